//! DNS message header flags, decoded through the bit-field codec.
//!
//! Only the first four bytes (ID and the two flag bytes) are described.
//! Bits are numbered from the least significant end of each byte, and the
//! three Z bits are reserved.

use crate::codec::{Fields, Format, Pos, Record, Segment};
use crate::error::Result;
use crate::view::View;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DnsHeader {
    pub id: u16,
    pub qr: bool,
    pub opcode: u8,
    pub aa: bool,
    pub tc: bool,
    pub rd: bool,
    pub ra: bool,
    pub rcode: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsField {
    Id,
    Qr,
    Opcode,
    Aa,
    Tc,
    Rd,
    Ra,
    Rcode,
}

/// `DnsHeader` has no variable-length fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoBytes {}

const LAYOUT: &[Segment<DnsField, NoBytes>] = &[
    Segment::field(DnsField::Id, Pos::new(0, 16)),
    Segment::field(DnsField::Qr, Pos::new(0, 1)),
    Segment::field(DnsField::Opcode, Pos::new(1, 4)),
    Segment::field(DnsField::Aa, Pos::new(5, 1)),
    Segment::field(DnsField::Tc, Pos::new(6, 1)),
    Segment::field(DnsField::Rd, Pos::new(7, 1)),
    Segment::field(DnsField::Ra, Pos::new(0, 1)),
    Segment::reserved(Pos::new(1, 3)),
    Segment::field(DnsField::Rcode, Pos::new(4, 4)),
];

impl<'a> Fields<'a> for DnsHeader {
    type Int = DnsField;
    type Bytes = NoBytes;

    fn get(&self, field: DnsField) -> u64 {
        match field {
            DnsField::Id => self.id.into(),
            DnsField::Qr => self.qr.into(),
            DnsField::Opcode => self.opcode.into(),
            DnsField::Aa => self.aa.into(),
            DnsField::Tc => self.tc.into(),
            DnsField::Rd => self.rd.into(),
            DnsField::Ra => self.ra.into(),
            DnsField::Rcode => self.rcode.into(),
        }
    }

    fn set(&mut self, field: DnsField, value: u64) {
        match field {
            DnsField::Id => self.id = value as u16,
            DnsField::Qr => self.qr = value != 0,
            DnsField::Opcode => self.opcode = value as u8,
            DnsField::Aa => self.aa = value != 0,
            DnsField::Tc => self.tc = value != 0,
            DnsField::Rd => self.rd = value != 0,
            DnsField::Ra => self.ra = value != 0,
            DnsField::Rcode => self.rcode = value as u8,
        }
    }

    fn view(&self, field: NoBytes) -> View<'a> {
        match field {}
    }

    fn bind(&mut self, field: NoBytes, _: View<'a>) {
        match field {}
    }
}

impl<'a> Record<'a> for DnsHeader {
    const FORMAT: Format<DnsField, NoBytes> = Format::new(LAYOUT);
}

impl DnsHeader {
    pub const fn min_bytes() -> usize {
        <Self as Record<'static>>::FORMAT.min_bytes()
    }

    pub fn read(bytes: &[u8]) -> Result<Self> {
        let (header, _) = Self::decode(View::new(bytes))?;
        Ok(header)
    }

    pub fn write<'b>(&self, buf: &'b mut [u8]) -> Result<&'b mut [u8]> {
        self.encode(buf)
    }
}
