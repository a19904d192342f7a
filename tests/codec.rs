use proptest::prelude::*;

use zipview::codec::{Fields, Format, Pos, Record, Segment};
use zipview::dns::DnsHeader;
use zipview::zip::{CentralDirectoryFileHeader, EocdRecord, LocalFileHeader};
use zipview::{Error, View};

/// A made-up telemetry frame header with groups of 1, 2, 4 and 8 bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Frame {
    version: u8,
    kind: u8,
    urgent: bool,
    channel: u16,
    priority: u8,
    sequence: u32,
    window: u8,
    stamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameField {
    Version,
    Kind,
    Urgent,
    Channel,
    Priority,
    Sequence,
    Window,
    Stamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nothing {}

const FRAME_LAYOUT: &[Segment<FrameField, Nothing>] = &[
    Segment::field(FrameField::Version, Pos::new(0, 2)),
    Segment::field(FrameField::Kind, Pos::new(2, 3)),
    Segment::field(FrameField::Urgent, Pos::new(5, 1)),
    Segment::reserved(Pos::new(6, 2)),
    Segment::field(FrameField::Channel, Pos::new(0, 12)),
    Segment::field(FrameField::Priority, Pos::new(12, 4)),
    Segment::field(FrameField::Sequence, Pos::new(0, 28)),
    Segment::field(FrameField::Window, Pos::new(28, 4)),
    Segment::field(FrameField::Stamp, Pos::bytes(8)),
];

impl<'a> Fields<'a> for Frame {
    type Int = FrameField;
    type Bytes = Nothing;

    fn get(&self, field: FrameField) -> u64 {
        match field {
            FrameField::Version => self.version.into(),
            FrameField::Kind => self.kind.into(),
            FrameField::Urgent => self.urgent.into(),
            FrameField::Channel => self.channel.into(),
            FrameField::Priority => self.priority.into(),
            FrameField::Sequence => self.sequence.into(),
            FrameField::Window => self.window.into(),
            FrameField::Stamp => self.stamp,
        }
    }

    fn set(&mut self, field: FrameField, value: u64) {
        match field {
            FrameField::Version => self.version = value as u8,
            FrameField::Kind => self.kind = value as u8,
            FrameField::Urgent => self.urgent = value != 0,
            FrameField::Channel => self.channel = value as u16,
            FrameField::Priority => self.priority = value as u8,
            FrameField::Sequence => self.sequence = value as u32,
            FrameField::Window => self.window = value as u8,
            FrameField::Stamp => self.stamp = value,
        }
    }

    fn view(&self, field: Nothing) -> View<'a> {
        match field {}
    }

    fn bind(&mut self, field: Nothing, _: View<'a>) {
        match field {}
    }
}

impl<'a> Record<'a> for Frame {
    const FORMAT: Format<FrameField, Nothing> = Format::new(FRAME_LAYOUT);
}

fn frame_by_hand(b: &[u8]) -> Frame {
    let w16 = u16::from_le_bytes([b[1], b[2]]);
    let w32 = u32::from_le_bytes([b[3], b[4], b[5], b[6]]);
    let mut stamp = [0u8; 8];
    stamp.copy_from_slice(&b[7..15]);
    Frame {
        version: b[0] & 0x3,
        kind: (b[0] >> 2) & 0x7,
        urgent: (b[0] >> 5) & 1 == 1,
        channel: w16 & 0x0FFF,
        priority: (w16 >> 12) as u8,
        sequence: w32 & 0x0FFF_FFFF,
        window: (w32 >> 28) as u8,
        stamp: u64::from_le_bytes(stamp),
    }
}

fn dns_by_hand(b: &[u8]) -> DnsHeader {
    DnsHeader {
        id: u16::from_le_bytes([b[0], b[1]]),
        qr: b[2] & 1 == 1,
        opcode: (b[2] >> 1) & 0xF,
        aa: (b[2] >> 5) & 1 == 1,
        tc: (b[2] >> 6) & 1 == 1,
        rd: b[2] >> 7 == 1,
        ra: b[3] & 1 == 1,
        rcode: b[3] >> 4,
    }
}

#[test]
fn repeated_byte_oracle() {
    for pattern in 0..=255u8 {
        let buf = vec![pattern; 1024];

        let dns = DnsHeader::read(&buf).unwrap();
        assert_eq!(dns, dns_by_hand(&buf), "dns header, pattern {pattern:#04x}");

        let (frame, rest) = Frame::decode(View::new(&buf)).unwrap();
        assert_eq!(frame, frame_by_hand(&buf), "frame, pattern {pattern:#04x}");
        assert_eq!(rest.len(), 1024 - 15);
    }
}

#[test]
fn fixed_sizes() {
    assert_eq!(Frame::FORMAT.min_bytes(), 15);
    assert_eq!(Frame::FORMAT.max_bytes(), 15);
    assert_eq!(DnsHeader::min_bytes(), 4);
    assert!(EocdRecord::min_bytes() <= EocdRecord::max_bytes());
    assert!(CentralDirectoryFileHeader::min_bytes() <= CentralDirectoryFileHeader::max_bytes());
    assert!(LocalFileHeader::min_bytes() <= LocalFileHeader::max_bytes());
}

#[test]
fn reserved_bits_are_written_as_zero() {
    let mut buf = [0xFFu8; 15];
    Frame::default().encode(&mut buf).unwrap();
    assert_eq!(buf, [0u8; 15]);
}

proptest! {
    #[test]
    fn short_views_are_rejected(bytes in proptest::collection::vec(any::<u8>(), 0..15)) {
        let err = Frame::decode(View::new(&bytes)).unwrap_err();
        let is_too_short = matches!(err, Error::BufferTooShort { .. });
        prop_assert!(is_too_short);
    }

    #[test]
    fn decode_then_encode_restores_the_bytes(mut bytes in proptest::array::uniform15(any::<u8>())) {
        // Reserved bits do not survive a round trip.
        bytes[0] &= 0x3F;

        let (frame, _) = Frame::decode(View::new(&bytes)).unwrap();
        let encoded = frame.to_bytes().unwrap();
        prop_assert_eq!(&encoded[..], &bytes[..]);
    }

    #[test]
    fn dns_header_round_trips(bytes in proptest::array::uniform4(any::<u8>())) {
        let mut expected = bytes;
        expected[3] &= 0xF1;

        let header = DnsHeader::read(&bytes).unwrap();
        let mut out = [0u8; 4];
        header.write(&mut out).unwrap();
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn dynamic_length_past_the_view_is_rejected(available in 0usize..64, excess in 1u16..512) {
        let name = vec![b'n'; available];
        let header = LocalFileHeader {
            signature: LocalFileHeader::SIGNATURE,
            name_len: available as u16,
            name: View::new(&name),
            ..LocalFileHeader::default()
        };
        let mut bytes = header.to_bytes().unwrap();
        // Claim more name bytes than follow the fixed part.
        bytes[26..28].copy_from_slice(&(available as u16 + excess).to_le_bytes());

        let err = LocalFileHeader::read(View::new(&bytes)).unwrap_err();
        let is_invalid_len = matches!(err, Error::InvalidDynamicLength { .. });
        prop_assert!(is_invalid_len);
    }

    #[test]
    fn dynamic_fields_borrow_the_input(name in "[a-z/]{0,40}", extra in proptest::collection::vec(any::<u8>(), 0..40)) {
        let header = LocalFileHeader {
            signature: LocalFileHeader::SIGNATURE,
            name_len: name.len() as u16,
            extra_len: extra.len() as u16,
            name: View::new(name.as_bytes()),
            extra: View::new(&extra),
            ..LocalFileHeader::default()
        };
        let mut bytes = header.to_bytes().unwrap();
        bytes.extend(b"payload");

        let input = View::new(&bytes);
        let (decoded, rest) = LocalFileHeader::read(input).unwrap();
        prop_assert_eq!(decoded.name.as_bytes(), name.as_bytes());
        prop_assert_eq!(decoded.extra.as_bytes(), &extra[..]);
        prop_assert_eq!(decoded.name.offset_in(input), Some(LocalFileHeader::min_bytes()));
        prop_assert_eq!(rest.as_bytes(), b"payload");
    }
}
