use std::fmt::Debug;

use super::Format;
use crate::error::Result;
use crate::view::View;

/// Tagged field access for a record type.
///
/// A record exposes its integer fields through `Int` selectors and its
/// variable-length fields through `Bytes` selectors. A [`Format`] names
/// fields only by selector, so one layout description drives both the read
/// and the write direction.
pub trait Fields<'a> {
    type Int: Copy + Debug + 'static;
    type Bytes: Copy + Debug + 'static;

    fn get(&self, field: Self::Int) -> u64;

    /// Store a decoded value. The value never exceeds the segment's width.
    fn set(&mut self, field: Self::Int, value: u64);

    fn view(&self, field: Self::Bytes) -> View<'a>;

    fn bind(&mut self, field: Self::Bytes, value: View<'a>);
}

/// A record with a fixed on-wire [`Format`].
pub trait Record<'a>: Fields<'a> + Default + 'a {
    const FORMAT: Format<Self::Int, Self::Bytes>;

    /// Decode one record from the front of `view`, returning it together
    /// with the bytes that follow it.
    fn decode(view: View<'a>) -> Result<(Self, View<'a>)> {
        let mut record = Self::default();
        let rest = Self::FORMAT.read(view, &mut record)?;
        Ok((record, rest))
    }

    /// Encode into the front of `buf`, returning the unused tail.
    fn encode<'b>(&self, buf: &'b mut [u8]) -> Result<&'b mut [u8]> {
        Self::FORMAT.write(buf, self)
    }

    /// Encode into a freshly allocated buffer of exactly the encoded size.
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; Self::FORMAT.encoded_len(self)];
        self.encode(&mut buf)?;
        Ok(buf)
    }
}
