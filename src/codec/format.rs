use std::fmt::Debug;

use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

use super::{DynamicSegment, Fields, Segment};
use crate::error::{Error, Result};
use crate::view::View;

/// Why a list of segments does not describe a contiguous layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("format has no segments")]
    Empty,
    #[error("segment {index} leaves a gap or overlaps the previous segment")]
    Disjointed { index: usize },
    #[error("dynamic segment {index} starts inside an open byte group")]
    DynamicInsideGroup { index: usize },
    #[error("last segment does not end on a byte boundary")]
    Unterminated,
}

/// On-wire layout of one record type: an ordered list of segments.
///
/// Formats are meant to be built in `const` items, where the layout check
/// runs during compilation:
///
/// ```
/// use zipview::codec::{Format, Pos, Segment};
///
/// #[derive(Debug, Clone, Copy)]
/// enum Field { Version, Flags, Length }
///
/// const LAYOUT: &[Segment<Field, ()>] = &[
///     Segment::field(Field::Version, Pos::new(0, 4)),
///     Segment::field(Field::Flags, Pos::new(4, 4)),
///     Segment::int(Field::Length, 2),
/// ];
/// const FORMAT: Format<Field, ()> = Format::new(LAYOUT);
///
/// assert_eq!(FORMAT.min_bytes(), 3);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Format<I: 'static, B: 'static> {
    segments: &'static [Segment<I, B>],
    min_bytes: usize,
    max_bytes: usize,
}

impl<I: 'static, B: 'static> Format<I, B> {
    /// Build a format, panicking if the segments are not contiguous.
    pub const fn new(segments: &'static [Segment<I, B>]) -> Self {
        match Self::try_new(segments) {
            Ok(format) => format,
            Err(LayoutError::Empty) => panic!("format has no segments"),
            Err(LayoutError::Disjointed { .. }) => {
                panic!("there should not be any disjointed segments")
            }
            Err(LayoutError::DynamicInsideGroup { .. }) => {
                panic!("dynamic segment starts inside an open byte group")
            }
            Err(LayoutError::Unterminated) => panic!("last segment does not end on a byte boundary"),
        }
    }

    /// Build a format, checking that consecutive fixed segments neither
    /// overlap nor leave gaps inside a byte group.
    pub const fn try_new(segments: &'static [Segment<I, B>]) -> std::result::Result<Self, LayoutError> {
        if segments.is_empty() {
            return Err(LayoutError::Empty);
        }

        let mut min_bytes = 0usize;
        let mut max_bytes = 0usize;
        // Bit at which the next segment must start within the current group.
        let mut next_lsb = 0u32;

        let mut index = 0;
        while index < segments.len() {
            let segment = &segments[index];
            match segment {
                Segment::Fixed { pos, .. } => {
                    if pos.lsb() != next_lsb {
                        return Err(LayoutError::Disjointed { index });
                    }
                    next_lsb = if pos.closes_group() { 0 } else { pos.msb() + 1 };
                }
                Segment::Dynamic(_) => {
                    if next_lsb != 0 {
                        return Err(LayoutError::DynamicInsideGroup { index });
                    }
                }
            }
            min_bytes += segment.min_bytes();
            max_bytes += segment.max_bytes();
            index += 1;
        }

        if next_lsb != 0 {
            return Err(LayoutError::Unterminated);
        }

        Ok(Self {
            segments,
            min_bytes,
            max_bytes,
        })
    }

    pub const fn segments(&self) -> &'static [Segment<I, B>] {
        self.segments
    }

    /// Smallest number of bytes a record of this format can occupy.
    pub const fn min_bytes(&self) -> usize {
        self.min_bytes
    }

    /// Largest number of bytes a record of this format can occupy.
    pub const fn max_bytes(&self) -> usize {
        self.max_bytes
    }
}

impl<I: Copy + Debug + 'static, B: Copy + Debug + 'static> Format<I, B> {
    /// Decode `view` into `out`, returning the bytes after the record.
    ///
    /// On failure `out` may be partially written and should be discarded.
    pub fn read<'a, R>(&self, view: View<'a>, out: &mut R) -> Result<View<'a>>
    where
        R: Fields<'a, Int = I, Bytes = B> + ?Sized,
    {
        if view.len() < self.min_bytes {
            return Err(Error::BufferTooShort {
                needed: self.min_bytes,
                available: view.len(),
            });
        }
        read_segments(self.segments, view, out)
    }

    /// Encode `record` into the front of `buf`, returning the unused tail.
    ///
    /// Each word is read, has the segment's bits replaced and is stored
    /// back, so fields sharing a byte group compose.
    pub fn write<'b, 'a, R>(&self, buf: &'b mut [u8], record: &R) -> Result<&'b mut [u8]>
    where
        R: Fields<'a, Int = I, Bytes = B> + ?Sized,
    {
        if buf.len() < self.min_bytes {
            return Err(Error::BufferTooShort {
                needed: self.min_bytes,
                available: buf.len(),
            });
        }
        write_segments(self.segments, buf, record)
    }

    /// Exact encoded size of `record`.
    pub fn encoded_len<'a, R>(&self, record: &R) -> usize
    where
        R: Fields<'a, Int = I, Bytes = B> + ?Sized,
    {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Fixed { .. } => segment.min_bytes(),
                Segment::Dynamic(dynamic) => record.view(dynamic.data).len(),
            })
            .sum()
    }
}

fn read_segments<'a, I, B, R>(
    segments: &[Segment<I, B>],
    view: View<'a>,
    out: &mut R,
) -> Result<View<'a>>
where
    I: Copy + Debug,
    B: Copy + Debug,
    R: Fields<'a, Int = I, Bytes = B> + ?Sized,
{
    let [segment, rest @ ..] = segments else {
        return Ok(view);
    };

    let view = match segment {
        Segment::Fixed { pos, field } => {
            let word_bytes = pos.word_bytes();
            if view.len() < word_bytes {
                return Err(Error::BufferTooShort {
                    needed: word_bytes,
                    available: view.len(),
                });
            }
            if let Some(field) = field {
                let word = LittleEndian::read_uint(&view[..word_bytes], word_bytes);
                out.set(*field, pos.extract(word));
            }
            if pos.closes_group() {
                view.skip(word_bytes)
            } else {
                view
            }
        }
        Segment::Dynamic(dynamic) => {
            let requested = out.get(dynamic.length);
            let count = checked_dynamic_len(dynamic, requested, view.len())?;
            out.bind(dynamic.data, view.first(count));
            view.skip(count)
        }
    };

    read_segments(rest, view, out)
}

fn write_segments<'b, 'a, I, B, R>(
    segments: &[Segment<I, B>],
    buf: &'b mut [u8],
    record: &R,
) -> Result<&'b mut [u8]>
where
    I: Copy + Debug,
    B: Copy + Debug,
    R: Fields<'a, Int = I, Bytes = B> + ?Sized,
{
    let [segment, rest @ ..] = segments else {
        return Ok(buf);
    };

    let buf = match segment {
        Segment::Fixed { pos, field } => {
            let word_bytes = pos.word_bytes();
            if buf.len() < word_bytes {
                return Err(Error::BufferTooShort {
                    needed: word_bytes,
                    available: buf.len(),
                });
            }
            let value = field.map_or(0, |field| record.get(field));
            let word = LittleEndian::read_uint(&buf[..word_bytes], word_bytes);
            LittleEndian::write_uint(
                &mut buf[..word_bytes],
                pos.insert(word, value),
                word_bytes,
            );
            if pos.closes_group() {
                &mut buf[word_bytes..]
            } else {
                buf
            }
        }
        Segment::Dynamic(dynamic) => {
            let declared = record.get(dynamic.length);
            let bytes = record.view(dynamic.data);
            if declared != bytes.len() as u64 {
                return Err(Error::DynamicLengthMismatch {
                    field: format!("{:?}", dynamic.data),
                    declared,
                    actual: bytes.len(),
                });
            }
            let count = checked_dynamic_len(dynamic, declared, buf.len())?;
            buf[..count].copy_from_slice(&bytes);
            &mut buf[count..]
        }
    };

    write_segments(rest, buf, record)
}

/// Validate a requested dynamic length against the segment's range and the
/// bytes actually available.
fn checked_dynamic_len<I, B: Debug>(
    dynamic: &DynamicSegment<I, B>,
    requested: u64,
    available: usize,
) -> Result<usize> {
    match usize::try_from(requested) {
        Ok(count)
            if count >= dynamic.min_bytes && count <= dynamic.max_bytes && count <= available =>
        {
            Ok(count)
        }
        _ => Err(Error::InvalidDynamicLength {
            field: format!("{:?}", dynamic.data),
            requested,
            min: dynamic.min_bytes,
            max: dynamic.max_bytes,
            available,
        }),
    }
}
