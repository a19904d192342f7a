use super::Pos;

/// One entry of a [`Format`](super::Format).
///
/// `I` selects an integer field of the target record and `B` selects one of
/// its variable-length byte fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<I, B> {
    /// A fixed-width bit field. `field` is `None` for reserved bits, which
    /// are consumed on read and written as zero.
    Fixed { pos: Pos, field: Option<I> },
    Dynamic(DynamicSegment<I, B>),
}

/// A byte range whose length comes from an integer field decoded earlier in
/// the same record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicSegment<I, B> {
    pub data: B,
    pub length: I,
    pub min_bytes: usize,
    pub max_bytes: usize,
}

impl<I, B> Segment<I, B> {
    /// A field occupying `pos`.
    pub const fn field(field: I, pos: Pos) -> Self {
        Segment::Fixed {
            pos,
            field: Some(field),
        }
    }

    /// A byte-aligned integer field of `n` bytes.
    pub const fn int(field: I, n: u32) -> Self {
        Self::field(field, Pos::bytes(n))
    }

    /// Bits that are skipped on read.
    pub const fn reserved(pos: Pos) -> Self {
        Segment::Fixed { pos, field: None }
    }

    /// A byte field of `min_bytes..=max_bytes` bytes sized by `length`.
    pub const fn dynamic(data: B, length: I, min_bytes: usize, max_bytes: usize) -> Self {
        assert!(
            min_bytes <= max_bytes,
            "dynamic segment needs min_bytes <= max_bytes"
        );
        Segment::Dynamic(DynamicSegment {
            data,
            length,
            min_bytes,
            max_bytes,
        })
    }

    /// A byte field sized by a 16-bit length, as used throughout ZIP records.
    pub const fn dynamic_u16(data: B, length: I) -> Self {
        Self::dynamic(data, length, 0, u16::MAX as usize)
    }

    /// Bytes this segment always consumes. Fields that leave their byte
    /// group open consume nothing; the closing field accounts for the word.
    pub const fn min_bytes(&self) -> usize {
        match self {
            Segment::Fixed { pos, .. } if pos.closes_group() => pos.word_bytes(),
            Segment::Fixed { .. } => 0,
            Segment::Dynamic(dynamic) => dynamic.min_bytes,
        }
    }

    pub const fn max_bytes(&self) -> usize {
        match self {
            Segment::Fixed { .. } => self.min_bytes(),
            Segment::Dynamic(dynamic) => dynamic.max_bytes,
        }
    }
}
