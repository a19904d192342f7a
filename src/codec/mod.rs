//! Declarative bit-field codec.
//!
//! A record's on-wire layout is written once as a list of [`Segment`]s and
//! wrapped in a [`Format`]. The same format drives decoding ([`Format::read`])
//! and encoding ([`Format::write`]).
//!
//! - Fixed segments ([`Pos`]) extract `width` bits starting at `lsb` from a
//!   little-endian word. Consecutive segments may share a word; the cursor
//!   only advances once a segment ends on a byte boundary.
//! - Dynamic segments bind a sub-view whose length was decoded earlier in
//!   the same record. Decoded byte fields borrow from the input and are
//!   never copied.

mod format;
mod pos;
mod record;
mod segment;

pub use format::{Format, LayoutError};
pub use pos::Pos;
pub use record::{Fields, Record};
pub use segment::{DynamicSegment, Segment};
