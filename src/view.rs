//! Non-owning byte views.
//!
//! A [`View`] is a `(pointer, length)` window into a buffer owned by someone
//! else, usually a memory-mapped archive. Sub-views never copy. Offsets handed
//! to the sub-ranging methods are expected to be validated by the caller;
//! passing an out-of-range offset is a programming error and panics.

use std::fmt;
use std::ops::Deref;

use memchr::memmem;

/// Read-only window into a byte buffer.
#[derive(Clone, Copy, Default)]
pub struct View<'a> {
    bytes: &'a [u8],
}

impl<'a> View<'a> {
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// The first `count` bytes.
    pub fn first(&self, count: usize) -> View<'a> {
        self.subrange(0, count)
    }

    /// The last `count` bytes.
    pub fn last(&self, count: usize) -> View<'a> {
        assert!(
            count <= self.len(),
            "view: last({count}) out of range for length {}",
            self.len()
        );
        self.subrange(self.len() - count, count)
    }

    /// `count` bytes starting at `offset`.
    pub fn subrange(&self, offset: usize, count: usize) -> View<'a> {
        assert!(
            offset <= self.len() && count <= self.len() - offset,
            "view: subrange({offset}, {count}) out of range for length {}",
            self.len()
        );
        View::new(&self.bytes[offset..offset + count])
    }

    /// Everything after the first `count` bytes.
    pub fn skip(&self, count: usize) -> View<'a> {
        assert!(
            count <= self.len(),
            "view: skip({count}) out of range for length {}",
            self.len()
        );
        View::new(&self.bytes[count..])
    }

    /// Position of the rightmost occurrence of `needle`.
    pub fn rfind(&self, needle: &[u8]) -> Option<usize> {
        memmem::rfind(self.bytes, needle)
    }

    /// Byte offset of `self` inside `outer`, if `self` lies entirely within it.
    pub fn offset_in(&self, outer: View<'_>) -> Option<usize> {
        let start = (self.bytes.as_ptr() as usize).checked_sub(outer.bytes.as_ptr() as usize)?;
        (start + self.len() <= outer.len()).then_some(start)
    }
}

impl<'a> From<&'a [u8]> for View<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        View::new(bytes)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for View<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        View::new(bytes)
    }
}

impl Deref for View<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.bytes
    }
}

impl AsRef<[u8]> for View<'_> {
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

/// Two views are equal when they cover the same bytes of the same buffer.
/// Compare [`View::as_bytes`] for content equality.
impl PartialEq for View<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.bytes.as_ptr(), other.bytes.as_ptr()) && self.len() == other.len()
    }
}

impl Eq for View<'_> {}

impl fmt::Debug for View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View").field("len", &self.len()).finish()
    }
}
