/// Bit position of a field inside one little-endian word.
///
/// The word is the smallest of 1, 2, 4 or 8 bytes that holds
/// `lsb + width` bits. Segments that share a byte group all read the same
/// starting address; only the segment whose most significant bit closes the
/// group advances the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    lsb: u8,
    width: u8,
}

impl Pos {
    /// `width` bits starting at bit `lsb`.
    ///
    /// Panics (at compile time when used in a `const`) if `width` is not in
    /// `1..=64` or the field does not fit a 64-bit word.
    pub const fn new(lsb: u32, width: u32) -> Self {
        assert!(width >= 1 && width <= 64, "Pos width must be in 1..=64");
        assert!(lsb + width <= 64, "Pos must fit in a 64-bit word");
        Self {
            lsb: lsb as u8,
            width: width as u8,
        }
    }

    /// A whole, byte-aligned integer of `n` bytes.
    pub const fn bytes(n: u32) -> Self {
        Self::new(0, 8 * n)
    }

    pub const fn lsb(&self) -> u32 {
        self.lsb as u32
    }

    pub const fn width(&self) -> u32 {
        self.width as u32
    }

    pub const fn msb(&self) -> u32 {
        self.lsb() + self.width() - 1
    }

    /// Size in bytes of the word this field is extracted from.
    pub const fn word_bytes(&self) -> usize {
        match (self.lsb() + self.width()).div_ceil(8) {
            1 => 1,
            2 => 2,
            3 | 4 => 4,
            _ => 8,
        }
    }

    /// Whether this field ends on a byte boundary, completing its group.
    pub const fn closes_group(&self) -> bool {
        (self.msb() + 1) % 8 == 0
    }

    /// Mask of `width` low bits. A full 64-bit width cannot be built by shifting.
    pub const fn mask(&self) -> u64 {
        if self.width() == u64::BITS {
            u64::MAX
        } else {
            (1u64 << self.width()) - 1
        }
    }

    /// Extract this field's value from a raw word.
    pub const fn extract(&self, word: u64) -> u64 {
        (word >> self.lsb()) & self.mask()
    }

    /// Replace this field's bits inside `word` with `value`.
    pub const fn insert(&self, word: u64, value: u64) -> u64 {
        let mask = self.mask() << self.lsb();
        (word & !mask) | ((value & self.mask()) << self.lsb())
    }
}
