//! Bit cursor and MSB-first field extraction.
//!
//! Ancillary payloads are a dense stream of fixed-width words packed
//! most-significant bit first with no padding between them, so fields
//! routinely start and end in the middle of a byte. [`extract_bits`] reads
//! one such field and hands back the cursor positioned for the next one.
//!
//! ```rust
//! use st2110::utils::bit_cursor::{BitCursor, extract_bits};
//! use st2110::utils::buffer_view::BufferView;
//!
//! let data = [0b1111_0011, 0b0001_1100];
//! let view = BufferView::from(&data);
//!
//! let (value, cursor) = extract_bits(&view, BitCursor::new(), 4)?;
//! assert_eq!(value, 0b1111);
//!
//! let (value, cursor) = extract_bits(&view, cursor, 10)?;
//! assert_eq!(value, 0b00_1100_0111);
//! assert_eq!((cursor.byte_index(), cursor.bit_offset()), (1, 6));
//! # Ok::<(), st2110::utils::errors::BitError>(())
//! ```

use std::fmt::{Display, Formatter};

use crate::utils::buffer_view::BufferView;
use crate::utils::errors::BitError;

/// Widest field a single extraction may return.
pub const MAX_FIELD_WIDTH: u32 = 32;

/// Position inside a byte buffer: a byte index plus the number of bits
/// already consumed from that byte (0 = most significant bit).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BitCursor {
    byte_index: usize,
    bit_offset: u8,
}

impl BitCursor {
    /// Cursor at bit 0 of byte 0.
    pub const fn new() -> Self {
        Self {
            byte_index: 0,
            bit_offset: 0,
        }
    }

    pub const fn from_bits(position: u64) -> Self {
        Self {
            byte_index: (position >> 3) as usize,
            bit_offset: (position & 7) as u8,
        }
    }

    #[inline(always)]
    pub const fn byte_index(&self) -> usize {
        self.byte_index
    }

    #[inline(always)]
    pub const fn bit_offset(&self) -> u8 {
        self.bit_offset
    }

    #[inline(always)]
    pub const fn position_in_bits(&self) -> u64 {
        ((self.byte_index as u64) << 3) + self.bit_offset as u64
    }

    #[inline(always)]
    pub const fn is_byte_aligned(&self) -> bool {
        self.bit_offset == 0
    }

    /// Cursor `bits` further along, with the offset folded back into `[0, 7]`.
    ///
    /// `None` if the new position does not fit in a `u64` bit count.
    #[inline(always)]
    pub const fn advance(self, bits: u64) -> Option<Self> {
        match self.position_in_bits().checked_add(bits) {
            Some(position) => Some(Self::from_bits(position)),
            None => None,
        }
    }

    /// Rounds up to the next multiple of `bits`, counted from bit 0.
    pub const fn align_to(self, bits: u64) -> Self {
        if bits == 0 {
            return self;
        }

        let position = self.position_in_bits();
        Self::from_bits(position.div_ceil(bits) * bits)
    }
}

impl Display for BitCursor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "byte {} bit {}", self.byte_index, self.bit_offset)
    }
}

/// Reads the next `width` bits at `cursor` as a right-justified unsigned value.
///
/// Returns the value together with the cursor advanced by exactly `width`
/// bits. The caller's cursor is taken by value, so on error it is simply
/// left where it was.
///
/// # Errors
///
/// - [`BitError::InvalidWidth`] if `width` is 0 or above [`MAX_FIELD_WIDTH`].
/// - [`BitError::BufferUnderrun`] if fewer than `width` bits remain.
pub fn extract_bits(
    view: &BufferView<'_>,
    cursor: BitCursor,
    width: u32,
) -> Result<(u32, BitCursor), BitError> {
    if width == 0 || width > MAX_FIELD_WIDTH {
        return Err(BitError::InvalidWidth(width));
    }

    let underrun = || BitError::BufferUnderrun {
        requested: width as u64,
        available: view.remaining_bits(cursor),
        position: cursor.position_in_bits(),
    };

    if width as u64 > view.remaining_bits(cursor) {
        return Err(underrun());
    }

    let bytes = view.as_bytes();

    // Holds up to width + 7 bits, the worst case being a field that starts
    // at bit 7 of its first byte.
    let mut acc: u64 = 0;
    let mut gathered: u32 = 0;
    let mut byte_index = cursor.byte_index;
    let mut bit_offset = cursor.bit_offset as u32;

    while gathered < width {
        let Some(&byte) = bytes.get(byte_index) else {
            return Err(underrun());
        };

        let take = 8 - bit_offset;
        let bits = byte as u64 & ((1u64 << take) - 1);

        acc = (acc << take) | bits;
        gathered += take;

        byte_index += 1;
        bit_offset = 0;
    }

    let value = (acc >> (gathered - width)) & ((1u64 << width) - 1);

    let next = cursor.advance(width as u64).ok_or_else(underrun)?;

    Ok((value as u32, next))
}

/// Compile-time width variant of [`extract_bits`].
///
/// A width outside `1..=32` is rejected when the call is monomorphized.
#[inline(always)]
pub fn extract<const N: u32>(
    view: &BufferView<'_>,
    cursor: BitCursor,
) -> Result<(u32, BitCursor), BitError> {
    const {
        assert!(N >= 1 && N <= MAX_FIELD_WIDTH, "field width must be within 1..=32");
    }

    extract_bits(view, cursor, N)
}

/// Unsigned integer types a field can be read into.
pub trait FieldValue: Sized {
    const BITS: u32;

    fn from_field(value: u32) -> Self;
}

macro_rules! impl_field_value {
    ($($t:ty),+) => { $(
        impl FieldValue for $t {
            const BITS: u32 = <$t>::BITS;
            #[inline(always)] fn from_field(value: u32) -> Self { value as $t }
        }
    )+ }
}

impl_field_value!(u8, u16, u32, u64, usize);

/// Stateful reader pairing a [`BufferView`] with its own [`BitCursor`].
///
/// Every read goes through [`extract_bits`], so bounds are checked on each
/// field and a failed read leaves the position untouched.
#[derive(Debug, Clone, Copy)]
pub struct BitReader<'a> {
    view: BufferView<'a>,
    cursor: BitCursor,
}

impl<'a> BitReader<'a> {
    pub const fn new(view: BufferView<'a>) -> Self {
        Self {
            view,
            cursor: BitCursor::new(),
        }
    }

    pub const fn from_slice(buf: &'a [u8]) -> Self {
        Self::new(BufferView::new(buf))
    }

    #[inline(always)]
    pub fn get(&mut self) -> Result<bool, BitError> {
        self.get_n::<u8>(1).map(|bit| bit != 0)
    }

    #[inline(always)]
    pub fn get_n<T: FieldValue>(&mut self, n: u32) -> Result<T, BitError> {
        if n > T::BITS {
            return Err(BitError::InvalidWidth(n));
        }

        let (value, cursor) = extract_bits(&self.view, self.cursor, n)?;
        self.cursor = cursor;

        Ok(T::from_field(value))
    }

    #[inline(always)]
    pub fn skip_n(&mut self, n: u64) -> Result<(), BitError> {
        self.ensure(n)?;
        self.cursor = self.cursor.advance(n).ok_or(BitError::BufferUnderrun {
            requested: n,
            available: self.available(),
            position: self.position(),
        })?;

        Ok(())
    }

    /// Skips forward to the next multiple of `bits` from the start of the view.
    pub fn align(&mut self, bits: u64) -> Result<u64, BitError> {
        let aligned = self.cursor.align_to(bits);
        let skipped = aligned.position_in_bits() - self.cursor.position_in_bits();

        self.skip_n(skipped)?;

        Ok(skipped)
    }

    #[inline(always)]
    pub fn position(&self) -> u64 {
        self.cursor.position_in_bits()
    }

    #[inline(always)]
    pub fn available(&self) -> u64 {
        self.view.remaining_bits(self.cursor)
    }

    #[inline(always)]
    pub const fn cursor(&self) -> BitCursor {
        self.cursor
    }

    #[inline(always)]
    pub const fn view(&self) -> BufferView<'a> {
        self.view
    }

    fn ensure(&self, n: u64) -> Result<(), BitError> {
        let available = self.available();
        if n > available {
            return Err(BitError::BufferUnderrun {
                requested: n,
                available,
                position: self.position(),
            });
        }

        Ok(())
    }
}

impl Default for BitReader<'_> {
    fn default() -> Self {
        Self::from_slice(&[])
    }
}
