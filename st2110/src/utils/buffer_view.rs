//! Read-only, non-owning views over received datagrams.

use std::ops::{Bound, RangeBounds};

use crate::utils::bit_cursor::BitCursor;
use crate::utils::errors::ViewError;

/// Immutable view over a contiguous byte region.
///
/// The view borrows its bytes, so it can never outlive the datagram it was
/// built from. Slicing produces another view over the same storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferView<'a> {
    data: &'a [u8],
}

impl<'a> BufferView<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline(always)]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    #[inline(always)]
    pub fn byte_at(&self, index: usize) -> Result<u8, ViewError> {
        self.data.get(index).copied().ok_or(ViewError::OutOfRange {
            index,
            len: self.data.len(),
        })
    }

    /// Returns a view over `range`, validated against this view's length.
    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> Result<BufferView<'a>, ViewError> {
        let len = self.data.len();

        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => len,
        };

        if start > end || end > len {
            return Err(ViewError::InvalidRange { start, end, len });
        }

        Ok(Self {
            data: &self.data[start..end],
        })
    }

    /// Number of bits left between `cursor` and the end of the view.
    #[inline(always)]
    pub fn remaining_bits(&self, cursor: BitCursor) -> u64 {
        ((self.data.len() as u64) << 3).saturating_sub(cursor.position_in_bits())
    }
}

impl<'a> From<&'a [u8]> for BufferView<'a> {
    fn from(data: &'a [u8]) -> Self {
        Self::new(data)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for BufferView<'a> {
    fn from(data: &'a [u8; N]) -> Self {
        Self::new(data)
    }
}

impl AsRef<[u8]> for BufferView<'_> {
    fn as_ref(&self) -> &[u8] {
        self.data
    }
}
