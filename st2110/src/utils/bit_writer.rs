//! MSB-first bit packing, the inverse of [`bit_cursor`](crate::utils::bit_cursor).

use std::fmt::{self, Debug, Formatter};
use std::io;

use bitstream_io::{BigEndian, BitWrite, BitWriter};

pub struct BitPacker {
    bs: BitWriter<Vec<u8>, BigEndian>,
    position: u64,
}

impl Debug for BitPacker {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitPacker")
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

impl Default for BitPacker {
    fn default() -> Self {
        Self {
            bs: BitWriter::endian(Vec::new(), BigEndian),
            position: 0,
        }
    }
}

impl BitPacker {
    #[inline(always)]
    pub fn put(&mut self, bit: bool) -> io::Result<()> {
        self.bs.write_bit(bit)?;
        self.position += 1;
        Ok(())
    }

    /// Writes the low `n` bits of `value`; fails if `value` does not fit.
    #[inline(always)]
    pub fn put_n(&mut self, n: u32, value: u32) -> io::Result<()> {
        self.bs.write_unsigned_var(n, value)?;
        self.position += n as u64;
        Ok(())
    }

    /// Pads with zero bits up to the next multiple of `bits`.
    pub fn align(&mut self, bits: u64) -> io::Result<u64> {
        let padding = (bits - self.position % bits) % bits;

        let mut left = padding;
        while left > 0 {
            let n = left.min(32) as u32;
            self.put_n(n, 0)?;
            left -= n as u64;
        }

        Ok(padding)
    }

    #[inline(always)]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Zero-pads to a byte boundary and returns the packed bytes.
    pub fn into_bytes(mut self) -> io::Result<Vec<u8>> {
        self.bs.byte_align()?;
        Ok(self.bs.into_writer())
    }
}
