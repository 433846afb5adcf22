//! ST 291 word integrity.
//!
//! DID, SDID and Data_Count words carry an 8-bit value in b0-b7, even parity
//! of those bits in b8 and the inverse of b8 in b9. The checksum word is the
//! 9-bit sum of b0-b8 of every word from DID through the last user data
//! word, again with b9 = !b8.

/// Mask for the 10-bit words of an ancillary packet.
pub const WORD_MASK: u16 = 0x3FF;

#[inline(always)]
pub const fn parity_bits(value: u8) -> u16 {
    let b8 = (value.count_ones() & 1) as u16;
    (b8 << 8) | ((b8 ^ 1) << 9)
}

/// Extends an 8-bit value with its b8/b9 parity bits.
#[inline(always)]
pub const fn with_parity(value: u8) -> u16 {
    value as u16 | parity_bits(value)
}

#[inline(always)]
pub const fn parity_ok(word: u16) -> bool {
    (word & 0xFC00) == 0 && with_parity(word as u8) == word
}

/// 9-bit sum of b0-b8 of `words`.
pub fn checksum(words: &[u16]) -> u16 {
    words
        .iter()
        .fold(0u16, |sum, word| sum.wrapping_add(word & 0x1FF))
        & 0x1FF
}

/// Checksum value with b9 set to the inverse of b8.
pub fn checksum_word(words: &[u16]) -> u16 {
    let sum = checksum(words);
    sum | ((!sum >> 8) & 1) << 9
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parity_of_known_values() {
        // 0x61 has three bits set: b8 = 1, b9 = 0
        assert_eq!(with_parity(0x61), 0x161);
        // 0x41 has two bits set: b8 = 0, b9 = 1
        assert_eq!(with_parity(0x41), 0x241);
        assert_eq!(with_parity(0x00), 0x200);
        assert_eq!(with_parity(0xFF), 0x2FF);

        assert!(parity_ok(0x161));
        assert!(!parity_ok(0x061));
        assert!(!parity_ok(0x361));
        assert!(!parity_ok(0x1161));
    }

    #[test]
    fn every_byte_round_trips() {
        for value in 0..=255u8 {
            let word = with_parity(value);
            assert!(parity_ok(word));
            assert_eq!(word as u8, value);
            assert!(word <= WORD_MASK);
        }
    }

    #[test]
    fn checksum_wraps_at_nine_bits() {
        // 0x03 has two bits set, so b8 = 0 and only b9 is added above b0-b7
        let words = [with_parity(0x61), with_parity(0x01), with_parity(0x03), 0x1FF, 0x1FF];
        assert_eq!(words[2], 0x203);
        let sum = (0x161 + 0x101 + 0x003 + 0x1FF + 0x1FF) & 0x1FF;

        assert_eq!(checksum(&words), sum);
        assert_eq!(checksum_word(&words) & 0x1FF, sum);
        assert_eq!(checksum_word(&words) >> 9, ((sum >> 8) & 1) ^ 1);

        assert_eq!(checksum_word(&[]), 0x200);
    }
}
