//! # Participant Bitset
//!
//! Bit `i` is set iff the roster member at position `i` contributed to the
//! aggregate. The aggregated signature carries no identities, so this is
//! the only way the destination chain learns who signed.
//!
//! ## Wire Forms
//!
//! - Chain B: little-endian `u64` words, bit `i` in word `i / 64`.
//! - Chain A: the same 256 bits read as one unsigned integer (bit `i` has
//!   value `2^i`), serialized big-endian in 32 bytes.

use bitvec::prelude::*;
use shared_types::U256;

/// Fixed bitset width; rosters larger than this cannot be represented.
pub const VALIDATORS_CAPACITY: usize = 256;

/// Positional participant bitset of fixed width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantBitset {
    bits: BitVec<u64, Lsb0>,
}

impl ParticipantBitset {
    /// An empty bitset of `VALIDATORS_CAPACITY` bits.
    pub fn new() -> Self {
        Self {
            bits: bitvec![u64, Lsb0; 0; VALIDATORS_CAPACITY],
        }
    }

    /// Marks `position`. Positions at or beyond capacity are ignored.
    pub fn set(&mut self, position: usize) {
        if position < VALIDATORS_CAPACITY {
            self.bits.set(position, true);
        }
    }

    /// Whether `position` is marked.
    pub fn is_set(&self, position: usize) -> bool {
        self.bits.get(position).map(|b| *b).unwrap_or(false)
    }

    /// Number of marked positions.
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// Marked positions in ascending order.
    pub fn positions(&self) -> Vec<usize> {
        self.bits.iter_ones().collect()
    }

    /// Chain B form: little-endian 64-bit words.
    pub fn to_words(&self) -> Vec<u64> {
        self.bits.as_raw_slice().to_vec()
    }

    /// Chain A form as an integer.
    pub fn to_u256(&self) -> U256 {
        let mut words = [0u64; 4];
        for (dst, src) in words.iter_mut().zip(self.bits.as_raw_slice()) {
            *dst = *src;
        }
        U256(words)
    }

    /// Chain A form: 32-byte big-endian integer.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        self.to_u256().to_big_endian(&mut out);
        out
    }
}

impl Default for ParticipantBitset {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_map_to_low_bits() {
        let mut bits = ParticipantBitset::new();
        for p in [0, 1, 3] {
            bits.set(p);
        }
        assert_eq!(bits.count(), 3);
        assert_eq!(bits.positions(), vec![0, 1, 3]);
        assert_eq!(bits.to_words(), vec![0b1011, 0, 0, 0]);
        assert_eq!(bits.to_u256(), U256::from(0b1011u64));
        let be = bits.to_be_bytes();
        assert_eq!(be[31], 0b1011);
        assert!(be[..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_high_positions_cross_words() {
        let mut bits = ParticipantBitset::new();
        bits.set(64);
        bits.set(255);
        assert_eq!(bits.to_words(), vec![0, 1, 0, 1 << 63]);
        assert_eq!(bits.to_be_bytes()[0], 0x80);
        assert_eq!(bits.to_be_bytes()[23], 0x01);
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut bits = ParticipantBitset::new();
        bits.set(VALIDATORS_CAPACITY);
        assert_eq!(bits.count(), 0);
        assert!(!bits.is_set(VALIDATORS_CAPACITY));
    }
}
