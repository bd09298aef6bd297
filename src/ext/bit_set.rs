use serde::{Deserialize, Serialize};

/// Order in which the bits of each byte map to consecutive indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    /// Bit 0 of byte 0 is index 0. Used by row images and column bitmaps.
    LsbFirst,
    /// Bit 7 of byte 0 is index 0. Used by table map signedness/visibility.
    MsbFirst,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitSet {
    bits: Vec<bool>,
}

impl BitSet {
    pub fn byte_len(bit_count: usize) -> usize {
        bit_count / 8 + usize::from(bit_count % 8 != 0)
    }

    pub fn from_bytes(bytes: &[u8], bit_count: usize, order: BitOrder) -> Self {
        let mut bits = Vec::with_capacity(bit_count);
        for i in 0..bit_count {
            let byte = bytes.get(i / 8).copied().unwrap_or(0);
            let shift = match order {
                BitOrder::LsbFirst => i % 8,
                BitOrder::MsbFirst => 7 - (i % 8),
            };
            bits.push(byte & (1 << shift) != 0);
        }
        Self { bits }
    }

    pub fn from_bools(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }

    /// Returns `default` for indices past the declared length.
    pub fn get_or(&self, index: usize, default: bool) -> bool {
        self.get(index).unwrap_or(default)
    }

    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_len() {
        assert_eq!(BitSet::byte_len(0), 0);
        assert_eq!(BitSet::byte_len(8), 1);
        assert_eq!(BitSet::byte_len(9), 2);
        assert_eq!(BitSet::byte_len(usize::MAX), usize::MAX / 8 + 1);
    }

    #[test]
    fn test_lsb_first() {
        let bits = BitSet::from_bytes(&[0b0000_0101, 0b0000_0001], 9, BitOrder::LsbFirst);
        assert_eq!(bits.len(), 9);
        assert_eq!(
            bits.iter().collect::<Vec<_>>(),
            vec![true, false, true, false, false, false, false, false, true]
        );
        assert_eq!(bits.count_ones(), 3);
    }

    #[test]
    fn test_msb_first() {
        let bits = BitSet::from_bytes(&[0b1010_0000], 3, BitOrder::MsbFirst);
        assert_eq!(bits.iter().collect::<Vec<_>>(), vec![true, false, true]);
    }

    #[test]
    fn test_get_or_past_end() {
        let bits = BitSet::from_bytes(&[0], 2, BitOrder::LsbFirst);
        assert!(!bits.get_or(1, true));
        assert!(bits.get_or(5, true));
    }
}
