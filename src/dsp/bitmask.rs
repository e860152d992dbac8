//! Bitmask Distortion
//!
//! Clears an arbitrary subset of the 32 bits of a sample's IEEE-754
//! representation. Clearing exponent or sign bits can yield denormals, zero
//! or a flipped sign; that is the effect, not a fault.

use crate::params::NUM_MASK_BITS;

/// Single-bit masks, index N has only bit N set
pub const BIT_MASKS: [u32; NUM_MASK_BITS] = build_bit_masks();

const fn build_bit_masks() -> [u32; NUM_MASK_BITS] {
    let mut masks = [0u32; NUM_MASK_BITS];
    let mut bit = 0;
    while bit < NUM_MASK_BITS {
        masks[bit] = 1 << bit;
        bit += 1;
    }
    masks
}

/// Fold the active bit flags into one mask of bits to clear
pub fn combine_masks(active: &[bool; NUM_MASK_BITS]) -> u32 {
    active
        .iter()
        .zip(BIT_MASKS.iter())
        .filter(|(on, _)| **on)
        .fold(0, |acc, (_, mask)| acc | mask)
}

/// Clear every bit set in `clear_mask` from the sample's bit pattern
///
/// A zero mask is an exact identity, NaN payloads included.
#[inline]
pub fn apply_mask(sample: f32, clear_mask: u32) -> f32 {
    f32::from_bits(sample.to_bits() & !clear_mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(bits: &[usize]) -> [bool; NUM_MASK_BITS] {
        let mut flags = [false; NUM_MASK_BITS];
        for &bit in bits {
            flags[bit] = true;
        }
        flags
    }

    #[test]
    fn test_masks_have_one_bit() {
        for (bit, mask) in BIT_MASKS.iter().enumerate() {
            assert_eq!(mask.count_ones(), 1);
            assert_eq!(mask.trailing_zeros() as usize, bit);
        }
    }

    #[test]
    fn test_clear_lsb_and_sign() {
        let sample = -0.123_456_79_f32;
        let pattern = sample.to_bits();
        let out = apply_mask(sample, combine_masks(&active(&[0, 31])));

        assert_eq!(out.to_bits(), pattern & !1 & !(1 << 31));
        assert!(out.is_sign_positive());
        // Every other bit untouched
        assert_eq!(out.to_bits() & 0x7FFF_FFFE, pattern & 0x7FFF_FFFE);
    }

    #[test]
    fn test_empty_mask_is_identity() {
        for sample in [0.5_f32, -1.0, 0.0, f32::MIN_POSITIVE, f32::NAN] {
            assert_eq!(apply_mask(sample, 0).to_bits(), sample.to_bits());
        }
        assert_eq!(combine_masks(&[false; NUM_MASK_BITS]), 0);
    }

    #[test]
    fn test_clearing_exponent_can_zero() {
        // 1.0 = 0x3F80_0000: sign 0, exponent 127, mantissa 0
        let exponent_bits: Vec<usize> = (23..31).collect();
        let out = apply_mask(1.0, combine_masks(&active(&exponent_bits)));
        assert_eq!(out, 0.0);
    }

    #[test]
    fn test_all_bits() {
        assert_eq!(combine_masks(&[true; NUM_MASK_BITS]), u32::MAX);
        assert_eq!(apply_mask(-42.0, u32::MAX).to_bits(), 0);
    }
}
