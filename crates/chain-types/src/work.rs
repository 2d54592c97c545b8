//! # Proof-of-Work Arithmetic
//!
//! Compact difficulty decoding and the 256-bit per-block work scalar.
//!
//! The compact encoding packs a target threshold into 32 bits: one exponent
//! byte and a 23-bit mantissa (bit 23 is a sign bit and is never valid for
//! a target). The work claimed by a header is `2^256 / (target + 1)`,
//! computed as `(!target / (target + 1)) + 1` to stay within 256 bits.

use primitive_types::U256;

/// Decode a compact difficulty encoding into a 256-bit target.
///
/// Returns `None` for zero, negative (sign bit set) or overflowing targets,
/// which claim no work.
pub fn compact_to_target(bits: u32) -> Option<U256> {
    let exponent = (bits >> 24) as usize;
    let mantissa = bits & 0x007f_ffff;

    if mantissa == 0 || bits & 0x0080_0000 != 0 {
        return None;
    }

    let target = if exponent <= 3 {
        U256::from(mantissa >> (8 * (3 - exponent)))
    } else {
        let shift = 8 * (exponent - 3);
        if shift >= 256 {
            return None;
        }
        let shifted = U256::from(mantissa) << shift;
        // A round trip detects mantissa bits pushed off the top.
        if shifted >> shift != U256::from(mantissa) {
            return None;
        }
        shifted
    };

    if target.is_zero() {
        None
    } else {
        Some(target)
    }
}

/// The work scalar claimed by a compact difficulty encoding.
///
/// Invalid targets claim zero work, so malformed headers can never win a
/// work comparison.
pub fn work_from_bits(bits: u32) -> U256 {
    match compact_to_target(bits) {
        Some(target) => (!target / (target + U256::one())) + U256::one(),
        None => U256::zero(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_mantissa_has_no_target() {
        assert_eq!(compact_to_target(0), None);
        assert_eq!(compact_to_target(0x0400_0000), None);
    }

    #[test]
    fn test_sign_bit_has_no_target() {
        assert_eq!(compact_to_target(0x0480_0001), None);
    }

    #[test]
    fn test_overflowing_exponent_has_no_target() {
        assert_eq!(compact_to_target(0xff00_ffff), None);
        // Exponent 34 pushes a three-byte mantissa past 256 bits.
        assert_eq!(compact_to_target(0x2200_ffff), None);
    }

    #[test]
    fn test_small_exponent_shifts_right() {
        // Exponent 0: mantissa shifted right by 24 bits, always zero.
        assert_eq!(compact_to_target(0x0000_002a), None);
        // Exponent 3: mantissa used as-is.
        assert_eq!(compact_to_target(0x0300_002a), Some(U256::from(0x2au64)));
    }

    #[test]
    fn test_mainnet_genesis_target() {
        let target = compact_to_target(0x1d00ffff).expect("valid target");
        let expected = U256::from(0x00ffffu64) << (8 * (0x1d - 3));
        assert_eq!(target, expected);
    }

    #[test]
    fn test_invalid_bits_claim_zero_work() {
        assert_eq!(work_from_bits(0), U256::zero());
        assert_eq!(work_from_bits(0x0480_0001), U256::zero());
    }

    #[test]
    fn test_harder_target_claims_more_work() {
        // 0x207fffff is the easiest admissible target; the mainnet genesis
        // target is far harder.
        let easy = work_from_bits(0x207f_ffff);
        let hard = work_from_bits(0x1d00_ffff);
        assert!(!easy.is_zero());
        assert!(hard > easy);
    }

    #[test]
    fn test_work_round_trips_against_definition() {
        let target = compact_to_target(0x1d00ffff).unwrap();
        let work = work_from_bits(0x1d00ffff);
        // work * (target + 1) must not exceed 2^256, and adding one more
        // (target + 1) must.
        let product = work.checked_mul(target + U256::one());
        assert!(product.is_some());
        assert!(product.unwrap().checked_add(target + U256::one()).is_none());
    }
}
