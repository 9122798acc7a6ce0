use num_bigint::{BigUint, RandBigInt};
use rand::rngs::OsRng;

/// Draws a uniform integer from [0, 2^n_bits) out of the OS entropy source.
///
/// `OsRng` panics if the entropy source is unavailable; that failure is
/// fatal and not retried.
pub fn random_bits(n_bits: u64) -> BigUint {
    OsRng.gen_biguint(n_bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;
    use num_traits::Zero;

    #[test]
    fn zero_width_is_zero() {
        assert!(random_bits(0).is_zero());
    }

    #[test]
    fn stays_below_two_pow_n() {
        let bound = BigUint::from(256u32);
        for _ in 0..64 {
            assert!(random_bits(8) < bound);
        }
    }

    #[test]
    fn wide_draws_differ() {
        // 2^-128 collision chance
        assert_ne!(random_bits(128), random_bits(128));
    }
}
