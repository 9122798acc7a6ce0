use num_bigint::BigUint;
use num_traits::One;

use crate::rsa::codec;
use crate::rsa::config::RsaConfig;
use crate::rsa::error::RsaError;
use crate::rsa::math::mod_inverse;
use crate::rsa::prime_gen::{generate_coprime, generate_primes, is_probable_prime};

/// One exposed key tuple: `(exponent, modulus)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub exponent: BigUint,
    pub modulus: BigUint,
}

/// Public/private keypair sharing a modulus.
///
/// The primes `p`, `q` and the totient live only inside the derivation
/// frame; neither key retains them.
#[derive(Debug, Clone)]
pub struct KeySet {
    pub public: Key,
    pub private: Key,
}

/// Euler totient of `p * q` for distinct primes: `(p - 1) * (q - 1)`.
pub fn phi(p: &BigUint, q: &BigUint) -> BigUint {
    (p - 1u32) * (q - 1u32)
}

impl KeySet {
    /// Generates a fresh keypair: two distinct `cfg.prime_bits`-bit probable
    /// primes from the parallel search, then `e` coprime to the totient and
    /// `d` its inverse.
    pub fn generate(cfg: &RsaConfig) -> Result<KeySet, RsaError> {
        let mut primes = generate_primes(cfg.prime_bits, 2, cfg)?;
        let (q, p) = (primes.pop(), primes.pop());
        match (p, q) {
            (Some(p), Some(q)) => KeySet::derive(p, q, cfg),
            _ => Err(RsaError::RetryBudgetExceeded {
                attempts: cfg.max_attempts,
            }),
        }
    }

    /// Derives a keypair from caller-supplied primes, picking `e` at random.
    pub fn from_primes(p: BigUint, q: BigUint, cfg: &RsaConfig) -> Result<KeySet, RsaError> {
        check_primes(&p, &q, cfg.rounds)?;
        KeySet::derive(p, q, cfg)
    }

    /// Derives a keypair from caller-supplied primes and public exponent,
    /// for deterministic use.
    pub fn from_primes_with_exponent(
        p: BigUint,
        q: BigUint,
        e: BigUint,
        rounds: u32,
    ) -> Result<KeySet, RsaError> {
        check_primes(&p, &q, rounds)?;
        let n = &p * &q;
        let f = phi(&p, &q);
        if e <= BigUint::one() || e >= f {
            return Err(RsaError::InvalidExponent);
        }
        let d = mod_inverse(&e, &f)?;
        debug_assert!(((&e * &d) % &f).is_one());
        Ok(KeySet {
            public: Key {
                exponent: e,
                modulus: n.clone(),
            },
            private: Key {
                exponent: d,
                modulus: n,
            },
        })
    }

    fn derive(p: BigUint, q: BigUint, cfg: &RsaConfig) -> Result<KeySet, RsaError> {
        let n = &p * &q;
        let f = phi(&p, &q);
        let e = generate_coprime(&f, cfg.prime_bits, cfg.max_attempts)?;
        let d = mod_inverse(&e, &f)?;
        debug_assert!(((&e * &d) % &f).is_one());
        Ok(KeySet {
            public: Key {
                exponent: e,
                modulus: n.clone(),
            },
            private: Key {
                exponent: d,
                modulus: n,
            },
        })
    }

    /// Raw-RSA encode of one block under the public key.
    pub fn encode(&self, message: &[u8]) -> Result<Vec<u8>, RsaError> {
        codec::encrypt(message, &self.public)
    }

    /// Raw-RSA decode of one block under the private key.
    pub fn decode(&self, message: &[u8]) -> Result<Vec<u8>, RsaError> {
        codec::decrypt(message, &self.private)
    }
}

fn check_primes(p: &BigUint, q: &BigUint, rounds: u32) -> Result<(), RsaError> {
    if p == q || !is_probable_prime(p, rounds) || !is_probable_prime(q, rounds) {
        return Err(RsaError::InvalidPrimes);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    #[test]
    fn textbook_keypair() {
        // p = 61, q = 53: n = 3233, phi = 3120, e = 17 gives d = 2753
        let ks = KeySet::from_primes_with_exponent(big(61), big(53), big(17), 40).unwrap();
        assert_eq!(ks.public.modulus, big(3233));
        assert_eq!(ks.private.modulus, big(3233));
        assert_eq!(ks.public.exponent, big(17));
        assert_eq!(ks.private.exponent, big(2753));
    }

    #[test]
    fn rejects_equal_or_composite_primes() {
        let cfg = RsaConfig::default();
        assert!(matches!(
            KeySet::from_primes(big(61), big(61), &cfg),
            Err(RsaError::InvalidPrimes)
        ));
        assert!(matches!(
            KeySet::from_primes(big(91), big(53), &cfg),
            Err(RsaError::InvalidPrimes)
        ));
        assert!(matches!(
            KeySet::from_primes_with_exponent(big(61), big(53), big(1), 40),
            Err(RsaError::InvalidExponent)
        ));
        assert!(matches!(
            KeySet::from_primes_with_exponent(big(61), big(53), big(3120), 40),
            Err(RsaError::InvalidExponent)
        ));
    }

    #[test]
    fn non_coprime_exponent_is_detected() {
        // phi(61, 53) = 3120 = 2^4 * 3 * 5 * 13; e = 26 shares 2 and 13
        assert!(matches!(
            KeySet::from_primes_with_exponent(big(61), big(53), big(26), 40),
            Err(RsaError::NotCoprime { .. })
        ));
    }

    #[test]
    fn derived_exponents_invert_mod_phi() {
        let cfg = RsaConfig {
            prime_bits: 24,
            threads: 2,
            ..RsaConfig::default()
        };
        let mut primes = generate_primes(24, 2, &cfg).unwrap();
        let q = primes.pop().unwrap();
        let p = primes.pop().unwrap();
        let ks = KeySet::from_primes(p.clone(), q.clone(), &cfg).unwrap();
        let f = phi(&p, &q);
        assert_eq!(ks.public.modulus, &p * &q);
        assert_eq!(ks.public.modulus, ks.private.modulus);
        assert!(((&ks.public.exponent * &ks.private.exponent) % &f).is_one());
        assert!(ks.public.exponent > BigUint::one());
        assert!(ks.public.exponent < f);
        assert!(ks.private.exponent < f);
    }

    #[test]
    fn generate_produces_working_keys() {
        let cfg = RsaConfig {
            prime_bits: 32,
            ..RsaConfig::default()
        };
        let ks = KeySet::generate(&cfg).unwrap();
        assert!(ks.public.modulus > BigUint::one());
        assert_eq!(ks.public.modulus, ks.private.modulus);
    }
}
