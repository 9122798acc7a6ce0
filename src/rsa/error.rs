use num_bigint::BigUint;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RsaError {
    #[error("invalid prime bit width {0}, need at least 2 bits")]
    InvalidBitWidth(u64),
    #[error("supplied primes are invalid (equal, too small, or composite)")]
    InvalidPrimes,
    #[error("public exponent out of range")]
    InvalidExponent,
    #[error("{a} has no inverse modulo {b}: gcd is not 1")]
    NotCoprime { a: BigUint, b: BigUint },
    #[error("message value does not fit below the modulus")]
    MessageTooLarge,
    #[error("retry budget of {attempts} attempts exceeded")]
    RetryBudgetExceeded { attempts: u64 },
}
