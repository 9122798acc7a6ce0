//! Textbook RSA built from first principles: Miller-Rabin primality
//! testing over `num-bigint`, extended-Euclid key derivation, and raw
//! modular-exponentiation block encoding.
//!
//! This is a reference implementation. It applies no padding scheme, does
//! no message chunking (each block's integer value must stay below the
//! modulus), and makes no attempt at constant-time arithmetic. The 64-bit
//! default prime width exists to keep demos fast and is trivially
//! factorable. Do not use this for anything that needs to stay secret.

pub mod codec;
pub mod config;
pub mod error;
pub mod keys;
pub mod math;
pub mod prime_gen;
pub mod random;

pub use codec::{decrypt, encrypt};
pub use config::RsaConfig;
pub use error::RsaError;
pub use keys::{Key, KeySet};
