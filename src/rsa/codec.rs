use num_bigint::BigUint;

use crate::rsa::error::RsaError;
use crate::rsa::keys::Key;
use crate::rsa::math::mod_exp;

/// Encodes one raw block under `(e, n)`: big-endian bytes to integer,
/// `m^e mod n`, minimal big-endian bytes back out.
///
/// The block's integer value must be below the modulus; larger values are
/// rejected instead of wrapping. Chunking and padding are a caller concern.
pub fn encrypt(message: &[u8], key: &Key) -> Result<Vec<u8>, RsaError> {
    apply(message, key)
}

/// Mirror of [`encrypt`] under `(d, n)`.
pub fn decrypt(message: &[u8], key: &Key) -> Result<Vec<u8>, RsaError> {
    apply(message, key)
}

fn apply(block: &[u8], key: &Key) -> Result<Vec<u8>, RsaError> {
    let value = BigUint::from_bytes_be(block);
    if value >= key.modulus {
        return Err(RsaError::MessageTooLarge);
    }
    let out = mod_exp(&value, &key.exponent, &key.modulus);
    // to_bytes_be gives [0] for zero, so output is never empty
    Ok(out.to_bytes_be())
}
