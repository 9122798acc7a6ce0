use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};

use crate::rsa::error::RsaError;

/// Square-and-multiply modular exponentiation: base^exponent mod modulus.
pub fn mod_exp(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> BigUint {
    let mut a = base % modulus;
    let mut q = exponent.clone();
    let mut r = BigUint::one() % modulus;
    while !q.is_zero() {
        if q.bit(0) {
            r = (&r * &a) % modulus;
        }
        q >>= 1;
        a = (&a * &a) % modulus;
    }
    r
}

/// Iterative Euclid.
pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    let mut a = a.clone();
    let mut b = b.clone();
    while !b.is_zero() {
        let r = &a % &b;
        a = b;
        b = r;
    }
    a
}

pub fn is_coprime(a: &BigUint, b: &BigUint) -> bool {
    gcd(a, b).is_one()
}

/// Returns `(g, x, y)` with `g = gcd(a, b)`.
///
/// The Bezout coefficients are normalized into `[0, b)` and `[0, a)` by
/// adding the opposite operand once when negative, so `x` is directly a
/// modular inverse of `a` mod `b` whenever `g == 1`. After normalization
/// `x*a + y*b` equals either `g` or `g + a*b`.
pub fn extended_gcd(a: &BigUint, b: &BigUint) -> (BigUint, BigUint, BigUint) {
    let oa = BigInt::from(a.clone());
    let ob = BigInt::from(b.clone());
    let (mut a, mut b) = (oa.clone(), ob.clone());
    let (mut x, mut lx) = (BigInt::zero(), BigInt::one());
    let (mut y, mut ly) = (BigInt::one(), BigInt::zero());
    while !b.is_zero() {
        let q = &a / &b;
        let r = &a % &b;
        a = b;
        b = r;
        let nx = &lx - &q * &x;
        lx = std::mem::replace(&mut x, nx);
        let ny = &ly - &q * &y;
        ly = std::mem::replace(&mut y, ny);
    }
    if lx.sign() == Sign::Minus {
        lx += &ob;
    }
    if ly.sign() == Sign::Minus {
        ly += &oa;
    }
    // all three are nonnegative now
    (
        a.to_biguint().unwrap_or_default(),
        lx.to_biguint().unwrap_or_default(),
        ly.to_biguint().unwrap_or_default(),
    )
}

/// Inverse of `e` modulo `phi`, in `[0, phi)`.
///
/// Fails with `NotCoprime` when `gcd(e, phi) != 1`; there is no silent
/// bogus-value path.
pub fn mod_inverse(e: &BigUint, phi: &BigUint) -> Result<BigUint, RsaError> {
    let (g, inv, _) = extended_gcd(e, phi);
    if !g.is_one() {
        return Err(RsaError::NotCoprime {
            a: e.clone(),
            b: phi.clone(),
        });
    }
    Ok(inv)
}
