use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::bounded;
use num::Integer;
use num_bigint::BigUint;
use num_traits::One;

use crate::rsa::config::RsaConfig;
use crate::rsa::error::RsaError;
use crate::rsa::math::{is_coprime, mod_exp};
use crate::rsa::random::random_bits;

/// Shrink the witness sample width by one bit after this many misses, so the
/// rejection loop cannot run away when the modulus sits just above a power
/// of two.
const WITNESS_SHRINK_INTERVAL: u32 = 10;

/// Miller-Rabin probabilistic primality test.
///
/// Composites that fail any round are rejected with certainty; a "true"
/// verdict is wrong with probability at most 4^-rounds. Callers pass
/// `rounds >= 1`.
pub fn is_probable_prime(num: &BigUint, rounds: u32) -> bool {
    let two = BigUint::from(2u32);
    let three = BigUint::from(3u32);
    if num < &two {
        return false;
    }
    if num == &two || num == &three {
        return true;
    }
    if num.is_even() {
        return false;
    }

    // num - 1 = d * 2^r with d odd
    let minus_one = num - 1u32;
    let mut d = minus_one.clone();
    let mut r: u64 = 0;
    while d.is_even() {
        d >>= 1;
        r += 1;
    }

    for _ in 0..rounds {
        let a = sample_witness(num);
        let mut x = mod_exp(&a, &d, num);
        if x.is_one() || x == minus_one {
            continue;
        }
        let mut passed = false;
        for _ in 1..r {
            x = (&x * &x) % num;
            if x.is_one() {
                // nontrivial square root of 1: certainly composite
                return false;
            }
            if x == minus_one {
                passed = true;
                break;
            }
        }
        if !passed {
            return false;
        }
    }
    true
}

/// Draws a witness uniformly-enough from [2, num - 2], num >= 5.
///
/// Each draw covers [0, 2^bits); draws that miss the window are rejected,
/// and the width shrinks one bit per `WITNESS_SHRINK_INTERVAL` misses
/// (floor 2 bits) so acceptance probability stays bounded away from zero.
fn sample_witness(num: &BigUint) -> BigUint {
    let two = BigUint::from(2u32);
    let upper = num - &two;
    let mut bit_size = num.bits();
    let mut tries: u32 = 0;
    loop {
        let a = random_bits(bit_size);
        if a >= two && a <= upper {
            return a;
        }
        tries += 1;
        if tries % WITNESS_SHRINK_INTERVAL == 0 && bit_size > 2 {
            bit_size -= 1;
        }
    }
}

/// Returns the first probable prime among uniform draws from [0, 2^n_bits).
///
/// The result may have fewer than `n_bits` significant bits; the top bit is
/// not forced.
pub fn generate_prime(n_bits: u64, rounds: u32, max_attempts: u64) -> Result<BigUint, RsaError> {
    if n_bits < 2 {
        return Err(RsaError::InvalidBitWidth(n_bits));
    }
    for _ in 0..max_attempts {
        let candidate = random_bits(n_bits);
        if is_probable_prime(&candidate, rounds) {
            return Ok(candidate);
        }
    }
    Err(RsaError::RetryBudgetExceeded {
        attempts: max_attempts,
    })
}

/// Runs the prime search on `cfg.threads` workers and collects `count`
/// distinct probable primes. Each candidate test is independent, so workers
/// share nothing but the channel and a stop flag.
pub fn generate_primes(n_bits: u64, count: usize, cfg: &RsaConfig) -> Result<Vec<BigUint>, RsaError> {
    if n_bits < 2 {
        return Err(RsaError::InvalidBitWidth(n_bits));
    }
    let threads = cfg.threads.max(1);
    let per_worker = cfg.max_attempts / threads as u64 + 1;
    let stop = Arc::new(AtomicBool::new(false));
    let (tx, rx) = bounded::<Option<BigUint>>(threads);
    let handles = (0..threads)
        .map(|_| {
            let tx = tx.clone();
            let stop = stop.clone();
            let rounds = cfg.rounds;
            thread::spawn(move || {
                for _ in 0..per_worker {
                    if stop.load(Ordering::Relaxed) {
                        return;
                    }
                    let candidate = random_bits(n_bits);
                    if is_probable_prime(&candidate, rounds)
                        && tx.send(Some(candidate)).is_err()
                    {
                        return;
                    }
                }
                let _ = tx.send(None);
            })
        })
        .collect::<Vec<_>>();
    drop(tx);

    let mut primes: Vec<BigUint> = Vec::with_capacity(count);
    let mut exhausted = 0;
    while primes.len() < count {
        match rx.recv() {
            Ok(Some(p)) => {
                if !primes.contains(&p) {
                    primes.push(p);
                }
            }
            Ok(None) => {
                exhausted += 1;
                if exhausted == threads {
                    break;
                }
            }
            Err(_) => break,
        }
    }
    stop.store(true, Ordering::Relaxed);
    drop(rx);
    for handle in handles {
        let _ = handle.join();
    }

    if primes.len() < count {
        return Err(RsaError::RetryBudgetExceeded {
            attempts: cfg.max_attempts,
        });
    }
    Ok(primes)
}

/// Picks `e` with `1 < e < modulus` and `gcd(modulus, e) == 1`.
pub fn generate_coprime(
    modulus: &BigUint,
    n_bits: u64,
    max_attempts: u64,
) -> Result<BigUint, RsaError> {
    if n_bits < 2 {
        return Err(RsaError::InvalidBitWidth(n_bits));
    }
    let one = BigUint::one();
    for _ in 0..max_attempts {
        let candidate = random_bits(n_bits);
        if candidate > one && &candidate < modulus && is_coprime(modulus, &candidate) {
            return Ok(candidate);
        }
    }
    Err(RsaError::RetryBudgetExceeded {
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::math::gcd;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    #[test]
    fn rejects_trivial_values() {
        assert!(!is_probable_prime(&big(0), 10));
        assert!(!is_probable_prime(&big(1), 10));
        assert!(!is_probable_prime(&big(4), 10));
        assert!(!is_probable_prime(&big(400), 50));
    }

    #[test]
    fn accepts_known_primes() {
        for p in [2u64, 3, 5, 7, 101, 601, 65537, 1125899839733759] {
            assert!(is_probable_prime(&big(p), 64), "{p} should test prime");
        }
    }

    #[test]
    fn rejects_known_composites() {
        // 341 = 11 * 31 (base-2 pseudoprime), 561 = 3 * 11 * 17 (Carmichael),
        // 60701 = 101 * 601
        for c in [9u64, 15, 341, 561, 60701] {
            assert!(!is_probable_prime(&big(c), 64), "{c} should test composite");
        }
    }

    #[test]
    fn sound_against_odd_semiprimes() {
        let small = [3u64, 5, 7, 11, 13, 17, 19, 23];
        for &p in &small {
            for &q in &small {
                assert!(
                    !is_probable_prime(&big(p * q), 40),
                    "{p}*{q} slipped through"
                );
            }
        }
    }

    #[test]
    fn generated_prime_fits_width_and_retests() {
        let p = generate_prime(16, 10, 100_000).unwrap();
        assert!(p.bits() <= 16);
        assert!(is_probable_prime(&p, 64));
    }

    #[test]
    fn tiny_bit_width_is_rejected() {
        assert_eq!(generate_prime(0, 10, 100), Err(RsaError::InvalidBitWidth(0)));
        assert_eq!(generate_prime(1, 10, 100), Err(RsaError::InvalidBitWidth(1)));
    }

    #[test]
    fn parallel_search_yields_distinct_primes() {
        let cfg = RsaConfig {
            prime_bits: 20,
            threads: 4,
            ..RsaConfig::default()
        };
        let primes = generate_primes(20, 2, &cfg).unwrap();
        assert_eq!(primes.len(), 2);
        assert_ne!(primes[0], primes[1]);
        for p in &primes {
            assert!(is_probable_prime(p, 64));
        }
    }

    #[test]
    fn coprime_generator_postconditions() {
        let phi = big(3120);
        let e = generate_coprime(&phi, 10, 100_000).unwrap();
        assert!(e > big(1));
        assert!(e < phi);
        assert!(gcd(&phi, &e).is_one());
    }

    #[test]
    fn coprime_budget_exhausts_on_impossible_modulus() {
        // no candidate satisfies 1 < c < 1
        let res = generate_coprime(&big(1), 8, 50);
        assert_eq!(res, Err(RsaError::RetryBudgetExceeded { attempts: 50 }));
    }
}
