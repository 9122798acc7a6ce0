/// Default bit width per prime. 64-bit primes keep the demo fast but are
/// trivially factorable; use 1024 bits or more for anything real.
pub const DEFAULT_PRIME_BITS: u64 = 64;

/// Recommended Miller-Rabin round count; worst-case false-positive
/// probability is at most 4^-rounds.
pub const DEFAULT_ROUNDS: u32 = 10;

/// Candidate budget for the probabilistic search loops before they give up
/// with `RetryBudgetExceeded`.
pub const DEFAULT_MAX_ATTEMPTS: u64 = 100_000;

#[derive(Debug, Clone)]
pub struct RsaConfig {
    pub prime_bits: u64,
    pub rounds: u32,
    pub max_attempts: u64,
    pub threads: usize,
}

impl Default for RsaConfig {
    fn default() -> Self {
        Self {
            prime_bits: DEFAULT_PRIME_BITS,
            rounds: DEFAULT_ROUNDS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            threads: num_cpus::get(),
        }
    }
}
