//! Xorshift128+ pseudo-random source.
//!
//! Every stochastic decision in the lattice engine draws from this
//! generator. The state transition is fixed (shift constants 23, 18, 5 and
//! the operand order below); changing any of it changes every downstream
//! lattice, so runs started from the same state are bit-identical.
//!
//! The generator is an ordinary owned value. Callers seed it once, then pass
//! it by `&mut` into the engine; nothing here is process-global.

use crate::error::{Error, Result};
use rand_core::{impls, OsRng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// 2^64 as an `f64`, exact.
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

/// Xorshift128+ (Vigna) with two 64-bit words of state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Xorshift128Plus {
    s: [u64; 2],
}

impl Xorshift128Plus {
    /// Build a generator from an explicit state.
    ///
    /// The all-zero state is a fixed point of the transition and is rejected.
    pub fn from_state(state: [u64; 2]) -> Result<Self> {
        if state == [0, 0] {
            return Err(Error::InvalidParameters(
                "xorshift128+ state must not be all zero".to_string(),
            ));
        }
        Ok(Self { s: state })
    }

    /// Seed from the operating system's entropy source.
    pub fn from_entropy() -> Result<Self> {
        Self::from_entropy_source(&mut OsRng)
    }

    /// Seed by reading exactly 128 bits from `source`.
    pub fn from_entropy_source<R: RngCore + ?Sized>(source: &mut R) -> Result<Self> {
        let mut bytes = [0u8; 16];
        source
            .try_fill_bytes(&mut bytes)
            .map_err(|e| Error::EntropyUnavailable(e.to_string()))?;

        let state = words_from_bytes(bytes);
        if state == [0, 0] {
            return Err(Error::EntropyUnavailable(
                "entropy source returned an all-zero seed".to_string(),
            ));
        }

        tracing::debug!("Seeded xorshift128+ from entropy");
        Ok(Self { s: state })
    }

    /// Current state, e.g. to log it so a run can be replayed.
    pub fn state(&self) -> [u64; 2] {
        self.s
    }

    /// Advance the state and return the pre-update sum.
    #[inline]
    pub fn next(&mut self) -> u64 {
        let mut s1 = self.s[0];
        let s0 = self.s[1];
        let result = s0.wrapping_add(s1);

        self.s[0] = s0;
        s1 ^= s1 << 23;
        self.s[1] = s1 ^ s0 ^ (s1 >> 18) ^ (s0 >> 5);

        result
    }
}

impl RngCore for Xorshift128Plus {
    fn next_u32(&mut self) -> u32 {
        (self.next() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Xorshift128Plus {
    type Seed = [u8; 16];

    fn from_seed(seed: Self::Seed) -> Self {
        let state = words_from_bytes(seed);
        if state == [0, 0] {
            return Self::seed_from_u64(0);
        }
        Self { s: state }
    }

    /// Expand a `u64` into the 128-bit state with SplitMix64.
    fn seed_from_u64(seed: u64) -> Self {
        let mut sm = seed;
        let mut s = [splitmix64(&mut sm), splitmix64(&mut sm)];
        while s == [0, 0] {
            s = [splitmix64(&mut sm), splitmix64(&mut sm)];
        }
        Self { s }
    }
}

/// Integer threshold for an acceptance test at probability `p`.
///
/// A draw `r` is accepted iff `r < p * 2^64`. For an integer `r` that is
/// `r < ceil(p * 2^64)`, so tiny positive `p` still accepts `r = 0`. The
/// comparison is done in 128 bits so `p = 1.0` (threshold 2^64) accepts every
/// draw and `p = 0.0` rejects every draw. NaN and negative `p` map to 0.
#[inline]
pub fn threshold(p: f64) -> u128 {
    (p * TWO_POW_64).ceil() as u128
}

/// Consume one draw and accept it with probability `p`.
#[inline]
pub fn chance<R: RngCore + ?Sized>(rng: &mut R, p: f64) -> bool {
    u128::from(rng.next_u64()) < threshold(p)
}

fn words_from_bytes(bytes: [u8; 16]) -> [u64; 2] {
    let mut lo = [0u8; 8];
    let mut hi = [0u8; 8];
    lo.copy_from_slice(&bytes[..8]);
    hi.copy_from_slice(&bytes[8..]);
    [u64::from_le_bytes(lo), u64::from_le_bytes(hi)]
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
