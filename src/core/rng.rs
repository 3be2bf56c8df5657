//! Injected randomness for combat rolls.
//!
//! Every resolver that rolls dice takes `&mut impl CombatRng` instead of
//! reaching for a thread-local generator, so sessions can be replayed from a
//! seed and tests can script exact rolls.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub trait CombatRng {
    /// Uniform roll in `[0, 100)`.
    fn roll_percent(&mut self) -> f64;

    /// Uniform index in `[0, len)`. `len` must be non-zero.
    fn roll_index(&mut self, len: usize) -> usize;

    /// Succeeds with `chance_percent` probability.
    fn chance(&mut self, chance_percent: f64) -> bool {
        self.roll_percent() < chance_percent
    }

    /// Uniform value in `[min, max]`.
    fn roll_between(&mut self, min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        let span = (max - min).saturating_add(1).min(usize::MAX as u64) as usize;
        min + self.roll_index(span) as u64
    }
}

/// Adapts any `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomSource<R: Rng> {
    inner: R,
}

impl<R: Rng> RandomSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl RandomSource<ChaCha8Rng> {
    /// Reproducible generator for replays and simulations.
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_seed_bytes(seed: [u8; 32]) -> Self {
        Self::new(ChaCha8Rng::from_seed(seed))
    }
}

impl<R: Rng> CombatRng for RandomSource<R> {
    fn roll_percent(&mut self) -> f64 {
        self.inner.gen_range(0.0..100.0)
    }

    fn roll_index(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len.max(1))
    }
}

/// Replays a fixed sequence of rolls.
///
/// Each roll consumes the next scripted value. `roll_percent` returns it as-is
/// (clamped below 100) and `roll_index` reduces it modulo `len`. Once the
/// script runs out every roll returns `fallback`, which defaults to 99.0 so
/// unscripted chance checks fail.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    rolls: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedRng {
    pub fn new(rolls: impl IntoIterator<Item = f64>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            fallback: 99.0,
        }
    }

    /// A generator whose every roll is `value`.
    pub fn constant(value: f64) -> Self {
        Self {
            rolls: VecDeque::new(),
            fallback: value,
        }
    }

    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }

    fn next(&mut self) -> f64 {
        self.rolls.pop_front().unwrap_or(self.fallback)
    }
}

impl CombatRng for ScriptedRng {
    fn roll_percent(&mut self) -> f64 {
        self.next().clamp(0.0, 99.999)
    }

    fn roll_index(&mut self, len: usize) -> usize {
        let value = self.next().max(0.0) as usize;
        value % len.max(1)
    }
}
