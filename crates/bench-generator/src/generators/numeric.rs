//! Numeric value generators, gates, and repeat counts.

use crate::emitter::{Emitter, SeededRng};
use crate::error::GeneratorError;
use crate::generators::choice::{gaussian_weights, WeightedChoice};
use bench_core::{FieldValue, RepeatConfig};
use rand::Rng;

/// Generate a random integer in the given range (inclusive).
pub fn generate_int_range<R: Rng>(rng: &mut R, min: i64, max: i64) -> i64 {
    if min >= max {
        return min;
    }
    rng.random_range(min..=max)
}

/// Generate a random float in the given range (inclusive).
pub fn generate_float_range<R: Rng>(rng: &mut R, min: f64, max: f64) -> f64 {
    if min >= max {
        return min;
    }
    rng.random_range(min..=max)
}

/// Clamp a probability to [0, 1]; NaN counts as never.
pub fn clamp_chance(chance: f64) -> f64 {
    if chance.is_nan() {
        0.0
    } else {
        chance.clamp(0.0, 1.0)
    }
}

/// Roll a probability. Certain outcomes do not consume the stream.
pub fn roll_chance<R: Rng>(rng: &mut R, chance: f64) -> bool {
    if chance >= 1.0 {
        true
    } else if chance.is_nan() || chance <= 0.0 {
        false
    } else {
        rng.random_bool(chance)
    }
}

/// Sequential integers, or zero-padded strings when a width is set.
#[derive(Debug, Clone)]
pub struct Sequential {
    start: i64,
    width: Option<usize>,
    next: i64,
}

impl Sequential {
    pub fn new(start: i64, width: Option<usize>) -> Self {
        Self {
            start,
            width,
            next: start,
        }
    }
}

impl Emitter for Sequential {
    type Item = FieldValue;

    fn emit_one(&mut self) -> FieldValue {
        let value = self.next;
        self.next = self.next.wrapping_add(1);
        match self.width {
            Some(width) => FieldValue::Str(format!("{value:0width$}")),
            None => FieldValue::Int(value),
        }
    }

    fn emits_unique(&self) -> bool {
        true
    }

    fn seed(&mut self, _seed: Option<u64>) {
        self.reset();
    }

    fn reset(&mut self) {
        self.next = self.start;
    }
}

/// Random integers in an inclusive range.
#[derive(Debug, Clone)]
pub struct IntRange {
    min: i64,
    max: i64,
    rng: SeededRng,
}

impl IntRange {
    pub fn new(min: i64, max: i64, seed: Option<u64>) -> Self {
        Self {
            min,
            max,
            rng: SeededRng::new(seed),
        }
    }
}

impl Emitter for IntRange {
    type Item = i64;

    fn emit_one(&mut self) -> i64 {
        generate_int_range(&mut self.rng, self.min, self.max)
    }

    fn max_unique(&self) -> Option<u64> {
        let span = (self.max as i128 - self.min as i128).max(0) + 1;
        u64::try_from(span).ok()
    }

    fn seed(&mut self, seed: Option<u64>) {
        self.rng.reseed(seed);
    }

    fn reset(&mut self) {
        self.rng.reset();
    }
}

/// Random floats in an inclusive range.
#[derive(Debug, Clone)]
pub struct FloatRange {
    min: f64,
    max: f64,
    rng: SeededRng,
}

impl FloatRange {
    pub fn new(min: f64, max: f64, seed: Option<u64>) -> Self {
        Self {
            min,
            max,
            rng: SeededRng::new(seed),
        }
    }
}

impl Emitter for FloatRange {
    type Item = f64;

    fn emit_one(&mut self) -> f64 {
        generate_float_range(&mut self.rng, self.min, self.max)
    }

    fn seed(&mut self, seed: Option<u64>) {
        self.rng.reseed(seed);
    }

    fn reset(&mut self) {
        self.rng.reset();
    }
}

/// Boolean emitter that is `true` with a fixed probability.
///
/// Serves both as the `weighted_bool` generator and as the occurrence gate
/// deciding whether a field has a value at all.
#[derive(Debug, Clone)]
pub struct Chance {
    chance: f64,
    rng: SeededRng,
}

impl Chance {
    pub fn new(chance: f64, seed: Option<u64>) -> Self {
        Self {
            chance: clamp_chance(chance),
            rng: SeededRng::new(seed),
        }
    }

    pub fn chance(&self) -> f64 {
        self.chance
    }
}

impl Emitter for Chance {
    type Item = bool;

    fn emit_one(&mut self) -> bool {
        roll_chance(&mut self.rng, self.chance)
    }

    fn max_unique(&self) -> Option<u64> {
        Some(2)
    }

    fn seed(&mut self, seed: Option<u64>) {
        self.rng.reseed(seed);
    }

    fn reset(&mut self) {
        self.rng.reset();
    }
}

/// Number of values a multi-valued field gets per document.
#[derive(Debug, Clone)]
pub struct RepeatCount {
    counts: WeightedChoice<usize>,
}

impl RepeatCount {
    /// Uniform over `min..=max`, or bell-weighted around `mean` when given.
    pub fn new(config: &RepeatConfig, seed: Option<u64>) -> Result<Self, GeneratorError> {
        let counts: Vec<usize> = (config.min..=config.max).collect();
        let weights = config.mean.map(|mean| {
            let peak = mean - config.min as f64 + 1.0;
            let spread = ((config.max - config.min) as f64 / 4.0).max(1.0);
            gaussian_weights(counts.len(), peak, spread, f64::MIN_POSITIVE)
        });
        Ok(Self {
            counts: WeightedChoice::new(counts, weights, seed)?,
        })
    }
}

impl Emitter for RepeatCount {
    type Item = usize;

    fn emit_one(&mut self) -> usize {
        self.counts.emit_one()
    }

    fn seed(&mut self, seed: Option<u64>) {
        self.counts.seed(seed);
    }

    fn reset(&mut self) {
        self.counts.reset();
    }
}
