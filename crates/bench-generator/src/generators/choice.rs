//! Weighted choice from a finite item set, with and without replacement.

use crate::emitter::{Emitter, SeededRng};
use crate::error::GeneratorError;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::seq::SliceRandom;
use rand::Rng;

/// Weighted random choice with replacement.
///
/// Uniform when no weights are given.
#[derive(Debug, Clone)]
pub struct WeightedChoice<T> {
    items: Vec<T>,
    weights: Option<Vec<f64>>,
    index: Option<WeightedIndex<f64>>,
    rng: SeededRng,
}

impl<T: Clone> WeightedChoice<T> {
    /// Create a choice over `items`, weighted by `weights` if given.
    pub fn new(
        items: Vec<T>,
        weights: Option<Vec<f64>>,
        seed: Option<u64>,
    ) -> Result<Self, GeneratorError> {
        if items.is_empty() {
            return Err(GeneratorError::EmptyChoice("items"));
        }
        let index = match &weights {
            Some(weights) => {
                check_weights(items.len(), weights)?;
                Some(
                    WeightedIndex::new(weights.iter().copied())
                        .map_err(|e| GeneratorError::InvalidWeights(e.to_string()))?,
                )
            }
            None => None,
        };
        Ok(Self {
            items,
            weights,
            index,
            rng: SeededRng::new(seed),
        })
    }

    /// Create a uniform choice over `items`.
    pub fn uniform(items: Vec<T>, seed: Option<u64>) -> Result<Self, GeneratorError> {
        Self::new(items, None, seed)
    }

    /// The full item set.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Per-item weights, if not uniform.
    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    /// The configured seed.
    pub fn current_seed(&self) -> Option<u64> {
        self.rng.current_seed()
    }
}

impl<T: Clone> Emitter for WeightedChoice<T> {
    type Item = T;

    fn emit_one(&mut self) -> T {
        let idx = match &self.index {
            Some(index) => index.sample(&mut self.rng),
            None => self.rng.random_range(0..self.items.len()),
        };
        self.items[idx].clone()
    }

    fn max_unique(&self) -> Option<u64> {
        Some(self.items.len() as u64)
    }

    fn seed(&mut self, seed: Option<u64>) {
        self.rng.reseed(seed);
    }

    fn reset(&mut self) {
        self.rng.reset();
    }
}

/// Weighted random choice without replacement.
///
/// Each item is emitted at most once per reset. The emission order is drawn
/// up front on reset using exponential keys (`ln(u) / w`, highest first),
/// which gives the same distribution as repeatedly drawing a weighted item
/// and removing it.
#[derive(Debug, Clone)]
pub struct UniqueChoice<T> {
    items: Vec<T>,
    weights: Option<Vec<f64>>,
    /// Remaining item indexes; the next item is at the end.
    pending: Vec<usize>,
    rng: SeededRng,
}

impl<T: Clone> UniqueChoice<T> {
    /// Create a without-replacement choice over `items`.
    pub fn new(
        items: Vec<T>,
        weights: Option<Vec<f64>>,
        seed: Option<u64>,
    ) -> Result<Self, GeneratorError> {
        if items.is_empty() {
            return Err(GeneratorError::EmptyChoice("items"));
        }
        if let Some(weights) = &weights {
            check_weights(items.len(), weights)?;
        }
        let mut choice = Self {
            items,
            weights,
            pending: Vec::new(),
            rng: SeededRng::new(seed),
        };
        choice.draw_order();
        Ok(choice)
    }

    /// Derive a without-replacement choice over the same items and weights.
    pub fn from_weighted(
        source: &WeightedChoice<T>,
        seed: Option<u64>,
    ) -> Result<Self, GeneratorError> {
        Self::new(
            source.items().to_vec(),
            source.weights().map(<[f64]>::to_vec),
            seed,
        )
    }

    fn draw_order(&mut self) {
        let n = self.items.len();
        match &self.weights {
            None => {
                let mut order: Vec<usize> = (0..n).collect();
                order.shuffle(&mut self.rng);
                self.pending = order;
            }
            Some(weights) => {
                let mut keyed: Vec<(f64, f64, usize)> = weights
                    .iter()
                    .enumerate()
                    .map(|(idx, &w)| {
                        let u: f64 = self.rng.random();
                        let tiebreak: f64 = self.rng.random();
                        (u.ln() / w, tiebreak, idx)
                    })
                    .collect();
                // Ascending, so the highest key is popped first.
                keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
                self.pending = keyed.into_iter().map(|(_, _, idx)| idx).collect();
            }
        }
    }

    /// Number of items not yet emitted since the last reset.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// The full item set.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Emit the next unused item.
    pub fn try_emit_one(&mut self) -> Result<T, GeneratorError> {
        match self.pending.pop() {
            Some(idx) => Ok(self.items[idx].clone()),
            None => Err(GeneratorError::Exhausted {
                requested: 1,
                remaining: 0,
            }),
        }
    }

    /// Emit `n` unused items, or nothing if fewer than `n` remain.
    pub fn try_emit_many(&mut self, n: usize) -> Result<Vec<T>, GeneratorError> {
        if n > self.pending.len() {
            return Err(GeneratorError::Exhausted {
                requested: n,
                remaining: self.pending.len(),
            });
        }
        Ok((0..n).filter_map(|_| self.try_emit_one().ok()).collect())
    }

    /// Emit every unused item.
    pub fn emit_remaining(&mut self) -> Vec<T> {
        let n = self.pending.len();
        self.try_emit_many(n).unwrap_or_default()
    }

    /// Set the seed and reset.
    pub fn seed(&mut self, seed: Option<u64>) {
        self.rng.reseed(seed);
        self.draw_order();
    }

    /// Make every item available again, in a fresh order from the seed.
    pub fn reset(&mut self) {
        self.rng.reset();
        self.draw_order();
    }
}

fn check_weights(n_items: usize, weights: &[f64]) -> Result<(), GeneratorError> {
    if weights.len() != n_items {
        return Err(GeneratorError::InvalidWeights(format!(
            "{} weights given for {} items",
            weights.len(),
            n_items
        )));
    }
    if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(GeneratorError::InvalidWeights(format!(
            "weights must be finite and non-negative, got {bad}"
        )));
    }
    Ok(())
}

/// Bell-curve weights over positions `1..=n`.
///
/// `mu` is the peak position and `sigma` the spread. Weights never drop
/// below `floor`, so a positive floor keeps every position reachable.
pub fn gaussian_weights(n: usize, mu: f64, sigma: f64, floor: f64) -> Vec<f64> {
    let sigma = if sigma > 0.0 { sigma } else { 1.0 };
    (1..=n)
        .map(|pos| {
            let z = (pos as f64 - mu) / sigma;
            (-0.5 * z * z).exp().max(floor)
        })
        .collect()
}

/// A weighted choice whose weights follow a bell curve over item positions.
pub fn gaussian_choice<T: Clone>(
    items: Vec<T>,
    mu: f64,
    sigma: f64,
    floor: f64,
    seed: Option<u64>,
) -> Result<WeightedChoice<T>, GeneratorError> {
    let weights = gaussian_weights(items.len(), mu, sigma, floor);
    WeightedChoice::new(items, Some(weights), seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_weighted_choice_respects_weights() {
        let mut choice =
            WeightedChoice::new(vec!["a", "b", "c"], Some(vec![0.0, 1.0, 0.0]), Some(42)).unwrap();

        let values = choice.emit_many(50);
        assert!(values.iter().all(|v| *v == "b"));
    }

    #[test]
    fn test_weighted_choice_deterministic() {
        let mut a = WeightedChoice::uniform((0..100).collect::<Vec<_>>(), Some(7)).unwrap();
        let mut b = WeightedChoice::uniform((0..100).collect::<Vec<_>>(), Some(7)).unwrap();

        assert_eq!(a.emit_many(20), b.emit_many(20));
    }

    #[test]
    fn test_weighted_choice_errors() {
        let empty: Result<WeightedChoice<u8>, _> = WeightedChoice::uniform(vec![], None);
        assert!(matches!(empty, Err(GeneratorError::EmptyChoice(_))));

        let mismatched = WeightedChoice::new(vec![1, 2], Some(vec![1.0]), None);
        assert!(matches!(mismatched, Err(GeneratorError::InvalidWeights(_))));

        let all_zero = WeightedChoice::new(vec![1, 2], Some(vec![0.0, 0.0]), None);
        assert!(matches!(all_zero, Err(GeneratorError::InvalidWeights(_))));

        let negative = WeightedChoice::new(vec![1, 2], Some(vec![1.0, -1.0]), None);
        assert!(matches!(negative, Err(GeneratorError::InvalidWeights(_))));
    }

    #[test]
    fn test_unique_choice_emits_each_once() {
        let mut choice = UniqueChoice::new((0..10).collect(), None, Some(3)).unwrap();
        let values = choice.try_emit_many(10).unwrap();

        let distinct: HashSet<_> = values.iter().collect();
        assert_eq!(distinct.len(), 10);
        assert_eq!(choice.remaining(), 0);
        assert!(matches!(
            choice.try_emit_one(),
            Err(GeneratorError::Exhausted { remaining: 0, .. })
        ));
    }

    #[test]
    fn test_unique_choice_partial_request_fails_whole() {
        let mut choice = UniqueChoice::new(vec!['a', 'b', 'c'], None, Some(3)).unwrap();
        choice.try_emit_one().unwrap();

        let result = choice.try_emit_many(3);
        assert!(matches!(
            result,
            Err(GeneratorError::Exhausted {
                requested: 3,
                remaining: 2
            })
        ));
        // Nothing was consumed by the failed request
        assert_eq!(choice.emit_remaining().len(), 2);
    }

    #[test]
    fn test_unique_choice_zero_weight_items_still_emitted() {
        let weights = vec![1.0, 0.0, f64::MIN_POSITIVE, 5.0];
        let mut choice = UniqueChoice::new(vec![0, 1, 2, 3], Some(weights), Some(11)).unwrap();

        let mut values = choice.emit_remaining();
        values.sort();
        assert_eq!(values, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_unique_choice_heavy_weights_come_first() {
        // With an overwhelming weight, item 0 should lead nearly every order
        let mut leads = 0;
        for seed in 0..50 {
            let mut choice =
                UniqueChoice::new(vec![0, 1, 2], Some(vec![1000.0, 1.0, 1.0]), Some(seed)).unwrap();
            if choice.try_emit_one().unwrap() == 0 {
                leads += 1;
            }
        }
        assert!(leads >= 45, "heavy item led only {leads} of 50 orders");
    }

    #[test]
    fn test_unique_choice_reset_replays() {
        let mut choice = UniqueChoice::new((0..20).collect(), None, Some(5)).unwrap();
        let first = choice.try_emit_many(8).unwrap();
        choice.reset();
        let second = choice.try_emit_many(8).unwrap();

        assert_eq!(first, second);
        assert_eq!(choice.remaining(), 12);
    }

    #[test]
    fn test_gaussian_weights_shape() {
        let weights = gaussian_weights(11, 6.0, 2.0, 0.0);

        assert_eq!(weights.len(), 11);
        assert_eq!(weights[5], 1.0);
        assert!(weights[4] < weights[5] && weights[6] < weights[5]);
        assert!((weights[4] - weights[6]).abs() < 1e-12);
        assert!(weights[0] < weights[3]);
    }

    #[test]
    fn test_gaussian_weights_floor() {
        let weights = gaussian_weights(2000, 1.0, 1.0, f64::MIN_POSITIVE);
        assert!(weights.iter().all(|w| *w > 0.0));
        assert_eq!(weights[1999], f64::MIN_POSITIVE);
    }
}
