//! Categorical sampling primitives.

use rand::Rng;
use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::seq::SliceRandom;
use thiserror::Error;

/// Allowed drift between a weight table's total and 1.0.
const WEIGHT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("Weight table is empty")]
    Empty,
    #[error("Invalid weights: {0}")]
    InvalidWeights(#[from] WeightedError),
    #[error("Weights sum to {0}, expected 1.0")]
    NotNormalized(f64),
}

/// A fixed set of values with an explicit probability for each.
#[derive(Debug, Clone)]
pub struct Categorical<T> {
    values: Vec<T>,
    index: WeightedIndex<f64>,
}

impl<T: Clone> Categorical<T> {
    /// Builds a table from `(value, probability)` pairs. Probabilities must sum to 1.
    pub fn new(entries: &[(T, f64)]) -> Result<Self, TableError> {
        if entries.is_empty() {
            return Err(TableError::Empty);
        }

        let total: f64 = entries.iter().map(|(_, weight)| weight).sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(TableError::NotNormalized(total));
        }

        let index = WeightedIndex::new(entries.iter().map(|(_, weight)| *weight))?;
        let values = entries.iter().map(|(value, _)| value.clone()).collect();

        Ok(Self { values, index })
    }

    /// Equal weight for every value.
    pub fn uniform(values: &[T]) -> Result<Self, TableError> {
        let weight = 1.0 / values.len().max(1) as f64;
        let entries: Vec<(T, f64)> = values.iter().map(|v| (v.clone(), weight)).collect();
        Self::new(&entries)
    }

    pub fn sample(&self, rng: &mut impl Rng) -> T {
        self.values[self.index.sample(rng)].clone()
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }
}

/// Draws uniformly from a support set, falling back to `default` when it is empty.
pub fn pick_uniform<T: Copy>(support: &[T], default: T, rng: &mut impl Rng) -> T {
    support.choose(rng).copied().unwrap_or(default)
}

/// Returns true with probability `p`.
pub fn chance(p: f64, rng: &mut impl Rng) -> bool {
    rng.gen_bool(p.clamp(0.0, 1.0))
}
