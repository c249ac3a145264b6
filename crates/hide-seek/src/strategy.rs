//! Roles and mixed strategies

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::SolverError;

/// Probabilities below this are simplex round-off, not part of the strategy.
const ROUNDOFF: f64 = 1e-9;

/// Side of the table. The Hider picks a row, the Seeker a column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Hider,
    Seeker,
}

impl Role {
    pub fn opponent(self) -> Self {
        match self {
            Role::Hider => Role::Seeker,
            Role::Seeker => Role::Hider,
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Role::Hider => write!(f, "Hider"),
            Role::Seeker => write!(f, "Seeker"),
        }
    }
}

/// Probability vector over one player's locations.
///
/// Always non-negative and summing to 1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MixedStrategy(Vec<f64>);

impl MixedStrategy {
    /// Normalise raw LP output into a distribution.
    ///
    /// Simplex round-off leaves entries like `-1e-17` or `4e-10`; those are
    /// clamped to zero before renormalising.
    pub fn normalize(role: Role, raw: Vec<f64>) -> Result<Self, SolverError> {
        if raw.iter().any(|p| !p.is_finite()) {
            return Err(SolverError::InvalidDistribution { role });
        }
        let clamped: Vec<f64> =
            raw.into_iter().map(|p| if p < ROUNDOFF { 0.0 } else { p }).collect();
        let total: f64 = clamped.iter().sum();
        if total <= 0.0 {
            return Err(SolverError::InvalidDistribution { role });
        }
        Ok(Self(clamped.into_iter().map(|p| p / total).collect()))
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.0
    }

    pub fn probability(&self, location: usize) -> f64 {
        self.0.get(location).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Locations played with positive probability.
    pub fn support(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, p)| **p > 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Categorical sampler over the locations.
    pub fn sampler(&self, role: Role) -> Result<WeightedIndex<f64>, SolverError> {
        WeightedIndex::new(&self.0).map_err(|_| SolverError::InvalidDistribution { role })
    }

    /// Draw a single location. Rebuilds the sampler; hot loops should hold
    /// on to `sampler()` instead.
    pub fn sample<R: Rng + ?Sized>(&self, role: Role, rng: &mut R) -> Result<usize, SolverError> {
        Ok(self.sampler(role)?.sample(rng))
    }
}
