//! Error types, one enum per concern.

use thiserror::Error;

use crate::strategy::Role;

/// Failure of a single linear program.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LpError {
    #[error("linear program is infeasible")]
    Infeasible,
    #[error("linear program is unbounded")]
    Unbounded,
    #[error("simplex did not terminate within {0} pivots")]
    PivotLimit(usize),
}

/// Invalid game setup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid grid dimensions {rows}x{cols}: both must be at least 1")]
    InvalidDimensions { rows: usize, cols: usize },
    #[error("expected {expected} location types, got {found}")]
    LocationTypeCount { expected: usize, found: usize },
    #[error("{role} distribution has {found} entries but the matrix needs {expected}")]
    DistributionMismatch { role: Role, expected: usize, found: usize },
    #[error("simulation length must be at least one round")]
    NoSimulationRounds,
    #[error("invalid game config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Matrix input that cannot be a payoff matrix.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MatrixError {
    #[error("payoff matrix is empty")]
    Empty,
    #[error("row {row} has {found} entries, expected {expected}")]
    Ragged { row: usize, expected: usize, found: usize },
    #[error("entry ({row}, {col}) is not finite")]
    NonFinite { row: usize, col: usize },
}

/// The equilibrium computation produced no trustworthy result.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SolverError {
    #[error("{role} program failed")]
    Program {
        role: Role,
        #[source]
        source: LpError,
    },
    #[error("duality gap: hider value {hider_value} != seeker value {seeker_value}")]
    DualityGap { hider_value: f64, seeker_value: f64 },
    #[error("{role} strategy guarantees {achieved}, game value is {value}")]
    Suboptimal { role: Role, value: f64, achieved: f64 },
    #[error("{role} distribution cannot be normalised")]
    InvalidDistribution { role: Role },
}

/// A round or simulation request the session rejects.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("location {location} is outside the {size} available locations")]
    OutOfRange { location: usize, size: usize },
    #[error("no game in progress")]
    NotStarted,
    #[error("simulation needs at least one round")]
    NoRounds,
}

/// Anything the `Game` lifecycle can report.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Solver(#[from] SolverError),
    #[error(transparent)]
    InvalidMove(#[from] MoveError),
}
