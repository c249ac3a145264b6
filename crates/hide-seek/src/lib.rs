//! Hide & Seek game core
//!
//! Spatial hide-and-seek as a two-player zero-sum matrix game.
//! A grid world is turned into a payoff matrix, both players' optimal
//! mixed strategies are solved exactly by linear programming, and a
//! session plays rounds against (or simulates) those strategies.
//! This crate is compiled to:
//! - Native (library, tests)
//! - WASM (for the browser front-end)

mod builder;
mod config;
mod error;
mod game;
mod grid;
mod matrix;
mod random;
mod session;
mod simplex;
mod solver;
mod strategy;

#[cfg(feature = "wasm")]
mod wasm;

pub use builder::{base_value, GridPayoff, GridPayoffBuilder, FAR_DISCOUNT, NEAR_DISCOUNT};
pub use config::GameConfig;
pub use error::{ConfigError, GameError, LpError, MatrixError, MoveError, SolverError};
pub use game::{ActiveGame, Game};
pub use grid::{Grid, LocationType};
pub use matrix::PayoffMatrix;
pub use random::SeededRng;
pub use session::{MatchSession, MatchState, RoundResult, SimulationResult};
pub use simplex::{LinearProgram, Relation, Solution};
pub use solver::{
    expected_payoff, hider_guarantee, seeker_guarantee, solve, EquilibriumResult, ZeroSumSolver,
    DEFAULT_TOLERANCE,
};
pub use strategy::{MixedStrategy, Role};

/// Score change for one round.
/// Returns (hider_delta, seeker_delta): the Hider collects the matrix
/// entry and the Seeker loses the same amount.
pub fn payoff(matrix: &PayoffMatrix, hider: usize, seeker: usize) -> (f64, f64) {
    let catch_value = matrix.get(hider, seeker);
    (catch_value, -catch_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payoff_zero_sum() {
        let m = PayoffMatrix::from_rows(vec![vec![-3.0, 0.5], vec![1.5, -1.0]]).unwrap();
        assert_eq!(payoff(&m, 0, 0), (-3.0, 3.0));
        assert_eq!(payoff(&m, 0, 1), (0.5, -0.5));
        assert_eq!(payoff(&m, 1, 0), (1.5, -1.5));
        assert_eq!(payoff(&m, 1, 1), (-1.0, 1.0));
    }
}
