//! Match execution: single rounds against the solved strategy and batch
//! simulation of equilibrium-vs-equilibrium play.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, GameError, MoveError};
use crate::matrix::PayoffMatrix;
use crate::payoff;
use crate::solver::EquilibriumResult;
use crate::strategy::Role;

/// Result of a single round
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    /// 0-based round number within the session.
    pub round: u32,
    pub hider_choice: usize,
    pub seeker_choice: usize,
    /// `matrix[hider_choice][seeker_choice]`, credited to the Hider.
    pub catch_value: f64,
    pub hider_score: f64,
    pub seeker_score: f64,
}

/// Result of a batch simulation. All four sequences have one entry per
/// round; the score sequences are running totals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub hider_scores: Vec<f64>,
    pub seeker_scores: Vec<f64>,
    pub hider_choices: Vec<usize>,
    pub seeker_choices: Vec<usize>,
}

impl SimulationResult {
    pub fn rounds(&self) -> usize {
        self.hider_choices.len()
    }

    /// Final (hider, seeker) totals.
    pub fn final_scores(&self) -> (f64, f64) {
        (
            self.hider_scores.last().copied().unwrap_or(0.0),
            self.seeker_scores.last().copied().unwrap_or(0.0),
        )
    }

    /// Average Hider payoff per round; tends to the game value.
    pub fn mean_hider_payoff(&self) -> f64 {
        if self.rounds() == 0 {
            return 0.0;
        }
        self.final_scores().0 / self.rounds() as f64
    }
}

/// Scores and history of the rounds the player has played.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub player_score: f64,
    pub computer_score: f64,
    pub player_choices: Vec<usize>,
    pub computer_choices: Vec<usize>,
}

impl MatchState {
    pub fn rounds_played(&self) -> usize {
        self.player_choices.len()
    }
}

/// One game between the player and the equilibrium computer.
#[derive(Clone, Debug)]
pub struct MatchSession {
    matrix: PayoffMatrix,
    role: Role,
    equilibrium: EquilibriumResult,
    hider_sampler: WeightedIndex<f64>,
    seeker_sampler: WeightedIndex<f64>,
    state: MatchState,
}

impl MatchSession {
    pub fn new(
        matrix: PayoffMatrix,
        role: Role,
        equilibrium: EquilibriumResult,
    ) -> Result<Self, GameError> {
        for (side, expected) in [(Role::Hider, matrix.rows()), (Role::Seeker, matrix.cols())] {
            let found = equilibrium.distribution(side).len();
            if found != expected {
                let mismatch = ConfigError::DistributionMismatch { role: side, expected, found };
                return Err(mismatch.into());
            }
        }
        let hider_sampler = equilibrium.hider.sampler(Role::Hider)?;
        let seeker_sampler = equilibrium.seeker.sampler(Role::Seeker)?;
        Ok(Self {
            matrix,
            role,
            equilibrium,
            hider_sampler,
            seeker_sampler,
            state: MatchState::default(),
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn matrix(&self) -> &PayoffMatrix {
        &self.matrix
    }

    pub fn equilibrium(&self) -> &EquilibriumResult {
        &self.equilibrium
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Locations the player may choose from.
    pub fn choices(&self) -> usize {
        match self.role {
            Role::Hider => self.matrix.rows(),
            Role::Seeker => self.matrix.cols(),
        }
    }

    pub fn hider_score(&self) -> f64 {
        match self.role {
            Role::Hider => self.state.player_score,
            Role::Seeker => self.state.computer_score,
        }
    }

    pub fn seeker_score(&self) -> f64 {
        match self.role {
            Role::Hider => self.state.computer_score,
            Role::Seeker => self.state.player_score,
        }
    }

    /// Play one round: the player takes `location`, the computer answers
    /// with a draw from its equilibrium strategy.
    pub fn play_round<R: Rng + ?Sized>(
        &mut self,
        location: usize,
        rng: &mut R,
    ) -> Result<RoundResult, MoveError> {
        let size = self.choices();
        if location >= size {
            return Err(MoveError::OutOfRange { location, size });
        }

        let opponent = self.sampler(self.role.opponent()).sample(rng);
        let (hider, seeker) = match self.role {
            Role::Hider => (location, opponent),
            Role::Seeker => (opponent, location),
        };
        let (hider_delta, seeker_delta) = payoff(&self.matrix, hider, seeker);
        let (player_delta, computer_delta) = match self.role {
            Role::Hider => (hider_delta, seeker_delta),
            Role::Seeker => (seeker_delta, hider_delta),
        };

        let round = self.state.rounds_played() as u32;
        self.state.player_score += player_delta;
        self.state.computer_score += computer_delta;
        self.state.player_choices.push(location);
        self.state.computer_choices.push(opponent);

        log::debug!("round {}: hider {} seeker {} catch {}", round, hider, seeker, hider_delta);
        Ok(RoundResult {
            round,
            hider_choice: hider,
            seeker_choice: seeker,
            catch_value: hider_delta,
            hider_score: self.hider_score(),
            seeker_score: self.seeker_score(),
        })
    }

    /// Play `rounds` rounds with both sides drawing from their own
    /// equilibrium strategy. Leaves the session's own score untouched.
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        rounds: u32,
        rng: &mut R,
    ) -> Result<SimulationResult, MoveError> {
        if rounds == 0 {
            return Err(MoveError::NoRounds);
        }
        let n = rounds as usize;
        let mut result = SimulationResult {
            hider_scores: Vec::with_capacity(n),
            seeker_scores: Vec::with_capacity(n),
            hider_choices: Vec::with_capacity(n),
            seeker_choices: Vec::with_capacity(n),
        };
        let (mut hider_total, mut seeker_total) = (0.0, 0.0);

        for _ in 0..rounds {
            let hider = self.hider_sampler.sample(rng);
            let seeker = self.seeker_sampler.sample(rng);
            let (hider_delta, seeker_delta) = payoff(&self.matrix, hider, seeker);
            hider_total += hider_delta;
            seeker_total += seeker_delta;

            result.hider_choices.push(hider);
            result.seeker_choices.push(seeker);
            result.hider_scores.push(hider_total);
            result.seeker_scores.push(seeker_total);
        }

        log::debug!(
            "simulated {} rounds: hider {} seeker {}",
            rounds,
            hider_total,
            seeker_total
        );
        Ok(result)
    }

    fn sampler(&self, role: Role) -> &WeightedIndex<f64> {
        match role {
            Role::Hider => &self.hider_sampler,
            Role::Seeker => &self.seeker_sampler,
        }
    }
}
