//! Start/reset lifecycle driven by the front-end
//!
//! `Game::start` runs the whole pipeline (world, matrix, equilibrium,
//! session) before replacing anything, so a failed start leaves the
//! previous game intact.

use rand::Rng;

use crate::builder::{GridPayoff, GridPayoffBuilder};
use crate::config::GameConfig;
use crate::error::{GameError, MoveError};
use crate::grid::{Grid, LocationType};
use crate::matrix::PayoffMatrix;
use crate::session::{MatchSession, MatchState, RoundResult, SimulationResult};
use crate::solver::{EquilibriumResult, ZeroSumSolver};
use crate::strategy::Role;

/// A started game: the world it was built on and the running session.
#[derive(Clone, Debug)]
pub struct ActiveGame {
    config: GameConfig,
    grid: Grid,
    location_types: Vec<LocationType>,
    session: MatchSession,
}

impl ActiveGame {
    /// Build and solve a fresh world for `config`.
    pub fn new<R: Rng + ?Sized>(
        config: GameConfig,
        solver: &ZeroSumSolver,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        let grid = config.validate()?;
        let payoff = GridPayoffBuilder::build(&grid, rng);
        Self::from_payoff(config, payoff, solver)
    }

    /// Solve an already built world.
    pub fn from_payoff(
        config: GameConfig,
        payoff: GridPayoff,
        solver: &ZeroSumSolver,
    ) -> Result<Self, GameError> {
        let GridPayoff { grid, location_types, matrix } = payoff;
        let equilibrium = solver.solve(&matrix)?;
        let session = MatchSession::new(matrix, config.role, equilibrium)?;
        log::debug!(
            "started {}x{} game as {} (value {})",
            grid.rows(),
            grid.cols(),
            config.role,
            session.equilibrium().value
        );
        Ok(Self { config, grid, location_types, session })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn role(&self) -> Role {
        self.session.role()
    }

    pub fn location_types(&self) -> &[LocationType] {
        &self.location_types
    }

    pub fn matrix(&self) -> &PayoffMatrix {
        self.session.matrix()
    }

    pub fn equilibrium(&self) -> &EquilibriumResult {
        self.session.equilibrium()
    }

    pub fn state(&self) -> &MatchState {
        self.session.state()
    }

    pub fn session(&self) -> &MatchSession {
        &self.session
    }
}

/// Holds at most one game at a time.
#[derive(Clone, Debug, Default)]
pub struct Game {
    solver: ZeroSumSolver,
    active: Option<ActiveGame>,
}

impl Game {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_solver(solver: ZeroSumSolver) -> Self {
        Self { solver, active: None }
    }

    /// Start a new game, replacing the current one on success.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        config: GameConfig,
        rng: &mut R,
    ) -> Result<&ActiveGame, GameError> {
        let game = ActiveGame::new(config, &self.solver, rng)?;
        Ok(self.active.insert(game))
    }

    /// Drop the current game entirely.
    pub fn reset(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<&ActiveGame> {
        self.active.as_ref()
    }

    pub fn is_started(&self) -> bool {
        self.active.is_some()
    }

    pub fn play_round<R: Rng + ?Sized>(
        &mut self,
        location: usize,
        rng: &mut R,
    ) -> Result<RoundResult, GameError> {
        let game = self.active.as_mut().ok_or(MoveError::NotStarted)?;
        Ok(game.session.play_round(location, rng)?)
    }

    /// Simulate `config.simulation_rounds` equilibrium-vs-equilibrium rounds.
    pub fn simulate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SimulationResult, GameError> {
        let game = self.active.as_ref().ok_or(MoveError::NotStarted)?;
        Ok(game.session.simulate(game.config.simulation_rounds, rng)?)
    }
}
