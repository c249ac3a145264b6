//! Game setup chosen on the start screen

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::Grid;
use crate::strategy::Role;

/// Configuration for one game.
///
/// Every field has a default, so `{}` and `{"role": "Seeker"}` are both
/// valid JSON configs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    /// Side the human plays; the computer takes the other.
    pub role: Role,
    /// Rounds played by `Game::simulate`.
    pub simulation_rounds: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self { rows: 3, cols: 3, role: Role::Hider, simulation_rounds: 100 }
    }
}

impl GameConfig {
    /// One-dimensional world of `len` locations in a row.
    pub fn line(len: usize, role: Role) -> Self {
        Self { rows: 1, cols: len, role, ..Self::default() }
    }

    /// Two-dimensional `rows × cols` world.
    pub fn grid(rows: usize, cols: usize, role: Role) -> Self {
        Self { rows, cols, role, ..Self::default() }
    }

    pub fn with_simulation_rounds(mut self, rounds: u32) -> Self {
        self.simulation_rounds = rounds;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check the config and return the world it describes.
    pub fn validate(&self) -> Result<Grid, ConfigError> {
        if self.simulation_rounds == 0 {
            return Err(ConfigError::NoSimulationRounds);
        }
        Grid::new(self.rows, self.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!((config.rows, config.cols), (3, 3));
        assert_eq!(config.role, Role::Hider);
        assert_eq!(config.simulation_rounds, 100);
        assert_eq!(config.validate().unwrap().size(), 9);
    }

    #[test]
    fn test_line_and_grid() {
        let line = GameConfig::line(5, Role::Seeker).validate().unwrap();
        assert_eq!((line.rows(), line.cols()), (1, 5));
        let grid = GameConfig::grid(2, 4, Role::Hider).validate().unwrap();
        assert_eq!(grid.size(), 8);
    }

    #[test]
    fn test_partial_json() {
        let config = GameConfig::from_json(r#"{"role": "Seeker", "cols": 4}"#).unwrap();
        assert_eq!(config, GameConfig { cols: 4, role: Role::Seeker, ..GameConfig::default() });
        assert_eq!(GameConfig::from_json("{}").unwrap(), GameConfig::default());
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            GameConfig::from_json(r#"{"role": "Spectator"}"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(GameConfig::from_json("not json"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validate_rejects() {
        assert!(matches!(
            GameConfig::grid(0, 3, Role::Hider).validate(),
            Err(ConfigError::InvalidDimensions { rows: 0, cols: 3 })
        ));
        assert!(matches!(
            GameConfig::default().with_simulation_rounds(0).validate(),
            Err(ConfigError::NoSimulationRounds)
        ));
    }
}
