//! WASM bindings for the browser front-end

#![cfg(feature = "wasm")]

use js_sys::Float64Array;
use wasm_bindgen::prelude::*;

use crate::{Game, GameConfig, PayoffMatrix, SeededRng};

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// One game table plus the random stream all its draws come from.
#[wasm_bindgen]
pub struct WasmGame {
    game: Game,
    rng: SeededRng,
}

#[wasm_bindgen]
impl WasmGame {
    /// # Arguments
    /// * `seed` - 32-byte randomness seed
    /// * `stream` - stream index, so one seed can drive several tables
    #[wasm_bindgen(constructor)]
    pub fn new(seed: &[u8], stream: u32) -> Result<WasmGame, JsError> {
        let seed_arr: [u8; 32] = seed
            .try_into()
            .map_err(|_| JsError::new("Seed must be exactly 32 bytes"))?;
        Ok(WasmGame { game: Game::new(), rng: SeededRng::new(&seed_arr, stream) })
    }

    /// Start a game from a JSON `GameConfig` (missing fields take defaults).
    pub fn start(&mut self, config_json: &str) -> Result<(), JsError> {
        let config = GameConfig::from_json(config_json).map_err(|e| JsError::new(&e.to_string()))?;
        self.game
            .start(config, &mut self.rng)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.game.reset();
    }

    #[wasm_bindgen(js_name = isStarted)]
    pub fn is_started(&self) -> bool {
        self.game.is_started()
    }

    /// Returns a serialised `RoundResult`.
    #[wasm_bindgen(js_name = playRound)]
    pub fn play_round(&mut self, location: usize) -> Result<JsValue, JsError> {
        let round = self
            .game
            .play_round(location, &mut self.rng)
            .map_err(|e| JsError::new(&e.to_string()))?;
        to_js(&round)
    }

    /// Returns a serialised `SimulationResult`.
    pub fn simulate(&mut self) -> Result<JsValue, JsError> {
        let sim = self.game.simulate(&mut self.rng).map_err(|e| JsError::new(&e.to_string()))?;
        to_js(&sim)
    }

    /// Payoff matrix as nested rows.
    pub fn matrix(&self) -> Result<JsValue, JsError> {
        to_js(self.active()?.matrix())
    }

    /// Location type codes (1 Neutral, 2 Valuable, 3 Trap), row-major.
    #[wasm_bindgen(js_name = locationTypes)]
    pub fn location_types(&self) -> Result<Vec<u8>, JsError> {
        Ok(self.active()?.location_types().iter().map(|t| t.code()).collect())
    }

    #[wasm_bindgen(js_name = hiderDistribution)]
    pub fn hider_distribution(&self) -> Result<Float64Array, JsError> {
        Ok(Float64Array::from(self.active()?.equilibrium().hider_distribution()))
    }

    #[wasm_bindgen(js_name = seekerDistribution)]
    pub fn seeker_distribution(&self) -> Result<Float64Array, JsError> {
        Ok(Float64Array::from(self.active()?.equilibrium().seeker_distribution()))
    }

    #[wasm_bindgen(js_name = gameValue)]
    pub fn game_value(&self) -> Result<f64, JsError> {
        Ok(self.active()?.equilibrium().value)
    }

    /// Returns a serialised `MatchState` (scores and choice history).
    pub fn state(&self) -> Result<JsValue, JsError> {
        to_js(self.active()?.state())
    }
}

impl WasmGame {
    fn active(&self) -> Result<&crate::ActiveGame, JsError> {
        self.game.active().ok_or_else(|| JsError::new("Start the game first"))
    }
}

/// Solve an arbitrary matrix given as JSON nested rows.
///
/// # Returns
/// JSON serialised EquilibriumResult
#[wasm_bindgen(js_name = solveMatrix)]
pub fn solve_matrix(matrix_json: &str) -> Result<JsValue, JsError> {
    let matrix: PayoffMatrix = serde_json::from_str(matrix_json)
        .map_err(|e| JsError::new(&format!("Invalid matrix: {}", e)))?;
    let result = crate::solve(&matrix).map_err(|e| JsError::new(&e.to_string()))?;
    to_js(&result)
}
