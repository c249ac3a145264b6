//! World geometry and location types

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What sits at a location. Controls the base catch payoff of its row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LocationType {
    /// Ordinary cell.
    Neutral = 1,
    /// Leaks twice as much to a near-miss Seeker.
    Valuable = 2,
    /// Being caught here costs the Hider three times as much.
    Trap = 3,
}

impl LocationType {
    pub const ALL: [LocationType; 3] = [Self::Neutral, Self::Valuable, Self::Trap];

    /// Uniform draw over the three types.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Numeric label shown in the type table.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for LocationType {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Neutral),
            2 => Ok(Self::Valuable),
            3 => Ok(Self::Trap),
            other => Err(other),
        }
    }
}

/// Rectangular world of `rows × cols` locations, indexed row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Result<Self, ConfigError> {
        if rows == 0 || cols == 0 {
            return Err(ConfigError::InvalidDimensions { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    /// One-dimensional world: a single row of `len` locations.
    pub fn line(len: usize) -> Result<Self, ConfigError> {
        Self::new(1, len)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of locations, and the dimension of the payoff matrix.
    pub fn size(&self) -> usize {
        self.rows * self.cols
    }

    /// `(row, col)` of a flat index.
    pub fn coordinates(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }

    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// Flat index of `index` shifted by `(dr, dc)`, if still on the grid.
    pub fn offset(&self, index: usize, dr: isize, dc: isize) -> Option<usize> {
        let (row, col) = self.coordinates(index);
        let row = row.checked_add_signed(dr).filter(|r| *r < self.rows)?;
        let col = col.checked_add_signed(dc).filter(|c| *c < self.cols)?;
        Some(self.index(row, col))
    }
}
