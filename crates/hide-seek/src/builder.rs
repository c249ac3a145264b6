//! Payoff matrix construction from grid geometry
//!
//! Each row starts from a base catch value set by the Hider's location
//! type, then the cells near the Hider are discounted: a Seeker guessing
//! next door collects half, two cells away three quarters.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::{Grid, LocationType};
use crate::matrix::PayoffMatrix;

/// Multiplier for a Seeker guess one cell away.
pub const NEAR_DISCOUNT: f64 = 0.5;

/// Multiplier for a Seeker guess two cells away along one axis.
pub const FAR_DISCOUNT: f64 = 0.75;

const NEAR_OFFSETS: [(isize, isize); 4] = [(0, 1), (0, -1), (-1, 0), (1, 0)];
const FAR_OFFSETS: [(isize, isize); 4] = [(0, 2), (0, -2), (-2, 0), (2, 0)];

/// A built world: geometry, location types, and the resulting matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridPayoff {
    pub grid: Grid,
    pub location_types: Vec<LocationType>,
    pub matrix: PayoffMatrix,
}

/// Builds square payoff matrices for grid worlds.
pub struct GridPayoffBuilder;

impl GridPayoffBuilder {
    /// Draw a type for every location, then build the matrix.
    pub fn build<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> GridPayoff {
        let location_types: Vec<LocationType> =
            (0..grid.size()).map(|_| LocationType::random(rng)).collect();
        let matrix = payoff_matrix(grid, &location_types);
        GridPayoff { grid: *grid, location_types, matrix }
    }

    /// Build from caller-chosen location types.
    pub fn build_with_types(
        grid: &Grid,
        location_types: Vec<LocationType>,
    ) -> Result<GridPayoff, ConfigError> {
        if location_types.len() != grid.size() {
            return Err(ConfigError::LocationTypeCount {
                expected: grid.size(),
                found: location_types.len(),
            });
        }
        let matrix = payoff_matrix(grid, &location_types);
        Ok(GridPayoff { grid: *grid, location_types, matrix })
    }
}

/// Base catch value for the pair, before any discount.
pub fn base_value(hider_type: LocationType, caught: bool) -> f64 {
    match (caught, hider_type) {
        (true, LocationType::Trap) => -3.0,
        (true, _) => -1.0,
        (false, LocationType::Valuable) => 2.0,
        (false, _) => 1.0,
    }
}

fn payoff_matrix(grid: &Grid, location_types: &[LocationType]) -> PayoffMatrix {
    let size = grid.size();
    let mut matrix = PayoffMatrix::zeroed(size, size);

    for (hider, &hider_type) in location_types.iter().enumerate() {
        for seeker in 0..size {
            matrix.set(hider, seeker, base_value(hider_type, hider == seeker));
        }
    }

    for hider in 0..size {
        discount_row(grid, &mut matrix, hider);
    }

    log::debug!(
        "built {}x{} grid payoff ({} locations)",
        grid.rows(),
        grid.cols(),
        size
    );
    matrix
}

/// Apply the proximity discounts to one row. The self-entry is never an
/// offset target, and no cell is discounted twice.
fn discount_row(grid: &Grid, matrix: &mut PayoffMatrix, hider: usize) {
    let mut visited = [usize::MAX; NEAR_OFFSETS.len() + FAR_OFFSETS.len()];
    let mut count = 0;

    let passes = [(&NEAR_OFFSETS, NEAR_DISCOUNT), (&FAR_OFFSETS, FAR_DISCOUNT)];
    for (offsets, factor) in passes {
        for &(dr, dc) in offsets {
            let Some(cell) = grid.offset(hider, dr, dc) else {
                continue;
            };
            if visited[..count].contains(&cell) {
                continue;
            }
            visited[count] = cell;
            count += 1;
            matrix.scale(hider, cell, factor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::LocationType::*;
    use crate::random::SeededRng;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_base_values() {
        assert_eq!(base_value(Neutral, false), 1.0);
        assert_eq!(base_value(Valuable, false), 2.0);
        assert_eq!(base_value(Trap, false), 1.0);
        assert_eq!(base_value(Neutral, true), -1.0);
        assert_eq!(base_value(Valuable, true), -1.0);
        assert_eq!(base_value(Trap, true), -3.0);
    }

    #[test]
    fn test_square_with_grid_size() {
        let mut rng = SeededRng::new(&[42u8; 32], 0);
        for (rows, cols) in [(1, 1), (1, 4), (3, 1), (2, 3), (4, 4)] {
            let grid = Grid::new(rows, cols).unwrap();
            let built = GridPayoffBuilder::build(&grid, &mut rng);
            assert_eq!(built.matrix.rows(), rows * cols);
            assert_eq!(built.matrix.cols(), rows * cols);
            assert_eq!(built.location_types.len(), rows * cols);
        }
    }

    #[test]
    fn test_diagonal_follows_type() {
        let mut rng = SeededRng::from_u64(3);
        let grid = Grid::new(4, 5).unwrap();
        let built = GridPayoffBuilder::build(&grid, &mut rng);
        for (i, t) in built.location_types.iter().enumerate() {
            let expected = if *t == Trap { -3.0 } else { -1.0 };
            assert_eq!(built.matrix.get(i, i), expected, "diagonal {} of type {:?}", i, t);
        }
    }

    #[test]
    fn test_column_discount_three_by_one() {
        let grid = Grid::new(3, 1).unwrap();
        let built =
            GridPayoffBuilder::build_with_types(&grid, vec![Neutral, Neutral, Valuable]).unwrap();
        let m = &built.matrix;
        assert!(approx(m.get(1, 0), 1.0 * NEAR_DISCOUNT));
        assert!(approx(m.get(2, 0), 2.0 * FAR_DISCOUNT));
        assert!(approx(m.get(2, 1), 2.0 * NEAR_DISCOUNT));
        assert!(approx(m.get(0, 2), 1.0 * FAR_DISCOUNT));
        assert_eq!(m.get(2, 2), -1.0);
    }

    #[test]
    fn test_three_by_three_corner_and_center() {
        let grid = Grid::new(3, 3).unwrap();
        let built = GridPayoffBuilder::build_with_types(&grid, vec![Neutral; 9]).unwrap();
        let m = &built.matrix;

        // corner (0,0): right and below are near, two away are far, diagonal cell untouched
        assert!(approx(m.get(0, 1), 0.5));
        assert!(approx(m.get(0, 3), 0.5));
        assert!(approx(m.get(0, 2), 0.75));
        assert!(approx(m.get(0, 6), 0.75));
        assert!(approx(m.get(0, 4), 1.0));
        assert!(approx(m.get(0, 8), 1.0));

        // center: four near neighbours, nothing two away fits
        for n in [1, 3, 5, 7] {
            assert!(approx(m.get(4, n), 0.5));
        }
        for c in [0, 2, 6, 8] {
            assert!(approx(m.get(4, c), 1.0));
        }
        assert_eq!(m.get(4, 4), -1.0);
    }

    #[test]
    fn test_valuable_row_scaled() {
        let grid = Grid::line(4).unwrap();
        let types = vec![Valuable, Trap, Neutral, Neutral];
        let built = GridPayoffBuilder::build_with_types(&grid, types).unwrap();
        let m = &built.matrix;
        assert_eq!(m.row(0), &[-1.0, 1.0, 1.5, 2.0]);
        assert_eq!(m.row(1), &[0.5, -3.0, 0.5, 0.75]);
    }

    #[test]
    fn test_single_cell() {
        let grid = Grid::new(1, 1).unwrap();
        let built = GridPayoffBuilder::build_with_types(&grid, vec![Trap]).unwrap();
        assert_eq!(built.matrix.to_rows(), vec![vec![-3.0]]);
    }

    #[test]
    fn test_wrong_type_count() {
        let grid = Grid::new(2, 2).unwrap();
        assert!(matches!(
            GridPayoffBuilder::build_with_types(&grid, vec![Neutral; 3]),
            Err(ConfigError::LocationTypeCount { expected: 4, found: 3 })
        ));
    }

    #[test]
    fn test_build_deterministic() {
        let grid = Grid::new(3, 3).unwrap();
        let a = GridPayoffBuilder::build(&grid, &mut SeededRng::new(&[9u8; 32], 2));
        let b = GridPayoffBuilder::build(&grid, &mut SeededRng::new(&[9u8; 32], 2));
        assert_eq!(a, b);
    }
}
