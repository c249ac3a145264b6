//! Dense two-phase simplex for the small programs the solver builds.
//!
//! Variables are non-negative unless marked free; free variables are
//! split into a positive and a negative column. Constraint rows are
//! normalised to a non-negative right-hand side; `<=` rows get a slack
//! column, `>=` rows a surplus and an artificial, `=` rows an artificial.
//! Phase one drives the artificials to zero, phase two optimises the
//! real objective with artificials barred from re-entering.
//!
//! Pivoting uses Dantzig's rule with a Harris two-pass ratio test and
//! falls back to Bland's rule after a run of degenerate pivots. The
//! tableau is rebuilt from the original rows every `REFACTOR_INTERVAL`
//! pivots and before declaring optimality, so round-off from long
//! degenerate runs never reaches the reported point.

use crate::error::LpError;

/// Pivot-element and reduced-cost threshold, relative to the data.
const EPSILON: f64 = 1e-9;

/// Bound violation the Harris ratio test may trade for a larger pivot.
const RATIO_SLACK: f64 = 1e-9;

/// Phase one must reach this close to zero to count as feasible.
const FEASIBILITY: f64 = 1e-7;

/// Hard cap on pivots per phase.
pub const MAX_PIVOTS: usize = 50_000;

/// Degenerate pivots in a row before switching to Bland's rule.
const DEGENERATE_RUN: usize = 32;

/// Pivots between two rebuilds of the tableau.
const REFACTOR_INTERVAL: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relation {
    LessEq,
    GreaterEq,
    Equal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Sense {
    Maximize,
    Minimize,
}

#[derive(Clone, Debug)]
struct Constraint {
    coefficients: Vec<f64>,
    relation: Relation,
    rhs: f64,
}

/// Optimal point and objective value.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    pub values: Vec<f64>,
    pub objective: f64,
    pub pivots: usize,
}

/// Linear program over `n` variables, built fluently.
#[derive(Clone, Debug)]
pub struct LinearProgram {
    sense: Sense,
    objective: Vec<f64>,
    free: Vec<bool>,
    constraints: Vec<Constraint>,
}

impl LinearProgram {
    pub fn maximize(objective: Vec<f64>) -> Self {
        Self::new(Sense::Maximize, objective)
    }

    pub fn minimize(objective: Vec<f64>) -> Self {
        Self::new(Sense::Minimize, objective)
    }

    fn new(sense: Sense, objective: Vec<f64>) -> Self {
        let free = vec![false; objective.len()];
        Self { sense, objective, free, constraints: Vec::new() }
    }

    pub fn variables(&self) -> usize {
        self.objective.len()
    }

    /// Let `var` take negative values.
    pub fn free(mut self, var: usize) -> Self {
        self.free[var] = true;
        self
    }

    /// Add `coefficients · x (relation) rhs`. Missing trailing
    /// coefficients are zero.
    pub fn constrain(mut self, mut coefficients: Vec<f64>, relation: Relation, rhs: f64) -> Self {
        debug_assert!(coefficients.len() <= self.variables());
        coefficients.resize(self.variables(), 0.0);
        self.constraints.push(Constraint { coefficients, relation, rhs });
        self
    }

    pub fn solve(&self) -> Result<Solution, LpError> {
        // structural column -> (variable, sign)
        let mut columns: Vec<(usize, f64)> = Vec::with_capacity(self.variables() * 2);
        for var in 0..self.variables() {
            columns.push((var, 1.0));
            if self.free[var] {
                columns.push((var, -1.0));
            }
        }
        let structural = columns.len();

        let rows: Vec<(Vec<f64>, Relation, f64)> = self
            .constraints
            .iter()
            .map(|c| {
                let coeffs: Vec<f64> =
                    columns.iter().map(|&(var, sign)| c.coefficients[var] * sign).collect();
                normalise(coeffs, c.relation, c.rhs)
            })
            .collect();

        let slacks = rows.iter().filter(|(_, rel, _)| *rel != Relation::Equal).count();
        let artificials = rows.iter().filter(|(_, rel, _)| *rel != Relation::LessEq).count();
        let real = structural + slacks;
        let width = real + artificials;

        let mut original = vec![vec![0.0; width + 1]; rows.len()];
        let mut basis = vec![0; rows.len()];
        let (mut next_slack, mut next_artificial) = (structural, real);
        for (i, (coeffs, relation, rhs)) in rows.into_iter().enumerate() {
            let row = &mut original[i];
            row[..structural].copy_from_slice(&coeffs);
            row[width] = rhs;
            match relation {
                Relation::LessEq => {
                    row[next_slack] = 1.0;
                    basis[i] = next_slack;
                    next_slack += 1;
                }
                Relation::GreaterEq => {
                    row[next_slack] = -1.0;
                    row[next_artificial] = 1.0;
                    basis[i] = next_artificial;
                    next_slack += 1;
                    next_artificial += 1;
                }
                Relation::Equal => {
                    row[next_artificial] = 1.0;
                    basis[i] = next_artificial;
                    next_artificial += 1;
                }
            }
        }
        let mut tableau = Tableau::new(original, basis, width);

        let mut pivots = 0;
        if artificials > 0 {
            let mut costs = vec![0.0; width];
            for cost in &mut costs[real..] {
                *cost = -1.0;
            }
            tableau.price(costs);
            pivots += tableau.optimise(width)?;
            if tableau.value() < -FEASIBILITY * tableau.scale {
                return Err(LpError::Infeasible);
            }
            tableau.evict_artificials(real);
        }

        let direction = match self.sense {
            Sense::Maximize => 1.0,
            Sense::Minimize => -1.0,
        };
        let mut costs = vec![0.0; width];
        for (col, &(var, sign)) in columns.iter().enumerate() {
            costs[col] = direction * self.objective[var] * sign;
        }
        tableau.price(costs);
        pivots += tableau.optimise(real)?;

        let mut column_values = vec![0.0; width];
        for (i, &col) in tableau.basis.iter().enumerate() {
            column_values[col] = tableau.rows[i][width].max(0.0);
        }
        let mut values = vec![0.0; self.variables()];
        for (col, &(var, sign)) in columns.iter().enumerate() {
            values[var] += sign * column_values[col];
        }
        let objective: f64 = self.objective.iter().zip(&values).map(|(c, x)| c * x).sum();

        Ok(Solution { values, objective, pivots })
    }
}

/// Flip the row so the right-hand side is non-negative. A `>= 0` row is
/// flipped too, so it gets a slack instead of an artificial.
fn normalise(coeffs: Vec<f64>, relation: Relation, rhs: f64) -> (Vec<f64>, Relation, f64) {
    let flip = rhs < 0.0 || (rhs == 0.0 && relation == Relation::GreaterEq);
    if !flip {
        return (coeffs, relation, rhs);
    }
    let relation = match relation {
        Relation::LessEq => Relation::GreaterEq,
        Relation::GreaterEq => Relation::LessEq,
        Relation::Equal => Relation::Equal,
    };
    (coeffs.into_iter().map(|a| -a).collect(), relation, -rhs)
}

/// Gauss-Jordan step on `rows`: make `col` the unit column of `row`.
fn eliminate(rows: &mut [Vec<f64>], row: usize, col: usize) {
    let pivot = rows[row][col];
    rows[row].iter_mut().for_each(|a| *a /= pivot);
    rows[row][col] = 1.0;
    let pivot_row = rows[row].clone();

    for (i, other) in rows.iter_mut().enumerate() {
        let factor = other[col];
        if i == row || factor == 0.0 {
            continue;
        }
        for (a, p) in other.iter_mut().zip(&pivot_row) {
            *a -= factor * p;
        }
        other[col] = 0.0;
    }
}

/// Constraint rows plus the reduced-cost row, each `width + 1` wide
/// (last entry is the right-hand side / objective value).
struct Tableau {
    /// Rows as built, before any pivot.
    original: Vec<Vec<f64>>,
    rows: Vec<Vec<f64>>,
    costs: Vec<f64>,
    reduced: Vec<f64>,
    basis: Vec<usize>,
    width: usize,
    /// Largest magnitude in the original rows, at least 1.
    scale: f64,
    /// Largest cost magnitude, at least 1.
    cost_scale: f64,
}

impl Tableau {
    fn new(original: Vec<Vec<f64>>, basis: Vec<usize>, width: usize) -> Self {
        let scale = original.iter().flatten().fold(1.0_f64, |m, a| m.max(a.abs()));
        Self {
            rows: original.clone(),
            original,
            costs: vec![0.0; width],
            reduced: vec![0.0; width + 1],
            basis,
            width,
            scale,
            cost_scale: 1.0,
        }
    }

    /// Current objective value.
    fn value(&self) -> f64 {
        self.reduced[self.width]
    }

    /// Load a maximisation objective and price out the basic columns.
    fn price(&mut self, costs: Vec<f64>) {
        self.cost_scale = costs.iter().fold(1.0_f64, |m, c| m.max(c.abs()));
        self.costs = costs;
        self.reprice();
    }

    fn reprice(&mut self) {
        self.reduced.iter_mut().for_each(|r| *r = 0.0);
        for (r, c) in self.reduced.iter_mut().zip(&self.costs) {
            *r = -c;
        }
        for (i, &col) in self.basis.iter().enumerate() {
            let factor = self.reduced[col];
            if factor != 0.0 {
                for (r, a) in self.reduced.iter_mut().zip(&self.rows[i]) {
                    *r -= factor * a;
                }
            }
        }
        for &col in &self.basis {
            self.reduced[col] = 0.0;
        }
    }

    /// Pivot until no column below `allowed` improves the objective on a
    /// freshly rebuilt tableau.
    fn optimise(&mut self, allowed: usize) -> Result<usize, LpError> {
        let mut pivots = 0;
        let mut degenerate = 0;
        let mut fresh = false;
        loop {
            if pivots >= MAX_PIVOTS {
                return Err(LpError::PivotLimit(MAX_PIVOTS));
            }
            if !fresh && pivots > 0 && pivots % REFACTOR_INTERVAL == 0 {
                self.refactor();
                fresh = true;
            }

            let bland = degenerate >= DEGENERATE_RUN;
            let Some(col) = self.entering(allowed, bland) else {
                if fresh {
                    return Ok(pivots);
                }
                self.refactor();
                fresh = true;
                continue;
            };
            let Some((row, ratio)) = self.leaving(col, bland) else {
                return Err(LpError::Unbounded);
            };

            degenerate = if ratio <= EPSILON { degenerate + 1 } else { 0 };
            self.pivot(row, col);
            pivots += 1;
            fresh = false;
        }
    }

    fn entering(&self, allowed: usize, bland: bool) -> Option<usize> {
        let threshold = -EPSILON * self.cost_scale;
        let mut candidates = (0..allowed).filter(|&j| self.reduced[j] < threshold);
        if bland {
            candidates.next()
        } else {
            candidates.min_by(|&a, &b| self.reduced[a].total_cmp(&self.reduced[b]))
        }
    }

    /// Harris ratio test: bound the step with every row's limit relaxed by
    /// `RATIO_SLACK`, then take the largest pivot within that bound. Under
    /// Bland's rule the exact minimum ratio wins, lowest basic column first.
    fn leaving(&self, col: usize, bland: bool) -> Option<(usize, f64)> {
        let rhs = self.width;
        let column_max = self.rows.iter().fold(1.0_f64, |m, row| m.max(row[col].abs()));
        let threshold = EPSILON * column_max;
        let candidates: Vec<(usize, f64, f64)> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row[col] > threshold)
            .map(|(i, row)| (i, row[col], row[rhs].max(0.0)))
            .collect();

        let bound = if bland {
            candidates.iter().map(|&(_, a, b)| b / a).fold(f64::INFINITY, f64::min) + EPSILON
        } else {
            let slack = RATIO_SLACK * self.scale;
            candidates.iter().map(|&(_, a, b)| (b + slack) / a).fold(f64::INFINITY, f64::min)
        };
        let eligible = candidates.into_iter().filter(|&(_, a, b)| b / a <= bound);
        let chosen = if bland {
            eligible.min_by_key(|&(i, _, _)| self.basis[i])
        } else {
            eligible.max_by(|x, y| x.1.total_cmp(&y.1))
        };
        chosen.map(|(i, a, b)| (i, b / a))
    }

    /// Rebuild every row from the original constraints for the current
    /// basis, with partial pivoting. A basis that has turned singular
    /// keeps the running tableau.
    fn refactor(&mut self) {
        let mut rows = self.original.clone();
        let mut assigned = vec![usize::MAX; rows.len()];
        for &col in &self.basis {
            let pick = (0..rows.len())
                .filter(|&i| assigned[i] == usize::MAX)
                .max_by(|&a, &b| rows[a][col].abs().total_cmp(&rows[b][col].abs()));
            let Some(row) = pick.filter(|&i| rows[i][col].abs() > EPSILON) else {
                log::debug!("basis singular at column {}, keeping running tableau", col);
                return;
            };
            eliminate(&mut rows, row, col);
            assigned[row] = col;
        }

        let tolerance = FEASIBILITY * self.scale;
        for row in &mut rows {
            let rhs = &mut row[self.width];
            if *rhs < 0.0 && *rhs > -tolerance {
                *rhs = 0.0;
            }
        }
        self.rows = rows;
        self.basis = assigned;
        self.reprice();
    }

    /// Swap any artificial still basic (at zero) for a real column. Rows
    /// with no real column left are redundant and keep their artificial.
    fn evict_artificials(&mut self, real: usize) {
        for i in 0..self.rows.len() {
            if self.basis[i] < real {
                continue;
            }
            if let Some(col) = (0..real).find(|&j| self.rows[i][j].abs() > EPSILON) {
                self.pivot(i, col);
            }
        }
    }

    fn pivot(&mut self, row: usize, col: usize) {
        eliminate(&mut self.rows, row, col);
        let factor = self.reduced[col];
        if factor != 0.0 {
            for (r, p) in self.reduced.iter_mut().zip(&self.rows[row]) {
                *r -= factor * p;
            }
            self.reduced[col] = 0.0;
        }
        self.basis[row] = col;
    }
}
