//! Zero-sum equilibrium via a pair of dual linear programs
//!
//! The Hider maximises the value it can guarantee against every Seeker
//! column; the Seeker minimises the value it concedes against every Hider
//! row. By the minimax theorem both optima coincide, and the solver
//! refuses to return a result when they do not.
//!
//! Each side is solved as the minimising player of its own view of the
//! matrix (the Seeker sees `A`, the Hider sees `-Aᵀ`). The view is shifted
//! and scaled into `(0, 1]`, which turns "min v st M y <= v, Σ y = 1" into
//! "max Σ w st M w <= 1, w >= 0": no free variable and no phase one.

use serde::{Deserialize, Serialize};

use crate::error::SolverError;
use crate::matrix::PayoffMatrix;
use crate::simplex::{LinearProgram, Relation, Solution};
use crate::strategy::{MixedStrategy, Role};

/// Default relative tolerance for the duality check.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Relative slack on the value when searching for the most even optimum.
const REFINE_SLACK: f64 = 1e-9;

/// Optimal mixed strategies for both sides and the game value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumResult {
    pub hider: MixedStrategy,
    pub seeker: MixedStrategy,
    /// Expected Hider payoff per round under optimal play.
    pub value: f64,
    /// |Hider program optimum - Seeker program optimum|.
    pub duality_gap: f64,
}

impl EquilibriumResult {
    pub fn hider_distribution(&self) -> &[f64] {
        self.hider.probabilities()
    }

    pub fn seeker_distribution(&self) -> &[f64] {
        self.seeker.probabilities()
    }

    pub fn distribution(&self, role: Role) -> &MixedStrategy {
        match role {
            Role::Hider => &self.hider,
            Role::Seeker => &self.seeker,
        }
    }
}

/// Exact LP equilibrium solver.
#[derive(Clone, Copy, Debug)]
pub struct ZeroSumSolver {
    tolerance: f64,
}

impl Default for ZeroSumSolver {
    fn default() -> Self {
        Self { tolerance: DEFAULT_TOLERANCE }
    }
}

impl ZeroSumSolver {
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn solve(&self, matrix: &PayoffMatrix) -> Result<EquilibriumResult, SolverError> {
        let hider_view = View::new(
            (0..matrix.cols()).map(|j| matrix.column(j).map(|a| -a).collect()).collect(),
        );
        let seeker_view = View::new(matrix.to_rows());

        let (x, hider_loss) = minimise(Role::Hider, &hider_view)?;
        let (y, seeker_value) = minimise(Role::Seeker, &seeker_view)?;
        let hider_value = -hider_loss;

        let gap = (hider_value - seeker_value).abs();
        if gap > self.allowance(&[hider_value, seeker_value]) {
            log::warn!("duality gap {} (hider {}, seeker {})", gap, hider_value, seeker_value);
            return Err(SolverError::DualityGap { hider_value, seeker_value });
        }

        let x = MixedStrategy::normalize(Role::Hider, x)?;
        let y = MixedStrategy::normalize(Role::Seeker, y)?;
        self.verify(matrix, Role::Hider, &x, hider_value).inspect_err(|e| log::warn!("{}", e))?;
        self.verify(matrix, Role::Seeker, &y, seeker_value).inspect_err(|e| log::warn!("{}", e))?;

        let x = self.balance(matrix, Role::Hider, &hider_view, hider_value).unwrap_or(x);
        let y = self.balance(matrix, Role::Seeker, &seeker_view, seeker_value).unwrap_or(y);

        log::debug!(
            "solved {}x{} game: value {} (gap {:e})",
            matrix.rows(),
            matrix.cols(),
            hider_value,
            gap
        );
        Ok(EquilibriumResult { hider: x, seeker: y, value: hider_value, duality_gap: gap })
    }

    /// Check that `strategy` really secures `value` for `role`.
    fn verify(
        &self,
        matrix: &PayoffMatrix,
        role: Role,
        strategy: &MixedStrategy,
        value: f64,
    ) -> Result<(), SolverError> {
        let achieved = match role {
            Role::Hider => hider_guarantee(matrix, strategy),
            Role::Seeker => seeker_guarantee(matrix, strategy),
        };
        let shortfall = match role {
            Role::Hider => value - achieved,
            Role::Seeker => achieved - value,
        };
        if shortfall > self.allowance(&[value, achieved]) {
            return Err(SolverError::Suboptimal { role, value, achieved });
        }
        Ok(())
    }

    /// Most evenly spread strategy that still secures `value`, or `None`
    /// when the refinement program cannot certify one.
    fn balance(
        &self,
        matrix: &PayoffMatrix,
        role: Role,
        view: &View,
        value: f64,
    ) -> Option<MixedStrategy> {
        let conceded = match role {
            Role::Hider => -value,
            Role::Seeker => value,
        };
        let slack = REFINE_SLACK * value.abs().max(1.0);
        let program = balanced_program(view, view.shifted(conceded + slack));
        let refined = run(role, &program)
            .and_then(|s| MixedStrategy::normalize(role, s.values[..view.cols()].to_vec()))
            .and_then(|strategy| self.verify(matrix, role, &strategy, value).map(|_| strategy));
        match refined {
            Ok(strategy) => Some(strategy),
            Err(err) => {
                log::debug!("keeping unrefined {} strategy: {}", role, err);
                None
            }
        }
    }

    fn allowance(&self, values: &[f64]) -> f64 {
        self.tolerance * values.iter().fold(1.0_f64, |m, v| m.max(v.abs()))
    }
}

/// Solve with the default tolerance.
pub fn solve(matrix: &PayoffMatrix) -> Result<EquilibriumResult, SolverError> {
    ZeroSumSolver::default().solve(matrix)
}

/// Expected Hider payoff when both sides play the given strategies.
pub fn expected_payoff(
    matrix: &PayoffMatrix,
    hider: &MixedStrategy,
    seeker: &MixedStrategy,
) -> f64 {
    (0..matrix.rows())
        .map(|i| {
            let row: f64 =
                matrix.row(i).iter().zip(seeker.probabilities()).map(|(a, q)| a * q).sum();
            hider.probability(i) * row
        })
        .sum()
}

/// Worst-case Hider payoff over all Seeker columns.
pub fn hider_guarantee(matrix: &PayoffMatrix, hider: &MixedStrategy) -> f64 {
    (0..matrix.cols())
        .map(|j| matrix.column(j).zip(hider.probabilities()).map(|(a, p)| a * p).sum::<f64>())
        .fold(f64::INFINITY, f64::min)
}

/// Worst-case (largest) Hider payoff the Seeker concedes over all rows.
pub fn seeker_guarantee(matrix: &PayoffMatrix, seeker: &MixedStrategy) -> f64 {
    (0..matrix.rows())
        .map(|i| matrix.row(i).iter().zip(seeker.probabilities()).map(|(a, q)| a * q).sum::<f64>())
        .fold(f64::NEG_INFINITY, f64::max)
}

/// A matrix from its minimising (column) player's side, mapped into
/// `(0, 1]` by `a -> (a + shift) / scale`.
struct View {
    rows: Vec<Vec<f64>>,
    shift: f64,
    scale: f64,
}

impl View {
    fn new(rows: Vec<Vec<f64>>) -> Self {
        let low = rows.iter().flatten().fold(f64::INFINITY, |m, a| m.min(*a));
        let shift = 1.0 - low;
        let scale = rows.iter().flatten().fold(1.0_f64, |m, a| m.max(a + shift));
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|a| (a + shift) / scale).collect())
            .collect();
        Self { rows, shift, scale }
    }

    fn cols(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Payoff in view units.
    fn shifted(&self, payoff: f64) -> f64 {
        (payoff + self.shift) / self.scale
    }

    /// Payoff in matrix units.
    fn unshifted(&self, value: f64) -> f64 {
        value * self.scale - self.shift
    }
}

fn run(role: Role, program: &LinearProgram) -> Result<Solution, SolverError> {
    let solution = program
        .solve()
        .map_err(|source| SolverError::Program { role, source })?;
    log::debug!("{} program: {} pivots, objective {}", role, solution.pivots, solution.objective);
    Ok(solution)
}

/// Optimal raw strategy of the minimising side of `view` and the value it
/// concedes, in matrix units.
fn minimise(role: Role, view: &View) -> Result<(Vec<f64>, f64), SolverError> {
    let solution = run(role, &primary_program(view))?;
    let total: f64 = solution.values.iter().sum();
    if total <= 0.0 {
        return Err(SolverError::InvalidDistribution { role });
    }
    let strategy = solution.values.iter().map(|w| w / total).collect();
    Ok((strategy, view.unshifted(1.0 / total)))
}

/// max Σ w  st  M w <= 1,  w >= 0.  At the optimum `y = w / Σ w` and the
/// conceded value is `1 / Σ w`.
fn primary_program(view: &View) -> LinearProgram {
    let mut lp = LinearProgram::maximize(vec![1.0; view.cols()]);
    for row in &view.rows {
        lp = lp.constrain(row.clone(), Relation::LessEq, 1.0);
    }
    lp
}

/// Among strategies conceding at most `ceiling`, the one whose smallest
/// probability is largest:  max t  st  M y <= ceiling,  y_k >= t,  Σ y = 1.
fn balanced_program(view: &View, ceiling: f64) -> LinearProgram {
    let cols = view.cols();
    let mut objective = vec![0.0; cols + 1];
    objective[cols] = 1.0;

    let mut lp = LinearProgram::maximize(objective);
    for row in &view.rows {
        lp = lp.constrain(row.clone(), Relation::LessEq, ceiling);
    }
    for k in 0..cols {
        lp = lp.constrain(unit_minus_t(cols, k), Relation::GreaterEq, 0.0);
    }
    lp.constrain(vec![1.0; cols], Relation::Equal, 1.0)
}

/// Coefficients of `p_k - t` over `n` probabilities plus `t`.
fn unit_minus_t(n: usize, k: usize) -> Vec<f64> {
    let mut coefficients = vec![0.0; n + 1];
    coefficients[k] = 1.0;
    coefficients[n] = -1.0;
    coefficients
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LpError;

    fn matrix(rows: &[&[f64]]) -> PayoffMatrix {
        PayoffMatrix::from_rows(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    fn assert_dist(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-6, "distribution {:?} != {:?}", actual, expected);
        }
    }

    fn assert_valid(result: &EquilibriumResult) {
        for dist in [result.hider_distribution(), result.seeker_distribution()] {
            assert!(dist.iter().all(|p| *p >= 0.0), "negative entry in {:?}", dist);
            let total: f64 = dist.iter().sum();
            assert!((total - 1.0).abs() < 1e-6, "sums to {}", total);
        }
        assert!(result.duality_gap <= 1e-6);
    }

    #[test]
    fn test_no_saddle_point() {
        // rows 0/1 guarantee 1 and 0 in pure strategies, but mixing 50/50 guarantees 1.5
        let m = matrix(&[&[3.0, 1.0], &[0.0, 2.0]]);
        let r = solve(&m).unwrap();
        assert_valid(&r);
        assert_dist(r.hider_distribution(), &[0.5, 0.5]);
        assert_dist(r.seeker_distribution(), &[0.25, 0.75]);
        assert!((r.value - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_mixed_equilibrium() {
        let m = matrix(&[&[2.0, -1.0], &[-1.0, 1.0]]);
        let r = solve(&m).unwrap();
        assert_valid(&r);
        assert_dist(r.hider_distribution(), &[0.4, 0.6]);
        assert_dist(r.seeker_distribution(), &[0.4, 0.6]);
        assert!((r.value - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_pure_saddle_point() {
        // row 0 dominates, column 1 is the seeker's best reply: saddle at (0, 1)
        let m = matrix(&[&[4.0, 2.0], &[1.0, 0.0]]);
        let r = solve(&m).unwrap();
        assert_valid(&r);
        assert_dist(r.hider_distribution(), &[1.0, 0.0]);
        assert_dist(r.seeker_distribution(), &[0.0, 1.0]);
        assert!((r.value - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_identical_rows_balanced() {
        let m = matrix(&[&[1.0, 1.0], &[1.0, 1.0]]);
        let r = solve(&m).unwrap();
        assert_dist(r.hider_distribution(), &[0.5, 0.5]);
        assert_dist(r.seeker_distribution(), &[0.5, 0.5]);
        assert!((r.value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_zero_balanced() {
        let m = matrix(&[&[0.0, 0.0], &[0.0, 0.0]]);
        let r = solve(&m).unwrap();
        assert_dist(r.hider_distribution(), &[0.5, 0.5]);
        assert_dist(r.seeker_distribution(), &[0.5, 0.5]);
        assert!(r.value.abs() < 1e-9);
    }

    #[test]
    fn test_rectangular() {
        let m = matrix(&[&[1.0, -2.0], &[0.0, 3.0], &[-1.0, 1.0]]);
        let r = solve(&m).unwrap();
        assert_valid(&r);
        assert_dist(r.hider_distribution(), &[0.5, 0.5, 0.0]);
        assert_dist(r.seeker_distribution(), &[5.0 / 6.0, 1.0 / 6.0]);
        assert!((r.value - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_matching_pennies() {
        let m = matrix(&[&[1.0, -1.0], &[-1.0, 1.0]]);
        let r = solve(&m).unwrap();
        assert_dist(r.hider_distribution(), &[0.5, 0.5]);
        assert_dist(r.seeker_distribution(), &[0.5, 0.5]);
        assert!(r.value.abs() < 1e-9);
    }

    #[test]
    fn test_rock_paper_scissors() {
        let m = matrix(&[&[0.0, -1.0, 1.0], &[1.0, 0.0, -1.0], &[-1.0, 1.0, 0.0]]);
        let r = solve(&m).unwrap();
        let third = 1.0 / 3.0;
        assert_dist(r.hider_distribution(), &[third; 3]);
        assert_dist(r.seeker_distribution(), &[third; 3]);
        assert!(r.value.abs() < 1e-9);
    }

    #[test]
    fn test_single_entry() {
        let m = matrix(&[&[-3.0]]);
        let r = solve(&m).unwrap();
        assert_dist(r.hider_distribution(), &[1.0]);
        assert_dist(r.seeker_distribution(), &[1.0]);
        assert!((r.value + 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_value_matches_expected_payoff() {
        let m = matrix(&[&[-1.0, 0.5, 0.75], &[1.0, -3.0, 1.0], &[1.5, 2.0, -1.0]]);
        let r = solve(&m).unwrap();
        let played = expected_payoff(&m, &r.hider, &r.seeker);
        assert!((played - r.value).abs() < 1e-6);
        assert!((hider_guarantee(&m, &r.hider) - r.value).abs() < 1e-6);
        assert!((seeker_guarantee(&m, &r.seeker) - r.value).abs() < 1e-6);
    }

    #[test]
    fn test_duality_gap_is_reported() {
        let m = matrix(&[&[3.0, 1.0], &[0.0, 2.0]]);
        let result = ZeroSumSolver::with_tolerance(-1.0).solve(&m);
        assert!(matches!(result, Err(SolverError::DualityGap { .. })), "{:?}", result);
    }

    #[test]
    fn test_program_failure_names_role() {
        let infeasible = LinearProgram::maximize(vec![1.0])
            .constrain(vec![1.0], Relation::LessEq, 1.0)
            .constrain(vec![1.0], Relation::GreaterEq, 2.0);
        let err = run(Role::Seeker, &infeasible).unwrap_err();
        assert_eq!(err, SolverError::Program { role: Role::Seeker, source: LpError::Infeasible });
    }

    #[test]
    fn test_large_shift_keeps_value() {
        // entries far from zero exercise the shift and scale of each view
        let m = matrix(&[&[1003.0, 1001.0], &[1000.0, 1002.0]]);
        let r = solve(&m).unwrap();
        assert_dist(r.hider_distribution(), &[0.5, 0.5]);
        assert_dist(r.seeker_distribution(), &[0.25, 0.75]);
        assert!((r.value - 1001.5).abs() < 1e-6);
    }

    #[test]
    fn test_tolerance_accessor() {
        assert_eq!(ZeroSumSolver::default().tolerance(), DEFAULT_TOLERANCE);
        assert_eq!(ZeroSumSolver::with_tolerance(1e-3).tolerance(), 1e-3);
    }
}
