//! HiGHS MIP solver interface
//!
//! Provides the engine seam for the CFLP model and its HiGHS implementation.

use std::fmt;
use std::sync::OnceLock;

use highs::{Col, HighsModelStatus, RowProblem, Sense};

use crate::config::SolverConfig;
use crate::error::{CflpError, CflpResult};
use crate::locate::model::MilpModel;

/// Terminal status reported by an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// The engine could not tell infeasible from unbounded
    InfeasibleOrUnbounded,
    TimeLimit,
    /// Any other engine-specific status
    Other(String),
}

impl SolveStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "optimal"),
            SolveStatus::Infeasible => write!(f, "infeasible"),
            SolveStatus::Unbounded => write!(f, "unbounded"),
            SolveStatus::InfeasibleOrUnbounded => write!(f, "infeasible or unbounded"),
            SolveStatus::TimeLimit => write!(f, "time limit reached"),
            SolveStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

impl From<HighsModelStatus> for SolveStatus {
    fn from(status: HighsModelStatus) -> Self {
        match status {
            HighsModelStatus::Optimal | HighsModelStatus::ModelEmpty => SolveStatus::Optimal,
            HighsModelStatus::Infeasible => SolveStatus::Infeasible,
            HighsModelStatus::Unbounded => SolveStatus::Unbounded,
            HighsModelStatus::UnboundedOrInfeasible => SolveStatus::InfeasibleOrUnbounded,
            HighsModelStatus::ReachedTimeLimit => SolveStatus::TimeLimit,
            other => SolveStatus::Other(format!("{:?}", other)),
        }
    }
}

/// Result of solving a MIP problem
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    pub status: SolveStatus,
    /// Engine objective, NaN unless optimal
    pub objective: f64,
    /// One value per model column, empty unless optimal
    pub values: Vec<f64>,
}

impl SolveResult {
    pub fn not_optimal(status: SolveStatus) -> Self {
        Self {
            status,
            objective: f64::NAN,
            values: Vec::new(),
        }
    }
}

/// A MILP engine: one blocking minimization per call.
pub trait MilpEngine {
    fn name(&self) -> &str;

    fn solve(&self, model: &MilpModel) -> CflpResult<SolveResult>;
}

/// HiGHS rejects matrix entries at or above its `large_matrix_value`.
const MAX_MATRIX_VALUE: f64 = 1e15;

/// HiGHS rejects costs at or above its `infinite_cost`.
const MAX_COST: f64 = 1e20;

static ENGINE_READY: OnceLock<()> = OnceLock::new();

/// Process-wide, idempotent engine start-up.
///
/// Creates and drops one HiGHS instance without running it. HiGHS sizes its
/// global thread pool on the first run, so no run happens here and the first
/// real solve's `threads` setting is the one that takes effect.
pub fn ensure_engine_ready() {
    ENGINE_READY.get_or_init(|| {
        let mut model = RowProblem::new().optimise(Sense::Minimise);
        model.make_quiet();
        log::debug!("HiGHS instance created");
    });
}

/// Checks that every coefficient is one HiGHS will load.
fn check_model_values(model: &MilpModel) -> CflpResult<()> {
    for column in model.columns() {
        if !(column.cost.is_finite() && column.cost.abs() < MAX_COST) {
            return Err(CflpError::Engine(format!(
                "objective coefficient {} of {} is outside HiGHS limits",
                column.cost, column.name
            )));
        }
    }
    for row in model.rows() {
        if let Some(&(col, coef)) = row
            .terms
            .iter()
            .find(|(_, coef)| !(coef.is_finite() && coef.abs() < MAX_MATRIX_VALUE))
        {
            return Err(CflpError::Engine(format!(
                "coefficient {} of {} in {:?} is outside HiGHS limits",
                coef,
                model.column(col).name,
                row.kind
            )));
        }
    }
    Ok(())
}

/// HiGHS through the `highs` crate.
#[derive(Debug, Clone, Default)]
pub struct HighsEngine {
    config: SolverConfig,
}

impl HighsEngine {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }
}

impl MilpEngine for HighsEngine {
    fn name(&self) -> &str {
        "HiGHS"
    }

    fn solve(&self, model: &MilpModel) -> CflpResult<SolveResult> {
        self.config.validate()?;
        if model.n_columns() == 0 {
            return Ok(solve_without_columns(model));
        }
        check_model_values(model)?;
        ensure_engine_ready();

        // Create row-based problem
        let mut pb = RowProblem::new();

        // In highs 1.12+, integrality must be set when adding the column
        let cols: Vec<Col> = model
            .columns()
            .iter()
            .map(|c| pb.add_column_with_integrality(c.cost, c.lower..=c.upper, c.integer))
            .collect();

        for row in model.rows() {
            let terms: Vec<(Col, f64)> = row
                .terms
                .iter()
                .map(|&(id, coef)| (cols[id.index()], coef))
                .collect();
            match (row.lower.is_finite(), row.upper.is_finite()) {
                (true, true) => pb.add_row(row.lower..=row.upper, terms),
                (false, true) => pb.add_row(..=row.upper, terms),
                (true, false) => pb.add_row(row.lower.., terms),
                (false, false) => pb.add_row(f64::NEG_INFINITY..=f64::INFINITY, terms),
            };
        }

        let mut highs = pb.optimise(Sense::Minimise);
        if !self.config.verbose {
            highs.make_quiet();
        }
        if let Some(limit) = self.config.time_limit {
            highs.set_option("time_limit", limit);
        }
        if let Some(gap) = self.config.mip_rel_gap {
            highs.set_option("mip_rel_gap", gap);
        }
        if let Some(threads) = self.config.threads {
            let threads = i32::try_from(threads).map_err(|_| {
                CflpError::InvalidConfig(format!("threads out of range: {}", threads))
            })?;
            highs.set_option("threads", threads);
        }

        let solved = highs
            .try_solve()
            .map_err(|status| CflpError::Engine(format!("HiGHS run failed: {:?}", status)))?;

        let status = SolveStatus::from(solved.status());
        if !status.is_optimal() {
            log::debug!("HiGHS returned non-optimal status: {:?}", solved.status());
            return Ok(SolveResult::not_optimal(status));
        }

        let sol = solved.get_solution();
        let values: Vec<f64> = cols.iter().map(|&c| sol[c]).collect();
        Ok(SolveResult {
            status,
            objective: solved.objective_value(),
            values,
        })
    }
}

/// A model without columns has constant rows: it is optimal at cost 0 iff
/// every row admits an activity of 0.
fn solve_without_columns(model: &MilpModel) -> SolveResult {
    if model.rows().iter().all(|r| r.is_satisfied(&[], 0.0)) {
        SolveResult {
            status: SolveStatus::Optimal,
            objective: 0.0,
            values: Vec::new(),
        }
    } else {
        SolveResult::not_optimal(SolveStatus::Infeasible)
    }
}
