//! Exact Capacitated Facility Location (CFLP) through a compact MILP.
//!
//! An [`Instance`] is turned into a binary program by
//! [`locate::cflp::build_model`], solved by a [`MilpEngine`] (HiGHS by
//! default) and decoded into a [`Solution`] mapping every customer to one
//! facility.
//!
//! ```no_run
//! use cflp_milp::{solve_text, SolverConfig};
//!
//! let input = "1 2\n0 10 0 0\n3 3 4\n4 0 3\n";
//! let output = solve_text(input, &SolverConfig::default()).unwrap();
//! assert_eq!(output, "8.0 1\n0 0\n");
//! ```

pub mod config;
pub mod distance;
pub mod error;
pub mod format;
pub mod instance;
pub mod locate;

pub use config::{LinkingForm, SolverConfig};
pub use error::{CflpError, CflpResult};
pub use format::FAILURE_MESSAGE;
pub use instance::{Customer, Facility, Instance, Point};
pub use locate::cflp::{build_model, solve, solve_with, CflpModel};
pub use locate::decode::{Solution, SolveOutcome, Violation};
pub use locate::solver::{HighsEngine, MilpEngine, SolveResult, SolveStatus};

/// Parse `input`, solve it with HiGHS and render the result text.
///
/// A non-optimal solve yields [`FAILURE_MESSAGE`]; only malformed input or an
/// engine crash produce an error.
pub fn solve_text(input: &str, config: &SolverConfig) -> CflpResult<String> {
    let instance: Instance = input.parse()?;
    let outcome = solve(&instance, config)?;
    Ok(format::render(&outcome))
}
