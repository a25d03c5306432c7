//! Text rendering of solve outcomes.

use std::fmt::Write;

use crate::instance::Instance;
use crate::locate::decode::{Solution, SolveOutcome};

/// Printed instead of the two-line result when no optimum was proven.
pub const FAILURE_MESSAGE: &str = "The problem does not have an optimal solution.";

/// Renders an outcome in the solution file format.
///
/// ```text
/// <total_cost> 1
/// <f(0)> <f(1)> ... <f(n-1)>
/// ```
///
/// The cost uses Rust's round-trip float formatting, so whole numbers keep
/// a trailing `.0`.
pub fn render(outcome: &SolveOutcome) -> String {
    match outcome {
        SolveOutcome::Optimal(solution) => render_solution(solution),
        SolveOutcome::NotOptimal(_) => FAILURE_MESSAGE.to_string(),
    }
}

pub fn render_solution(solution: &Solution) -> String {
    let assignments: Vec<String> = solution
        .assignments()
        .iter()
        .map(|f| f.to_string())
        .collect();
    format!("{:?} 1\n{}\n", solution.total_cost(), assignments.join(" "))
}

/// Human-readable report of opened facilities and their utilization.
pub fn render_summary(instance: &Instance, solution: &Solution) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "cost {:.6} (engine objective {:.6}), {} of {} facilities open",
        solution.total_cost(),
        solution.objective(),
        solution.opened().len(),
        instance.facility_count()
    );
    for &f in solution.opened() {
        let facility = &instance.facilities()[f];
        let _ = writeln!(
            out,
            "  facility {:>4}: load {:>6} / {:<6} ({:5.1}%)  setup {}",
            f,
            solution.loads()[f],
            facility.capacity(),
            solution.utilizations()[f] * 100.0,
            facility.setup_cost()
        );
    }
    if !solution.fallback_customers().is_empty() {
        let _ = writeln!(
            out,
            "  {} customer(s) defaulted to facility 0: {:?}",
            solution.fallback_customers().len(),
            solution.fallback_customers()
        );
    }
    out
}
