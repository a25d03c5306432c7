//! Turning engine column values back into a customer assignment.

use crate::config::SolverConfig;
use crate::error::{CflpError, CflpResult};
use crate::instance::Instance;
use crate::locate::cflp::CflpModel;
use crate::locate::model::ColumnId;
use crate::locate::solver::SolveStatus;

/// Values above this count as 1 for a binary column.
pub const BINARY_THRESHOLD: f64 = 0.5;

/// Outcome of one solve: an optimal solution, or the status that ended it.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    Optimal(Solution),
    NotOptimal(SolveStatus),
}

impl SolveOutcome {
    pub fn status(&self) -> SolveStatus {
        match self {
            SolveOutcome::Optimal(_) => SolveStatus::Optimal,
            SolveOutcome::NotOptimal(status) => status.clone(),
        }
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolveOutcome::Optimal(solution) => Some(solution),
            SolveOutcome::NotOptimal(_) => None,
        }
    }
}

/// An optimal CFLP solution.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    total_cost: f64,
    objective: f64,
    assignments: Vec<usize>,
    opened: Vec<usize>,
    loads: Vec<u128>,
    utilizations: Vec<f64>,
    fallback_customers: Vec<usize>,
}

impl Solution {
    /// Cost recomputed from the column values.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Objective value reported by the engine.
    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// Facility index serving each customer, in customer order.
    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    pub fn facility_of(&self, customer: usize) -> Option<usize> {
        self.assignments.get(customer).copied()
    }

    /// Facilities whose `open` column is set, ascending.
    pub fn opened(&self) -> &[usize] {
        &self.opened
    }

    /// Total assigned demand per facility.
    pub fn loads(&self) -> &[u128] {
        &self.loads
    }

    /// `load / capacity` per facility; 0 for closed or zero-capacity facilities.
    pub fn utilizations(&self) -> &[f64] {
        &self.utilizations
    }

    /// Customers with no assignment value above the threshold.
    ///
    /// These were put on facility 0. A non-empty list means the engine
    /// returned a non-integral point for an "optimal" status.
    pub fn fallback_customers(&self) -> &[usize] {
        &self.fallback_customers
    }

    /// Checks completeness, capacities and cost against `instance`.
    ///
    /// The reference cost counts the setup cost of every facility that serves
    /// at least one customer plus all assignment distances.
    pub fn verify(&self, instance: &Instance, rel_tol: f64) -> Vec<Violation> {
        let mut violations = Vec::new();
        let n_fac = instance.facility_count();

        if self.assignments.len() != instance.customer_count() {
            violations.push(Violation::Incomplete {
                expected: instance.customer_count(),
                actual: self.assignments.len(),
            });
        }

        let mut load = vec![0u128; n_fac];
        let mut serving = vec![false; n_fac];
        let mut cost = 0.0;
        for (customer, &facility) in instance.customers().iter().zip(&self.assignments) {
            if facility >= n_fac {
                violations.push(Violation::UnknownFacility {
                    customer: customer.index(),
                    facility,
                });
                continue;
            }
            load[facility] += u128::from(customer.demand());
            serving[facility] = true;
            cost += crate::distance::euclidean(
                customer.location(),
                instance.facilities()[facility].location(),
            );
        }

        for (f, facility) in instance.facilities().iter().enumerate() {
            if load[f] > u128::from(facility.capacity()) {
                violations.push(Violation::OverCapacity {
                    facility: f,
                    load: load[f],
                    capacity: facility.capacity(),
                });
            }
            if serving[f] {
                cost += facility.setup_cost();
            }
        }

        if !costs_agree(cost, self.total_cost, rel_tol) {
            violations.push(Violation::CostMismatch {
                reported: self.total_cost,
                recomputed: cost,
            });
        }

        violations
    }
}

/// A failed check from [`Solution::verify`].
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    Incomplete { expected: usize, actual: usize },
    UnknownFacility { customer: usize, facility: usize },
    OverCapacity { facility: usize, load: u128, capacity: u64 },
    CostMismatch { reported: f64, recomputed: f64 },
}

pub(crate) fn costs_agree(a: f64, b: f64, rel_tol: f64) -> bool {
    (a - b).abs() <= rel_tol * a.abs().max(b.abs()).max(1.0)
}

/// Decode optimal column `values` of `cflp` into a [`Solution`].
pub fn decode(
    instance: &Instance,
    cflp: &CflpModel,
    values: &[f64],
    objective: f64,
    config: &SolverConfig,
) -> CflpResult<Solution> {
    let n_fac = instance.facility_count();
    let n_cust = instance.customer_count();
    if values.len() != cflp.model.n_columns() {
        return Err(CflpError::SolutionSize {
            expected: cflp.model.n_columns(),
            actual: values.len(),
        });
    }
    let vars = &cflp.vars;
    let value = |col: ColumnId| values[col.index()];

    // Recompute the cost from the same coefficients as the objective
    let mut total_cost = 0.0;
    for (f, facility) in instance.facilities().iter().enumerate() {
        total_cost += value(vars.open(f)?) * facility.setup_cost();
        for c in 0..n_cust {
            total_cost += value(vars.assign(c, f)?) * cflp.distances.get(c, f);
        }
    }

    // First facility above the threshold, scanning in index order
    let mut assignments = Vec::with_capacity(n_cust);
    let mut fallback_customers = Vec::new();
    for c in 0..n_cust {
        let mut chosen = None;
        for f in 0..n_fac {
            if value(vars.assign(c, f)?) > BINARY_THRESHOLD {
                chosen = Some(f);
                break;
            }
        }
        match chosen {
            Some(f) => assignments.push(f),
            None => {
                log::warn!(
                    "Customer {} has no assignment above {}; defaulting to facility 0",
                    c,
                    BINARY_THRESHOLD
                );
                fallback_customers.push(c);
                assignments.push(0);
            }
        }
    }

    let opened: Vec<usize> = (0..n_fac)
        .map(|f| -> CflpResult<_> { Ok((f, value(vars.open(f)?))) })
        .collect::<CflpResult<Vec<_>>>()?
        .into_iter()
        .filter(|&(_, v)| v > BINARY_THRESHOLD)
        .map(|(f, _)| f)
        .collect();

    let mut loads = vec![0u128; n_fac];
    for (customer, &f) in instance.customers().iter().zip(&assignments) {
        if f < n_fac {
            loads[f] += u128::from(customer.demand());
        }
    }
    let utilizations: Vec<f64> = instance
        .facilities()
        .iter()
        .zip(&loads)
        .enumerate()
        .map(|(f, (facility, &load))| {
            if facility.capacity() > 0 && opened.binary_search(&f).is_ok() {
                load as f64 / facility.capacity() as f64
            } else {
                0.0
            }
        })
        .collect();

    if !costs_agree(total_cost, objective, config.cost_tolerance) {
        log::warn!(
            "Recomputed cost {} differs from engine objective {}",
            total_cost,
            objective
        );
    }

    Ok(Solution {
        total_cost,
        objective,
        assignments,
        opened,
        loads,
        utilizations,
        fallback_customers,
    })
}
