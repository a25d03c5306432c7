//! Capacitated Facility Location Problem (CFLP)
//!
//! Minimize opening costs plus Euclidean assignment distances, with every
//! customer served by exactly one open facility and facility capacities
//! respected. All decision variables are binary.

use std::time::Instant;

use crate::config::{LinkingForm, SolverConfig};
use crate::distance::DistanceMatrix;
use crate::error::CflpResult;
use crate::instance::Instance;
use crate::locate::decode::{decode, SolveOutcome};
use crate::locate::model::{MilpModel, Row, RowKind, VariableStore};
use crate::locate::solver::{HighsEngine, MilpEngine, SolveStatus};

/// The compact CFLP formulation of one instance.
#[derive(Debug, Clone)]
pub struct CflpModel {
    pub model: MilpModel,
    pub vars: VariableStore,
    pub distances: DistanceMatrix,
}

/// Build the MILP for `instance`.
///
/// Variables:
/// - `open[f]` = 1 if facility f is opened
/// - `assign[c][f]` = 1 if customer c is served by facility f
///
/// Zero facilities or customers yield a degenerate but well-formed model.
pub fn build_model(instance: &Instance, linking: LinkingForm) -> CflpResult<CflpModel> {
    let n_fac = instance.facility_count();
    let n_cust = instance.customer_count();
    let facilities = instance.facilities();
    let customers = instance.customers();
    let distances = DistanceMatrix::from_instance(instance);

    let n_cols = n_fac + n_cust * n_fac;
    let n_rows = n_cust + n_cust * n_fac + n_fac;
    let mut model = MilpModel::with_capacity(n_cols, n_rows);
    let mut vars = VariableStore::new(n_fac, n_cust);

    // Objective: sum_f setup[f] * open[f] + sum_{c,f} dist[c][f] * assign[c][f]
    for facility in facilities {
        let col = model.add_binary(format!("open[{}]", facility.index()), facility.setup_cost());
        vars.push_open(col);
    }
    for c in 0..n_cust {
        for f in 0..n_fac {
            let col = model.add_binary(format!("assign[{}][{}]", c, f), distances.get(c, f));
            vars.push_assign(col);
        }
    }

    // Constraint 1: sum_f assign[c][f] = 1 for all c (service is mandatory)
    for c in 0..n_cust {
        let terms = (0..n_fac)
            .map(|f| -> CflpResult<_> { Ok((vars.assign(c, f)?, 1.0)) })
            .collect::<CflpResult<Vec<_>>>()?;
        model.add_row(Row {
            kind: RowKind::Assignment { customer: c },
            lower: 1.0,
            upper: 1.0,
            terms,
        });
    }

    // Constraint 2: assign[c][f] - open[f] <= 0 for all f,c
    // Sparse: only 2 non-zeros per row
    let linking_lower = match linking {
        LinkingForm::Inequality => f64::NEG_INFINITY,
        LinkingForm::Equality => 0.0,
    };
    for f in 0..n_fac {
        let open = vars.open(f)?;
        for c in 0..n_cust {
            model.add_row(Row {
                kind: RowKind::Linking {
                    facility: f,
                    customer: c,
                },
                lower: linking_lower,
                upper: 0.0,
                terms: vec![(vars.assign(c, f)?, 1.0), (open, -1.0)],
            });
        }
    }

    // Constraint 3: CAPACITY: sum_c demand[c] * assign[c][f] <= capacity[f] for all f
    for (f, facility) in facilities.iter().enumerate() {
        let terms = customers
            .iter()
            .enumerate()
            .map(|(c, customer)| -> CflpResult<_> {
                Ok((vars.assign(c, f)?, customer.demand() as f64))
            })
            .collect::<CflpResult<Vec<_>>>()?;
        model.add_row(Row {
            kind: RowKind::Capacity { facility: f },
            lower: 0.0,
            upper: facility.capacity() as f64,
            terms,
        });
    }

    log::debug!(
        "CFLP model: {} facilities, {} customers, {} columns, {} rows, {} nonzeros",
        n_fac,
        n_cust,
        model.n_columns(),
        model.n_rows(),
        model.n_nonzeros()
    );

    Ok(CflpModel {
        model,
        vars,
        distances,
    })
}

/// Solve `instance` with HiGHS.
pub fn solve(instance: &Instance, config: &SolverConfig) -> CflpResult<SolveOutcome> {
    let engine = HighsEngine::new(config.clone());
    solve_with(&engine, instance, config)
}

/// Solve `instance` with any engine.
pub fn solve_with<E: MilpEngine + ?Sized>(
    engine: &E,
    instance: &Instance,
    config: &SolverConfig,
) -> CflpResult<SolveOutcome> {
    config.validate()?;
    let total_demand = instance.total_demand();
    let total_capacity = instance.total_capacity();
    if total_capacity < total_demand {
        log::warn!(
            "Total capacity ({}) is less than total demand ({}); expecting an infeasible model",
            total_capacity,
            total_demand
        );
    }

    let cflp = build_model(instance, config.linking)?;

    let start = Instant::now();
    let result = engine.solve(&cflp.model)?;
    log::info!(
        "{} finished with status {} in {:.3}s",
        engine.name(),
        result.status,
        start.elapsed().as_secs_f64()
    );

    match result.status {
        SolveStatus::Optimal => {
            let solution = decode(instance, &cflp, &result.values, result.objective, config)?;
            Ok(SolveOutcome::Optimal(solution))
        }
        status => Ok(SolveOutcome::NotOptimal(status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Point;

    fn two_by_three() -> Instance {
        Instance::new(
            vec![
                (10.0, 8, Point::new(0.0, 0.0)),
                (20.0, 4, Point::new(6.0, 8.0)),
            ],
            vec![
                (3, Point::new(3.0, 4.0)),
                (2, Point::new(6.0, 8.0)),
                (5, Point::new(0.0, 1.0)),
            ],
        )
    }

    #[test]
    fn test_dimensions() {
        let cflp = build_model(&two_by_three(), LinkingForm::Inequality).unwrap();
        assert_eq!(cflp.model.n_columns(), 2 + 3 * 2);
        assert_eq!(cflp.model.n_rows(), 3 + 3 * 2 + 2);
        assert!(cflp
            .model
            .columns()
            .iter()
            .all(|c| c.integer && c.lower == 0.0 && c.upper == 1.0));
    }

    #[test]
    fn test_objective_coefficients() {
        let cflp = build_model(&two_by_three(), LinkingForm::Inequality).unwrap();
        let m = &cflp.model;
        let v = &cflp.vars;
        assert_eq!(m.column(v.open(0).unwrap()).cost, 10.0);
        assert_eq!(m.column(v.open(1).unwrap()).cost, 20.0);
        assert_eq!(m.column(v.assign(0, 0).unwrap()).cost, 5.0);
        assert_eq!(m.column(v.assign(0, 1).unwrap()).cost, 5.0);
        assert_eq!(m.column(v.assign(1, 1).unwrap()).cost, 0.0);
        assert_eq!(m.column(v.assign(2, 0).unwrap()).cost, 1.0);
        assert_eq!(m.column(v.assign(1, 0).unwrap()).name, "assign[1][0]");
    }

    #[test]
    fn test_assignment_rows() {
        let cflp = build_model(&two_by_three(), LinkingForm::Inequality).unwrap();
        let rows: Vec<_> = cflp
            .model
            .rows()
            .iter()
            .filter(|r| matches!(r.kind, RowKind::Assignment { .. }))
            .collect();
        assert_eq!(rows.len(), 3);
        for (c, row) in rows.iter().enumerate() {
            assert_eq!(row.kind, RowKind::Assignment { customer: c });
            assert_eq!((row.lower, row.upper), (1.0, 1.0));
            let expected: Vec<_> = (0..2)
                .map(|f| (cflp.vars.assign(c, f).unwrap(), 1.0))
                .collect();
            assert_eq!(row.terms, expected);
        }
    }

    #[test]
    fn test_linking_rows_inequality() {
        let cflp = build_model(&two_by_three(), LinkingForm::Inequality).unwrap();
        let row = cflp
            .model
            .rows()
            .iter()
            .find(|r| {
                r.kind
                    == RowKind::Linking {
                        facility: 1,
                        customer: 2,
                    }
            })
            .unwrap();
        assert_eq!(row.lower, f64::NEG_INFINITY);
        assert_eq!(row.upper, 0.0);
        assert_eq!(
            row.terms,
            vec![
                (cflp.vars.assign(2, 1).unwrap(), 1.0),
                (cflp.vars.open(1).unwrap(), -1.0)
            ]
        );
    }

    #[test]
    fn test_linking_rows_equality() {
        let cflp = build_model(&two_by_three(), LinkingForm::Equality).unwrap();
        let linking = cflp
            .model
            .rows()
            .iter()
            .filter(|r| matches!(r.kind, RowKind::Linking { .. }));
        let mut n = 0;
        for row in linking {
            assert_eq!((row.lower, row.upper), (0.0, 0.0));
            n += 1;
        }
        assert_eq!(n, 6);
    }

    #[test]
    fn test_capacity_rows() {
        let cflp = build_model(&two_by_three(), LinkingForm::Inequality).unwrap();
        let row = cflp
            .model
            .rows()
            .iter()
            .find(|r| r.kind == RowKind::Capacity { facility: 1 })
            .unwrap();
        assert_eq!(row.upper, 4.0);
        let coefs: Vec<f64> = row.terms.iter().map(|&(_, a)| a).collect();
        assert_eq!(coefs, vec![3.0, 2.0, 5.0]);
        assert_eq!(row.terms[2].0, cflp.vars.assign(2, 1).unwrap());
    }

    #[test]
    fn test_closed_facility_cannot_serve() {
        let cflp = build_model(&two_by_three(), LinkingForm::Inequality).unwrap();
        let mut values = vec![0.0; cflp.model.n_columns()];
        // Everyone on facility 0 while it is closed
        for c in 0..3 {
            values[cflp.vars.assign(c, 0).unwrap().index()] = 1.0;
        }
        let violated = cflp
            .model
            .rows()
            .iter()
            .filter(|r| !r.is_satisfied(&values, 1e-9))
            .count();
        // three linking rows, and the capacity row of facility 0 (10 > 8)
        assert_eq!(violated, 4);
    }

    #[test]
    fn test_degenerate_models() {
        let empty = build_model(&Instance::default(), LinkingForm::Inequality).unwrap();
        assert_eq!(empty.model.n_columns(), 0);
        assert_eq!(empty.model.n_rows(), 0);

        let no_customers = Instance::new(vec![(5.0, 1, Point::new(0.0, 0.0))], vec![]);
        let cflp = build_model(&no_customers, LinkingForm::Inequality).unwrap();
        assert_eq!(cflp.model.n_columns(), 1);
        assert_eq!(cflp.model.n_rows(), 1);
        assert!(cflp.model.rows()[0].terms.is_empty());

        let no_facilities = Instance::new(vec![], vec![(1, Point::new(0.0, 0.0))]);
        let cflp = build_model(&no_facilities, LinkingForm::Inequality).unwrap();
        assert_eq!(cflp.model.n_columns(), 0);
        assert_eq!(cflp.model.n_rows(), 1);
        assert_eq!(cflp.model.rows()[0].lower, 1.0);
    }
}
