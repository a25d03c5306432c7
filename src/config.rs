//! Configuration settings for building and solving the CFLP model.

use crate::error::{CflpError, CflpResult};

/// Encoding of the "no service unless open" rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkingForm {
    /// `assign[c][f] - open[f] <= 0`, the textbook formulation.
    #[default]
    Inequality,

    /// `assign[c][f] - open[f]` pinned to `[0, 0]`.
    ///
    /// This makes `assign[c][f] == open[f]`, so an open facility must serve
    /// every customer and at most one facility can be open when customers
    /// exist. Only useful to reproduce outputs of the pinned formulation.
    Equality,
}

/// Settings passed to the MILP engine and the decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Wall-clock limit for the engine in seconds. `None` means unbounded.
    pub time_limit: Option<f64>,

    /// Relative MIP gap at which the engine may stop.
    pub mip_rel_gap: Option<f64>,

    /// Engine thread count. `None` leaves the engine default.
    pub threads: Option<usize>,

    /// How the linking rows are encoded.
    pub linking: LinkingForm,

    /// Let the engine print its own log to stdout.
    pub verbose: bool,

    /// Relative tolerance between the recomputed cost and the engine objective.
    pub cost_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit: None,
            mip_rel_gap: None,
            threads: None,
            linking: LinkingForm::default(),
            verbose: false,
            cost_tolerance: 1e-6,
        }
    }
}

impl SolverConfig {
    /// Rejects settings the engine would refuse.
    ///
    /// Time limit and gap must be non-negative (infinity is allowed), the
    /// thread count must fit an `i32` and the cost tolerance must be >= 0.
    pub fn validate(&self) -> CflpResult<()> {
        non_negative("time_limit", self.time_limit)?;
        non_negative("mip_rel_gap", self.mip_rel_gap)?;
        if let Some(threads) = self.threads {
            if i32::try_from(threads).is_err() {
                return Err(CflpError::InvalidConfig(format!(
                    "threads must be at most {}, got {}",
                    i32::MAX,
                    threads
                )));
            }
        }
        non_negative("cost_tolerance", Some(self.cost_tolerance))?;
        Ok(())
    }

    /// Returns a copy with the given time limit.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    /// Returns a copy with the given linking encoding.
    pub fn with_linking(mut self, linking: LinkingForm) -> Self {
        self.linking = linking;
        self
    }
}

fn non_negative(name: &str, value: Option<f64>) -> CflpResult<()> {
    match value {
        Some(v) if v.is_nan() || v < 0.0 => Err(CflpError::InvalidConfig(format!(
            "{} must be >= 0, got {}",
            name, v
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SolverConfig::default().validate().is_ok());
        let config = SolverConfig {
            time_limit: Some(f64::INFINITY),
            mip_rel_gap: Some(0.0),
            threads: Some(0),
            ..SolverConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let bad = [
            SolverConfig::default().with_time_limit(-1.0),
            SolverConfig::default().with_time_limit(f64::NAN),
            SolverConfig {
                mip_rel_gap: Some(-0.1),
                ..SolverConfig::default()
            },
            SolverConfig {
                threads: Some(usize::MAX),
                ..SolverConfig::default()
            },
            SolverConfig {
                cost_tolerance: -1e-6,
                ..SolverConfig::default()
            },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(CflpError::InvalidConfig(_))),
                "{:?}",
                config
            );
        }
    }
}
