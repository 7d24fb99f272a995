//! Projection configuration and request validation

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use crate::error::{FinplanError, FinplanResult};

/// Arguments of a projection or aggregation call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionConfig {
    /// Exclusive upper bound of the projection
    pub horizon: NaiveDate,

    /// Number of Monte Carlo paths (must be >= 1)
    pub paths: u32,

    /// Explicit stochastic flag; `None` picks stochastic only for multiple paths
    pub stochastic: Option<bool>,
}

/// Configuration after validation, with every choice resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidatedConfig {
    pub horizon: NaiveDate,
    pub paths: u32,
    pub stochastic: bool,
}

/// Non-fatal diagnostic raised while validating a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Advisory {
    /// Several paths were requested with a fixed rate; sampling was switched on
    StochasticForced { paths: u32 },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::StochasticForced { paths } => write!(
                f,
                "{} paths requested with stochastic sampling disabled; enabling it so paths differ",
                paths
            ),
        }
    }
}

impl ProjectionConfig {
    pub fn new(horizon: NaiveDate, paths: u32, stochastic: Option<bool>) -> Self {
        Self { horizon, paths, stochastic }
    }

    /// Single deterministic path up to `horizon`
    pub fn deterministic(horizon: NaiveDate) -> Self {
        Self::new(horizon, 1, Some(false))
    }

    /// Resolve the stochastic flag and reject unusable input
    ///
    /// An inconsistent request (several paths, sampling disabled) is corrected
    /// rather than rejected and reported through the returned advisories.
    pub fn validate(&self) -> FinplanResult<(ValidatedConfig, Vec<Advisory>)> {
        if self.paths == 0 {
            return Err(FinplanError::invalid("path count must be at least 1"));
        }

        let mut advisories = Vec::new();
        let stochastic = match self.stochastic {
            Some(false) if self.paths > 1 => {
                advisories.push(Advisory::StochasticForced { paths: self.paths });
                true
            }
            Some(flag) => flag,
            None => self.paths > 1,
        };

        Ok((
            ValidatedConfig {
                horizon: self.horizon,
                paths: self.paths,
                stochastic,
            },
            advisories,
        ))
    }
}
