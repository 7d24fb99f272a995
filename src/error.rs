//! Error types for projection and aggregation

use chrono::NaiveDate;
use thiserror::Error;

/// Result alias used across the crate
pub type FinplanResult<T> = Result<T, FinplanError>;

/// Errors raised while building, projecting or aggregating cash flows
#[derive(Error, Debug)]
pub enum FinplanError {
    /// A cash flow with this name is already registered
    #[error("cash flow '{0}' is already registered")]
    DuplicateCashFlow(String),

    /// Bad input detected before any projection work starts
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// What was wrong with the input
        reason: String,
    },

    /// The recurrence produced NaN or infinity
    #[error("cash flow '{cash_flow}' produced a non-finite value at {date} on path {path}")]
    NonFiniteValue {
        cash_flow: String,
        date: NaiveDate,
        path: u32,
    },

    /// Month arithmetic left chrono's representable range
    #[error("date out of range after {date}")]
    DateOutOfRange {
        /// Last representable date reached
        date: NaiveDate,
    },

    /// A single projector failed during aggregation
    #[error("projection of '{cash_flow}' failed (horizon {horizon}, {paths} paths): {source}")]
    Projection {
        cash_flow: String,
        horizon: NaiveDate,
        paths: u32,
        #[source]
        source: Box<FinplanError>,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FinplanError {
    /// Shorthand for an `InvalidConfiguration` error
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration { reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_projection_error_keeps_source() {
        let inner = FinplanError::NonFiniteValue {
            cash_flow: "equity".to_string(),
            date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            path: 3,
        };
        let err = FinplanError::Projection {
            cash_flow: "equity".to_string(),
            horizon: NaiveDate::from_ymd_opt(2040, 1, 1).unwrap(),
            paths: 10,
            source: Box::new(inner),
        };

        let msg = err.to_string();
        assert!(msg.contains("equity"));
        assert!(msg.contains("2040-01-01"));
        assert!(msg.contains("non-finite"));

        let source = err.source().expect("source should be preserved");
        assert!(source.to_string().contains("on path 3"));
    }
}
