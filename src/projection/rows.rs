//! Projection output structures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::config::{Advisory, ValidatedConfig};

/// Value of one cash flow in one month on one path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRow {
    pub date: NaiveDate,
    pub value: f64,
    pub path: u32,
}

/// Complete output of projecting a single cash flow
#[derive(Debug, Clone, Serialize)]
pub struct Projection {
    /// Name of the projected cash flow
    pub cash_flow: String,

    /// Configuration actually used after validation
    pub config: ValidatedConfig,

    /// Diagnostics raised during validation
    pub advisories: Vec<Advisory>,

    /// Rows ordered by path, then date
    pub rows: Vec<ProjectionRow>,
}

impl Projection {
    pub fn new(cash_flow: impl Into<String>, config: ValidatedConfig, advisories: Vec<Advisory>) -> Self {
        Self {
            cash_flow: cash_flow.into(),
            config,
            advisories,
            rows: Vec::new(),
        }
    }

    /// Add a row
    pub fn add_row(&mut self, row: ProjectionRow) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows belonging to a single path
    pub fn path(&self, path: u32) -> impl Iterator<Item = &ProjectionRow> {
        self.rows.iter().filter(move |r| r.path == path)
    }

    /// Number of months emitted per path (every path has the same length)
    pub fn months_per_path(&self) -> usize {
        self.path(0).count()
    }
}
