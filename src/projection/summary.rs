//! Monte Carlo statistics of the aggregate total across paths

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use super::table::AggregateTable;

/// Default percentiles reported by [`TotalSummary::from_table`] callers
pub const DEFAULT_PERCENTILES: [f64; 3] = [0.1, 0.5, 0.9];

/// Statistics of `total` across paths for a single date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateSummary {
    pub date: NaiveDate,
    pub paths: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// (percentile, value) pairs in the order requested
    pub percentiles: Vec<(f64, f64)>,
}

/// Per-date statistics of the total column
#[derive(Debug, Clone, Default, Serialize)]
pub struct TotalSummary {
    pub rows: Vec<DateSummary>,
}

impl TotalSummary {
    /// Summarize every date of `table`
    ///
    /// Percentiles use the nearest rank `floor(n * p)` on sorted totals,
    /// clamped to the last observation.
    pub fn from_table(table: &AggregateTable, percentiles: &[f64]) -> Self {
        let mut by_date: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
        for row in table.rows() {
            by_date.entry(row.date).or_default().push(row.total);
        }

        let rows = by_date
            .into_iter()
            .map(|(date, mut totals)| {
                totals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                let n = totals.len();
                let mean = totals.iter().sum::<f64>() / n as f64;
                let variance = totals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;

                let percentiles = percentiles
                    .iter()
                    .map(|&p| {
                        let idx = ((n as f64 * p).floor().max(0.0) as usize).min(n - 1);
                        (p, totals[idx])
                    })
                    .collect();

                DateSummary {
                    date,
                    paths: n,
                    mean,
                    std_dev: variance.sqrt(),
                    min: totals[0],
                    max: totals[n - 1],
                    percentiles,
                }
            })
            .collect();

        Self { rows }
    }

    /// Statistics for the last projected date
    pub fn final_row(&self) -> Option<&DateSummary> {
        self.rows.last()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DateSummary> {
        self.rows.iter().find(|r| r.date == date)
    }
}
