//! Aggregate table keyed by (date, path)

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

use super::rows::ProjectionRow;
use crate::error::FinplanResult;

/// One (date, path) row of the aggregate
///
/// `values` lines up with [`AggregateTable::columns`]; `None` means the cash
/// flow was not active in that month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub date: NaiveDate,
    pub path: u32,
    pub values: Vec<Option<f64>>,
    pub total: f64,
}

/// Outer join of several projections with a `total` column
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateTable {
    columns: Vec<String>,
    #[serde(serialize_with = "serialize_rows")]
    rows: BTreeMap<(NaiveDate, u32), AggregateRow>,
}

fn serialize_rows<S: serde::Serializer>(
    rows: &BTreeMap<(NaiveDate, u32), AggregateRow>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(rows.values())
}

impl AggregateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full outer join of one cash flow's rows onto the table
    ///
    /// Keys missing on either side stay absent in the respective column, and
    /// totals are recomputed so they always reflect the joined columns.
    pub fn outer_join(&mut self, name: &str, rows: &[ProjectionRow]) {
        self.columns.push(name.to_string());
        let width = self.columns.len();

        for existing in self.rows.values_mut() {
            existing.values.push(None);
        }

        for row in rows {
            let entry = self
                .rows
                .entry((row.date, row.path))
                .or_insert_with(|| AggregateRow {
                    date: row.date,
                    path: row.path,
                    values: vec![None; width],
                    total: 0.0,
                });
            entry.values[width - 1] = Some(row.value);
        }

        for row in self.rows.values_mut() {
            row.total = row.values.iter().flatten().sum();
        }
    }

    /// Cash flow column names in join order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows ordered by date, then path
    pub fn rows(&self) -> impl Iterator<Item = &AggregateRow> {
        self.rows.values()
    }

    pub fn row(&self, date: NaiveDate, path: u32) -> Option<&AggregateRow> {
        self.rows.get(&(date, path))
    }

    /// Value of one cash flow at (date, path), `None` when absent
    pub fn value(&self, date: NaiveDate, path: u32, name: &str) -> Option<f64> {
        let col = self.columns.iter().position(|c| c == name)?;
        self.row(date, path).and_then(|r| r.values[col])
    }

    pub fn total(&self, date: NaiveDate, path: u32) -> Option<f64> {
        self.row(date, path).map(|r| r.total)
    }

    /// Distinct dates in ascending order
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.rows.keys().map(|(d, _)| *d).collect();
        dates.dedup();
        dates
    }

    /// Number of distinct paths present
    pub fn path_count(&self) -> usize {
        self.rows.keys().map(|(_, p)| *p).max().map_or(0, |p| p as usize + 1)
    }

    /// Write as CSV: `date,<cash flows...>,path,total`, absent cells empty
    pub fn write_csv<W: Write>(&self, writer: W) -> FinplanResult<()> {
        let mut csv = csv::Writer::from_writer(writer);

        let mut header = Vec::with_capacity(self.columns.len() + 3);
        header.push("date".to_string());
        header.extend(self.columns.iter().cloned());
        header.push("path".to_string());
        header.push("total".to_string());
        csv.write_record(&header)?;

        for row in self.rows.values() {
            let mut record = Vec::with_capacity(header.len());
            record.push(row.date.to_string());
            for value in &row.values {
                record.push(value.map(|v| format!("{:.2}", v)).unwrap_or_default());
            }
            record.push(row.path.to_string());
            record.push(format!("{:.2}", row.total));
            csv.write_record(&record)?;
        }

        csv.flush()?;
        Ok(())
    }
}
