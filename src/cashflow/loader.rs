//! Load cash flow definitions from CSV or JSON

use csv::Reader;
use serde::Deserialize;
use std::path::Path;

use super::CashFlow;
use crate::dates::parse_date;
use crate::error::{FinplanError, FinplanResult};

/// Raw record shared by the CSV and JSON formats
///
/// Optional columns may be left blank in CSV or omitted in JSON.
#[derive(Debug, Deserialize)]
struct CashFlowRecord {
    name: String,
    start_date: String,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    start_value: Option<f64>,
    #[serde(default)]
    monthly_value: Option<f64>,
    #[serde(default)]
    growth_rate_mean: Option<f64>,
    #[serde(default)]
    growth_rate_vol: Option<f64>,
}

impl CashFlowRecord {
    fn to_cash_flow(self) -> FinplanResult<CashFlow> {
        let start_date = parse_date(&self.start_date)?;
        let mut builder = CashFlow::builder(self.name, start_date);

        if let Some(end) = self.end_date.as_deref().filter(|s| !s.trim().is_empty()) {
            builder = builder.end_date(parse_date(end)?);
        }
        if let Some(v) = self.start_value {
            builder = builder.start_value(v);
        }
        if let Some(v) = self.monthly_value {
            builder = builder.monthly_value(v);
        }
        if let Some(v) = self.growth_rate_mean {
            builder = builder.growth_rate(v);
        }
        if let Some(v) = self.growth_rate_vol {
            builder = builder.volatility(v);
        }

        builder.build()
    }
}

/// Load cash flows from any CSV reader
pub fn load_cash_flows_from_reader<R: std::io::Read>(reader: R) -> FinplanResult<Vec<CashFlow>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut cash_flows = Vec::new();

    for (idx, result) in csv_reader.deserialize().enumerate() {
        let record: CashFlowRecord = result?;
        let cash_flow = record.to_cash_flow().map_err(|e| with_row(e, idx + 1))?;
        cash_flows.push(cash_flow);
    }

    Ok(cash_flows)
}

/// Load cash flows from a CSV file
pub fn load_cash_flows<P: AsRef<Path>>(path: P) -> FinplanResult<Vec<CashFlow>> {
    let file = std::fs::File::open(path)?;
    load_cash_flows_from_reader(file)
}

/// Load cash flows from a JSON array
pub fn load_cash_flows_json_from_reader<R: std::io::Read>(reader: R) -> FinplanResult<Vec<CashFlow>> {
    let records: Vec<CashFlowRecord> = serde_json::from_reader(reader)?;
    records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| record.to_cash_flow().map_err(|e| with_row(e, idx + 1)))
        .collect()
}

/// Load cash flows from a JSON file
pub fn load_cash_flows_json<P: AsRef<Path>>(path: P) -> FinplanResult<Vec<CashFlow>> {
    let file = std::fs::File::open(path)?;
    load_cash_flows_json_from_reader(std::io::BufReader::new(file))
}

fn with_row(err: FinplanError, row: usize) -> FinplanError {
    match err {
        FinplanError::InvalidConfiguration { reason } => {
            FinplanError::invalid(format!("record {}: {}", row, reason))
        }
        other => other,
    }
}
