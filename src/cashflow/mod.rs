//! Cash flow definitions and loading

mod data;
pub mod loader;

pub use data::{annual_to_monthly_rate, CashFlow, CashFlowBuilder};
pub use loader::{
    load_cash_flows, load_cash_flows_from_reader, load_cash_flows_json,
    load_cash_flows_json_from_reader,
};
