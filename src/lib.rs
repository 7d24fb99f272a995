//! Finplan - monthly net-worth projection engine
//!
//! This library provides:
//! - Cash flow definitions with a starting balance, monthly contribution and growth rate
//! - Deterministic and Gaussian (Monte Carlo) monthly projections
//! - Aggregation of many cash flows into a (date, path) net-worth table
//! - Per-date summary statistics across simulated paths

pub mod error;
pub mod dates;
pub mod cashflow;
pub mod projection;
pub mod networth;

// Re-export commonly used types
pub use error::{FinplanError, FinplanResult};
pub use cashflow::CashFlow;
pub use projection::{AggregateTable, Projection, ProjectionConfig, ProjectionRow, Projector, TotalSummary};
pub use networth::{NetWorth, Verbosity};
