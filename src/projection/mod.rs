//! Monthly projection of cash flows and aggregation output

mod config;
mod state;
mod engine;
mod rows;
mod table;
mod summary;

pub use config::{Advisory, ProjectionConfig, ValidatedConfig};
pub use state::ProjectionState;
pub use engine::Projector;
pub use rows::{Projection, ProjectionRow};
pub use table::{AggregateRow, AggregateTable};
pub use summary::{DateSummary, TotalSummary, DEFAULT_PERCENTILES};
