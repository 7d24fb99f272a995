//! Net-worth container: a registry of named cash flows and their aggregation
//!
//! Every registered cash flow is projected with the same horizon, path count
//! and stochastic flag, then the per-cash-flow rows are outer-joined on
//! (date, path) into one [`AggregateTable`].

use chrono::NaiveDate;
use log::{warn, Level};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::cashflow::CashFlow;
use crate::dates::{far_future, month_start};
use crate::error::{FinplanError, FinplanResult};
use crate::projection::{AggregateTable, Projection, ProjectionConfig, Projector};

/// Diagnostic level for aggregation progress output
///
/// 0 is silent, 1 reports progress, 2 adds per-cash-flow detail, 3 and above
/// adds per-month detail. Warnings are always emitted. Never affects data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Verbosity(pub u8);

impl Verbosity {
    pub const SILENT: Verbosity = Verbosity(0);

    /// Whether messages at `level` pass this verbosity
    pub fn allows(self, level: Level) -> bool {
        match level {
            Level::Error | Level::Warn => true,
            Level::Info => self.0 >= 1,
            Level::Debug => self.0 >= 2,
            Level::Trace => self.0 >= 3,
        }
    }

    fn emit(self, level: Level, args: fmt::Arguments<'_>) {
        if self.allows(level) {
            log::log!(level, "{}", args);
        }
    }
}

impl From<u8> for Verbosity {
    fn from(level: u8) -> Self {
        Verbosity(level)
    }
}

/// Named collection of uniquely named cash flows
#[derive(Debug, Clone)]
pub struct NetWorth {
    name: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    cash_flows: BTreeMap<String, CashFlow>,
}

impl NetWorth {
    /// Create an empty container; the end date defaults to 2050-01-01
    pub fn new(name: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            start_date: month_start(start_date),
            end_date: far_future(),
            cash_flows: BTreeMap::new(),
        }
    }

    /// Override the default horizon
    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = month_start(end_date);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Horizon used when the caller does not pass one
    pub fn default_horizon(&self) -> NaiveDate {
        self.end_date
    }

    pub fn len(&self) -> usize {
        self.cash_flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cash_flows.is_empty()
    }

    pub fn cash_flow(&self, name: &str) -> Option<&CashFlow> {
        self.cash_flows.get(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cash_flows.keys().map(String::as_str)
    }

    /// Add a cash flow; a duplicate name is rejected and nothing changes
    pub fn register(&mut self, cash_flow: CashFlow) -> FinplanResult<()> {
        if self.cash_flows.contains_key(cash_flow.name()) {
            return Err(FinplanError::DuplicateCashFlow(cash_flow.name().to_string()));
        }
        self.cash_flows.insert(cash_flow.name().to_string(), cash_flow);
        Ok(())
    }

    /// Add several cash flows, all or nothing
    pub fn register_all(&mut self, cash_flows: Vec<CashFlow>) -> FinplanResult<()> {
        let mut seen = HashSet::new();
        for cf in &cash_flows {
            if self.cash_flows.contains_key(cf.name()) || !seen.insert(cf.name()) {
                return Err(FinplanError::DuplicateCashFlow(cf.name().to_string()));
            }
        }
        for cf in cash_flows {
            self.cash_flows.insert(cf.name().to_string(), cf);
        }
        Ok(())
    }

    /// Project every cash flow and outer-join the results on (date, path)
    ///
    /// Each cash flow draws from its own `StdRng`, seeded from `rng` in name
    /// order, so a seeded caller gets the same table regardless of how the
    /// projections are scheduled.
    pub fn aggregate<R: Rng + ?Sized>(
        &self,
        horizon: NaiveDate,
        paths: u32,
        stochastic: Option<bool>,
        verbosity: u8,
        rng: &mut R,
    ) -> FinplanResult<AggregateTable> {
        let config = ProjectionConfig::new(horizon, paths, stochastic);
        self.aggregate_with_config(&config, Verbosity(verbosity), rng)
    }

    pub fn aggregate_with_config<R: Rng + ?Sized>(
        &self,
        config: &ProjectionConfig,
        verbosity: Verbosity,
        rng: &mut R,
    ) -> FinplanResult<AggregateTable> {
        let (validated, advisories) = config.validate()?;
        for advisory in &advisories {
            warn!("{}: {}", self.name, advisory);
        }

        verbosity.emit(
            Level::Info,
            format_args!(
                "aggregating '{}': {} cash flows to {}, {} paths, stochastic={}",
                self.name,
                self.cash_flows.len(),
                validated.horizon,
                validated.paths,
                validated.stochastic
            ),
        );

        let seeded: Vec<(&CashFlow, u64)> = self
            .cash_flows
            .values()
            .map(|cf| (cf, rng.gen::<u64>()))
            .collect();

        let projections = seeded
            .par_iter()
            .map(|(cf, seed)| -> FinplanResult<Projection> {
                let mut stream = StdRng::seed_from_u64(*seed);
                let mut projection = Projection::new(cf.name(), validated, advisories.clone());
                Projector::new(cf)
                    .project_validated(&validated, &mut stream, &mut projection)
                    .map_err(|e| FinplanError::Projection {
                        cash_flow: cf.name().to_string(),
                        horizon: validated.horizon,
                        paths: validated.paths,
                        source: Box::new(e),
                    })?;
                Ok(projection)
            })
            .collect::<FinplanResult<Vec<Projection>>>()?;

        let mut table = AggregateTable::new();
        for projection in &projections {
            verbosity.emit(
                Level::Debug,
                format_args!(
                    "joining '{}': {} rows",
                    projection.cash_flow,
                    projection.rows.len()
                ),
            );
            table.outer_join(&projection.cash_flow, &projection.rows);
        }

        if verbosity.allows(Level::Trace) {
            for row in table.rows() {
                log::trace!("{} path {}: total {:.2}", row.date, row.path, row.total);
            }
        }

        verbosity.emit(
            Level::Info,
            format_args!("aggregated '{}': {} rows", self.name, table.len()),
        );

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(2024)
    }

    fn flat(name: &str, start: NaiveDate, end: NaiveDate, monthly: f64) -> CashFlow {
        CashFlow::builder(name, start)
            .end_date(end)
            .monthly_value(monthly)
            .build()
            .unwrap()
    }

    fn portfolio() -> NetWorth {
        let start = ymd(2024, 1, 1);
        let mut nw = NetWorth::new("wealth", start);
        nw.register(
            CashFlow::builder("equity", start)
                .start_value(1_000_000.0)
                .growth_rate(1.0 + 0.05 / 12.0)
                .volatility(0.04)
                .build()
                .unwrap(),
        )
        .unwrap();
        nw.register(
            CashFlow::builder("bonds", start)
                .start_value(1_000_000.0)
                .growth_rate(1.0 + 0.01 / 12.0)
                .build()
                .unwrap(),
        )
        .unwrap();
        nw.register(flat("college", ymd(2025, 9, 1), ymd(2026, 6, 1), -50_000.0))
            .unwrap();
        nw
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut nw = NetWorth::new("wealth", ymd(2024, 1, 1));
        nw.register(flat("income", ymd(2024, 1, 1), ymd(2030, 1, 1), 100.0)).unwrap();

        let err = nw
            .register(flat("income", ymd(2026, 1, 1), ymd(2031, 1, 1), 999.0))
            .unwrap_err();
        assert!(matches!(err, FinplanError::DuplicateCashFlow(ref n) if n == "income"));

        assert_eq!(nw.len(), 1);
        assert_eq!(nw.cash_flow("income").unwrap().monthly_value(), 100.0);
    }

    #[test]
    fn test_register_all_is_atomic() {
        let mut nw = NetWorth::new("wealth", ymd(2024, 1, 1));
        let batch = vec![
            flat("a", ymd(2024, 1, 1), ymd(2025, 1, 1), 1.0),
            flat("b", ymd(2024, 1, 1), ymd(2025, 1, 1), 1.0),
            flat("a", ymd(2024, 1, 1), ymd(2025, 1, 1), 2.0),
        ];
        assert!(nw.register_all(batch).is_err());
        assert!(nw.is_empty());

        nw.register_all(vec![flat("a", ymd(2024, 1, 1), ymd(2025, 1, 1), 1.0)]).unwrap();
        assert_eq!(nw.names().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_empty_container_aggregates_to_empty_table() {
        let nw = NetWorth::new("nothing", ymd(2024, 1, 1));
        let table = nw.aggregate(ymd(2030, 1, 1), 10, None, 0, &mut rng()).unwrap();
        assert!(table.is_empty());
        assert!(table.columns().is_empty());
    }

    #[test]
    fn test_invalid_path_count() {
        let nw = portfolio();
        let result = nw.aggregate(ymd(2030, 1, 1), 0, None, 0, &mut rng());
        assert!(matches!(result, Err(FinplanError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_disjoint_windows() {
        let mut nw = NetWorth::new("wealth", ymd(2024, 1, 1));
        nw.register(flat("early", ymd(2024, 1, 1), ymd(2024, 3, 1), 100.0)).unwrap();
        nw.register(flat("late", ymd(2024, 6, 1), ymd(2024, 8, 1), 7.0)).unwrap();

        let table = nw.aggregate(ymd(2025, 1, 1), 1, None, 0, &mut rng()).unwrap();
        assert_eq!(table.len(), 6);

        for row in table.rows() {
            assert!(row.total.is_finite());
            let early = table.value(row.date, 0, "early");
            let late = table.value(row.date, 0, "late");
            match (early, late) {
                (Some(v), None) => assert_eq!(row.total, v),
                (None, Some(v)) => assert_eq!(row.total, v),
                other => panic!("unexpected overlap at {}: {:?}", row.date, other),
            }
        }
        assert_eq!(table.total(ymd(2024, 2, 1), 0), Some(100.0));
        assert_eq!(table.total(ymd(2024, 7, 1), 0), Some(7.0));
        assert_eq!(table.total(ymd(2024, 4, 1), 0), None);
    }

    #[test]
    fn test_total_is_sum_of_present_values() {
        let nw = portfolio();
        let table = nw.aggregate(ymd(2027, 1, 1), 8, None, 0, &mut rng()).unwrap();

        assert_eq!(table.path_count(), 8);
        assert_eq!(table.columns(), ["bonds", "college", "equity"]);
        for row in table.rows() {
            let expected: f64 = row.values.iter().flatten().sum();
            assert_relative_eq!(row.total, expected);
            assert!(row.total.is_finite());
        }

        // College is only active for its own window
        assert_eq!(table.value(ymd(2025, 8, 1), 3, "college"), None);
        assert_eq!(table.value(ymd(2025, 9, 1), 3, "college"), Some(-50_000.0));
        assert_eq!(table.value(ymd(2026, 7, 1), 3, "college"), None);
    }

    #[test]
    fn test_seeded_aggregate_reproducible() {
        let nw = portfolio();
        let a = nw.aggregate(ymd(2026, 1, 1), 4, None, 0, &mut rng()).unwrap();
        let b = nw.aggregate(ymd(2026, 1, 1), 4, None, 0, &mut rng()).unwrap();
        assert_eq!(a.rows().collect::<Vec<_>>(), b.rows().collect::<Vec<_>>());
    }

    #[test]
    fn test_stochastic_paths_differ_but_bonds_do_not() {
        let nw = portfolio();
        let horizon = ymd(2026, 1, 1);
        let table = nw.aggregate(horizon, 5, Some(false), 0, &mut rng()).unwrap();
        let last = ymd(2025, 12, 1);

        let equity: Vec<f64> = (0..5).map(|p| table.value(last, p, "equity").unwrap()).collect();
        assert!(equity.windows(2).any(|w| w[0] != w[1]));

        let bonds: Vec<f64> = (0..5).map(|p| table.value(last, p, "bonds").unwrap()).collect();
        assert!(bonds.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_deterministic_aggregate_matches_single_projection() {
        let start = ymd(2024, 1, 1);
        let mut nw = NetWorth::new("wealth", start);
        nw.register(
            CashFlow::builder("wealth", start)
                .start_value(1_000_000.0)
                .growth_rate(1.01)
                .build()
                .unwrap(),
        )
        .unwrap();

        let table = nw.aggregate(ymd(2024, 4, 1), 1, None, 3, &mut rng()).unwrap();
        let totals: Vec<f64> = table.rows().map(|r| r.total).collect();
        assert_eq!(totals.len(), 3);
        assert_relative_eq!(totals[0], 1_000_000.0);
        assert_relative_eq!(totals[1], 1_010_000.0, max_relative = 1e-12);
        assert_relative_eq!(totals[2], 1_020_100.0, max_relative = 1e-12);
    }

    #[test]
    fn test_projection_failure_carries_context() {
        let start = ymd(2024, 1, 1);
        let mut nw = NetWorth::new("wealth", start);
        nw.register(flat("fine", start, ymd(2030, 1, 1), 1.0)).unwrap();
        nw.register(
            CashFlow::builder("runaway", start)
                .start_value(1e300)
                .growth_rate(1e200)
                .build()
                .unwrap(),
        )
        .unwrap();

        let err = nw.aggregate(ymd(2025, 1, 1), 2, None, 0, &mut rng()).unwrap_err();
        match err {
            FinplanError::Projection { cash_flow, horizon, paths, source } => {
                assert_eq!(cash_flow, "runaway");
                assert_eq!(horizon, ymd(2025, 1, 1));
                assert_eq!(paths, 2);
                assert!(matches!(*source, FinplanError::NonFiniteValue { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_verbosity_levels() {
        assert!(!Verbosity::SILENT.allows(Level::Info));
        assert!(Verbosity::SILENT.allows(Level::Warn));
        assert!(Verbosity(1).allows(Level::Info));
        assert!(!Verbosity(1).allows(Level::Debug));
        assert!(Verbosity(2).allows(Level::Debug));
        assert!(Verbosity(5).allows(Level::Trace));
    }

    #[test]
    fn test_container_dates() {
        let nw = NetWorth::new("wealth", ymd(2024, 5, 19)).with_end_date(ymd(2040, 3, 3));
        assert_eq!(nw.name(), "wealth");
        assert_eq!(nw.start_date(), ymd(2024, 5, 1));
        assert_eq!(nw.default_horizon(), ymd(2040, 3, 1));
    }
}
