//! Per-path recurrence state

use chrono::NaiveDate;

use crate::cashflow::CashFlow;
use crate::dates::next_month;
use crate::error::FinplanResult;

/// State of one cash flow on one path at the start of a month
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Current month (always the first of the month)
    pub date: NaiveDate,

    /// Compounded starting balance
    pub growth_value: f64,

    /// Compounded recurring contribution
    pub contribution: f64,
}

impl ProjectionState {
    /// Initialize state at the cash flow's start date
    pub fn from_cash_flow(cash_flow: &CashFlow) -> Self {
        Self {
            date: cash_flow.start_date(),
            growth_value: cash_flow.start_value(),
            contribution: cash_flow.monthly_value(),
        }
    }

    /// Value reported for the current month
    pub fn value(&self) -> f64 {
        self.growth_value + self.contribution
    }

    /// Apply this month's realized rate and move to the next month
    ///
    /// Balance and contribution compound at the same rate.
    pub fn advance_month(&mut self, rate: f64) -> FinplanResult<()> {
        self.growth_value *= rate;
        self.contribution *= rate;
        self.date = next_month(self.date)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_advance_compounds_both_components() {
        let cf = CashFlow::builder("income", NaiveDate::from_ymd_opt(2024, 12, 1).unwrap())
            .start_value(100.0)
            .monthly_value(10.0)
            .build()
            .unwrap();
        let mut state = ProjectionState::from_cash_flow(&cf);
        assert_eq!(state.value(), 110.0);

        state.advance_month(1.1).unwrap();
        assert_eq!(state.date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_relative_eq!(state.growth_value, 110.0, epsilon = 1e-9);
        assert_relative_eq!(state.contribution, 11.0, epsilon = 1e-9);
        assert_relative_eq!(state.value(), 121.0, epsilon = 1e-9);
    }
}
