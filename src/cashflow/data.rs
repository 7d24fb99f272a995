//! Cash flow definition

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates::{far_future, month_start};
use crate::error::{FinplanError, FinplanResult};

/// A named stream of value with a starting balance, a recurring monthly
/// contribution and a monthly growth rate
///
/// Fields are private so that the name stays fixed and both dates stay
/// truncated to the first of their month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashFlow {
    name: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    start_value: f64,
    monthly_value: f64,
    growth_rate_mean: f64,
    growth_rate_vol: f64,
}

impl CashFlow {
    /// Start building a cash flow; everything except name and start date has a default
    pub fn builder(name: impl Into<String>, start_date: NaiveDate) -> CashFlowBuilder {
        CashFlowBuilder {
            name: name.into(),
            start_date,
            end_date: None,
            start_value: 0.0,
            monthly_value: 0.0,
            growth_rate_mean: 1.0,
            growth_rate_vol: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// First month of the projection (inclusive)
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Last month of the projection (inclusive)
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn start_value(&self) -> f64 {
        self.start_value
    }

    pub fn monthly_value(&self) -> f64 {
        self.monthly_value
    }

    /// Mean monthly growth multiplier (1.0 = flat)
    pub fn growth_rate_mean(&self) -> f64 {
        self.growth_rate_mean
    }

    /// Standard deviation of the monthly growth multiplier
    pub fn growth_rate_vol(&self) -> f64 {
        self.growth_rate_vol
    }

    /// True when stochastic sampling would actually vary the rate
    pub fn is_volatile(&self) -> bool {
        self.growth_rate_vol > 0.0
    }
}

/// Builder for [`CashFlow`]
#[derive(Debug, Clone)]
pub struct CashFlowBuilder {
    name: String,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    start_value: f64,
    monthly_value: f64,
    growth_rate_mean: f64,
    growth_rate_vol: f64,
}

impl CashFlowBuilder {
    /// Last month that still produces a value (defaults to 2050-01-01)
    pub fn end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Balance at the start date
    pub fn start_value(mut self, value: f64) -> Self {
        self.start_value = value;
        self
    }

    /// Recurring amount added each month (negative for expenses)
    pub fn monthly_value(mut self, value: f64) -> Self {
        self.monthly_value = value;
        self
    }

    /// Fixed monthly growth multiplier, e.g. `1.0 + 0.05 / 12.0`
    pub fn growth_rate(mut self, mean: f64) -> Self {
        self.growth_rate_mean = mean;
        self
    }

    /// Standard deviation of the monthly growth multiplier
    pub fn volatility(mut self, vol: f64) -> Self {
        self.growth_rate_vol = vol;
        self
    }

    pub fn build(self) -> FinplanResult<CashFlow> {
        if self.name.trim().is_empty() {
            return Err(FinplanError::invalid("cash flow name must not be empty"));
        }

        let numeric = [
            ("start_value", self.start_value),
            ("monthly_value", self.monthly_value),
            ("growth_rate_mean", self.growth_rate_mean),
            ("growth_rate_vol", self.growth_rate_vol),
        ];
        for (field, value) in numeric {
            if !value.is_finite() {
                return Err(FinplanError::invalid(format!(
                    "cash flow '{}': {} must be finite, got {}",
                    self.name, field, value
                )));
            }
        }

        if self.growth_rate_vol < 0.0 {
            return Err(FinplanError::invalid(format!(
                "cash flow '{}': growth_rate_vol must be >= 0, got {}",
                self.name, self.growth_rate_vol
            )));
        }

        Ok(CashFlow {
            start_date: month_start(self.start_date),
            end_date: month_start(self.end_date.unwrap_or_else(far_future)),
            name: self.name,
            start_value: self.start_value,
            monthly_value: self.monthly_value,
            growth_rate_mean: self.growth_rate_mean,
            growth_rate_vol: self.growth_rate_vol,
        })
    }
}

/// Convert an annual rate to a monthly growth multiplier (`0.05` -> `1.0041666...`)
pub fn annual_to_monthly_rate(annual_rate: f64) -> f64 {
    1.0 + annual_rate / 12.0
}
