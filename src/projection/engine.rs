//! Core projector for monthly cash flow values

use log::{debug, trace, warn};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::cashflow::CashFlow;
use crate::error::{FinplanError, FinplanResult};
use super::config::{ProjectionConfig, ValidatedConfig};
use super::rows::{Projection, ProjectionRow};
use super::state::ProjectionState;

/// Source of the monthly growth multiplier
enum GrowthRate {
    Fixed(f64),
    Sampled(Normal<f64>),
}

impl GrowthRate {
    fn for_cash_flow(cash_flow: &CashFlow, stochastic: bool) -> FinplanResult<Self> {
        // Zero volatility samples to the mean anyway, so skip the draws
        if !stochastic || !cash_flow.is_volatile() {
            return Ok(GrowthRate::Fixed(cash_flow.growth_rate_mean()));
        }
        Normal::new(cash_flow.growth_rate_mean(), cash_flow.growth_rate_vol())
            .map(GrowthRate::Sampled)
            .map_err(|e| {
                FinplanError::invalid(format!(
                    "cash flow '{}': cannot sample growth rate: {}",
                    cash_flow.name(),
                    e
                ))
            })
    }

    fn next<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            GrowthRate::Fixed(rate) => *rate,
            GrowthRate::Sampled(normal) => normal.sample(rng),
        }
    }
}

/// Projects a single cash flow month by month
#[derive(Debug, Clone)]
pub struct Projector<'a> {
    cash_flow: &'a CashFlow,
}

impl<'a> Projector<'a> {
    pub fn new(cash_flow: &'a CashFlow) -> Self {
        Self { cash_flow }
    }

    pub fn cash_flow(&self) -> &CashFlow {
        self.cash_flow
    }

    /// Validate `config`, then run every path
    ///
    /// Advisories from validation are logged at `warn` and kept on the result.
    pub fn project<R: Rng + ?Sized>(
        &self,
        config: &ProjectionConfig,
        rng: &mut R,
    ) -> FinplanResult<Projection> {
        let (validated, advisories) = config.validate()?;
        for advisory in &advisories {
            warn!("{}: {}", self.cash_flow.name(), advisory);
        }

        let mut projection = Projection::new(self.cash_flow.name(), validated, advisories);
        self.project_validated(&validated, rng, &mut projection)?;
        Ok(projection)
    }

    /// Run the recurrence for an already validated configuration
    pub(crate) fn project_validated<R: Rng + ?Sized>(
        &self,
        config: &ValidatedConfig,
        rng: &mut R,
        projection: &mut Projection,
    ) -> FinplanResult<()> {
        let cf = self.cash_flow;
        let rate = GrowthRate::for_cash_flow(cf, config.stochastic)?;

        debug!(
            "projecting '{}' from {} to {} (end {}), {} paths, stochastic={}",
            cf.name(),
            cf.start_date(),
            config.horizon,
            cf.end_date(),
            config.paths,
            config.stochastic
        );

        for path in 0..config.paths {
            let mut state = ProjectionState::from_cash_flow(cf);

            while state.date < config.horizon {
                if state.date > cf.end_date() {
                    break;
                }

                let value = state.value();
                if !value.is_finite() {
                    return Err(FinplanError::NonFiniteValue {
                        cash_flow: cf.name().to_string(),
                        date: state.date,
                        path,
                    });
                }
                trace!("{} path {} {}: {:.2}", cf.name(), path, state.date, value);
                projection.add_row(ProjectionRow { date: state.date, value, path });

                state.advance_month(rate.next(rng))?;
            }
        }

        Ok(())
    }
}
