//! Budget burn-rate extrapolation.

use crate::BudgetForecast;

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetInputs {
    pub budget_total: f64,
    pub spent_to_date: f64,
    /// Periods elapsed since project start.
    pub elapsed_periods: f64,
    /// Periods of scheduled work still ahead.
    pub remaining_periods: f64,
}

/// Extrapolate the burn rate against the remaining duration.
///
/// With nothing elapsed yet there is no rate to extrapolate; the projection
/// then equals the spend so far.
pub fn budget_forecast(inputs: &BudgetInputs) -> BudgetForecast {
    let burn_rate = if inputs.elapsed_periods > 0.0 {
        inputs.spent_to_date / inputs.elapsed_periods
    } else {
        0.0
    };
    let projected_total = inputs.spent_to_date + burn_rate * inputs.remaining_periods.max(0.0);
    let overrun_amount = (projected_total - inputs.budget_total).max(0.0);

    BudgetForecast {
        burn_rate,
        projected_total,
        budget_total: inputs.budget_total,
        overrun: overrun_amount > 0.0,
        overrun_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn steady_burn_within_budget_is_not_flagged() {
        let forecast = budget_forecast(&BudgetInputs {
            budget_total: 100_000.0,
            spent_to_date: 40_000.0,
            elapsed_periods: 4.0,
            remaining_periods: 5.0,
        });

        assert_eq!(forecast.burn_rate, 10_000.0);
        assert_eq!(forecast.projected_total, 90_000.0);
        assert!(!forecast.overrun);
        assert_eq!(forecast.overrun_amount, 0.0);
    }

    #[test]
    fn overrun_is_flagged_with_magnitude() {
        let forecast = budget_forecast(&BudgetInputs {
            budget_total: 100_000.0,
            spent_to_date: 60_000.0,
            elapsed_periods: 4.0,
            remaining_periods: 4.0,
        });

        assert!(forecast.overrun);
        assert_eq!(forecast.projected_total, 120_000.0);
        assert_eq!(forecast.overrun_amount, 20_000.0);
    }

    #[test]
    fn nothing_elapsed_projects_only_current_spend() {
        let forecast = budget_forecast(&BudgetInputs {
            budget_total: 50_000.0,
            spent_to_date: 5_000.0,
            elapsed_periods: 0.0,
            remaining_periods: 10.0,
        });

        assert_eq!(forecast.burn_rate, 0.0);
        assert_eq!(forecast.projected_total, 5_000.0);
        assert!(!forecast.overrun);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: the projection never falls below the spend so far, and
        /// the overrun flag agrees with the reported magnitude.
        #[test]
        fn projection_is_consistent(
            budget_total in 0.0f64..1e6,
            spent_to_date in 0.0f64..1e6,
            elapsed_periods in 0.0f64..50.0,
            remaining_periods in 0.0f64..50.0,
        ) {
            let forecast = budget_forecast(&BudgetInputs {
                budget_total,
                spent_to_date,
                elapsed_periods,
                remaining_periods,
            });

            prop_assert!(forecast.projected_total >= spent_to_date);
            prop_assert!(forecast.overrun_amount >= 0.0);
            prop_assert_eq!(forecast.overrun, forecast.overrun_amount > 0.0);
        }
    }
}
