//! Year-to-date carbon budget.
//!
//! Emissions are integrated over the aligned CO2/mix series of the current
//! calendar year and extrapolated back to January 1st at the observed daily
//! rate. The budget is the current-year target pro-rated by elapsed time.

use chrono::{DateTime, Datelike, FixedOffset};

use super::series::{days_between, start_of_year, AlignedPoint};
use super::{GoalTrackerConfig, KpiError};
use crate::domain::{CarbonBudget, NetZeroRecord};

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn carbon_budget(
    aligned: &[AlignedPoint],
    netzero: &[NetZeroRecord],
    as_of: DateTime<FixedOffset>,
    config: &GoalTrackerConfig,
) -> Result<CarbonBudget, KpiError> {
    let year = as_of.year();
    let year_start = start_of_year(year, &as_of)?;
    let year_end = start_of_year(year + 1, &as_of)?;

    let target = netzero
        .iter()
        .find(|r| r.year() == year)
        .ok_or_else(|| KpiError::insufficient("current-year net-zero target", 1, 0))?;

    let points: Vec<&AlignedPoint> = aligned
        .iter()
        .filter(|p| p.timestamp >= year_start && p.timestamp <= as_of)
        .collect();
    if points.len() < 2 {
        return Err(KpiError::insufficient("budget emissions series", 2, points.len()));
    }

    // hours covered by each point: gap to the next, the last repeats the previous gap
    let mut spans: Vec<f64> = points
        .windows(2)
        .map(|w| days_between(w[0].timestamp, w[1].timestamp) * 24.0)
        .collect();
    let last_span = spans.last().copied().unwrap_or(0.0);
    spans.push(last_span);

    let mut observed_tons = 0.0;
    for (p, hours) in points.iter().zip(&spans) {
        let tons = p.total_mw * hours * p.co2_intensity_g_per_kwh / 1000.0;
        if !tons.is_finite() {
            return Err(KpiError::Input(format!(
                "non-finite emissions at {}",
                p.timestamp
            )));
        }
        observed_tons += tons;
    }

    let observed_days = spans.iter().sum::<f64>() / 24.0;
    if observed_days <= config.epsilon {
        return Err(KpiError::degenerate("budget series spans no time"));
    }
    let daily_rate = observed_tons / observed_days;
    if daily_rate <= config.epsilon {
        return Err(KpiError::degenerate("daily emission rate is zero"));
    }

    let unobserved_days = days_between(year_start, points[0].timestamp).max(0.0);
    let ytd_tons = observed_tons + daily_rate * unobserved_days;

    let elapsed = (days_between(year_start, as_of) / days_between(year_start, year_end)).clamp(0.0, 1.0);
    let ytd_budget_tons = target.target_emissions_mt() * config.tons_per_target_unit * elapsed;

    Ok(CarbonBudget {
        ytd_tons: round_to(ytd_tons, 0),
        ytd_budget_tons: round_to(ytd_budget_tons, 0),
        days_ahead: round_to((ytd_budget_tons - ytd_tons) / daily_rate, 1),
    })
}
