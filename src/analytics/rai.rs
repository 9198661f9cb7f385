//! Real-time alignment index: latest intensity against the intensity the
//! net-zero trajectory requires right now.

use chrono::{DateTime, FixedOffset};

use super::series::fractional_year;
use super::{GoalTrackerConfig, KpiError};
use crate::domain::{Co2Record, NetZeroRecord};

/// Target emissions at a fractional year, linearly interpolated between the
/// bracketing records and held flat beyond either end. `netzero` must be
/// sorted by year.
pub fn interpolate_target(netzero: &[NetZeroRecord], at_year: f64) -> Option<f64> {
    let first = netzero.first()?;
    let last = netzero.last()?;

    if at_year <= first.year() as f64 {
        return Some(first.target_emissions_mt());
    }
    if at_year >= last.year() as f64 {
        return Some(last.target_emissions_mt());
    }

    netzero
        .windows(2)
        .find(|w| (w[0].year() as f64) <= at_year && at_year < w[1].year() as f64)
        .map(|w| {
            let span = (w[1].year() - w[0].year()) as f64;
            let t = (at_year - w[0].year() as f64) / span;
            w[0].target_emissions_mt() + t * (w[1].target_emissions_mt() - w[0].target_emissions_mt())
        })
}

/// Intensity (g/kWh) the trajectory requires at `at_year`: the baseline
/// intensity scaled by target(at_year) / target(first year).
pub fn required_intensity(
    netzero: &[NetZeroRecord],
    at_year: f64,
    config: &GoalTrackerConfig,
) -> Result<f64, KpiError> {
    let first = netzero
        .first()
        .ok_or_else(|| KpiError::insufficient("net-zero trajectory", 1, 0))?;
    if first.target_emissions_mt() <= config.epsilon {
        return Err(KpiError::degenerate("base-year emissions target is zero"));
    }
    let target = interpolate_target(netzero, at_year)
        .ok_or_else(|| KpiError::insufficient("net-zero trajectory", 1, 0))?;

    Ok(config.baseline_intensity_g_per_kwh * target / first.target_emissions_mt())
}

/// RAI in percent, clamped to [0, 100]. `co2` and `netzero` must be sorted.
pub fn real_time_alignment_index(
    co2: &[Co2Record],
    netzero: &[NetZeroRecord],
    as_of: DateTime<FixedOffset>,
    config: &GoalTrackerConfig,
) -> Result<f64, KpiError> {
    let latest = co2
        .last()
        .ok_or_else(|| KpiError::insufficient("CO2 intensity series", 1, 0))?;
    let current = latest.co2_intensity_g_per_kwh;
    if !current.is_finite() || current < 0.0 {
        return Err(KpiError::Input(format!("latest intensity {current} is not a valid reading")));
    }
    if current <= config.epsilon {
        return Err(KpiError::degenerate("latest intensity is zero"));
    }

    let required = required_intensity(netzero, fractional_year(&as_of)?, config)?;
    Ok((100.0 * required / current).clamp(0.0, 100.0))
}
