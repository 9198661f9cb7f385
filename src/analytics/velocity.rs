//! Decarbonization velocity: observed intensity trend versus the trend needed
//! to reach the terminal net-zero target.

use chrono::{DateTime, Duration, FixedOffset};

use super::rai::required_intensity;
use super::series::{start_of_year, years_between};
use super::stats::linear_fit;
use super::{GoalTrackerConfig, KpiError};
use crate::domain::{Co2Record, NetZeroRecord, Velocity};

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `co2` and `netzero` must be sorted.
pub fn decarbonization_velocity(
    co2: &[Co2Record],
    netzero: &[NetZeroRecord],
    as_of: DateTime<FixedOffset>,
    config: &GoalTrackerConfig,
) -> Result<Velocity, KpiError> {
    let latest = co2
        .last()
        .ok_or_else(|| KpiError::insufficient("velocity window", config.velocity_min_points, 0))?;

    let window_start = Duration::try_hours(i64::from(config.velocity_window_hours))
        .and_then(|window| latest.timestamp.checked_sub_signed(window))
        .ok_or_else(|| {
            KpiError::Input(format!(
                "velocity window of {} h reaches outside the representable time range",
                config.velocity_window_hours
            ))
        })?;
    let recent: Vec<&Co2Record> = co2
        .iter()
        .filter(|r| r.timestamp >= window_start && r.co2_intensity_g_per_kwh.is_finite())
        .collect();
    if recent.len() < config.velocity_min_points {
        return Err(KpiError::insufficient(
            "velocity window",
            config.velocity_min_points,
            recent.len(),
        ));
    }

    let origin = recent[0].timestamp;
    let xs: Vec<f64> = recent.iter().map(|r| years_between(origin, r.timestamp)).collect();
    let ys: Vec<f64> = recent.iter().map(|r| r.co2_intensity_g_per_kwh).collect();
    let v_actual = linear_fit(&xs, &ys)?.slope;

    let terminal = netzero
        .last()
        .ok_or_else(|| KpiError::insufficient("net-zero trajectory", 1, 0))?;
    let terminal_required = required_intensity(netzero, terminal.year() as f64, config)?;
    let years_left = years_between(as_of, start_of_year(terminal.year(), &as_of)?);
    if years_left <= config.epsilon {
        return Err(KpiError::degenerate(format!(
            "terminal target year {} has already started",
            terminal.year()
        )));
    }

    let current = recent[recent.len() - 1].co2_intensity_g_per_kwh;
    let v_required = (terminal_required - current) / years_left;

    let on_track = if v_required < 0.0 {
        v_actual <= 0.0 && v_actual.abs() >= v_required.abs()
    } else {
        v_actual <= v_required
    };

    Ok(Velocity {
        on_track,
        v_actual_g_per_kwh_per_yr: round2(v_actual),
        v_required_g_per_kwh_per_yr: round2(v_required),
    })
}
