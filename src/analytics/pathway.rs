//! Net-zero pathway: the target series plus an estimated year in which
//! emissions reach (near) zero at the current rate of decline.

use chrono::{DateTime, Datelike, FixedOffset};

use super::stats::linear_fit;
use super::{GoalTrackerConfig, KpiError};
use crate::domain::{NetZeroRecord, Pathway, PathwayPoint, Velocity};

/// Record the ETA is projected from: the current year, else the latest year
/// before it, else the earliest available.
fn anchor_record(netzero: &[NetZeroRecord], current_year: i32) -> Option<&NetZeroRecord> {
    netzero
        .iter()
        .find(|r| r.year() == current_year)
        .or_else(|| netzero.iter().rev().find(|r| r.year() <= current_year))
        .or_else(|| netzero.first())
}

/// Annual change in actual emissions (Mt/yr) from the trajectory itself
fn trajectory_slope(netzero: &[NetZeroRecord]) -> Option<f64> {
    let xs: Vec<f64> = netzero.iter().map(|r| r.year() as f64).collect();
    let ys: Vec<f64> = netzero.iter().map(|r| r.actual_emissions_mt()).collect();
    linear_fit(&xs, &ys).ok().map(|fit| fit.slope)
}

/// `netzero` must be sorted. `velocity` and `latest_intensity` are used to
/// derive a decline rate when the trajectory itself is not falling.
pub fn net_zero_pathway(
    netzero: &[NetZeroRecord],
    velocity: Option<&Velocity>,
    latest_intensity: Option<f64>,
    as_of: DateTime<FixedOffset>,
    config: &GoalTrackerConfig,
) -> Result<Pathway, KpiError> {
    let current_year = as_of.year();
    let anchor = anchor_record(netzero, current_year)
        .ok_or_else(|| KpiError::insufficient("net-zero trajectory", 1, 0))?;

    let series = netzero
        .iter()
        .map(|r| PathwayPoint {
            year: r.year(),
            target_emissions_mt: r.target_emissions_mt(),
        })
        .collect();

    let e0 = anchor.actual_emissions_mt();
    if !e0.is_finite() {
        return Err(KpiError::Input(format!(
            "actual emissions for {} are not finite",
            anchor.year()
        )));
    }

    let from_intensity = match (velocity, latest_intensity) {
        (Some(v), Some(intensity)) if intensity > config.epsilon => {
            Some(e0 * v.v_actual_g_per_kwh_per_yr / intensity)
        }
        _ => None,
    };
    let slope = [trajectory_slope(netzero), from_intensity]
        .into_iter()
        .flatten()
        .find(|s| s.is_finite() && *s < 0.0);

    let eta_year = if e0 <= config.near_zero_emissions_mt {
        Some(current_year)
    } else {
        slope.and_then(|s| {
            let years = ((e0 - config.near_zero_emissions_mt) / s.abs()).ceil();
            let eta = current_year as f64 + years;
            (eta <= config.max_eta_year as f64).then_some(eta as i32)
        })
    };

    Ok(Pathway { eta_year, series })
}
