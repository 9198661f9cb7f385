//! Time-series helpers: ordering, CO2/mix alignment and calendar arithmetic.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone};
use itertools::{EitherOrBoth, Itertools};

use super::KpiError;
use crate::domain::{Co2Record, GenerationRecord, NetZeroRecord};

pub const SECONDS_PER_DAY: f64 = 86_400.0;
pub const SECONDS_PER_YEAR: f64 = 365.25 * SECONDS_PER_DAY;

/// A CO2 observation joined with the generation record of the same instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedPoint {
    pub timestamp: DateTime<FixedOffset>,
    pub co2_intensity_g_per_kwh: f64,
    pub total_mw: f64,
    pub renewable_share_pct: f64,
}

pub fn sorted_co2(co2: &[Co2Record]) -> Vec<Co2Record> {
    let mut out = co2.to_vec();
    out.sort_by_key(|r| r.timestamp);
    out
}

pub fn sorted_mix(mix: &[GenerationRecord]) -> Vec<GenerationRecord> {
    let mut out = mix.to_vec();
    out.sort_by_key(|r| r.timestamp());
    out
}

pub fn sorted_netzero(netzero: &[NetZeroRecord]) -> Vec<NetZeroRecord> {
    let mut out = netzero.to_vec();
    out.sort_by_key(|r| r.year());
    out
}

/// Inner join of two ascending series on exact instants
pub fn align(co2: &[Co2Record], mix: &[GenerationRecord]) -> Vec<AlignedPoint> {
    co2.iter()
        .merge_join_by(mix.iter(), |c, m| c.timestamp.cmp(&m.timestamp()))
        .filter_map(|pair| match pair {
            EitherOrBoth::Both(c, m) => Some(AlignedPoint {
                timestamp: c.timestamp,
                co2_intensity_g_per_kwh: c.co2_intensity_g_per_kwh,
                total_mw: m.total_mw(),
                renewable_share_pct: m.renewable_share_pct(),
            }),
            _ => None,
        })
        .collect()
}

/// Elapsed time in (Julian) years
pub fn years_between(from: DateTime<FixedOffset>, to: DateTime<FixedOffset>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0 / SECONDS_PER_YEAR
}

pub fn days_between(from: DateTime<FixedOffset>, to: DateTime<FixedOffset>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY
}

/// Midnight on January 1st of `year`, in the offset of `reference`
pub fn start_of_year(
    year: i32,
    reference: &DateTime<FixedOffset>,
) -> Result<DateTime<FixedOffset>, KpiError> {
    let naive = NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| KpiError::Unclassified(format!("cannot build January 1st of {year}")))?;
    reference
        .offset()
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| KpiError::Unclassified(format!("ambiguous start of year {year}")))
}

/// Calendar year of `at` plus the elapsed fraction of that year
pub fn fractional_year(at: &DateTime<FixedOffset>) -> Result<f64, KpiError> {
    let year = at.year();
    let start = start_of_year(year, at)?;
    let end = start_of_year(year + 1, at)?;
    let fraction = (*at - start).num_seconds() as f64 / (end - start).num_seconds() as f64;
    Ok(year as f64 + fraction.clamp(0.0, 1.0))
}
