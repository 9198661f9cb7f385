//! # Noise & Bias Library
//!
//! Stochastic primitives shared by the generation-mix and CO2 simulators.
//! Every function that draws randomness takes the caller's RNG handle, so a
//! seeded simulator stays reproducible and no state is shared between
//! simulation contexts.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

/// Hour of peak demand
pub const DIURNAL_PEAK_HOUR: f64 = 19.0;
pub const DIURNAL_MIN_FACTOR: f64 = 0.8;
pub const DIURNAL_MAX_FACTOR: f64 = 1.2;

/// Probability of a planned outage per sample, and its output factor
pub const OUTAGE_PROBABILITY: f64 = 0.02;
pub const OUTAGE_FACTOR: f64 = 0.7;

/// Probability of a fossil price shock per sample, and its output factor
pub const PRICE_SHOCK_PROBABILITY: f64 = 0.01;
pub const PRICE_SHOCK_FACTOR: f64 = 0.8;

/// Renewable share (%) at or above which intensity sits at the low end
pub const CO2_CLEAN_SHARE_PCT: f64 = 60.0;
/// Width of the share range (%) over which intensity climbs to the high end
pub const CO2_SHARE_SPAN_PCT: f64 = 30.0;
pub const CO2_NOISE_STD_DEV: f64 = 10.0;

const DAYS_PER_YEAR: f64 = 365.25;

/// Normal draw clamped to `[lower, upper]`.
///
/// Degenerate parameters (non-finite mean, negative or non-finite standard
/// deviation) are not rejected: the mean itself is clamped and returned.
pub fn bounded_normal<R: Rng + ?Sized>(
    rng: &mut R,
    mean: f64,
    std_dev: f64,
    lower: f64,
    upper: f64,
) -> f64 {
    let (lower, upper) = if lower <= upper {
        (lower, upper)
    } else {
        (upper, lower)
    };

    let value = match Normal::new(mean, std_dev) {
        Ok(normal) if mean.is_finite() => normal.sample(rng),
        _ => {
            debug!(mean, std_dev, "degenerate normal parameters, using mean");
            if mean.is_finite() {
                mean
            } else {
                lower
            }
        }
    };

    value.clamp(lower, upper)
}

/// Demand-shaped multiplier peaking at 19:00.
///
/// `min_factor + (max_factor - min_factor) * (cos(((hour - 19) mod 24) / 24 * 2π) + 1) / 2`
///
/// Fractional hours are accepted.
pub fn diurnal_factor(hour: f64, min_factor: f64, max_factor: f64) -> f64 {
    let phase = (hour - DIURNAL_PEAK_HOUR).rem_euclid(24.0);
    let cos_val = ((phase / 24.0 * 2.0 * PI).cos() + 1.0) / 2.0;
    min_factor + (max_factor - min_factor) * cos_val
}

/// Half-sine daylight curve: 0 outside `[sunrise, sunset]`, 1 at solar noon.
pub fn daylight_factor(hour: f64, sunrise: f64, sunset: f64) -> f64 {
    if hour <= sunrise || hour >= sunset {
        return 0.0;
    }
    let day_len = (sunset - sunrise).max(0.01);
    let x = (hour - sunrise) / day_len;
    (PI * x).sin().max(0.0)
}

/// Seasonal multiplier `1 + amplitude * cos(2π (day - peak_day) / 365.25)`.
pub fn seasonal_factor(day_of_year: u32, peak_day: u32, amplitude: f64) -> f64 {
    let delta = day_of_year as f64 - peak_day as f64;
    1.0 + amplitude * (2.0 * PI * delta / DAYS_PER_YEAR).cos()
}

/// Weather-driven multipliers for the variable renewables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherFactors {
    pub wind: f64,
    pub solar: f64,
    pub hydro: f64,
}

/// Independent weather draws: wind [0.5, 1.5] σ 0.2, solar [0.2, 1.6] σ 0.25,
/// hydro [0.8, 1.2] σ 0.05, all centred on 1.0.
pub fn weather_factors<R: Rng + ?Sized>(rng: &mut R) -> WeatherFactors {
    let wind = bounded_normal(rng, 1.0, 0.2, 0.5, 1.5);
    let solar = bounded_normal(rng, 1.0, 0.25, 0.2, 1.6);
    let hydro = bounded_normal(rng, 1.0, 0.05, 0.8, 1.2);
    WeatherFactors { wind, solar, hydro }
}

/// Occasional planned outage or maintenance reduction
pub fn outage_factor<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    if rng.gen_bool(OUTAGE_PROBABILITY) {
        OUTAGE_FACTOR
    } else {
        1.0
    }
}

/// Rare fossil output cut caused by a fuel price or CO2 cost spike
pub fn price_shock_factor<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    if rng.gen_bool(PRICE_SHOCK_PROBABILITY) {
        PRICE_SHOCK_FACTOR
    } else {
        1.0
    }
}

/// Intensity range used by the renewable-share mapping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Co2Band {
    /// Intensity at high renewable share (g/kWh)
    pub low_g_per_kwh: f64,
    /// Intensity at low renewable share (g/kWh)
    pub high_g_per_kwh: f64,
    /// Hard floor applied after noise
    pub floor_g_per_kwh: f64,
    /// Hard ceiling applied after noise
    pub ceiling_g_per_kwh: f64,
}

impl Default for Co2Band {
    fn default() -> Self {
        Self {
            low_g_per_kwh: 100.0,
            high_g_per_kwh: 300.0,
            floor_g_per_kwh: 50.0,
            ceiling_g_per_kwh: 300.0,
        }
    }
}

impl Co2Band {
    pub fn contains(&self, value: f64) -> bool {
        (self.floor_g_per_kwh..=self.ceiling_g_per_kwh).contains(&value)
    }
}

/// Noise-free intensity for a renewable share: linear between the band's
/// high end at 30% share and its low end at 60% share.
pub fn base_intensity_for_share(renewable_share_pct: f64, band: &Co2Band) -> f64 {
    let norm = if renewable_share_pct.is_finite() {
        ((CO2_CLEAN_SHARE_PCT - renewable_share_pct) / CO2_SHARE_SPAN_PCT).clamp(0.0, 1.0)
    } else {
        1.0
    };
    band.low_g_per_kwh + norm * (band.high_g_per_kwh - band.low_g_per_kwh)
}

/// Map renewable share to CO2 intensity with noise. Higher share gives lower
/// intensity; the result always lies within the band's floor and ceiling.
pub fn co2_from_renewable_share<R: Rng + ?Sized>(
    rng: &mut R,
    renewable_share_pct: f64,
    band: &Co2Band,
) -> f64 {
    let base = base_intensity_for_share(renewable_share_pct, band);
    bounded_normal(
        rng,
        base,
        CO2_NOISE_STD_DEV,
        band.floor_g_per_kwh,
        band.ceiling_g_per_kwh,
    )
}
