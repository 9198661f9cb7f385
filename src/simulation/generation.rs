//! # Generation-Mix Simulation
//!
//! Produces one five-source generation record per timestamp. Each source
//! starts from its base capacity and is modulated by demand (diurnal curve),
//! weather, season and, for the thermal fleet, outages and price shocks.

use chrono::{DateTime, Datelike, Timelike};
use chrono_tz::Tz;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::trace;
use validator::Validate;

use super::noise::{
    daylight_factor, diurnal_factor, outage_factor, price_shock_factor, seasonal_factor,
    weather_factors, DIURNAL_MAX_FACTOR, DIURNAL_MIN_FACTOR,
};
use crate::domain::GenerationRecord;

/// Generation-mix simulator configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerationMixConfig {
    /// Installed hydro capacity in MW
    #[validate(range(min = 0.0))]
    pub hydro_base_mw: f64,
    /// Installed wind capacity in MW
    #[validate(range(min = 0.0))]
    pub wind_base_mw: f64,
    /// Installed solar capacity in MW
    #[validate(range(min = 0.0))]
    pub solar_base_mw: f64,
    /// Installed nuclear capacity in MW
    #[validate(range(min = 0.0))]
    pub nuclear_base_mw: f64,
    /// Dispatchable fossil capacity in MW
    #[validate(range(min = 0.0))]
    pub fossil_base_mw: f64,
    /// Lower bound of the diurnal demand multiplier
    #[validate(range(min = 0.0))]
    pub diurnal_min_factor: f64,
    /// Upper bound of the diurnal demand multiplier
    #[validate(range(min = 0.0))]
    pub diurnal_max_factor: f64,
    /// Local hour solar output starts
    #[validate(range(min = 0.0, max = 24.0))]
    pub sunrise_hour: f64,
    /// Local hour solar output ends
    #[validate(range(min = 0.0, max = 24.0))]
    pub sunset_hour: f64,
    /// Seasonal swing of solar output around its summer peak (0-1)
    #[validate(range(min = 0.0, max = 1.0))]
    pub solar_seasonal_amplitude: f64,
    /// Seasonal swing of wind output around its winter peak (0-1)
    #[validate(range(min = 0.0, max = 1.0))]
    pub wind_seasonal_amplitude: f64,
    /// Seasonal swing of hydro output around the spring melt (0-1)
    #[validate(range(min = 0.0, max = 1.0))]
    pub hydro_seasonal_amplitude: f64,
    /// Random seed for reproducibility (None = random)
    pub random_seed: Option<u64>,
}

impl Default for GenerationMixConfig {
    fn default() -> Self {
        Self {
            hydro_base_mw: 1200.0,
            wind_base_mw: 900.0,
            solar_base_mw: 700.0,
            nuclear_base_mw: 1500.0,
            fossil_base_mw: 1600.0,
            diurnal_min_factor: DIURNAL_MIN_FACTOR,
            diurnal_max_factor: DIURNAL_MAX_FACTOR,
            sunrise_hour: 6.0,
            sunset_hour: 20.0,
            solar_seasonal_amplitude: 0.35,
            wind_seasonal_amplitude: 0.2,
            hydro_seasonal_amplitude: 0.15,
            random_seed: None,
        }
    }
}

/// Day of year of the summer solstice (solar peak)
const SOLAR_PEAK_DAY: u32 = 172;
/// Mid-January, the windiest stretch of the year
const WIND_PEAK_DAY: u32 = 15;
/// Mid-May snow melt
const HYDRO_PEAK_DAY: u32 = 135;

/// Simulates the generation mix of the grid
pub struct GenerationMixSimulator {
    config: GenerationMixConfig,
    rng: StdRng,
}

impl GenerationMixSimulator {
    /// Create a new simulator; seeded from `config.random_seed` when set
    pub fn new(config: GenerationMixConfig) -> Self {
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { config, rng }
    }

    /// Create a simulator driven by an existing RNG handle
    pub fn with_rng(config: GenerationMixConfig, rng: StdRng) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &GenerationMixConfig {
        &self.config
    }

    /// Simulate the generation mix at `timestamp` (local time drives the
    /// diurnal and daylight curves).
    pub fn simulate(&mut self, timestamp: DateTime<Tz>) -> GenerationRecord {
        let cfg = &self.config;
        let hour = timestamp.hour() as f64 + timestamp.minute() as f64 / 60.0;
        let day_of_year = timestamp.ordinal();

        let demand = diurnal_factor(hour, cfg.diurnal_min_factor, cfg.diurnal_max_factor);
        let weather = weather_factors(&mut self.rng);
        let nuclear_outage = outage_factor(&mut self.rng);
        let fossil_outage = outage_factor(&mut self.rng);
        let price_shock = price_shock_factor(&mut self.rng);

        let hydro_mw = cfg.hydro_base_mw
            * weather.hydro
            * demand
            * seasonal_factor(day_of_year, HYDRO_PEAK_DAY, cfg.hydro_seasonal_amplitude);
        let wind_mw = cfg.wind_base_mw
            * weather.wind
            * seasonal_factor(day_of_year, WIND_PEAK_DAY, cfg.wind_seasonal_amplitude);
        let solar_mw = cfg.solar_base_mw
            * weather.solar
            * daylight_factor(hour, cfg.sunrise_hour, cfg.sunset_hour)
            * seasonal_factor(day_of_year, SOLAR_PEAK_DAY, cfg.solar_seasonal_amplitude);
        let nuclear_mw = cfg.nuclear_base_mw * nuclear_outage;
        let fossil_mw = cfg.fossil_base_mw * demand * fossil_outage * price_shock;

        let record = GenerationRecord::from_sources(
            timestamp.fixed_offset(),
            hydro_mw,
            wind_mw,
            solar_mw,
            nuclear_mw,
            fossil_mw,
        );

        trace!(
            timestamp = %record.timestamp(),
            total_mw = record.total_mw(),
            renewable_share_pct = record.renewable_share_pct(),
            "simulated generation mix"
        );

        record
    }
}
