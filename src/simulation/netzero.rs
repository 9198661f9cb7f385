//! # Net-Zero Alignment Simulation
//!
//! Annual emissions target on a straight-line reduction path, with an
//! "actual" figure scattered uniformly around it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::NetZeroRecord;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NetZeroConfig {
    /// Emissions target in the start year (Mt)
    #[validate(range(min = 0.0, max = 1_000_000.0))]
    pub base_emissions_mt: f64,
    /// Linear reduction per year as a fraction of the base (0.08 = 8%)
    #[validate(range(min = 0.0, max = 1.0))]
    pub annual_reduction: f64,
    /// Half-width of the uniform scatter of actual emissions (Mt)
    #[validate(range(min = 0.0, max = 1_000.0))]
    pub actual_noise_mt: f64,
    /// First year of the trajectory; None means the current year
    pub start_year: Option<i32>,
    pub random_seed: Option<u64>,
}

impl Default for NetZeroConfig {
    fn default() -> Self {
        Self {
            base_emissions_mt: 100.0,
            annual_reduction: 0.08,
            actual_noise_mt: 3.0,
            start_year: None,
            random_seed: None,
        }
    }
}

pub struct NetZeroSimulator {
    config: NetZeroConfig,
    start_year: i32,
    rng: StdRng,
}

impl NetZeroSimulator {
    /// `start_year` is used when the configuration leaves it unset
    pub fn new(config: NetZeroConfig, start_year: i32) -> Self {
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, start_year, rng)
    }

    pub fn with_rng(config: NetZeroConfig, start_year: i32, rng: StdRng) -> Self {
        let start_year = config.start_year.unwrap_or(start_year);
        Self {
            config,
            start_year,
            rng,
        }
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    /// Deterministic target for `year`, floored at zero
    pub fn target_for(&self, year: i32) -> f64 {
        let base = self.config.base_emissions_mt;
        let elapsed = (i64::from(year) - i64::from(self.start_year)) as f64;
        (base - self.config.annual_reduction * base * elapsed).max(0.0)
    }

    pub fn simulate(&mut self, year: i32) -> NetZeroRecord {
        let target = self.target_for(year);
        let spread = self.config.actual_noise_mt;
        // unvalidated configs may carry inf/NaN; no scatter then
        let noise = if spread > 0.0 && spread.is_finite() {
            self.rng.gen_range(-spread..=spread)
        } else {
            0.0
        };
        NetZeroRecord::new(year, target + noise, target)
    }

    /// `years` consecutive records starting at the start year, stopping
    /// early at `i32::MAX`
    pub fn horizon(&mut self, years: u32) -> Vec<NetZeroRecord> {
        let start = self.start_year;
        let span: Vec<i32> = (0..years)
            .map_while(|offset| i32::try_from(offset).ok().and_then(|o| start.checked_add(o)))
            .collect();
        span.into_iter().map(|year| self.simulate(year)).collect()
    }
}
