//! # Grid Environment Orchestrator
//!
//! Owns one seeded context per simulator and runs the per-timestamp pipeline
//! (generation mix, then CO2 intensity from that mix) over timestamp windows.

use chrono::{DateTime, Datelike, Duration, Utc};
use chrono_tz::Tz;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;
use validator::Validate;

use super::noise::Co2Band;
use super::{
    Co2IntensitySimulator, GenerationMixConfig, GenerationMixSimulator, NetZeroConfig,
    NetZeroSimulator,
};
use crate::domain::{Co2Record, GenerationRecord, NetZeroRecord};

/// What the host does with generated data. The simulators and the goal
/// tracker never look at this flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutputMode {
    #[default]
    None,
    Json,
}

/// Simulation context configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SimulatorConfig {
    /// IANA timezone of the grid, e.g. "Europe/Stockholm"
    pub timezone: String,
    pub output_mode: OutputMode,
    /// Master seed; each simulator derives its own seed from it
    pub seed: Option<u64>,
    /// Spacing between samples in minutes
    #[validate(range(min = 1, max = 1440))]
    pub step_minutes: u32,
    /// Samples in the live window (96 x 15 min = 24 h)
    #[validate(range(min = 1, max = 10_000))]
    pub live_points: usize,
    /// Samples in the analytics window (720 x 15 min = 7.5 days)
    #[validate(range(min = 1, max = 100_000))]
    pub analytics_points: usize,
    /// Years in the net-zero horizon
    #[validate(range(min = 1, max = 100))]
    pub netzero_years: u32,
    #[validate(nested)]
    pub generation: GenerationMixConfig,
    pub co2: Co2Band,
    #[validate(nested)]
    pub netzero: NetZeroConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            output_mode: OutputMode::None,
            seed: None,
            step_minutes: 15,
            live_points: 96,
            analytics_points: 720,
            netzero_years: 10,
            generation: GenerationMixConfig::default(),
            co2: Co2Band::default(),
            netzero: NetZeroConfig::default(),
        }
    }
}

impl SimulatorConfig {
    /// Parse the configured IANA timezone
    pub fn tz(&self) -> anyhow::Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("invalid timezone {:?}: {}", self.timezone, e))
    }

    /// Set the master seed
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn step(&self) -> Duration {
        Duration::minutes(self.step_minutes as i64)
    }

    /// Current instant in the configured timezone
    pub fn now(&self) -> anyhow::Result<DateTime<Tz>> {
        Ok(Utc::now().with_timezone(&self.tz()?))
    }
}

/// Generation and CO2 series for one window, index-aligned
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulatedWindow {
    pub mix: Vec<GenerationRecord>,
    pub co2: Vec<Co2Record>,
}

impl SimulatedWindow {
    pub fn len(&self) -> usize {
        self.mix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mix.is_empty()
    }
}

/// Ascending timestamps `end - (periods-1)*step, ..., end`, at millisecond
/// resolution. Instants before the representable range are left out.
pub fn window_timestamps(end: DateTime<Tz>, periods: usize, step: Duration) -> Vec<DateTime<Tz>> {
    let step_ms = step.num_milliseconds();
    (0..periods)
        .rev()
        .filter_map(|back| {
            i64::try_from(back)
                .ok()
                .and_then(|back| step_ms.checked_mul(back))
                .and_then(Duration::try_milliseconds)
                .and_then(|offset| end.checked_sub_signed(offset))
        })
        .collect()
}

/// Simulation context: the three simulators, each with its own RNG
pub struct GridEnvironment {
    config: SimulatorConfig,
    generation: GenerationMixSimulator,
    co2: Co2IntensitySimulator,
    netzero: NetZeroSimulator,
    /// Source of seeds for forked contexts
    seeder: StdRng,
}

/// RNGs for the generation, CO2 and net-zero simulators plus the fork seeder
fn context_rngs(seed: Option<u64>) -> [StdRng; 4] {
    match seed {
        Some(seed) => [0u64, 1, 2, 3].map(|k| StdRng::seed_from_u64(seed.wrapping_add(k))),
        None => [(); 4].map(|_| StdRng::from_entropy()),
    }
}

impl GridEnvironment {
    /// Build a context. With a master seed the simulators are seeded with
    /// `seed`, `seed + 1` and `seed + 2`; without one they draw from entropy.
    pub fn new(config: SimulatorConfig) -> Self {
        let start_year = match config.tz() {
            Ok(tz) => Utc::now().with_timezone(&tz).year(),
            Err(_) => Utc::now().year(),
        };
        Self::with_start_year(config, start_year)
    }

    /// Build a context whose net-zero trajectory starts at `start_year`
    /// unless the configuration pins one.
    pub fn with_start_year(config: SimulatorConfig, start_year: i32) -> Self {
        let rngs = context_rngs(config.seed);
        Self::from_rngs(config, start_year, rngs)
    }

    fn from_rngs(config: SimulatorConfig, start_year: i32, rngs: [StdRng; 4]) -> Self {
        let [gen_rng, co2_rng, nz_rng, seeder] = rngs;
        Self {
            generation: GenerationMixSimulator::with_rng(config.generation.clone(), gen_rng),
            co2: Co2IntensitySimulator::with_rng(config.co2, co2_rng),
            netzero: NetZeroSimulator::with_rng(config.netzero.clone(), start_year, nz_rng),
            config,
            seeder,
        }
    }

    /// Independently seeded child context, for use on another thread.
    /// Forks of identically seeded parents are identical.
    pub fn fork(&mut self) -> Self {
        let rngs = [(); 4].map(|_| StdRng::seed_from_u64(self.seeder.gen()));
        Self::from_rngs(self.config.clone(), self.netzero.start_year(), rngs)
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// One generation record and the CO2 record derived from it
    pub fn run_once(&mut self, timestamp: DateTime<Tz>) -> (GenerationRecord, Co2Record) {
        let mix = self.generation.simulate(timestamp);
        let co2 = self.co2.simulate(timestamp, &mix);
        (mix, co2)
    }

    /// Run the pipeline over `periods` samples spaced `step` apart, ending at `end`
    pub fn simulate_window(
        &mut self,
        end: DateTime<Tz>,
        periods: usize,
        step: Duration,
    ) -> SimulatedWindow {
        let timestamps = window_timestamps(end, periods, step);
        let mut window = SimulatedWindow {
            mix: Vec::with_capacity(periods),
            co2: Vec::with_capacity(periods),
        };
        for ts in timestamps {
            let (mix, co2) = self.run_once(ts);
            window.mix.push(mix);
            window.co2.push(co2);
        }
        debug!(periods, end = %end, "simulated window");
        window
    }

    pub fn simulate_net_zero(&mut self, year: i32) -> NetZeroRecord {
        self.netzero.simulate(year)
    }

    pub fn net_zero_horizon(&mut self, years: u32) -> Vec<NetZeroRecord> {
        self.netzero.horizon(years)
    }

    pub fn netzero_start_year(&self) -> i32 {
        self.netzero.start_year()
    }
}
