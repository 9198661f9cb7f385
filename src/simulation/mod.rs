//! # Grid Simulation Module
//!
//! Procedural data sources for a hypothetical power grid.
//!
//! ## Components
//!
//! - **Noise**: bounded-normal draws, diurnal/seasonal curves, weather, outage and price-shock factors
//! - **Generation**: five-source generation mix per timestamp
//! - **CO2**: carbon intensity derived from the renewable share of a generation record
//! - **Net-zero**: annual emissions target versus actual
//! - **Environment**: seeded simulation context that runs the per-timestamp pipeline over windows
//! - **Scenario**: what-if replays with boosted or curtailed sources
//!
//! ## Usage
//!
//! ```rust
//! use chrono::{Duration, TimeZone};
//! use chrono_tz::Europe::Stockholm;
//! use nexus_grid_sim::simulation::{GridEnvironment, SimulatorConfig};
//!
//! let config = SimulatorConfig::default().with_random_seed(42);
//! let mut env = GridEnvironment::with_start_year(config, 2025);
//!
//! let end = Stockholm.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
//! let window = env.simulate_window(end, 96, Duration::minutes(15));
//! let netzero = env.net_zero_horizon(10);
//!
//! assert_eq!(window.mix.len(), 96);
//! assert_eq!(netzero.len(), 10);
//! ```

pub mod co2;
pub mod environment;
pub mod generation;
pub mod netzero;
pub mod noise;
pub mod scenario;

pub use co2::Co2IntensitySimulator;
pub use environment::{window_timestamps, GridEnvironment, OutputMode, SimulatedWindow, SimulatorConfig};
pub use generation::{GenerationMixConfig, GenerationMixSimulator};
pub use netzero::{NetZeroConfig, NetZeroSimulator};
pub use noise::{Co2Band, WeatherFactors};
pub use scenario::{run_scenario, ImpactAnalysis, ScenarioParams, ScenarioResult};
