//! # What-If Scenario Modeling
//!
//! Replays a simulated window with adjusted source outputs and reports how
//! renewable share, carbon intensity and net-zero alignment move. Both arms
//! share the same generation draws and the same intensity noise stream, so
//! the deltas come from the adjustments alone.

use chrono::{DateTime, Datelike, Duration};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Co2IntensitySimulator, GridEnvironment, SimulatedWindow, SimulatorConfig};
use crate::domain::{Co2Record, EnergySource, GenerationRecord, NetZeroRecord};

/// Offset added to the master seed for the shared intensity noise stream
const SCENARIO_NOISE_SEED_OFFSET: u64 = 0x5CE7_A210;

/// Adjustments applied to every sample of the baseline window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioParams {
    /// Extra solar output as a fraction of baseline (0-2)
    pub solar_boost: f64,
    /// Extra wind output as a fraction of baseline (0-2)
    pub wind_boost: f64,
    /// Fossil output removed as a fraction of baseline (0-1)
    pub fossil_reduction: f64,
    /// Take the whole nuclear fleet offline
    pub nuclear_outage: bool,
    /// Length of the simulated window (1-168 h)
    pub duration_hours: u32,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            solar_boost: 0.0,
            wind_boost: 0.0,
            fossil_reduction: 0.0,
            nuclear_outage: false,
            duration_hours: 24,
        }
    }
}

fn clamp_fraction(value: f64, max: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, max)
    } else {
        0.0
    }
}

impl ScenarioParams {
    /// Copy with every parameter forced into its valid range
    pub fn clamped(&self) -> Self {
        Self {
            solar_boost: clamp_fraction(self.solar_boost, 2.0),
            wind_boost: clamp_fraction(self.wind_boost, 2.0),
            fossil_reduction: clamp_fraction(self.fossil_reduction, 1.0),
            nuclear_outage: self.nuclear_outage,
            duration_hours: self.duration_hours.clamp(1, 168),
        }
    }

    /// Apply the adjustments to one generation record
    pub fn apply(&self, record: &GenerationRecord) -> GenerationRecord {
        let adjusted = record
            .scale_source(EnergySource::Solar, 1.0 + self.solar_boost)
            .scale_source(EnergySource::Wind, 1.0 + self.wind_boost)
            .scale_source(EnergySource::Fossil, 1.0 - self.fossil_reduction);
        if self.nuclear_outage {
            adjusted.with_source(EnergySource::Nuclear, 0.0)
        } else {
            adjusted
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewableShareChange {
    pub baseline_pct: f64,
    pub scenario_pct: f64,
    /// Difference in percentage points
    pub change_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Co2IntensityChange {
    pub baseline_g_per_kwh: f64,
    pub scenario_g_per_kwh: f64,
    /// Relative reduction in percent; negative when intensity rises
    pub reduction_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentChange {
    pub baseline_pct: f64,
    pub scenario_pct: f64,
    /// Difference in percentage points
    pub improvement_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactAnalysis {
    pub renewable_share_change: RenewableShareChange,
    pub co2_intensity_change: Co2IntensityChange,
    pub netzero_alignment_change: AlignmentChange,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub params: ScenarioParams,
    pub baseline: SimulatedWindow,
    pub scenario: SimulatedWindow,
    pub impact_analysis: ImpactAnalysis,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

fn intensities(
    config: &SimulatorConfig,
    noise_seed: u64,
    tz: &Tz,
    mix: &[GenerationRecord],
) -> Vec<Co2Record> {
    let mut sim = Co2IntensitySimulator::new(config.co2, Some(noise_seed));
    mix.iter()
        .map(|record| sim.simulate(record.timestamp().with_timezone(tz), record))
        .collect()
}

/// Run a what-if scenario over the window ending at `end`.
pub fn run_scenario(
    config: &SimulatorConfig,
    params: &ScenarioParams,
    end: DateTime<Tz>,
) -> ScenarioResult {
    let params = params.clamped();
    let step_minutes = config.step_minutes.max(1);
    let periods = ((params.duration_hours * 60) / step_minutes).max(1) as usize;
    let tz = end.timezone();

    let mut env = GridEnvironment::new(config.clone());
    let baseline_mix = env
        .simulate_window(end, periods, Duration::minutes(step_minutes as i64))
        .mix;
    let scenario_mix: Vec<GenerationRecord> =
        baseline_mix.iter().map(|r| params.apply(r)).collect();

    let noise_seed = config
        .seed
        .map(|seed| seed.wrapping_add(SCENARIO_NOISE_SEED_OFFSET))
        .unwrap_or_else(rand::random);
    let baseline_co2 = intensities(config, noise_seed, &tz, &baseline_mix);
    let scenario_co2 = intensities(config, noise_seed, &tz, &scenario_mix);

    let current = env.simulate_net_zero(end.year());
    let impact_analysis = analyse(&baseline_mix, &scenario_mix, &baseline_co2, &scenario_co2, &current);

    info!(
        periods,
        reduction_pct = impact_analysis.co2_intensity_change.reduction_pct,
        "scenario complete"
    );

    ScenarioResult {
        params,
        baseline: SimulatedWindow {
            mix: baseline_mix,
            co2: baseline_co2,
        },
        scenario: SimulatedWindow {
            mix: scenario_mix,
            co2: scenario_co2,
        },
        impact_analysis,
    }
}

fn analyse(
    baseline_mix: &[GenerationRecord],
    scenario_mix: &[GenerationRecord],
    baseline_co2: &[Co2Record],
    scenario_co2: &[Co2Record],
    current: &NetZeroRecord,
) -> ImpactAnalysis {
    let baseline_share = mean(baseline_mix.iter().map(|r| r.renewable_share_pct()));
    let scenario_share = mean(scenario_mix.iter().map(|r| r.renewable_share_pct()));

    let baseline_intensity = mean(baseline_co2.iter().map(|r| r.co2_intensity_g_per_kwh));
    let scenario_intensity = mean(scenario_co2.iter().map(|r| r.co2_intensity_g_per_kwh));
    let (reduction_pct, intensity_ratio) = if baseline_intensity > f64::EPSILON {
        (
            100.0 * (baseline_intensity - scenario_intensity) / baseline_intensity,
            scenario_intensity / baseline_intensity,
        )
    } else {
        (0.0, 1.0)
    };

    // Emissions scale with intensity; the target does not move.
    let scenario_netzero = NetZeroRecord::new(
        current.year(),
        current.actual_emissions_mt() * intensity_ratio,
        current.target_emissions_mt(),
    );

    ImpactAnalysis {
        renewable_share_change: RenewableShareChange {
            baseline_pct: baseline_share,
            scenario_pct: scenario_share,
            change_pct: scenario_share - baseline_share,
        },
        co2_intensity_change: Co2IntensityChange {
            baseline_g_per_kwh: baseline_intensity,
            scenario_g_per_kwh: scenario_intensity,
            reduction_pct,
        },
        netzero_alignment_change: AlignmentChange {
            baseline_pct: current.alignment_pct(),
            scenario_pct: scenario_netzero.alignment_pct(),
            improvement_pct: scenario_netzero.alignment_pct() - current.alignment_pct(),
        },
    }
}
