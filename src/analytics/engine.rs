//! Goal tracker: runs every KPI calculator over one set of series and folds
//! the outcomes into a single report.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use validator::Validate;

use super::series::{align, sorted_co2, sorted_mix, sorted_netzero};
use super::{anomaly, budget, correlation, pathway, rai, velocity};
use super::{Kpi, KpiError, KpiFailure};
use crate::domain::{Co2Record, GenerationRecord, GoalTrackerReport, NetZeroRecord};

/// Windows, thresholds and constants used by the KPI calculators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct GoalTrackerConfig {
    /// Intensity the grid is expected to run at in the first trajectory year
    #[validate(range(min = 0.0))]
    pub baseline_intensity_g_per_kwh: f64,
    /// Tons of CO2 per unit of `target_emissions_mt` when pro-rating the budget
    #[validate(range(min = 0.0))]
    pub tons_per_target_unit: f64,

    /// Trailing window for the velocity trend, at most ten years
    #[validate(range(min = 1, max = 87_600))]
    pub velocity_window_hours: u32,
    #[validate(range(min = 2))]
    pub velocity_min_points: usize,

    /// Trailing points forming the anomaly baseline
    #[validate(range(min = 1))]
    pub anomaly_window: usize,
    #[validate(range(min = 2))]
    pub anomaly_min_baseline: usize,
    /// Lower bound on the baseline standard deviation
    #[validate(range(min = 0.0))]
    pub anomaly_min_std_dev_g_per_kwh: f64,
    #[validate(range(min = 0.0))]
    pub anomaly_threshold: f64,
    #[validate(range(min = 0.0))]
    pub anomaly_medium: f64,
    #[validate(range(min = 0.0))]
    pub anomaly_high: f64,
    pub anomaly_recent_limit: usize,

    #[validate(range(min = 0.0, max = 1.0))]
    pub correlation_moderate: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub correlation_strong: f64,

    /// Emissions at or below this count as net zero
    #[validate(range(min = 0.0))]
    pub near_zero_emissions_mt: f64,
    pub max_eta_year: i32,

    #[validate(range(min = 0.0))]
    pub epsilon: f64,
}

impl Default for GoalTrackerConfig {
    fn default() -> Self {
        Self {
            baseline_intensity_g_per_kwh: 400.0,
            tons_per_target_unit: 1000.0,
            velocity_window_hours: 168,
            velocity_min_points: 7,
            anomaly_window: 96,
            anomaly_min_baseline: 24,
            anomaly_min_std_dev_g_per_kwh: 1.0,
            anomaly_threshold: 2.0,
            anomaly_medium: 2.5,
            anomaly_high: 3.0,
            anomaly_recent_limit: 10,
            correlation_moderate: 0.3,
            correlation_strong: 0.7,
            near_zero_emissions_mt: 0.5,
            max_eta_year: 2100,
            epsilon: 1e-9,
        }
    }
}

impl GoalTrackerConfig {
    /// Field ranges plus the orderings between thresholds
    pub fn check(&self) -> anyhow::Result<()> {
        self.validate()?;
        anyhow::ensure!(
            self.anomaly_threshold <= self.anomaly_medium && self.anomaly_medium <= self.anomaly_high,
            "anomaly thresholds must satisfy threshold <= medium <= high"
        );
        anyhow::ensure!(
            self.correlation_moderate <= self.correlation_strong,
            "correlation_moderate must not exceed correlation_strong"
        );
        anyhow::ensure!(
            self.anomaly_min_baseline <= self.anomaly_window,
            "anomaly_min_baseline must fit inside anomaly_window"
        );
        Ok(())
    }
}

/// Stateless KPI engine; safe to share between threads
#[derive(Debug, Clone, Default)]
pub struct GoalTracker {
    config: GoalTrackerConfig,
}

impl GoalTracker {
    pub fn new(config: GoalTrackerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GoalTrackerConfig {
        &self.config
    }

    /// Evaluate at the latest observed instant (CO2 first, then mix, then now)
    pub fn evaluate(
        &self,
        co2: &[Co2Record],
        mix: &[GenerationRecord],
        netzero: &[NetZeroRecord],
    ) -> GoalTrackerReport {
        let as_of = co2
            .iter()
            .map(|r| r.timestamp)
            .max()
            .or_else(|| mix.iter().map(|r| r.timestamp()).max())
            .unwrap_or_else(|| Utc::now().fixed_offset());
        self.evaluate_at(co2, mix, netzero, as_of)
    }

    pub fn evaluate_at(
        &self,
        co2: &[Co2Record],
        mix: &[GenerationRecord],
        netzero: &[NetZeroRecord],
        as_of: DateTime<FixedOffset>,
    ) -> GoalTrackerReport {
        let cfg = &self.config;
        let co2 = sorted_co2(co2);
        let mix = sorted_mix(mix);
        let netzero = sorted_netzero(netzero);
        let aligned = align(&co2, &mix);

        debug!(
            co2_points = co2.len(),
            mix_points = mix.len(),
            aligned_points = aligned.len(),
            netzero_years = netzero.len(),
            %as_of,
            "evaluating goal tracker"
        );

        let mut failures = Vec::new();

        let rai_pct = capture(
            &mut failures,
            Kpi::Rai,
            rai::real_time_alignment_index(&co2, &netzero, as_of, cfg),
        );
        let budget = capture(
            &mut failures,
            Kpi::Budget,
            budget::carbon_budget(&aligned, &netzero, as_of, cfg),
        );
        let velocity = capture(
            &mut failures,
            Kpi::Velocity,
            velocity::decarbonization_velocity(&co2, &netzero, as_of, cfg),
        );
        let latest_intensity = co2.last().map(|r| r.co2_intensity_g_per_kwh);
        let pathway = capture(
            &mut failures,
            Kpi::Pathway,
            pathway::net_zero_pathway(&netzero, velocity.as_ref(), latest_intensity, as_of, cfg),
        );
        let anomalies = capture(
            &mut failures,
            Kpi::Anomalies,
            anomaly::detect_anomalies(&co2, cfg),
        );
        let correlation = capture(
            &mut failures,
            Kpi::Correlation,
            correlation::renewable_intensity_correlation(&aligned, cfg),
        );

        let error = (!failures.is_empty()).then(|| {
            failures
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        });

        GoalTrackerReport {
            rai_pct,
            budget,
            velocity,
            pathway,
            anomalies,
            correlation,
            error,
            failures,
        }
    }
}

fn capture<T>(failures: &mut Vec<KpiFailure>, kpi: Kpi, result: Result<T, KpiError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(%kpi, kind = %error.kind(), %error, "KPI computation failed");
            failures.push(KpiFailure { kpi, error });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::ErrorKind;
    use chrono::{Duration, TimeZone};

    fn ts(i: i64) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 4, 1, 0, 0, 0)
            .unwrap()
            + Duration::minutes(15 * i)
    }

    fn trajectory() -> Vec<NetZeroRecord> {
        (0..10)
            .map(|i| {
                let target = 100.0 * (1.0 - 0.08 * i as f64);
                NetZeroRecord::new(2025 + i, target + 1.0, target)
            })
            .collect()
    }

    fn series(n: i64) -> (Vec<Co2Record>, Vec<GenerationRecord>) {
        let mix: Vec<_> = (0..n)
            .map(|i| {
                let wind = 200.0 + 100.0 * ((i % 24) as f64 / 24.0);
                GenerationRecord::from_sources(ts(i), 300.0, wind, 100.0, 500.0, 600.0)
            })
            .collect();
        let co2 = mix
            .iter()
            .map(|m| Co2Record::new(m.timestamp(), 400.0 - 3.0 * m.renewable_share_pct()))
            .collect();
        (co2, mix)
    }

    #[test]
    fn test_full_report() {
        let (co2, mix) = series(200);
        let report = GoalTracker::default().evaluate(&co2, &mix, &trajectory());

        assert!(report.is_complete(), "{:?}", report.error);
        assert!(report.error.is_none());
        let rai = report.rai_pct.unwrap();
        assert!((0.0..=100.0).contains(&rai));
        assert!(report.budget.is_some());
        assert!(report.velocity.is_some());
        assert_eq!(report.pathway.as_ref().unwrap().series.len(), 10);
        assert!(report.pathway.unwrap().eta_year.unwrap() >= 2025);
        assert!(report.anomalies.is_some());
        let correlation = report.correlation.unwrap();
        assert_eq!(correlation.sample_size, 200);
        assert!(correlation.coefficient < -0.99);
    }

    #[test]
    fn test_unsorted_input_matches_sorted() {
        let (co2, mix) = series(100);
        let mut shuffled_co2 = co2.clone();
        shuffled_co2.reverse();
        let mut shuffled_mix = mix.clone();
        shuffled_mix.rotate_left(37);

        let tracker = GoalTracker::default();
        let a = serde_json::to_value(tracker.evaluate(&co2, &mix, &trajectory())).unwrap();
        let b = serde_json::to_value(tracker.evaluate(&shuffled_co2, &shuffled_mix, &trajectory()))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_co2_degrades_gracefully() {
        let (_, mix) = series(50);
        let report = GoalTracker::default().evaluate(&[], &mix, &trajectory());

        assert!(report.rai_pct.is_none());
        assert!(report.budget.is_none());
        assert!(report.velocity.is_none());
        assert!(report.anomalies.is_none());
        assert!(report.correlation.is_none());
        // the pathway only needs the trajectory
        assert!(report.pathway.is_some());

        let error = report.error.unwrap();
        assert!(error.starts_with("rai: "));
        assert!(error.contains("; correlation: "));
        assert_eq!(report.failures.len(), 5);
        assert!(report
            .failures
            .iter()
            .all(|f| f.error.kind() == ErrorKind::InsufficientData));
    }

    #[test]
    fn test_reference_instant_falls_back_to_mix() {
        let (_, mix) = series(10);
        let report = GoalTracker::default().evaluate(&[], &mix, &[]);
        assert!(report.pathway.is_none());
        assert_eq!(report.failures.len(), 6);
    }

    #[test]
    fn test_config_checks() {
        assert!(GoalTrackerConfig::default().check().is_ok());

        let inverted = GoalTrackerConfig {
            anomaly_medium: 4.0,
            ..GoalTrackerConfig::default()
        };
        assert!(inverted.check().is_err());

        let out_of_range = GoalTrackerConfig {
            correlation_strong: 1.5,
            ..GoalTrackerConfig::default()
        };
        assert!(out_of_range.check().is_err());

        let huge_window = GoalTrackerConfig {
            velocity_window_hours: u32::MAX,
            ..GoalTrackerConfig::default()
        };
        assert!(huge_window.check().is_err());
    }

    #[test]
    fn test_oversized_velocity_window_only_fails_velocity() {
        let (co2, mix) = series(200);
        let tracker = GoalTracker::new(GoalTrackerConfig {
            velocity_window_hours: u32::MAX,
            ..GoalTrackerConfig::default()
        });
        let report = tracker.evaluate(&co2, &mix, &trajectory());

        assert!(report.velocity.is_none());
        assert!(report.rai_pct.is_some());
        assert!(report.budget.is_some());
        assert!(report.pathway.is_some());
        assert!(report.anomalies.is_some());
        assert!(report.correlation.is_some());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kpi, Kpi::Velocity);
        assert_eq!(report.failures[0].error.kind(), ErrorKind::Input);
        assert!(report.error.unwrap().starts_with("velocity: "));
    }
}
