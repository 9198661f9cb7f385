//! Rolling z-score anomaly detection over CO2 intensity.
//!
//! Each reading is compared with the mean and standard deviation of the
//! readings immediately before it. The standard deviation is floored at a
//! configurable noise level so a perfectly flat baseline still yields a
//! finite score.

use super::stats::{mean, std_dev};
use super::{GoalTrackerConfig, KpiError};
use crate::domain::{AnomalyPoint, AnomalySummary, Co2Record, Severity};

pub fn severity_for(deviation: f64, config: &GoalTrackerConfig) -> Option<Severity> {
    let magnitude = deviation.abs();
    if magnitude >= config.anomaly_high {
        Some(Severity::High)
    } else if magnitude >= config.anomaly_medium {
        Some(Severity::Medium)
    } else if magnitude >= config.anomaly_threshold {
        Some(Severity::Low)
    } else {
        None
    }
}

/// `co2` must be sorted by timestamp.
pub fn detect_anomalies(
    co2: &[Co2Record],
    config: &GoalTrackerConfig,
) -> Result<AnomalySummary, KpiError> {
    if co2.is_empty() {
        return Err(KpiError::insufficient("anomaly series", 1, 0));
    }

    let values: Vec<f64> = co2.iter().map(|r| r.co2_intensity_g_per_kwh).collect();
    let mut summary = AnomalySummary::default();
    let mut flagged = Vec::new();

    for (i, record) in co2.iter().enumerate() {
        let value = record.co2_intensity_g_per_kwh;
        if !value.is_finite() {
            continue;
        }

        let start = i.saturating_sub(config.anomaly_window);
        let baseline: Vec<f64> = values[start..i].iter().copied().filter(|v| v.is_finite()).collect();
        if baseline.len() < config.anomaly_min_baseline {
            continue;
        }

        let (Some(mu), Some(sigma)) = (mean(&baseline), std_dev(&baseline)) else {
            continue;
        };
        let sigma = sigma.max(config.anomaly_min_std_dev_g_per_kwh);
        if sigma <= config.epsilon {
            continue;
        }

        let deviation = (value - mu) / sigma;
        if let Some(severity) = severity_for(deviation, config) {
            summary.severity.record(severity);
            flagged.push(AnomalyPoint {
                timestamp: record.timestamp,
                co2_intensity_g_per_kwh: value,
                is_anomaly: true,
                deviation: (deviation * 100.0).round() / 100.0,
                severity,
            });
        }
    }

    summary.count = flagged.len();
    let keep_from = flagged.len().saturating_sub(config.anomaly_recent_limit);
    summary.recent = flagged.split_off(keep_from);
    Ok(summary)
}
