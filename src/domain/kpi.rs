//! KPI bundle produced by the goal tracker.
//!
//! Every sub-result is optional: a KPI that could not be computed is left as
//! `None` (and omitted from JSON) while the rest of the bundle is still
//! returned. The reasons are collected in `error` as one string.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::analytics::KpiFailure;

/// Year-to-date carbon budget ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonBudget {
    /// Emissions accumulated since January 1st (t)
    pub ytd_tons: f64,
    /// Annual target pro-rated to the elapsed part of the year (t)
    pub ytd_budget_tons: f64,
    /// Budget headroom expressed in days at the current emission rate.
    /// Positive means ahead of schedule.
    pub days_ahead: f64,
}

/// Decarbonization velocity, actual versus required
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub on_track: bool,
    pub v_actual_g_per_kwh_per_yr: f64,
    pub v_required_g_per_kwh_per_yr: f64,
}

/// One point of the target trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathwayPoint {
    pub year: i32,
    pub target_emissions_mt: f64,
}

/// Net-zero arrival projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pathway {
    /// First year the extrapolated trend reaches net zero, if it ever does
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_year: Option<i32>,
    pub series: Vec<PathwayPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A CO2 observation compared against its trailing baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyPoint {
    pub timestamp: DateTime<FixedOffset>,
    pub co2_intensity_g_per_kwh: f64,
    #[serde(rename = "isAnomaly")]
    pub is_anomaly: bool,
    /// Signed z-score against the trailing window
    pub deviation: f64,
    pub severity: Severity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityHistogram {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl SeverityHistogram {
    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Low => self.low += 1,
            Severity::Medium => self.medium += 1,
            Severity::High => self.high += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.medium + self.high
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalySummary {
    pub count: usize,
    /// Most recent flagged points, oldest first
    pub recent: Vec<AnomalyPoint>,
    pub severity: SeverityHistogram,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CorrelationStrength {
    Weak,
    Moderate,
    Strong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CorrelationDirection {
    Positive,
    Negative,
}

/// Pearson correlation between renewable share and CO2 intensity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub coefficient: f64,
    pub strength: CorrelationStrength,
    pub direction: CorrelationDirection,
    #[serde(rename = "sampleSize")]
    pub sample_size: usize,
}

/// Goal tracker output
#[derive(Debug, Clone, Default, Serialize)]
pub struct GoalTrackerReport {
    /// Real-time alignment index (0-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rai_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<CarbonBudget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity: Option<Velocity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pathway: Option<Pathway>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomalies: Option<AnomalySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation: Option<Correlation>,
    /// All sub-computation failures joined into one description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub failures: Vec<KpiFailure>,
}

impl GoalTrackerReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
