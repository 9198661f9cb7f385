use serde::Serialize;
use strum::Display;
use thiserror::Error;

/// Broad failure class of a KPI computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Input,
    InsufficientData,
    NumericDegeneracy,
    Unclassified,
}

/// KPI computation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KpiError {
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Insufficient data for {what}: need {needed}, got {got}")]
    InsufficientData {
        what: &'static str,
        needed: usize,
        got: usize,
    },

    #[error("Numeric degeneracy: {0}")]
    NumericDegeneracy(String),

    #[error("Computation failed: {0}")]
    Unclassified(String),
}

impl KpiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            KpiError::Input(_) => ErrorKind::Input,
            KpiError::InsufficientData { .. } => ErrorKind::InsufficientData,
            KpiError::NumericDegeneracy(_) => ErrorKind::NumericDegeneracy,
            KpiError::Unclassified(_) => ErrorKind::Unclassified,
        }
    }

    pub(crate) fn insufficient(what: &'static str, needed: usize, got: usize) -> Self {
        KpiError::InsufficientData { what, needed, got }
    }

    pub(crate) fn degenerate(message: impl Into<String>) -> Self {
        KpiError::NumericDegeneracy(message.into())
    }
}

/// KPI produced by the goal tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Kpi {
    Rai,
    Budget,
    Velocity,
    Pathway,
    Anomalies,
    Correlation,
}

/// One failed sub-computation
#[derive(Debug, Clone, PartialEq)]
pub struct KpiFailure {
    pub kpi: Kpi,
    pub error: KpiError,
}

impl std::fmt::Display for KpiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kpi, self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            KpiError::insufficient("velocity", 7, 2).kind(),
            ErrorKind::InsufficientData
        );
        assert_eq!(KpiError::degenerate("x").kind(), ErrorKind::NumericDegeneracy);
        assert_eq!(ErrorKind::InsufficientData.to_string(), "insufficient_data");
    }

    #[test]
    fn test_failure_display() {
        let failure = KpiFailure {
            kpi: Kpi::Velocity,
            error: KpiError::insufficient("velocity regression", 7, 3),
        };
        assert_eq!(
            failure.to_string(),
            "velocity: Insufficient data for velocity regression: need 7, got 3"
        );
    }
}
