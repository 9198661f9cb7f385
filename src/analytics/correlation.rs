//! Correlation between renewable share and CO2 intensity.

use super::series::AlignedPoint;
use super::stats::pearson;
use super::{GoalTrackerConfig, KpiError};
use crate::domain::{Correlation, CorrelationDirection, CorrelationStrength};

pub fn strength_for(coefficient: f64, config: &GoalTrackerConfig) -> CorrelationStrength {
    let magnitude = coefficient.abs();
    if magnitude < config.correlation_moderate {
        CorrelationStrength::Weak
    } else if magnitude < config.correlation_strong {
        CorrelationStrength::Moderate
    } else {
        CorrelationStrength::Strong
    }
}

/// Pearson r over aligned points with finite share and intensity. A series
/// with no variance on either side correlates at zero.
pub fn renewable_intensity_correlation(
    aligned: &[AlignedPoint],
    config: &GoalTrackerConfig,
) -> Result<Correlation, KpiError> {
    let (shares, intensities): (Vec<f64>, Vec<f64>) = aligned
        .iter()
        .filter(|p| p.renewable_share_pct.is_finite() && p.co2_intensity_g_per_kwh.is_finite())
        .map(|p| (p.renewable_share_pct, p.co2_intensity_g_per_kwh))
        .unzip();

    if shares.len() < 2 {
        return Err(KpiError::insufficient("correlation pairs", 2, shares.len()));
    }

    let r = pearson(&shares, &intensities).unwrap_or(0.0);
    let coefficient = (r * 1000.0).round() / 1000.0;

    Ok(Correlation {
        coefficient,
        strength: strength_for(coefficient, config),
        direction: if coefficient < 0.0 {
            CorrelationDirection::Negative
        } else {
            CorrelationDirection::Positive
        },
        sample_size: shares.len(),
    })
}
