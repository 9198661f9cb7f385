//! Descriptive statistics shared by the KPI calculators.

use super::KpiError;

/// Variances below this are treated as zero
pub const VARIANCE_EPSILON: f64 = 1e-12;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Least-squares fit `y = intercept + slope * x`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Ordinary least squares over paired samples.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Result<LinearFit, KpiError> {
    if xs.len() != ys.len() {
        return Err(KpiError::Input(format!(
            "dimension mismatch: x={}, y={}",
            xs.len(),
            ys.len()
        )));
    }
    if xs.len() < 2 {
        return Err(KpiError::insufficient("linear regression", 2, xs.len()));
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let sxx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
    let sxy: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();

    if sxx / n <= VARIANCE_EPSILON {
        return Err(KpiError::degenerate("regression abscissa has zero variance"));
    }

    let slope = sxy / sxx;
    if !slope.is_finite() {
        return Err(KpiError::degenerate("regression slope is not finite"));
    }

    Ok(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// Pearson correlation coefficient; `None` when either side has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx / n <= VARIANCE_EPSILON || syy / n <= VARIANCE_EPSILON {
        return None;
    }

    let r = sxy / (sxx.sqrt() * syy.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&values), Some(5.0));
        assert_eq!(std_dev(&values), Some(2.0));
        assert_eq!(mean(&[]), None);
        assert_eq!(std_dev(&[]), None);
    }

    #[test]
    fn test_linear_fit_exact_line() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 3.0, 5.0, 7.0];
        let fit = linear_fit(&xs, &ys).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.at(10.0) - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_fit_degenerate() {
        assert!(matches!(
            linear_fit(&[1.0], &[1.0]),
            Err(KpiError::InsufficientData { .. })
        ));
        assert!(matches!(
            linear_fit(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]),
            Err(KpiError::NumericDegeneracy(_))
        ));
        assert!(matches!(
            linear_fit(&[1.0, 2.0], &[1.0]),
            Err(KpiError::Input(_))
        ));
    }

    #[test]
    fn test_pearson() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert!((pearson(&xs, &[2.0, 4.0, 6.0, 8.0]).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&xs, &[8.0, 6.0, 4.0, 2.0]).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&xs, &[3.0, 3.0, 3.0, 3.0]), None);
        assert_eq!(pearson(&[1.0], &[1.0]), None);
    }
}
