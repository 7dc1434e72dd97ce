use statrs::distribution::{ContinuousCDF, StudentsT};
use thiserror::Error;

/// Number of decimal places p-values are rounded to before thresholding.
pub const PVALUE_DECIMALS: i32 = 5;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CorrelationError {
    #[error("vectors must have the same length ({0} vs {1})")]
    Input(usize, usize),
    #[error("correlation is undefined for these vectors")]
    Degenerate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    pub coefficient: f64,
    /// Two-sided p-value, rounded to `PVALUE_DECIMALS`.
    pub pvalue: f64,
}

pub fn round_pvalue(p: f64) -> f64 {
    let scale = 10f64.powi(PVALUE_DECIMALS);
    (p * scale).round() / scale
}

/// Pearson correlation with a two-sided p-value from Student's t with
/// `n - 2` degrees of freedom.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<Correlation, CorrelationError> {
    if x.len() != y.len() {
        return Err(CorrelationError::Input(x.len(), y.len()));
    }
    let n = x.len();
    if n < 3 {
        return Err(CorrelationError::Degenerate);
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 || !(var_x * var_y).is_finite() {
        return Err(CorrelationError::Degenerate);
    }

    let r = (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0);
    if !r.is_finite() {
        return Err(CorrelationError::Degenerate);
    }

    let df = (n - 2) as f64;
    let rest = 1.0 - r * r;
    let p = if rest <= 0.0 {
        0.0
    } else {
        let t = r * (df / rest).sqrt();
        let dist = StudentsT::new(0.0, 1.0, df).map_err(|_| CorrelationError::Degenerate)?;
        (2.0 * dist.sf(t.abs())).min(1.0)
    };

    Ok(Correlation {
        coefficient: r,
        pvalue: round_pvalue(p),
    })
}
