//! Scalar type and small float helpers.

use crate::CoreError;

/// Floating point type used throughout.
pub type Real = f64;

/// Pass `v` through, or fail naming `what` when it is NaN or infinite.
pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Number of whole samples spanned by `delay` at step `dt`, rounded to nearest.
pub fn delay_samples(delay: Real, dt: Real) -> usize {
    let steps = (delay / dt).round();
    if steps.is_finite() && steps > 0.0 {
        steps as usize
    } else {
        0
    }
}

/// Arithmetic mean and population standard deviation.
pub fn mean_std(values: &[Real]) -> (Real, Real) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as Real;
    let mean = values.iter().sum::<Real>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<Real>() / n;
    (mean, var.sqrt())
}
