//! Population statistics and Z-score normalization

/// Relative tolerance under which a standard deviation counts as zero.
///
/// Identical inputs can leave a spread of a few ULPs after the mean is
/// subtracted; dividing by that would produce meaningless Z-scores.
const DEGENERATE_STDDEV_TOLERANCE: f64 = 1e-12;

/// Population mean and standard deviation of a sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    /// Arithmetic mean
    pub mean: f64,
    /// Population (divide by n) standard deviation
    pub stddev: f64,
}

impl Moments {
    /// Whether the standard deviation is zero (within tolerance) or not finite
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !self.stddev.is_finite()
            || self.stddev <= DEGENERATE_STDDEV_TOLERANCE * self.mean.abs().max(1.0)
    }

    /// Z-score of `value`; `None` when the moments are degenerate
    #[must_use]
    pub fn z_score(&self, value: f64) -> Option<f64> {
        (!self.is_degenerate()).then(|| (value - self.mean) / self.stddev)
    }
}

/// Mean and population standard deviation; `None` for an empty slice
#[must_use]
pub fn population_moments(values: &[f64]) -> Option<Moments> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(Moments {
        mean,
        stddev: variance.sqrt(),
    })
}

/// Round half away from zero to `decimals` places, without producing `-0.0`
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}
