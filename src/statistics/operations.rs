//! Core statistical operations
//!
//! Operations work on a flat slice of samples and skip non-finite values,
//! matching NaN-skipping reductions over labeled arrays.

/// Supported reductions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatOperation {
    /// Arithmetic mean
    Mean,
    /// Population standard deviation (ddof = 0)
    Std,
}

impl StatOperation {
    /// Get the string representation of the operation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Std => "std",
        }
    }

    /// Reduce a slice of samples; NaN if no sample is finite
    #[must_use]
    pub fn apply(self, samples: &[f64]) -> f64 {
        match self {
            Self::Mean => finite_mean(samples).map_or(f64::NAN, |(mean, _)| mean),
            Self::Std => population_std(samples),
        }
    }
}

/// Mean of the finite samples and how many there were
pub fn finite_mean(samples: &[f64]) -> Option<(f64, usize)> {
    let (sum, count) = samples
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0_f64, 0_usize), |(sum, count), &v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some((sum / count as f64, count))
    }
}

fn population_std(samples: &[f64]) -> f64 {
    let Some((mean, count)) = finite_mean(samples) else {
        return f64::NAN;
    };
    let sum_sq: f64 = samples
        .iter()
        .filter(|v| v.is_finite())
        .map(|&v| (v - mean).powi(2))
        .sum();
    let variance = sum_sq / count as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_skips_nan() {
        assert_eq!(StatOperation::Mean.apply(&[1.0, f64::NAN, 3.0]), 2.0);
        assert!(StatOperation::Mean.apply(&[f64::NAN]).is_nan());
        assert!(StatOperation::Mean.apply(&[]).is_nan());
    }

    #[test]
    fn std_is_population_form() {
        let std = StatOperation::Std.apply(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((std - 2.0).abs() < 1e-12);
        assert_eq!(StatOperation::Std.apply(&[3.0]), 0.0);
    }
}
