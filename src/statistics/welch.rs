//! Welch's unequal-variance two-sample t-test

use statrs::distribution::{ContinuousCDF, StudentsT};

/// Outcome of one Welch test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WelchResult {
    /// t statistic of `mean(a) - mean(b)`
    pub statistic: f64,
    /// Welch–Satterthwaite degrees of freedom
    pub df: f64,
    /// Two-sided p-value
    pub p_value: f64,
}

impl WelchResult {
    const UNDEFINED: Self = Self {
        statistic: f64::NAN,
        df: f64::NAN,
        p_value: f64::NAN,
    };
}

/// Sample mean and unbiased variance of the finite values
fn moments(samples: &[f64]) -> Option<(f64, f64, f64)> {
    let finite: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.len() < 2 {
        return None;
    }
    let n = finite.len() as f64;
    let mean = finite.iter().sum::<f64>() / n;
    let var = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some((n, mean, var))
}

/// Two-sided Welch t-test between samples `a` and `b`
///
/// Non-finite samples are ignored. With fewer than two finite samples in
/// either group every field of the result is NaN. When both groups have zero
/// variance the groups are either identical in mean (p = 1) or perfectly
/// separated (p = 0, t = ±inf).
pub fn welch_t_test(a: &[f64], b: &[f64]) -> WelchResult {
    let (Some((na, mean_a, var_a)), Some((nb, mean_b, var_b))) = (moments(a), moments(b)) else {
        return WelchResult::UNDEFINED;
    };

    let se_a = var_a / na;
    let se_b = var_b / nb;
    let se2 = se_a + se_b;
    let diff = mean_a - mean_b;

    if se2 == 0.0 {
        return if diff == 0.0 {
            WelchResult {
                statistic: 0.0,
                df: f64::NAN,
                p_value: 1.0,
            }
        } else {
            WelchResult {
                statistic: diff.signum() * f64::INFINITY,
                df: f64::NAN,
                p_value: 0.0,
            }
        };
    }

    let statistic = diff / se2.sqrt();
    let df = se2.powi(2) / (se_a.powi(2) / (na - 1.0) + se_b.powi(2) / (nb - 1.0));

    let p_value = StudentsT::new(0.0, 1.0, df)
        .map(|dist| (2.0 * dist.sf(statistic.abs())).clamp(0.0, 1.0))
        .unwrap_or(f64::NAN);

    WelchResult {
        statistic,
        df,
        p_value,
    }
}
