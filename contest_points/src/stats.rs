//! Plain descriptive statistics: shares, Pearson correlation and z-scores.

use crate::config::AnalysisErrors;

/// Pearson correlation between two series.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Correlation {
    pub coefficient: f64,
    /// Two-sided p-value of the hypothesis that the series are uncorrelated.
    pub p_value: f64,
    pub sample_size: usize,
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Divides each value by the total of all the values.
pub fn normalize(values: &[f64]) -> Result<Vec<f64>, AnalysisErrors> {
    let total: f64 = values.iter().sum();
    if total == 0.0 {
        return Err(AnalysisErrors::EmptyTotal);
    }
    Ok(values.iter().map(|v| v / total).collect())
}

pub fn pearson(x_values: &[f64], y_values: &[f64]) -> Result<Correlation, AnalysisErrors> {
    if x_values.len() != y_values.len() {
        return Err(AnalysisErrors::LengthMismatch(
            x_values.len(),
            y_values.len(),
        ));
    }
    let n = x_values.len();
    if n < 2 {
        return Err(AnalysisErrors::NotEnoughData(n));
    }

    let mean_x = mean(x_values);
    let mean_y = mean(y_values);

    let (covariance, variance_x, variance_y) = x_values
        .iter()
        .zip(y_values.iter())
        .map(|(x, y)| {
            let diff_x = x - mean_x;
            let diff_y = y - mean_y;
            (diff_x * diff_y, diff_x * diff_x, diff_y * diff_y)
        })
        .fold((0.0, 0.0, 0.0), |acc, (cov, var_x, var_y)| {
            (acc.0 + cov, acc.1 + var_x, acc.2 + var_y)
        });

    if variance_x == 0.0 || variance_y == 0.0 {
        return Err(AnalysisErrors::ConstantInput);
    }

    let coefficient = (covariance / (variance_x.sqrt() * variance_y.sqrt())).clamp(-1.0, 1.0);
    let p_value = if n == 2 {
        1.0
    } else {
        correlation_p_value(coefficient, (n - 2) as f64)
    };
    Ok(Correlation {
        coefficient,
        p_value,
        sample_size: n,
    })
}

/// Standard scores using the population standard deviation.
pub fn zscores(values: &[f64]) -> Result<Vec<f64>, AnalysisErrors> {
    if values.is_empty() {
        return Err(AnalysisErrors::NotEnoughData(0));
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    let std_dev = variance.sqrt();
    if std_dev == 0.0 {
        return Err(AnalysisErrors::ConstantInput);
    }
    Ok(values.iter().map(|v| (v - m) / std_dev).collect())
}

fn correlation_p_value(r: f64, df: f64) -> f64 {
    let one_minus_r2 = 1.0 - r * r;
    if one_minus_r2 <= 0.0 {
        return 0.0;
    }
    let t = r * (df / one_minus_r2).sqrt();
    t_two_sided_p_value(t, df)
}

// P(|T| >= |t|) for Student's t with df degrees of freedom.
fn t_two_sided_p_value(t: f64, df: f64) -> f64 {
    let x = df / (df + t * t);
    regularized_incomplete_beta(x, df / 2.0, 0.5).clamp(0.0, 1.0)
}

fn regularized_incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();
    // The continued fraction converges quickly only on this side of the mode.
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(x, a, b) / a
    } else {
        1.0 - front * beta_continued_fraction(1.0 - x, b, a) / b
    }
}

// Modified Lentz evaluation.
fn beta_continued_fraction(x: f64, a: f64, b: f64) -> f64 {
    const MAX_ITERATIONS: usize = 300;
    const EPSILON: f64 = 3.0e-14;
    const TINY: f64 = 1.0e-300;

    let guard = |v: f64| if v.abs() < TINY { TINY } else { v };

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 / guard(1.0 - qab * x / qap);
    let mut h = d;

    for m in 1..=MAX_ITERATIONS {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPSILON {
            break;
        }
    }
    h
}

// Lanczos approximation, g = 7.
fn ln_gamma(x: f64) -> f64 {
    const COEFFICIENTS: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];
    if x < 0.5 {
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut acc = COEFFICIENTS[0];
    for (i, c) in COEFFICIENTS.iter().enumerate().skip(1) {
        acc += c / (x + i as f64);
    }
    let t = x + 7.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + acc.ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn ln_gamma_known_values() {
        assert!(close(ln_gamma(1.0), 0.0, 1e-10));
        assert!(close(ln_gamma(5.0), 24f64.ln(), 1e-10));
        assert!(close(ln_gamma(0.5), std::f64::consts::PI.sqrt().ln(), 1e-10));
    }

    #[test]
    fn t_distribution_tails() {
        // One degree of freedom is the Cauchy distribution.
        assert!(close(t_two_sided_p_value(1.0, 1.0), 0.5, 1e-9));
        assert!(close(t_two_sided_p_value(0.0, 4.0), 1.0, 1e-12));
        let t = 2f64.sqrt();
        assert!(close(t_two_sided_p_value(t, 2.0), 1.0 - t / 2.0, 1e-9));
    }

    #[test]
    fn pearson_with_p_value() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 1.0, 4.0, 3.0, 5.0];
        let c = pearson(&x, &y).unwrap();
        assert!(close(c.coefficient, 0.8, 1e-12));
        assert!(close(c.p_value, 0.1041, 1e-3));
        assert_eq!(c.sample_size, 5);
    }

    #[test]
    fn pearson_perfect_lines() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let up = pearson(&x, &[2.0, 4.0, 6.0, 8.0]).unwrap();
        assert!(close(up.coefficient, 1.0, 1e-12));
        assert!(up.p_value < 1e-9);
        let down = pearson(&x, &[4.0, 3.0, 2.0, 1.0]).unwrap();
        assert!(close(down.coefficient, -1.0, 1e-12));
    }

    #[test]
    fn pearson_two_points() {
        let c = pearson(&[0.1, 0.2], &[0.3, 0.1]).unwrap();
        assert!(close(c.coefficient, -1.0, 1e-12));
        assert_eq!(c.p_value, 1.0);
    }

    #[test]
    fn pearson_errors() {
        assert_eq!(pearson(&[1.0], &[1.0]), Err(AnalysisErrors::NotEnoughData(1)));
        assert_eq!(
            pearson(&[1.0, 2.0], &[1.0]),
            Err(AnalysisErrors::LengthMismatch(2, 1))
        );
        assert_eq!(
            pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]),
            Err(AnalysisErrors::ConstantInput)
        );
    }

    #[test]
    fn zscores_population() {
        let z = zscores(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let s = 2f64.sqrt();
        assert!(close(z[0], -2.0 / s, 1e-12));
        assert!(close(z[2], 0.0, 1e-12));
        assert!(close(z[4], 2.0 / s, 1e-12));
        assert_eq!(zscores(&[3.0, 3.0]), Err(AnalysisErrors::ConstantInput));
    }

    #[test]
    fn normalize_shares() {
        assert_eq!(normalize(&[1.0, 3.0]).unwrap(), vec![0.25, 0.75]);
        assert_eq!(normalize(&[0.0, 0.0]), Err(AnalysisErrors::EmptyTotal));
    }
}
