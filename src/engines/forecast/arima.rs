//! Conditional-sum-of-squares estimation for ARIMA(p, d, q).
//!
//! The series is differenced `d` times. A mean is estimated only when
//! `d == 0`. The centred differenced series `z` then follows
//!
//! ```text
//! z[t] = Σ ar[i] · z[t-1-i] + e[t] + Σ ma[j] · e[t-1-j]
//! ```
//!
//! Pure AR models are solved exactly by least squares. Models with an MA part
//! start from Hannan-Rissanen estimates and are refined with Nelder-Mead.

use super::optimizer::{nelder_mead, Bounds, NelderMeadOptions, Termination};
use crate::error::FitError;
use crate::types::ArimaOrder;
use std::f64::consts::PI;
use std::time::{Duration, Instant};

const AR_BOUND: f64 = 3.0;
const MA_BOUND: f64 = 0.999;
const SIMPLEX_XTOL: f64 = 1e-7;

#[derive(Debug, Clone)]
pub(crate) struct Estimate {
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub intercept: f64,
    pub has_intercept: bool,
    /// Centred differenced series
    pub centered: Vec<f64>,
    /// Innovations on the differenced scale, zero before index p
    pub residuals: Vec<f64>,
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub n_effective: usize,
    pub iterations: usize,
}

impl Estimate {
    /// Number of estimated parameters, innovation variance included
    pub fn num_params(&self) -> usize {
        self.ar.len() + self.ma.len() + usize::from(self.has_intercept) + 1
    }

    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood + 2.0 * self.num_params() as f64
    }

    pub fn bic(&self) -> f64 {
        -2.0 * self.log_likelihood + self.num_params() as f64 * (self.n_effective as f64).ln()
    }
}

/// Apply differencing `order` times
pub(crate) fn difference(data: &[f64], order: usize) -> Vec<f64> {
    let mut result = data.to_vec();
    for _ in 0..order {
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Last value of each differencing level `0..d`
pub(crate) fn difference_tails(data: &[f64], d: usize) -> Vec<f64> {
    let mut tails = Vec::with_capacity(d);
    let mut level = data.to_vec();
    for _ in 0..d {
        if let Some(&last) = level.last() {
            tails.push(last);
        }
        level = difference(&level, 1);
    }
    tails
}

/// Undo differencing on forecasts, innermost level first
pub(crate) fn integrate(forecasts: &[f64], tails: &[f64]) -> Vec<f64> {
    let mut result = forecasts.to_vec();
    for &last in tails.iter().rev() {
        let mut acc = last;
        for value in result.iter_mut() {
            acc += *value;
            *value = acc;
        }
    }
    result
}

pub(crate) fn css_residuals(z: &[f64], ar: &[f64], ma: &[f64]) -> Vec<f64> {
    let p = ar.len();
    let mut residuals = vec![0.0; z.len()];
    for t in p..z.len() {
        let mut prediction = 0.0;
        for (i, coeff) in ar.iter().enumerate() {
            prediction += coeff * z[t - i - 1];
        }
        for (j, coeff) in ma.iter().enumerate() {
            if t > j {
                prediction += coeff * residuals[t - j - 1];
            }
        }
        residuals[t] = z[t] - prediction;
    }
    residuals
}

fn css(z: &[f64], ar: &[f64], ma: &[f64]) -> f64 {
    css_residuals(z, ar, ma)[ar.len()..].iter().map(|e| e * e).sum()
}

/// Solve `min |Xb - y|²` through ridge-stabilised normal equations
pub(crate) fn least_squares(rows: &[Vec<f64>], targets: &[f64]) -> Option<Vec<f64>> {
    let k = rows.first().map(|r| r.len())?;
    if k == 0 {
        return Some(Vec::new());
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &y) in rows.iter().zip(targets) {
        for i in 0..k {
            xty[i] += row[i] * y;
            for j in 0..k {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }

    let scale = (0..k).map(|i| xtx[i][i]).sum::<f64>() / k as f64;
    let ridge = if scale > 0.0 { scale * 1e-10 } else { 1e-10 };
    for (i, row) in xtx.iter_mut().enumerate() {
        row[i] += ridge;
    }

    solve_linear(xtx, xty)
}

// Gaussian elimination with partial pivoting
fn solve_linear(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if !a[pivot][col].is_finite() || a[pivot][col].abs() < 1e-300 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    x.iter().all(|v| v.is_finite()).then_some(x)
}

/// Conditional least squares AR(p) fit
pub(crate) fn fit_ar(z: &[f64], p: usize) -> Option<Vec<f64>> {
    if p == 0 {
        return Some(Vec::new());
    }
    if z.len() <= p {
        return None;
    }
    let rows: Vec<Vec<f64>> = (p..z.len())
        .map(|t| (1..=p).map(|i| z[t - i]).collect())
        .collect();
    least_squares(&rows, &z[p..])
}

/// Hannan-Rissanen starting values `[ar..., ma...]`; zeros when infeasible
fn hannan_rissanen(z: &[f64], p: usize, q: usize) -> Vec<f64> {
    let n = z.len();
    let fallback = vec![0.0; p + q];
    let long = (p + q).max((n / 4).min(20));
    let start = p.max(long + q);
    if long == 0 || n <= start + p + q + 1 {
        return fallback;
    }

    let Some(long_ar) = fit_ar(z, long) else {
        return fallback;
    };
    let innovations = css_residuals(z, &long_ar, &[]);

    let rows: Vec<Vec<f64>> = (start..n)
        .map(|t| {
            (1..=p)
                .map(|i| z[t - i])
                .chain((1..=q).map(|j| innovations[t - j]))
                .collect()
        })
        .collect();

    match least_squares(&rows, &z[start..]) {
        Some(mut params) => {
            for (i, v) in params.iter_mut().enumerate() {
                let bound = if i < p { AR_BOUND } else { 0.9 };
                *v = v.clamp(-bound, bound);
            }
            params
        }
        None => fallback,
    }
}

/// Estimate an ARIMA model on raw values
pub(crate) fn estimate(
    values: &[f64],
    order: ArimaOrder,
    max_iterations: usize,
    tolerance: f64,
    time_budget: Option<Duration>,
) -> Result<Estimate, FitError> {
    let started = Instant::now();
    let ArimaOrder { p, d, q } = order;

    let differenced = difference(values, d);
    let intercept = if d == 0 {
        differenced.iter().sum::<f64>() / differenced.len() as f64
    } else {
        0.0
    };
    let centered: Vec<f64> = differenced.iter().map(|v| v - intercept).collect();

    let (ar, ma, iterations) = if q == 0 {
        let ar = fit_ar(&centered, p).ok_or(FitError::NonConvergent { iterations: 0 })?;
        (ar, Vec::new(), 0)
    } else {
        let initial = hannan_rissanen(&centered, p, q);
        let bounds = Bounds {
            lower: (0..p + q)
                .map(|i| if i < p { -AR_BOUND } else { -MA_BOUND })
                .collect(),
            upper: (0..p + q)
                .map(|i| if i < p { AR_BOUND } else { MA_BOUND })
                .collect(),
        };
        let options = NelderMeadOptions {
            max_iterations,
            xtol: SIMPLEX_XTOL,
            ftol: tolerance,
            deadline: time_budget.map(|budget| started + budget),
        };

        let minimum = nelder_mead(
            |params| {
                let value = css(&centered, &params[..p], &params[p..]);
                if value.is_finite() {
                    value
                } else {
                    f64::MAX
                }
            },
            &initial,
            &bounds,
            &options,
        );
        log::debug!(
            "{} simplex search: {:?} after {} iterations, css={:.6}",
            order,
            minimum.termination,
            minimum.iterations,
            minimum.value
        );

        match minimum.termination {
            Termination::Converged if minimum.value < f64::MAX => {}
            Termination::DeadlineExceeded => {
                return Err(FitError::TimeBudgetExceeded {
                    budget_ms: time_budget.map_or(0, |b| b.as_millis() as u64),
                })
            }
            _ => {
                return Err(FitError::NonConvergent {
                    iterations: minimum.iterations,
                })
            }
        }

        let ma = minimum.point[p..].to_vec();
        let ar = minimum.point[..p].to_vec();
        (ar, ma, minimum.iterations)
    };

    if let Some(budget) = time_budget {
        if started.elapsed() > budget {
            return Err(FitError::TimeBudgetExceeded {
                budget_ms: budget.as_millis() as u64,
            });
        }
    }

    let residuals = css_residuals(&centered, &ar, &ma);
    let n_effective = centered.len() - p;
    let sum_squares: f64 = residuals[p..].iter().map(|e| e * e).sum();
    let sigma2 = sum_squares / n_effective as f64;
    if !sigma2.is_finite() {
        return Err(FitError::NonConvergent { iterations });
    }
    let log_likelihood =
        -0.5 * n_effective as f64 * ((2.0 * PI * sigma2.max(1e-300)).ln() + 1.0);

    Ok(Estimate {
        ar,
        ma,
        intercept,
        has_intercept: d == 0,
        centered,
        residuals,
        sigma2,
        log_likelihood,
        n_effective,
        iterations,
    })
}
