// Nelder-Mead simplex optimizer (bounded)

use std::cmp::Ordering;
use std::time::Instant;

pub(crate) struct Bounds {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

pub(crate) struct NelderMeadOptions {
    pub max_iterations: usize,
    /// Simplex diameter below which the search stops
    pub xtol: f64,
    /// Relative spread of objective values below which the search stops
    pub ftol: f64,
    pub deadline: Option<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Termination {
    Converged,
    MaxIterations,
    DeadlineExceeded,
}

#[derive(Debug, Clone)]
pub(crate) struct Minimum {
    pub point: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub termination: Termination,
}

fn clamp_point(point: &mut [f64], bounds: &Bounds) {
    for (i, v) in point.iter_mut().enumerate() {
        *v = v.clamp(bounds.lower[i], bounds.upper[i]);
    }
}

fn by_value(values: &[f64]) -> impl Fn(&usize, &usize) -> Ordering + '_ {
    move |&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal)
}

pub(crate) fn nelder_mead<F>(
    f: F,
    initial: &[f64],
    bounds: &Bounds,
    options: &NelderMeadOptions,
) -> Minimum
where
    F: Fn(&[f64]) -> f64,
{
    let dim = initial.len();
    let n = dim + 1; // number of simplex vertices

    let mut clamped = initial.to_vec();
    clamp_point(&mut clamped, bounds);

    if dim == 0 {
        let value = f(&clamped);
        return Minimum {
            point: clamped,
            value,
            iterations: 0,
            termination: Termination::Converged,
        };
    }

    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n);
    simplex.push(clamped.clone());
    for i in 0..dim {
        let mut vertex = clamped.clone();
        let step = (bounds.upper[i] - bounds.lower[i]) * 0.05;
        vertex[i] = (vertex[i] + step).min(bounds.upper[i]);
        if (vertex[i] - clamped[i]).abs() < 1e-12 {
            vertex[i] = (vertex[i] - step).max(bounds.lower[i]);
        }
        simplex.push(vertex);
    }

    let mut values: Vec<f64> = simplex.iter().map(|v| f(v)).collect();
    let mut indices: Vec<usize> = (0..n).collect();

    for iteration in 0..options.max_iterations {
        if options.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            indices.sort_by(by_value(&values));
            return Minimum {
                point: simplex[indices[0]].clone(),
                value: values[indices[0]],
                iterations: iteration,
                termination: Termination::DeadlineExceeded,
            };
        }

        indices.sort_by(by_value(&values));
        let best_idx = indices[0];
        let worst_idx = indices[n - 1];
        let second_worst_idx = indices[n - 2];

        let diameter = simplex[best_idx]
            .iter()
            .zip(simplex[worst_idx].iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0_f64, f64::max);
        let spread = (values[worst_idx] - values[best_idx]).abs();
        if diameter < options.xtol || spread <= options.ftol * (values[best_idx].abs() + 1e-12) {
            return Minimum {
                point: simplex[best_idx].clone(),
                value: values[best_idx],
                iterations: iteration,
                termination: Termination::Converged,
            };
        }

        // Centroid of all points except worst
        let mut centroid = vec![0.0; dim];
        for &idx in &indices[..n - 1] {
            for (j, c) in centroid.iter_mut().enumerate() {
                *c += simplex[idx][j];
            }
        }
        for c in centroid.iter_mut() {
            *c /= (n - 1) as f64;
        }

        // Reflection
        let mut reflected: Vec<f64> = centroid
            .iter()
            .zip(simplex[worst_idx].iter())
            .map(|(&c, &w)| 2.0 * c - w)
            .collect();
        clamp_point(&mut reflected, bounds);
        let f_reflected = f(&reflected);

        if f_reflected < values[best_idx] {
            // Expansion
            let mut expanded: Vec<f64> = centroid
                .iter()
                .zip(reflected.iter())
                .map(|(&c, &r)| 2.0 * r - c)
                .collect();
            clamp_point(&mut expanded, bounds);
            let f_expanded = f(&expanded);

            if f_expanded < f_reflected {
                simplex[worst_idx] = expanded;
                values[worst_idx] = f_expanded;
            } else {
                simplex[worst_idx] = reflected;
                values[worst_idx] = f_reflected;
            }
        } else if f_reflected < values[second_worst_idx] {
            simplex[worst_idx] = reflected;
            values[worst_idx] = f_reflected;
        } else {
            // Contraction
            let use_reflected = f_reflected < values[worst_idx];
            let (contract_from, f_contract_from) = if use_reflected {
                (reflected, f_reflected)
            } else {
                (simplex[worst_idx].clone(), values[worst_idx])
            };

            let mut contracted: Vec<f64> = centroid
                .iter()
                .zip(contract_from.iter())
                .map(|(&c, &w)| 0.5 * (c + w))
                .collect();
            clamp_point(&mut contracted, bounds);
            let f_contracted = f(&contracted);

            if f_contracted < f_contract_from {
                simplex[worst_idx] = contracted;
                values[worst_idx] = f_contracted;
            } else {
                // Shrink all towards best
                let best_point = simplex[best_idx].clone();
                for &idx in &indices[1..] {
                    for j in 0..dim {
                        simplex[idx][j] = 0.5 * (simplex[idx][j] + best_point[j]);
                    }
                    clamp_point(&mut simplex[idx], bounds);
                    values[idx] = f(&simplex[idx]);
                }
            }
        }
    }

    indices.sort_by(by_value(&values));
    Minimum {
        point: simplex[indices[0]].clone(),
        value: values[indices[0]],
        iterations: options.max_iterations,
        termination: Termination::MaxIterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(max_iterations: usize) -> NelderMeadOptions {
        NelderMeadOptions {
            max_iterations,
            xtol: 1e-9,
            ftol: 1e-14,
            deadline: None,
        }
    }

    fn bounds(dim: usize) -> Bounds {
        Bounds {
            lower: vec![-5.0; dim],
            upper: vec![5.0; dim],
        }
    }

    #[test]
    fn test_minimizes_quadratic() {
        let f = |x: &[f64]| (x[0] - 1.0).powi(2) + (x[1] + 0.5).powi(2);
        let result = nelder_mead(f, &[0.0, 0.0], &bounds(2), &options(2000));
        assert_eq!(result.termination, Termination::Converged);
        assert!((result.point[0] - 1.0).abs() < 1e-4);
        assert!((result.point[1] + 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_respects_bounds() {
        let f = |x: &[f64]| (x[0] - 10.0).powi(2);
        let result = nelder_mead(f, &[0.0], &bounds(1), &options(2000));
        assert!((result.point[0] - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_reports_iteration_limit() {
        let f = |x: &[f64]| (x[0] - 1.0).powi(2) + (x[1] - 2.0).powi(2);
        let result = nelder_mead(f, &[-4.0, -4.0], &bounds(2), &options(3));
        assert_eq!(result.termination, Termination::MaxIterations);
        assert_eq!(result.iterations, 3);
    }

    #[test]
    fn test_reports_deadline() {
        let f = |x: &[f64]| x[0] * x[0];
        let opts = NelderMeadOptions {
            deadline: Some(Instant::now()),
            ..options(100)
        };
        let result = nelder_mead(f, &[3.0], &bounds(1), &opts);
        assert_eq!(result.termination, Termination::DeadlineExceeded);
    }
}
