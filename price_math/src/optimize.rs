//! Derivative-free minimisation

/// Settings for the Nelder-Mead simplex search
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations
    pub max_iter: usize,
    /// Stop when the spread of objective values falls below this
    pub tolerance: f64,
    /// Relative size of the initial simplex
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 2000,
            tolerance: 1e-10,
            initial_step: 0.1,
        }
    }
}

/// Outcome of a simplex search
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// Best point found
    pub point: Vec<f64>,
    /// Objective value at `point`
    pub value: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Whether the tolerance was reached before `max_iter`
    pub converged: bool,
}

fn clamp(point: &mut [f64], bounds: Option<&[(f64, f64)]>) {
    if let Some(bounds) = bounds {
        for (x, &(lo, hi)) in point.iter_mut().zip(bounds) {
            *x = x.clamp(lo, hi);
        }
    }
}

fn towards(from: &[f64], to: &[f64], coef: f64) -> Vec<f64> {
    from.iter()
        .zip(to)
        .map(|(f, t)| f + coef * (t - f))
        .collect()
}

/// Minimise `objective` starting from `initial`
///
/// Uses the standard coefficients (reflection 1, expansion 2, contraction
/// 0.5, shrink 0.5). Points are clamped into `bounds` when given.
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: &NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    let eval = |p: &[f64]| {
        let v = objective(p);
        if v.is_nan() {
            f64::INFINITY
        } else {
            v
        }
    };

    if n == 0 {
        return NelderMeadResult {
            point: Vec::new(),
            value: eval(initial),
            iterations: 0,
            converged: true,
        };
    }

    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    let mut start = initial.to_vec();
    clamp(&mut start, bounds);
    simplex.push(start.clone());
    for i in 0..n {
        let mut vertex = start.clone();
        vertex[i] += if vertex[i].abs() > 1e-8 {
            config.initial_step * vertex[i].abs()
        } else {
            config.initial_step
        };
        clamp(&mut vertex, bounds);
        if vertex == start {
            vertex[i] -= config.initial_step;
            clamp(&mut vertex, bounds);
        }
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|p| eval(p)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        simplex = order.iter().map(|&i| simplex[i].clone()).collect();
        values = order.iter().map(|&i| values[i]).collect();

        if (values[n] - values[0]).abs() <= config.tolerance * (1.0 + values[0].abs()) {
            converged = true;
            break;
        }

        let centroid: Vec<f64> = (0..n)
            .map(|j| simplex[..n].iter().map(|p| p[j]).sum::<f64>() / n as f64)
            .collect();

        let mut reflected = towards(&centroid, &simplex[n], -1.0);
        clamp(&mut reflected, bounds);
        let reflected_value = eval(&reflected);

        if reflected_value < values[0] {
            let mut expanded = towards(&centroid, &simplex[n], -2.0);
            clamp(&mut expanded, bounds);
            let expanded_value = eval(&expanded);
            if expanded_value < reflected_value {
                simplex[n] = expanded;
                values[n] = expanded_value;
            } else {
                simplex[n] = reflected;
                values[n] = reflected_value;
            }
            continue;
        }

        if reflected_value < values[n - 1] {
            simplex[n] = reflected;
            values[n] = reflected_value;
            continue;
        }

        let (mut contracted, threshold) = if reflected_value < values[n] {
            (towards(&centroid, &reflected, 0.5), reflected_value)
        } else {
            (towards(&centroid, &simplex[n], 0.5), values[n])
        };
        clamp(&mut contracted, bounds);
        let contracted_value = eval(&contracted);
        if contracted_value < threshold {
            simplex[n] = contracted;
            values[n] = contracted_value;
            continue;
        }

        // Shrink towards the best vertex
        let best = simplex[0].clone();
        for i in 1..=n {
            let mut shrunk = towards(&best, &simplex[i], 0.5);
            clamp(&mut shrunk, bounds);
            values[i] = eval(&shrunk);
            simplex[i] = shrunk;
        }
    }

    let best = (0..=n)
        .min_by(|&a, &b| values[a].total_cmp(&values[b]))
        .unwrap_or(0);

    NelderMeadResult {
        point: simplex[best].clone(),
        value: values[best],
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quadratic_minimum() {
        let result = nelder_mead(
            |x| (x[0] - 2.0).powi(2) + (x[1] + 1.0).powi(2),
            &[0.0, 0.0],
            None,
            &NelderMeadConfig::default(),
        );

        assert!(result.converged);
        assert_relative_eq!(result.point[0], 2.0, epsilon = 1e-3);
        assert_relative_eq!(result.point[1], -1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_bounds_respected() {
        let bounds = [(-0.5, 0.5)];
        let result = nelder_mead(
            |x| (x[0] - 3.0).powi(2),
            &[0.0],
            Some(&bounds),
            &NelderMeadConfig::default(),
        );

        assert!(result.point[0] <= 0.5);
        assert_relative_eq!(result.point[0], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_rosenbrock() {
        let config = NelderMeadConfig {
            max_iter: 10_000,
            tolerance: 1e-14,
            ..Default::default()
        };
        let result = nelder_mead(
            |x| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2),
            &[-1.2, 1.0],
            None,
            &config,
        );
        assert_relative_eq!(result.point[0], 1.0, epsilon = 1e-2);
        assert_relative_eq!(result.point[1], 1.0, epsilon = 1e-2);
    }
}
