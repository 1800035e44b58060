//! Backtracking line search under the strong Wolfe conditions.

use super::config::LbfgsConfig;
use crate::gsa::{Differentiable, LocalStatus};

const DECREASE: f64 = 0.5;
const INCREASE: f64 = 2.1;

pub(super) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(u, v)| u * v).sum()
}

/// Evaluates `objective` at `x`, widening the gradient into `g`.
pub(super) fn evaluate<O: Differentiable + ?Sized>(
    objective: &O,
    x: &[f32],
    g32: &mut [f32],
    g: &mut [f64],
) -> f64 {
    let f = objective.value_and_gradient(x, g32);
    for (dst, &src) in g.iter_mut().zip(g32.iter()) {
        *dst = f64::from(src);
    }
    f
}

/// Read-only inputs of one line search.
pub(super) struct Line<'s> {
    /// Starting point.
    pub xp: &'s [f32],
    /// Objective value at `xp`.
    pub fp: f64,
    /// Gradient at `xp`.
    pub gp: &'s [f64],
    /// Search direction.
    pub d: &'s [f64],
}

/// Buffers receiving the trial point and its gradient.
pub(super) struct Trial<'s> {
    pub x: &'s mut [f32],
    pub g: &'s mut [f64],
    pub g32: &'s mut [f32],
}

/// Searches along `line.d` from `line.xp`, starting at `*step`.
///
/// On success `trial` and the returned value describe the accepted point.
/// On failure their content is unspecified; the caller restores `xp`.
/// Every objective evaluation is added to `evals`.
pub(super) fn backtracking<O: Differentiable + ?Sized>(
    objective: &O,
    config: &LbfgsConfig,
    line: &Line<'_>,
    trial: &mut Trial<'_>,
    step: &mut f64,
    evals: &mut usize,
) -> Result<f64, LocalStatus> {
    if !(*step > 0.0) {
        return Err(LocalStatus::InvalidParameters);
    }
    let dginit = dot(line.gp, line.d);
    if dginit > 0.0 {
        return Err(LocalStatus::IncreaseGradient);
    }
    let dgtest = config.ftol * dginit;

    let mut count = 0;
    loop {
        for ((xi, &x0), &di) in trial.x.iter_mut().zip(line.xp).zip(line.d) {
            *xi = (f64::from(x0) + *step * di) as f32;
        }
        if *trial.x == *line.xp {
            return Err(LocalStatus::RoundingErrors);
        }

        let f = evaluate(objective, trial.x, trial.g32, trial.g);
        *evals += 1;
        count += 1;

        let width = if !f.is_finite() || f > line.fp + *step * dgtest {
            DECREASE
        } else {
            let dg = dot(trial.g, line.d);
            if dg < config.gtol * dginit {
                INCREASE
            } else if dg > -config.gtol * dginit {
                DECREASE
            } else {
                return Ok(f);
            }
        };

        if count >= config.max_linesearch {
            return Err(LocalStatus::TooManyLineSearchEvaluations);
        }
        *step *= width;
        if *step < config.min_step {
            return Err(LocalStatus::MinimumStep);
        }
        if *step > config.max_step {
            return Err(LocalStatus::MaximumStep);
        }
    }
}
