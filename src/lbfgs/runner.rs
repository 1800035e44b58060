//! L-BFGS iteration.

use super::config::LbfgsConfig;
use super::line_search::{backtracking, dot, evaluate, Line, Trial};
use crate::gsa::{Differentiable, LocalOutcome, LocalSolver, LocalStatus};

/// Scratch vectors, kept between calls so that repeated refinements of
/// same-sized points do not allocate.
#[derive(Debug, Clone, Default)]
struct Scratch {
    xp: Vec<f32>,
    g32: Vec<f32>,
    g: Vec<f64>,
    gp: Vec<f64>,
    d: Vec<f64>,
    /// `m` correction pairs, `n` elements each.
    s: Vec<f64>,
    y: Vec<f64>,
    rho: Vec<f64>,
    alpha: Vec<f64>,
    /// Recent objective values for the relative decrease test.
    past: Vec<f64>,
}

impl Scratch {
    fn prepare(&mut self, n: usize, config: &LbfgsConfig) {
        let m = config.m;
        for v in [&mut self.g, &mut self.gp, &mut self.d] {
            v.clear();
            v.resize(n, 0.0);
        }
        for v in [&mut self.xp, &mut self.g32] {
            v.clear();
            v.resize(n, 0.0);
        }
        for v in [&mut self.s, &mut self.y] {
            v.clear();
            v.resize(m * n, 0.0);
        }
        for v in [&mut self.rho, &mut self.alpha] {
            v.clear();
            v.resize(m, 0.0);
        }
        self.past.clear();
        self.past.resize(config.past, 0.0);
    }
}

/// Limited-memory BFGS with a backtracking strong Wolfe line search.
///
/// Points are `f32`; all internal arithmetic is `f64`. On failure `x` is
/// left at the last accepted point.
///
/// # Examples
///
/// ```
/// use u_gsa::functions::Rastrigin;
/// use u_gsa::gsa::{LocalSolver, LocalStatus};
/// use u_gsa::lbfgs::{Lbfgs, LbfgsConfig};
///
/// let mut solver = Lbfgs::new(LbfgsConfig::default());
/// let mut x = [0.1_f32, -0.05];
/// let outcome = solver.minimize(&Rastrigin::default(), &mut x);
/// assert_eq!(outcome.status, LocalStatus::Success);
/// assert!(outcome.func < 1e-6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Lbfgs {
    config: LbfgsConfig,
    scratch: Scratch,
}

impl Lbfgs {
    pub fn new(config: LbfgsConfig) -> Self {
        Self {
            config,
            scratch: Scratch::default(),
        }
    }

    pub fn config(&self) -> &LbfgsConfig {
        &self.config
    }
}

impl LocalSolver for Lbfgs {
    fn minimize<O: Differentiable + ?Sized>(&mut self, objective: &O, x: &mut [f32]) -> LocalOutcome {
        let config = &self.config;
        if config.validate().is_err() {
            return LocalOutcome {
                status: LocalStatus::InvalidParameters,
                func: f64::NAN,
                num_f_evals: 0,
            };
        }

        let n = x.len();
        let m = config.m;
        let ws = &mut self.scratch;
        ws.prepare(n, config);

        let mut evals = 1;
        let mut f = evaluate(objective, x, &mut ws.g32, &mut ws.g);
        let outcome = |status, func, evals| LocalOutcome {
            status,
            func,
            num_f_evals: evals,
        };
        if !f.is_finite() || ws.g.iter().any(|v| !v.is_finite()) {
            return outcome(LocalStatus::NonFiniteValue, f, evals);
        }
        if let Some(first) = ws.past.first_mut() {
            *first = f;
        }

        for (d, g) in ws.d.iter_mut().zip(&ws.g) {
            *d = -g;
        }
        let gnorm = dot(&ws.g, &ws.g).sqrt();
        if gnorm <= config.epsilon * norm(x).max(1.0) {
            return outcome(LocalStatus::Success, f, evals);
        }
        let mut step = 1.0 / dot(&ws.d, &ws.d).sqrt();

        let mut stored = 0;
        let mut next = 0;
        let mut k = 1;
        loop {
            ws.xp.copy_from_slice(x);
            ws.gp.copy_from_slice(&ws.g);
            let fp = f;

            let line = Line {
                xp: &ws.xp,
                fp,
                gp: &ws.gp,
                d: &ws.d,
            };
            let mut trial = Trial {
                x: &mut *x,
                g: &mut ws.g,
                g32: &mut ws.g32,
            };
            match backtracking(objective, config, &line, &mut trial, &mut step, &mut evals) {
                Ok(value) => f = value,
                Err(status) => {
                    x.copy_from_slice(&ws.xp);
                    return outcome(status, fp, evals);
                }
            }

            let gnorm = dot(&ws.g, &ws.g).sqrt();
            if gnorm <= config.epsilon * norm(x).max(1.0) {
                return outcome(LocalStatus::Success, f, evals);
            }

            let moved = x
                .iter()
                .zip(&ws.xp)
                .map(|(&a, &b)| (f64::from(a) - f64::from(b)).abs())
                .fold(0.0, f64::max);
            if moved <= config.x_tol * max_abs(x).max(1.0) {
                return outcome(LocalStatus::Success, f, evals);
            }

            if config.past > 0 {
                let slot = k % config.past;
                if k >= config.past {
                    let rate = (ws.past[slot] - f) / f.abs();
                    if rate.abs() < config.delta {
                        return outcome(LocalStatus::Success, f, evals);
                    }
                }
                ws.past[slot] = f;
            }

            if config.max_iterations != 0 && k >= config.max_iterations {
                return outcome(LocalStatus::TooManyIterations, f, evals);
            }

            // New correction pair s = x - xp, y = g - gp.
            let s = &mut ws.s[next * n..(next + 1) * n];
            let y = &mut ws.y[next * n..(next + 1) * n];
            for (sv, (&a, &b)) in s.iter_mut().zip(x.iter().zip(&ws.xp)) {
                *sv = f64::from(a) - f64::from(b);
            }
            for (yv, (&a, &b)) in y.iter_mut().zip(ws.g.iter().zip(&ws.gp)) {
                *yv = a - b;
            }
            let ys = dot(y, s);
            let yy = dot(y, y);
            let mut gamma = 1.0;
            if ys > 0.0 && yy > 0.0 {
                ws.rho[next] = 1.0 / ys;
                gamma = ys / yy;
                next = (next + 1) % m;
                stored = (stored + 1).min(m);
            } else if stored == m {
                // The rejected pair overwrote the oldest one.
                stored -= 1;
            }

            // Two-loop recursion: d = -H g.
            for (d, g) in ws.d.iter_mut().zip(&ws.g) {
                *d = -g;
            }
            for t in 0..stored {
                let j = (next + m - 1 - t) % m;
                let sj = &ws.s[j * n..(j + 1) * n];
                let yj = &ws.y[j * n..(j + 1) * n];
                let alpha = ws.rho[j] * dot(sj, &ws.d);
                ws.alpha[j] = alpha;
                for (d, &yv) in ws.d.iter_mut().zip(yj) {
                    *d -= alpha * yv;
                }
            }
            for d in ws.d.iter_mut() {
                *d *= gamma;
            }
            for t in (0..stored).rev() {
                let j = (next + m - 1 - t) % m;
                let sj = &ws.s[j * n..(j + 1) * n];
                let yj = &ws.y[j * n..(j + 1) * n];
                let beta = ws.rho[j] * dot(yj, &ws.d);
                let alpha = ws.alpha[j];
                for (d, &sv) in ws.d.iter_mut().zip(sj) {
                    *d += (alpha - beta) * sv;
                }
            }

            step = 1.0;
            k += 1;
        }
    }
}

fn norm(x: &[f32]) -> f64 {
    x.iter()
        .map(|&v| f64::from(v) * f64::from(v))
        .sum::<f64>()
        .sqrt()
}

fn max_abs(x: &[f32]) -> f64 {
    x.iter().map(|&v| f64::from(v).abs()).fold(0.0, f64::max)
}
