//! L-BFGS configuration.

/// Parameters of the L-BFGS local solver.
///
/// # Examples
///
/// ```
/// use u_gsa::lbfgs::LbfgsConfig;
///
/// let config = LbfgsConfig::default().with_memory(8).with_x_tol(1e-5);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LbfgsConfig {
    /// Number of correction pairs kept for the inverse Hessian estimate.
    pub m: usize,

    /// Gradient convergence: stop when `‖g‖ ≤ epsilon · max(1, ‖x‖)`.
    pub epsilon: f64,

    /// Distance, in iterations, of the relative decrease test. 0 disables it.
    pub past: usize,

    /// Relative decrease threshold: stop when
    /// `|f(k - past) - f(k)| / |f(k)| < delta`.
    pub delta: f64,

    /// Maximum number of iterations. 0 means no limit.
    pub max_iterations: usize,

    /// Maximum objective evaluations per line search.
    pub max_linesearch: usize,

    /// Smallest allowed line-search step.
    pub min_step: f64,

    /// Largest allowed line-search step.
    pub max_step: f64,

    /// Sufficient decrease (Armijo) constant, in (0, 0.5).
    pub ftol: f64,

    /// Curvature constant of the strong Wolfe condition, in (ftol, 1).
    pub gtol: f64,

    /// Step convergence: stop when the largest coordinate change is at most
    /// `x_tol · max(1, ‖x‖∞)`.
    pub x_tol: f64,
}

impl Default for LbfgsConfig {
    fn default() -> Self {
        Self {
            m: 6,
            epsilon: 1e-5,
            past: 0,
            delta: 1e-5,
            max_iterations: 100,
            max_linesearch: 20,
            min_step: 1e-20,
            max_step: 1e20,
            ftol: 1e-4,
            gtol: 0.9,
            x_tol: 1e-5,
        }
    }
}

impl LbfgsConfig {
    pub fn with_memory(mut self, m: usize) -> Self {
        self.m = m;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Enables the relative decrease test over `past` iterations.
    pub fn with_past(mut self, past: usize, delta: f64) -> Self {
        self.past = past;
        self.delta = delta;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_max_linesearch(mut self, n: usize) -> Self {
        self.max_linesearch = n;
        self
    }

    pub fn with_wolfe(mut self, ftol: f64, gtol: f64) -> Self {
        self.ftol = ftol;
        self.gtol = gtol;
        self
    }

    pub fn with_x_tol(mut self, x_tol: f64) -> Self {
        self.x_tol = x_tol;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.m == 0 {
            return Err("m must be at least 1".into());
        }
        if !(self.epsilon >= 0.0) {
            return Err(format!("epsilon must be non-negative, got {}", self.epsilon));
        }
        if self.past > 0 && !(self.delta >= 0.0) {
            return Err(format!("delta must be non-negative, got {}", self.delta));
        }
        if self.max_linesearch == 0 {
            return Err("max_linesearch must be at least 1".into());
        }
        if !(self.min_step > 0.0 && self.min_step < self.max_step) {
            return Err(format!(
                "need 0 < min_step < max_step, got {} and {}",
                self.min_step, self.max_step
            ));
        }
        if !(self.ftol > 0.0 && self.ftol < 0.5) {
            return Err(format!("ftol must be in (0, 0.5), got {}", self.ftol));
        }
        if !(self.gtol > self.ftol && self.gtol < 1.0) {
            return Err(format!("gtol must be in (ftol, 1), got {}", self.gtol));
        }
        if !(self.x_tol >= 0.0) {
            return Err(format!("x_tol must be non-negative, got {}", self.x_tol));
        }
        Ok(())
    }
}
