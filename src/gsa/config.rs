//! GSA configuration.

/// Parameters of a Generalized Simulated Annealing run.
///
/// Immutable for the duration of a run.
///
/// # Examples
///
/// ```
/// use u_gsa::gsa::GsaConfig;
///
/// let config = GsaConfig::default()
///     .with_visiting(2.67)
///     .with_acceptance(-5.0)
///     .with_initial_temperature(10.0)
///     .with_max_iterations(1000)
///     .with_patience(20)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GsaConfig {
    /// Visiting distribution shape `q_V`, in (1, 3).
    ///
    /// Larger values give heavier tails and longer jumps.
    pub q_v: f64,

    /// Acceptance shape `q_A`.
    ///
    /// Values below 1 make uphill moves rarer; `q_A → 1` is the classic
    /// Metropolis rule. Typical: -5.
    pub q_a: f64,

    /// Initial visiting temperature `t_0`.
    pub t0: f64,

    /// Maximum number of chain iterations.
    pub max_iterations: usize,

    /// Consecutive non-improving iterations tolerated before stopping.
    pub patience: usize,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for GsaConfig {
    fn default() -> Self {
        Self {
            q_v: 2.62,
            q_a: -5.0,
            t0: 5230.0,
            max_iterations: 1000,
            patience: 50,
            seed: None,
        }
    }
}

impl GsaConfig {
    pub fn with_visiting(mut self, q_v: f64) -> Self {
        self.q_v = q_v;
        self
    }

    pub fn with_acceptance(mut self, q_a: f64) -> Self {
        self.q_a = q_a;
        self
    }

    pub fn with_initial_temperature(mut self, t0: f64) -> Self {
        self.t0 = t0;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_patience(mut self, n: usize) -> Self {
        self.patience = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.q_v > 1.0 && self.q_v < 3.0) {
            return Err(format!("q_v must be in (1, 3), got {}", self.q_v));
        }
        if !self.q_a.is_finite() {
            return Err(format!("q_a must be finite, got {}", self.q_a));
        }
        if !(self.t0 > 0.0 && self.t0.is_finite()) {
            return Err(format!("t0 must be positive and finite, got {}", self.t0));
        }
        if self.patience == 0 {
            return Err("patience must be at least 1".into());
        }
        Ok(())
    }
}
