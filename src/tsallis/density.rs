//! Exact density of the D-dimensional Tsallis visiting distribution.
//!
//! ```text
//! p(x) = c(D) * (1 + a |x|^2)^b
//! a    = (q_V - 1) t_V^(-2 / (3 - q_V))
//! b    = 1 / (1 - q_V) + (1 - D) / 2
//! c(D) = ((q_V - 1) / π)^(D/2)
//!        * Γ(1 / (q_V - 1) + (D - 1) / 2) / Γ(1 / (q_V - 1) - 1/2)
//!        * t_V^(D / (q_V - 3))
//! ```
//!
//! Used for validation against sampled histograms, not by the chain.

use crate::special::ln_gamma;
use std::f64::consts::PI;

/// Natural logarithm of the density at `x`; the dimension is `x.len()`.
pub fn ln_density(q_v: f64, t_v: f64, x: &[f64]) -> f64 {
    debug_assert!(1.0 < q_v && q_v < 3.0, "q_V must be in (1, 3), got {q_v}");
    debug_assert!(t_v > 0.0, "t_V must be positive, got {t_v}");
    let d = x.len() as f64;
    let norm2: f64 = x.iter().map(|v| v * v).sum();
    let inv = 1.0 / (q_v - 1.0);

    let a = (q_v - 1.0) * t_v.powf(-2.0 / (3.0 - q_v));
    let b = 1.0 / (1.0 - q_v) + (1.0 - d) / 2.0;
    let ln_scale = 0.5 * d * ((q_v - 1.0) / PI).ln() + ln_gamma(inv + (d - 1.0) / 2.0)
        - ln_gamma(inv - 0.5)
        + d / (q_v - 3.0) * t_v.ln();

    ln_scale + b * (a * norm2).ln_1p()
}

/// Density at the point `x`.
pub fn density(q_v: f64, t_v: f64, x: &[f64]) -> f64 {
    ln_density(q_v, t_v, x).exp()
}

/// Density of the one-dimensional distribution at `x`.
pub fn density_1d(q_v: f64, t_v: f64, x: f64) -> f64 {
    density(q_v, t_v, &[x])
}
