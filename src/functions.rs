//! Benchmark objectives.

use crate::gsa::{wrap_periodic, Differentiable, Objective};
use std::f64::consts::PI;

/// The Rastrigin function on a periodic box:
///
/// ```text
/// f(x) = Σ (x_i² - A cos(2π x_i) + A),  A = 10
/// ```
///
/// Global minimum `0` at the origin, with a local minimum near every
/// integer lattice point. Implements incremental evaluation and gradients.
///
/// # Examples
///
/// ```
/// use u_gsa::functions::Rastrigin;
/// use u_gsa::gsa::Objective;
///
/// let f = Rastrigin::default();
/// assert_eq!(f.value(&[0.0, 0.0, 0.0]), 0.0);
/// assert!((f.value(&[1.0]) - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rastrigin {
    pub lower: f32,
    pub upper: f32,
}

impl Rastrigin {
    const A: f64 = 10.0;

    pub fn new(lower: f32, upper: f32) -> Self {
        debug_assert!(lower < upper, "empty box [{lower}, {upper})");
        Self { lower, upper }
    }

    fn term(x: f32) -> f64 {
        let x = f64::from(x);
        x * x - Self::A * (2.0 * PI * x).cos() + Self::A
    }
}

impl Default for Rastrigin {
    fn default() -> Self {
        Self::new(-5.12, 5.12)
    }
}

impl Objective for Rastrigin {
    fn value(&self, x: &[f32]) -> f64 {
        x.iter().map(|&v| Self::term(v)).sum()
    }

    fn wrap(&self, x: f32) -> f32 {
        wrap_periodic(x, self.lower, self.upper)
    }

    fn value_from_diff(&self, x: &[f32], func: f64, index: usize, new_value: f32) -> Option<f64> {
        Some(func - Self::term(x[index]) + Self::term(new_value))
    }
}

impl Differentiable for Rastrigin {
    fn value_and_gradient(&self, x: &[f32], gradient: &mut [f32]) -> f64 {
        debug_assert_eq!(x.len(), gradient.len());
        for (g, &v) in gradient.iter_mut().zip(x) {
            let v = f64::from(v);
            *g = (2.0 * v + 2.0 * PI * Self::A * (2.0 * PI * v).sin()) as f32;
        }
        self.value(x)
    }
}

/// `f(x) = Σ x_i²` on a periodic box.
///
/// Value-only: no incremental evaluation, no gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sphere {
    pub lower: f32,
    pub upper: f32,
}

impl Sphere {
    pub fn new(lower: f32, upper: f32) -> Self {
        debug_assert!(lower < upper, "empty box [{lower}, {upper})");
        Self { lower, upper }
    }
}

impl Objective for Sphere {
    fn value(&self, x: &[f32]) -> f64 {
        x.iter().map(|&v| f64::from(v) * f64::from(v)).sum()
    }

    fn wrap(&self, x: f32) -> f32 {
        wrap_periodic(x, self.lower, self.upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rastrigin_minimum_and_lattice() {
        let f = Rastrigin::default();
        assert_eq!(f.value(&[0.0; 10]), 0.0);
        // Near-integer points: f ≈ Σ x_i².
        assert!((f.value(&[1.0, -2.0]) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_rastrigin_gradient_matches_finite_differences() {
        let f = Rastrigin::default();
        let x = [0.3_f32, -1.7, 2.25];
        let mut g = [0.0_f32; 3];
        let value = f.value_and_gradient(&x, &mut g);
        assert_eq!(value, f.value(&x));
        for i in 0..3 {
            let h = 1e-3_f32;
            let mut up = x;
            let mut down = x;
            up[i] += h;
            down[i] -= h;
            let fd = (f.value(&up) - f.value(&down)) / f64::from(up[i] - down[i]);
            assert!((fd - f64::from(g[i])).abs() < 0.05 * (1.0 + fd.abs()), "{i}: {fd} vs {}", g[i]);
        }
    }

    #[test]
    fn test_rastrigin_wraps_into_box() {
        let f = Rastrigin::default();
        assert!((f.wrap(5.12 + 1.0) - (-5.12 + 1.0)).abs() < 1e-5);
        assert!((f.wrap(-6.0) - 4.24).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_has_no_incremental_evaluation() {
        let f = Sphere::new(-1.0, 1.0);
        assert_eq!(f.value(&[0.5, -0.5]), 0.5);
        assert_eq!(f.value_from_diff(&[0.5, -0.5], 0.5, 0, 0.0), None);
    }

    proptest! {
        #[test]
        fn prop_value_from_diff_matches_value(
            x in proptest::collection::vec(-5.12_f32..5.12, 10),
            index in 0usize..10,
            new_value in -5.12_f32..5.12,
        ) {
            let f = Rastrigin::default();
            let func = f.value(&x);
            let incremental = f.value_from_diff(&x, func, index, new_value).unwrap();
            let mut changed = x.clone();
            changed[index] = new_value;
            let full = f.value(&changed);
            prop_assert!((incremental - full).abs() < 1e-9, "{} vs {}", incremental, full);
        }
    }
}
