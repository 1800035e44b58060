//! Objective capabilities consumed by the annealing chain.

/// A scalar objective over a bounded box of `f32` coordinates.
///
/// This is the value-only capability. Two optional capabilities layer on
/// top of it:
///
/// - incremental evaluation, by overriding
///   [`value_from_diff`](Objective::value_from_diff);
/// - gradients for local search, by implementing [`Differentiable`].
///
/// # Examples
///
/// ```
/// use u_gsa::gsa::{wrap_periodic, Objective};
///
/// struct Parabola;
///
/// impl Objective for Parabola {
///     fn value(&self, x: &[f32]) -> f64 {
///         x.iter().map(|&v| f64::from(v) * f64::from(v)).sum()
///     }
///
///     fn wrap(&self, x: f32) -> f32 {
///         wrap_periodic(x, -10.0, 10.0)
///     }
/// }
///
/// assert_eq!(Parabola.value(&[3.0, 4.0]), 25.0);
/// assert_eq!(Parabola.wrap(12.0), -8.0);
/// ```
pub trait Objective {
    /// Objective value at `x`. Lower is better.
    fn value(&self, x: &[f32]) -> f64;

    /// Maps a perturbed coordinate back into the valid domain.
    fn wrap(&self, x: f32) -> f32;

    /// Value at `x` with coordinate `index` replaced by `new_value`, given
    /// that `value(x) == func`.
    ///
    /// Returning `None` (the default) means the objective cannot do better
    /// than a full evaluation; the chain then mutates the coordinate in
    /// place, calls [`value`](Objective::value) and restores it. An override
    /// must agree with `value` on the mutated vector.
    fn value_from_diff(&self, x: &[f32], func: f64, index: usize, new_value: f32) -> Option<f64> {
        let _ = (x, func, index, new_value);
        None
    }
}

/// Objectives that can supply a gradient, as required by local search.
pub trait Differentiable: Objective {
    /// Writes `∇f(x)` into `gradient` and returns `f(x)`.
    fn value_and_gradient(&self, x: &[f32], gradient: &mut [f32]) -> f64;
}

impl<T: Objective + ?Sized> Objective for &T {
    fn value(&self, x: &[f32]) -> f64 {
        (**self).value(x)
    }

    fn wrap(&self, x: f32) -> f32 {
        (**self).wrap(x)
    }

    fn value_from_diff(&self, x: &[f32], func: f64, index: usize, new_value: f32) -> Option<f64> {
        (**self).value_from_diff(x, func, index, new_value)
    }
}

impl<T: Differentiable + ?Sized> Differentiable for &T {
    fn value_and_gradient(&self, x: &[f32], gradient: &mut [f32]) -> f64 {
        (**self).value_and_gradient(x, gradient)
    }
}

/// Periodic wrap of `x` into `[lo, hi)`.
pub fn wrap_periodic(x: f32, lo: f32, hi: f32) -> f32 {
    debug_assert!(lo < hi, "empty interval [{lo}, {hi})");
    let length = hi - lo;
    let delta = ((x - lo) % length + length) % length;
    // `delta` can round up to `length` for tiny negative remainders.
    if delta >= length {
        lo
    } else {
        lo + delta
    }
}

/// Evaluates `x` with `x[index] = new_value`, restoring the coordinate
/// afterwards even if `value` unwinds.
pub(crate) fn value_with_coordinate<O: Objective + ?Sized>(
    objective: &O,
    x: &mut [f32],
    index: usize,
    new_value: f32,
) -> f64 {
    struct Restore<'a> {
        x: &'a mut [f32],
        index: usize,
        old: f32,
    }

    impl Drop for Restore<'_> {
        fn drop(&mut self) {
            self.x[self.index] = self.old;
        }
    }

    let old = std::mem::replace(&mut x[index], new_value);
    let guard = Restore { x, index, old };
    let func = objective.value(guard.x);
    drop(guard);
    func
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct Sum;

    impl Objective for Sum {
        fn value(&self, x: &[f32]) -> f64 {
            x.iter().map(|&v| f64::from(v)).sum()
        }

        fn wrap(&self, x: f32) -> f32 {
            x
        }
    }

    #[test]
    fn test_default_value_from_diff_is_absent() {
        assert_eq!(Sum.value_from_diff(&[1.0, 2.0], 3.0, 0, 5.0), None);
    }

    #[test]
    fn test_value_with_coordinate_restores() {
        let mut x = [1.0, 2.0, 3.0];
        let v = value_with_coordinate(&Sum, &mut x, 1, 10.0);
        assert_eq!(v, 14.0);
        assert_eq!(x, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_value_with_coordinate_restores_on_panic() {
        struct Boom;
        impl Objective for Boom {
            fn value(&self, _x: &[f32]) -> f64 {
                panic!("boom")
            }
            fn wrap(&self, x: f32) -> f32 {
                x
            }
        }

        let mut x = vec![1.0_f32, 2.0];
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            value_with_coordinate(&Boom, &mut x, 0, 9.0)
        }));
        assert!(result.is_err());
        assert_eq!(x, vec![1.0, 2.0]);
    }

    #[test]
    fn test_wrap_periodic_examples() {
        assert_eq!(wrap_periodic(0.5, 0.0, 1.0), 0.5);
        assert_eq!(wrap_periodic(1.0, 0.0, 1.0), 0.0);
        assert_eq!(wrap_periodic(-0.25, 0.0, 1.0), 0.75);
        assert_eq!(wrap_periodic(12.0, -10.0, 10.0), -8.0);
    }

    proptest! {
        #[test]
        fn prop_wrap_periodic_in_range(x in -1.0e6_f32..1.0e6) {
            let w = wrap_periodic(x, -5.12, 5.12);
            prop_assert!((-5.12..5.12).contains(&w), "wrap({}) = {}", x, w);
        }
    }
}
