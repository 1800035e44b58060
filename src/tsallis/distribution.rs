//! Tsallis visiting distribution sampler.
//!
//! Implements the exact D-dimensional construction of Schanze (2006):
//!
//! ```text
//! u ~ Gamma((3 - q_V) / (2 (q_V - 1)), 1)
//! y = s * sqrt(u),  s = sqrt(2 (q_V - 1)) / t_V^(1 / (3 - q_V))
//! x_i = n_i / y,    n_i ~ Normal(0, 1)
//! ```
//!
//! All coordinates of one vector draw share the same `y`. Drawing a fresh
//! `u` per coordinate would produce a product of one-dimensional Tsallis
//! variates, which is a different distribution.

use rand::Rng;
use rand_distr::{Distribution, Gamma, StandardNormal};

/// Parameters `(q_V, t_V)` of the visiting distribution and the derived `s`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TsallisParams {
    q_v: f64,
    t_v: f64,
    s: f64,
}

impl TsallisParams {
    /// Creates the parameter set. Requires `1 < q_v < 3` and `t_v > 0`.
    pub fn new(q_v: f64, t_v: f64) -> Self {
        debug_assert!(1.0 < q_v && q_v < 3.0, "q_V must be in (1, 3), got {q_v}");
        debug_assert!(t_v > 0.0, "t_V must be positive, got {t_v}");
        Self {
            q_v,
            t_v,
            s: (2.0 * (q_v - 1.0)).sqrt() / t_v.powf(1.0 / (3.0 - q_v)),
        }
    }

    /// Shape parameter `q_V`.
    pub fn q_v(&self) -> f64 {
        self.q_v
    }

    /// Visiting temperature `t_V`.
    pub fn t_v(&self) -> f64 {
        self.t_v
    }

    /// Derived scale `s`.
    pub fn s(&self) -> f64 {
        self.s
    }
}

fn gamma_for(q_v: f64) -> Gamma<f64> {
    Gamma::new((3.0 - q_v) / (2.0 * (q_v - 1.0)), 1.0)
        .expect("gamma shape is positive for 1 < q_V < 3")
}

/// Stateful sampler of the Tsallis visiting distribution.
///
/// # Examples
///
/// ```
/// use u_gsa::random::create_rng;
/// use u_gsa::tsallis::Tsallis;
///
/// let mut rng = create_rng(7);
/// let dist = Tsallis::new(2.62, 10.0);
///
/// let _one: f32 = dist.sample_one(&mut rng);
/// let step: Vec<f32> = dist.many(&mut rng).take(5).collect();
/// assert_eq!(step.len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct Tsallis {
    gamma: Gamma<f64>,
    params: TsallisParams,
}

impl Tsallis {
    pub fn new(q_v: f64, t_v: f64) -> Self {
        Self {
            gamma: gamma_for(q_v),
            params: TsallisParams::new(q_v, t_v),
        }
    }

    pub fn params(&self) -> TsallisParams {
        self.params
    }

    /// Replaces both parameters. The gamma sampler is rebuilt only when
    /// `q_V` changes.
    pub fn set_params(&mut self, params: TsallisParams) {
        if params.q_v != self.params.q_v {
            self.gamma = gamma_for(params.q_v);
        }
        self.params = params;
    }

    /// Changes `t_V`, keeping `q_V`.
    pub fn set_temperature(&mut self, t_v: f64) {
        self.params = TsallisParams::new(self.params.q_v, t_v);
    }

    fn draw_y<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u = self.gamma.sample(rng);
        self.params.s * u.sqrt()
    }

    /// Draws a single one-dimensional variate with its own `u`.
    pub fn sample_one<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let y = self.draw_y(rng);
        let n: f64 = StandardNormal.sample(rng);
        (n / y) as f32
    }

    /// Starts one vector draw: samples `y` once and returns an endless
    /// iterator of coordinates `n_i / y`. Take exactly `D` items.
    pub fn many<'r, R: Rng + ?Sized>(&self, rng: &'r mut R) -> Visits<'r, R> {
        let y = self.draw_y(rng);
        Visits { rng, inv_y: y.recip() }
    }
}

impl Distribution<f32> for Tsallis {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        self.sample_one(rng)
    }
}

/// Coordinates of one D-dimensional Tsallis draw. See [`Tsallis::many`].
pub struct Visits<'r, R: ?Sized> {
    rng: &'r mut R,
    inv_y: f64,
}

impl<R: Rng + ?Sized> Iterator for Visits<'_, R> {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let n: f64 = StandardNormal.sample(self.rng);
        Some((n * self.inv_y) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;
    use crate::tsallis::density::{density, density_1d};

    #[test]
    fn test_derived_s() {
        let p = TsallisParams::new(1.5, 2.0);
        let expected = 1.0_f64.sqrt() / 2.0_f64.powf(1.0 / 1.5);
        assert!((p.s() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_set_temperature_keeps_q() {
        let mut dist = Tsallis::new(2.62, 100.0);
        dist.set_temperature(0.5);
        assert_eq!(dist.params(), TsallisParams::new(2.62, 0.5));
    }

    #[test]
    fn test_set_params_rebuilds_gamma() {
        let mut a = Tsallis::new(1.5, 1.0);
        a.set_params(TsallisParams::new(2.5, 3.0));
        let b = Tsallis::new(2.5, 3.0);
        let mut rng_a = create_rng(3);
        let mut rng_b = create_rng(3);
        for _ in 0..50 {
            assert_eq!(a.sample_one(&mut rng_a), b.sample_one(&mut rng_b));
        }
    }

    #[test]
    fn test_seeded_draws_replay() {
        let dist = Tsallis::new(2.0, 1.0);
        let mut r1 = create_rng(11);
        let mut r2 = create_rng(11);
        let a: Vec<f32> = dist.many(&mut r1).take(8).collect();
        let b: Vec<f32> = dist.many(&mut r2).take(8).collect();
        assert_eq!(a, b);
    }

    /// Simpson integral of the exact density over `[lo, hi]`.
    fn exact_mass(q_v: f64, t_v: f64, lo: f64, hi: f64) -> f64 {
        let n = 16;
        let h = (hi - lo) / n as f64;
        let mut sum = 0.0;
        for i in 0..=n {
            let w = if i == 0 || i == n {
                1.0
            } else if i % 2 == 1 {
                4.0
            } else {
                2.0
            };
            sum += w * density_1d(q_v, t_v, lo + i as f64 * h);
        }
        sum * h / 3.0
    }

    #[test]
    fn test_histogram_matches_exact_density() {
        let (q_v, t_v) = (1.5, 2.0);
        let (min, max, bins) = (-100.0, 100.0, 400usize);
        let samples = 1_000_000usize;
        let width = (max - min) / bins as f64;

        let dist = Tsallis::new(q_v, t_v);
        let mut rng = create_rng(12_349_827);
        let mut counts = vec![0usize; bins];
        for _ in 0..samples {
            let x = dist.sample_one(&mut rng) as f64;
            if (min..max).contains(&x) {
                counts[((x - min) / width) as usize] += 1;
            }
        }

        // Central bins, |x| <= 3: each holds well over 1% of the mass.
        for (i, &count) in counts.iter().enumerate() {
            let lo = min + i as f64 * width;
            let hi = lo + width;
            if lo < -3.0 || hi > 3.0 {
                continue;
            }
            let expected = exact_mass(q_v, t_v, lo, hi);
            let observed = count as f64 / samples as f64;
            let rel = (observed - expected).abs() / expected;
            assert!(
                rel < 0.05,
                "bin [{lo}, {hi}): observed {observed}, expected {expected}"
            );
        }

        // Log-density curves agree over the bulk of the range.
        for (i, &count) in counts.iter().enumerate() {
            let centre = min + (i as f64 + 0.5) * width;
            if centre.abs() > 6.0 {
                continue;
            }
            let empirical = (count as f64 / samples as f64 / width).ln();
            let exact = density_1d(q_v, t_v, centre).ln();
            assert!(
                (empirical - exact).abs() < 0.15,
                "x = {centre}: ln p = {empirical} vs {exact}"
            );
        }
    }

    #[test]
    fn test_vector_draw_matches_two_dimensional_density() {
        let (q_v, t_v) = (1.5, 2.0);
        let radius = 2.0;
        let samples = 100_000usize;

        let dist = Tsallis::new(q_v, t_v);
        let mut rng = create_rng(1);
        let mut inside = 0usize;
        for _ in 0..samples {
            let mut visits = dist.many(&mut rng);
            let (a, b) = (visits.next().unwrap() as f64, visits.next().unwrap() as f64);
            if a * a + b * b < radius * radius {
                inside += 1;
            }
        }

        // P(|x| < R) = ∫ 2πr p(r) dr.
        let n = 2000;
        let h = radius / n as f64;
        let mut exact = 0.0;
        for i in 0..=n {
            let r = i as f64 * h;
            let w = if i == 0 || i == n {
                1.0
            } else if i % 2 == 1 {
                4.0
            } else {
                2.0
            };
            exact += w * 2.0 * std::f64::consts::PI * r * density(q_v, t_v, &[r, 0.0]);
        }
        exact *= h / 3.0;

        let observed = inside as f64 / samples as f64;
        assert!(
            (observed - exact).abs() < 0.01,
            "observed {observed}, exact {exact}"
        );
    }
}
