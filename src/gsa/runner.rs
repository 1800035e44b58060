//! GSA execution loop.

use super::chain::Chain;
use super::config::GsaConfig;
use super::local::{LocalSearch, LocalSolver, LocalStatus, NoRefine, Refine};
use super::types::{Differentiable, Objective};
use crate::error::GsaError;
use crate::random::create_rng;
use crate::workspace::{with_thread_local, Buffers, Slot};
use rand::Rng;
use tracing::{debug, warn};

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// `max_iterations` chain steps were performed.
    MaxIterations,
    /// The best value did not improve for `patience` consecutive steps.
    Patience,
    /// The local solver failed hard; the result holds the best point found
    /// before the failure.
    LocalSearchFailed(LocalStatus),
}

/// Result of a GSA run.
///
/// The best point itself is written back into the caller's vector.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GsaResult {
    /// Objective value at the best point.
    pub func: f64,

    /// Completed chain iterations.
    pub iterations: usize,

    /// Objective evaluations, local search included.
    pub num_f_evals: usize,

    /// Fraction of accepted chain moves. NaN when no iteration ran.
    pub acceptance: f64,

    /// Stopping reason.
    pub termination: Termination,
}

/// Executes Generalized Simulated Annealing.
///
/// # Examples
///
/// ```
/// use u_gsa::functions::Rastrigin;
/// use u_gsa::gsa::{GsaConfig, GsaRunner};
/// use u_gsa::lbfgs::{Lbfgs, LbfgsConfig};
///
/// let objective = Rastrigin::default();
/// let config = GsaConfig::default()
///     .with_visiting(2.67)
///     .with_initial_temperature(10.0)
///     .with_patience(20)
///     .with_seed(3);
/// let mut x = vec![2.5_f32; 5];
///
/// let solver = Lbfgs::new(LbfgsConfig::default());
/// let result = GsaRunner::run_with_local_search(&objective, &mut x, &config, solver).unwrap();
/// assert!(result.func < 1e-3);
/// assert!(x.iter().all(|v| v.abs() < 1e-2));
/// ```
pub struct GsaRunner;

impl GsaRunner {
    /// Minimises `objective` from `x` by annealing alone.
    ///
    /// Uses this thread's cached workspace and an RNG seeded from
    /// `config.seed`. On success `x` holds the best point found.
    pub fn run<O>(objective: &O, x: &mut [f32], config: &GsaConfig) -> Result<GsaResult, GsaError>
    where
        O: Objective + ?Sized,
    {
        let mut rng = seeded_rng(config);
        with_thread_local(|buffers| Self::minimize_with(objective, x, config, buffers, &mut rng))
    }

    /// Like [`run`](Self::run), with `solver` refining the current point
    /// before the first step and after every step that improves the best
    /// value.
    pub fn run_with_local_search<O, S>(
        objective: &O,
        x: &mut [f32],
        config: &GsaConfig,
        solver: S,
    ) -> Result<GsaResult, GsaError>
    where
        O: Differentiable + ?Sized,
        S: LocalSolver,
    {
        let mut rng = seeded_rng(config);
        let mut search = LocalSearch::new(solver);
        with_thread_local(|buffers| {
            Self::minimize_with_local_search(objective, x, config, &mut search, buffers, &mut rng)
        })
    }

    /// Annealing alone, over caller-provided buffers and generator.
    pub fn minimize_with<O, R>(
        objective: &O,
        x: &mut [f32],
        config: &GsaConfig,
        buffers: &mut Buffers,
        rng: &mut R,
    ) -> Result<GsaResult, GsaError>
    where
        O: Objective + ?Sized,
        R: Rng + ?Sized,
    {
        drive(objective, x, config, &mut NoRefine, buffers, rng)
    }

    /// Annealing with local search, over caller-provided buffers and
    /// generator.
    pub fn minimize_with_local_search<O, S, R>(
        objective: &O,
        x: &mut [f32],
        config: &GsaConfig,
        search: &mut LocalSearch<S>,
        buffers: &mut Buffers,
        rng: &mut R,
    ) -> Result<GsaResult, GsaError>
    where
        O: Differentiable + ?Sized,
        S: LocalSolver,
        R: Rng + ?Sized,
    {
        drive(objective, x, config, search, buffers, rng)
    }
}

#[cfg(feature = "parallel")]
impl GsaRunner {
    /// Runs one independent annealing per start point on the rayon pool.
    ///
    /// Runs share nothing but `objective`; each thread uses its own cached
    /// workspace. With a seed, start `k` is annealed with
    /// `seed.wrapping_add(k)`, so the outcome does not depend on scheduling.
    pub fn run_independent<O>(
        objective: &O,
        starts: &mut [Vec<f32>],
        config: &GsaConfig,
    ) -> Vec<Result<GsaResult, GsaError>>
    where
        O: Objective + Sync + ?Sized,
    {
        use rayon::prelude::*;

        starts
            .par_iter_mut()
            .enumerate()
            .map(|(k, x)| {
                let config = match config.seed {
                    Some(seed) => config.clone().with_seed(seed.wrapping_add(k as u64)),
                    None => config.clone(),
                };
                Self::run(objective, x, &config)
            })
            .collect()
    }
}

fn seeded_rng(config: &GsaConfig) -> crate::random::GsaRng {
    match config.seed {
        Some(seed) => create_rng(seed),
        None => create_rng(rand::random()),
    }
}

fn drive<O, F, R>(
    objective: &O,
    x: &mut [f32],
    config: &GsaConfig,
    refine: &mut F,
    buffers: &mut Buffers,
    rng: &mut R,
) -> Result<GsaResult, GsaError>
where
    O: Objective + ?Sized,
    F: Refine<O>,
    R: Rng + ?Sized,
{
    debug_assert!(config.validate().is_ok(), "{:?}", config.validate());
    let dim = x.len();
    if let Err(err) = buffers.resize(dim) {
        warn!(dim, %err, "could not acquire a workspace");
        return Err(err.into());
    }

    let mut workspace = buffers.workspace();
    workspace.copy_from(Slot::Current, x);
    let mut chain = Chain::new(objective, workspace, config, rng);
    debug!(dim, func = chain.workspace().current().func, "gsa started");

    let termination = anneal(&mut chain, config, refine);

    let best = chain.workspace().best();
    x.copy_from_slice(best.x);
    let result = GsaResult {
        func: best.func,
        iterations: chain.iteration(),
        num_f_evals: chain.num_f_evals(),
        acceptance: chain.acceptance(),
        termination,
    };
    debug!(
        func = result.func,
        iterations = result.iterations,
        num_f_evals = result.num_f_evals,
        ?termination,
        "gsa finished"
    );
    Ok(result)
}

/// Steps the chain under the patience policy, refining after every
/// improvement of the best value.
fn anneal<O, F, R>(chain: &mut Chain<'_, O, R>, config: &GsaConfig, refine: &mut F) -> Termination
where
    O: Objective + ?Sized,
    F: Refine<O>,
    R: Rng + ?Sized,
{
    if let Err(status) = refine.refine(chain) {
        return Termination::LocalSearchFailed(status);
    }

    let mut last_best = chain.workspace().best().func;
    let mut patience = config.patience;
    loop {
        if chain.iteration() >= config.max_iterations {
            return Termination::MaxIterations;
        }
        if patience == 0 {
            debug!(iteration = chain.iteration(), "patience exhausted");
            return Termination::Patience;
        }

        chain.advance();

        if chain.workspace().best().func < last_best {
            patience = config.patience;
            if let Err(status) = refine.refine(chain) {
                return Termination::LocalSearchFailed(status);
            }
            last_best = chain.workspace().best().func;
        } else {
            patience -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::{Rastrigin, Sphere};
    use crate::gsa::LocalOutcome;
    use crate::lbfgs::{Lbfgs, LbfgsConfig};

    struct Flat;

    impl Objective for Flat {
        fn value(&self, _x: &[f32]) -> f64 {
            1.0
        }

        fn wrap(&self, x: f32) -> f32 {
            crate::gsa::wrap_periodic(x, -1.0, 1.0)
        }
    }

    struct Failing;

    impl LocalSolver for Failing {
        fn minimize<O: Differentiable + ?Sized>(&mut self, objective: &O, x: &mut [f32]) -> LocalOutcome {
            x.fill(0.0);
            LocalOutcome {
                status: LocalStatus::IncreaseGradient,
                func: objective.value(x),
                num_f_evals: 1,
            }
        }
    }

    /// Gives up softly on the first call and fails hard on every later one.
    #[derive(Default)]
    struct FailsAfterFirst {
        calls: usize,
    }

    impl LocalSolver for FailsAfterFirst {
        fn minimize<O: Differentiable + ?Sized>(&mut self, objective: &O, x: &mut [f32]) -> LocalOutcome {
            self.calls += 1;
            let status = if self.calls == 1 {
                LocalStatus::TooManyIterations
            } else {
                LocalStatus::IncreaseGradient
            };
            LocalOutcome {
                status,
                func: objective.value(x),
                num_f_evals: 1,
            }
        }
    }

    fn rastrigin_config() -> GsaConfig {
        GsaConfig::default()
            .with_visiting(2.67)
            .with_acceptance(-5.0)
            .with_initial_temperature(10.0)
            .with_max_iterations(1000)
            .with_patience(20)
    }

    fn start_point(dim: usize, seed: u64) -> Vec<f32> {
        let mut rng = create_rng(seed);
        (0..dim).map(|_| rng.random_range(-1.0..3.0)).collect()
    }

    #[test]
    fn test_patience_stops_without_improvement() {
        let config = GsaConfig::default().with_patience(5).with_seed(1);
        let mut x = vec![0.5_f32; 3];
        let result = GsaRunner::run(&Flat, &mut x, &config).unwrap();
        assert_eq!(result.termination, Termination::Patience);
        assert_eq!(result.iterations, 5);
        assert!(result.iterations < config.max_iterations);
        assert_eq!(result.func, 1.0);
        assert_eq!(result.num_f_evals, 1 + 5 * 2 * 3);
    }

    #[test]
    fn test_max_iterations() {
        let config = GsaConfig::default()
            .with_max_iterations(3)
            .with_patience(100)
            .with_seed(2);
        let mut x = vec![0.7_f32; 4];
        let result = GsaRunner::run(&Sphere::new(-1.0, 1.0), &mut x, &config).unwrap();
        assert_eq!(result.termination, Termination::MaxIterations);
        assert_eq!(result.iterations, 3);
        assert!(result.func <= 4.0 * 0.49);
        assert_eq!(result.func, Sphere::new(-1.0, 1.0).value(&x));
    }

    #[test]
    fn test_zero_iterations_returns_start() {
        let config = GsaConfig::default().with_max_iterations(0).with_seed(2);
        let mut x = vec![1.0_f32, -2.0];
        let objective = Rastrigin::default();
        let result = GsaRunner::run(&objective, &mut x, &config).unwrap();
        assert_eq!(result.iterations, 0);
        assert!(result.acceptance.is_nan());
        assert_eq!(x, vec![1.0, -2.0]);
        assert_eq!(result.func, objective.value(&x));
    }

    #[test]
    fn test_explicit_buffers_are_reused() {
        let objective = Rastrigin::default();
        let config = rastrigin_config().with_max_iterations(5);
        let mut buffers = Buffers::new();
        let mut rng = create_rng(9);

        let mut x = start_point(8, 1);
        GsaRunner::minimize_with(&objective, &mut x, &config, &mut buffers, &mut rng).unwrap();
        let capacity = buffers.capacity();

        let mut y = start_point(4, 2);
        GsaRunner::minimize_with(&objective, &mut y, &config, &mut buffers, &mut rng).unwrap();
        assert_eq!(buffers.capacity(), capacity);
        assert_eq!(buffers.size(), 4);
    }

    #[test]
    fn test_seed_reproducibility() {
        let objective = Rastrigin::default();
        let config = rastrigin_config().with_max_iterations(50).with_seed(42);
        let mut a = start_point(6, 3);
        let mut b = a.clone();
        let ra = GsaRunner::run(&objective, &mut a, &config).unwrap();
        let rb = GsaRunner::run(&objective, &mut b, &config).unwrap();
        assert_eq!(a, b);
        assert_eq!(ra.func, rb.func);
        assert_eq!(ra.iterations, rb.iterations);
        assert_eq!(ra.num_f_evals, rb.num_f_evals);
    }

    #[test]
    fn test_hard_local_failure_stops_immediately() {
        let objective = Rastrigin::default();
        let config = rastrigin_config().with_seed(4);
        let start = vec![1.5_f32, 2.5, -0.5];
        let mut x = start.clone();
        let result = GsaRunner::run_with_local_search(&objective, &mut x, &config, Failing).unwrap();
        assert_eq!(
            result.termination,
            Termination::LocalSearchFailed(LocalStatus::IncreaseGradient)
        );
        assert_eq!(result.iterations, 0);
        assert_eq!(x, start);
        assert_eq!(result.func, objective.value(&start));
        assert_eq!(result.num_f_evals, 2);
    }

    #[test]
    fn test_hard_local_failure_after_improvement() {
        let objective = Rastrigin::default();
        let config = rastrigin_config().with_seed(4);
        let start = vec![1.5_f32, 2.5, -0.5];
        let mut x = start.clone();
        let mut solver = FailsAfterFirst::default();
        let result =
            GsaRunner::run_with_local_search(&objective, &mut x, &config, &mut solver).unwrap();
        assert_eq!(solver.calls, 2);
        assert_eq!(
            result.termination,
            Termination::LocalSearchFailed(LocalStatus::IncreaseGradient)
        );
        assert!(result.iterations >= 1);
        assert!(result.func < objective.value(&start));
        // `best.func` may come from incremental updates.
        assert!((objective.value(&x) - result.func).abs() < 1e-9);
    }

    #[test]
    fn test_rastrigin_with_local_search_reaches_global_minimum() {
        let objective = Rastrigin::default();
        let config = rastrigin_config().with_seed(12_345);
        let mut x = start_point(10, 12_345);
        let solver = Lbfgs::new(LbfgsConfig::default().with_x_tol(1e-5));

        let result = GsaRunner::run_with_local_search(&objective, &mut x, &config, solver).unwrap();
        assert!(result.func < 1e-3, "func = {}", result.func);
        assert!(result.iterations < config.max_iterations);
        assert!((objective.value(&x) - result.func).abs() < 1e-9);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_independent_runs_match_sequential() {
        let objective = Rastrigin::default();
        let config = rastrigin_config().with_max_iterations(30).with_seed(100);
        let mut starts: Vec<Vec<f32>> = (0..4).map(|k| start_point(5, k)).collect();
        let mut expected = starts.clone();

        let results = GsaRunner::run_independent(&objective, &mut starts, &config);
        for (k, (x, result)) in expected.iter_mut().zip(results).enumerate() {
            let config = config.clone().with_seed(100 + k as u64);
            let sequential = GsaRunner::run(&objective, x, &config).unwrap();
            assert_eq!(result.unwrap(), sequential);
        }
        assert_eq!(starts, expected);
    }

    #[test]
    fn test_rastrigin_annealing_only() {
        let objective = Rastrigin::default();
        let config = rastrigin_config().with_patience(1000).with_seed(7);
        let mut x = start_point(10, 7);

        let result = GsaRunner::run(&objective, &mut x, &config).unwrap();
        assert!(result.func < 1e-2, "func = {}", result.func);
        assert!(result.acceptance > 0.0 && result.acceptance < 1.0);
        assert_eq!(result.num_f_evals, 1 + result.iterations * 2 * 10);
    }
}
