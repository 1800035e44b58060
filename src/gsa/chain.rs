//! The GSA Markov chain.
//!
//! One [`Chain::advance`] call performs a full step at the current
//! temperature:
//!
//! 1. cool down: `t_V(i)` from [`visiting_temperature`], `t_A = t_V / (i + 1)`;
//! 2. `D` full-vector moves `current + Tsallis(q_V, t_V)`, each wrapped into
//!    the domain and accepted by the generalised Metropolis rule;
//! 3. `D` single-coordinate moves, evaluated incrementally;
//! 4. `i += 1`.
//!
//! All moves work in place on a [`Workspace`]; no step allocates.

use super::config::GsaConfig;
use super::types::{value_with_coordinate, Objective};
use crate::tsallis::Tsallis;
use crate::workspace::{Slot, Workspace};
use rand::Rng;
use tracing::trace;

/// Largest magnitude of a single visit. Keeps candidates finite when the
/// gamma draw is (nearly) zero.
const MAX_VISIT: f32 = 1.0e8;

/// Visiting temperature at iteration `i`:
/// `t_0 (2^(q_V - 1) - 1) / ((2 + i)^(q_V - 1) - 1)`.
pub fn visiting_temperature(t0: f64, q_v: f64, i: usize) -> f64 {
    let exponent = q_v - 1.0;
    t0 * (2.0_f64.powf(exponent) - 1.0) / ((2.0 + i as f64).powf(exponent) - 1.0)
}

/// Generalised Metropolis acceptance probability of an energy change
/// `delta` at acceptance temperature `t_a`.
///
/// Downhill moves have probability 1. Otherwise
/// `P = (1 + (q_A - 1) delta / t_A)^(1 / (1 - q_A))`, or 0 if the base is
/// not positive. `q_A == 1` is the classic `exp(-delta / t_A)`.
pub fn acceptance_probability(delta: f64, t_a: f64, q_a: f64) -> f64 {
    if delta < 0.0 {
        return 1.0;
    }
    if q_a == 1.0 {
        return (-delta / t_a).exp();
    }
    let factor = 1.0 + (q_a - 1.0) * delta / t_a;
    if factor <= 0.0 {
        0.0
    } else {
        factor.powf(1.0 / (1.0 - q_a))
    }
}

fn clamp_visit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(-MAX_VISIT, MAX_VISIT)
    }
}

/// Counters owned by a [`Chain`]. All of them only grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChainState {
    /// Completed [`Chain::advance`] calls.
    pub iteration: usize,
    /// Accepted moves, both phases.
    pub num_accepted: usize,
    /// Objective evaluations, incremental ones included.
    pub num_f_evals: usize,
}

/// Markov chain over a borrowed [`Workspace`].
///
/// # Examples
///
/// ```
/// use u_gsa::functions::Rastrigin;
/// use u_gsa::gsa::{Chain, GsaConfig};
/// use u_gsa::random::create_rng;
/// use u_gsa::workspace::{Buffers, Slot};
///
/// let objective = Rastrigin::default();
/// let config = GsaConfig::default().with_initial_temperature(10.0);
/// let mut buffers = Buffers::with_size(4).unwrap();
/// let mut workspace = buffers.workspace();
/// workspace.copy_from(Slot::Current, &[1.0, 2.0, -1.5, 0.5]);
/// let mut rng = create_rng(1);
///
/// let mut chain = Chain::new(&objective, workspace, &config, &mut rng);
/// for _ in 0..10 {
///     chain.advance();
/// }
/// assert!(chain.workspace().best().func <= chain.workspace().current().func);
/// ```
pub struct Chain<'a, O: ?Sized, R: ?Sized> {
    objective: &'a O,
    workspace: Workspace<'a>,
    config: &'a GsaConfig,
    rng: &'a mut R,
    sampler: Tsallis,
    state: ChainState,
}

impl<'a, O, R> Chain<'a, O, R>
where
    O: Objective + ?Sized,
    R: Rng + ?Sized,
{
    /// Starts a chain at `workspace.current().x`.
    ///
    /// Evaluates the starting point, copies it into `best` and clears
    /// `proposed`.
    pub fn new(
        objective: &'a O,
        mut workspace: Workspace<'a>,
        config: &'a GsaConfig,
        rng: &'a mut R,
    ) -> Self {
        debug_assert!(config.validate().is_ok(), "{:?}", config.validate());
        let func = objective.value(workspace.current().x);
        workspace.set_func(Slot::Current, func);
        workspace.assign(Slot::Best, Slot::Current);
        workspace.x_mut(Slot::Proposed).fill(0.0);
        workspace.set_func(Slot::Proposed, f64::NAN);

        Self {
            objective,
            workspace,
            config,
            rng,
            sampler: Tsallis::new(config.q_v, config.t0),
            state: ChainState {
                num_f_evals: 1,
                ..ChainState::default()
            },
        }
    }

    /// Performs one annealing step at the temperature of the current
    /// iteration.
    pub fn advance(&mut self) {
        let i = self.state.iteration;
        let t_v = visiting_temperature(self.config.t0, self.config.q_v, i);
        let t_a = t_v / (i + 1) as f64;
        self.sampler.set_temperature(t_v);

        let dim = self.workspace.dim();
        for _ in 0..dim {
            self.generate_full();
            let delta = self.workspace.func(Slot::Proposed) - self.workspace.func(Slot::Current);
            if self.accept_or_reject(delta, t_a) {
                self.workspace.swap(Slot::Current, Slot::Proposed);
                self.state.num_accepted += 1;
                trace!(func = self.workspace.func(Slot::Current), "accepted full move");
                self.update_best();
            }
        }

        for j in 0..dim {
            let (x, func) = self.generate_one(j);
            let delta = func - self.workspace.func(Slot::Current);
            if self.accept_or_reject(delta, t_a) {
                self.workspace.x_mut(Slot::Current)[j] = x;
                self.workspace.set_func(Slot::Current, func);
                self.state.num_accepted += 1;
                trace!(index = j, func, "accepted coordinate move");
                self.update_best();
            }
        }

        self.state.iteration += 1;
    }

    /// Writes `wrap(current + visit)` into `proposed` and evaluates it.
    fn generate_full(&mut self) {
        let objective = self.objective;
        let (current, proposed) = self.workspace.split(Slot::Current, Slot::Proposed);
        let visits = self.sampler.many(&mut *self.rng);
        for ((dst, &x), v) in proposed.iter_mut().zip(current).zip(visits) {
            *dst = objective.wrap(x + clamp_visit(v));
        }
        let func = objective.value(self.workspace.proposed().x);
        self.workspace.set_func(Slot::Proposed, func);
        self.state.num_f_evals += 1;
    }

    /// Draws a new value for coordinate `index` and the objective value the
    /// current point would have with it.
    fn generate_one(&mut self, index: usize) -> (f32, f64) {
        let objective = self.objective;
        let x = objective.wrap(clamp_visit(self.sampler.sample_one(&mut *self.rng)));
        let current = self.workspace.current();
        let func = match objective.value_from_diff(current.x, current.func, index, x) {
            Some(func) => func,
            None => value_with_coordinate(objective, self.workspace.x_mut(Slot::Current), index, x),
        };
        self.state.num_f_evals += 1;
        (x, func)
    }

    fn accept_or_reject(&mut self, delta: f64, t_a: f64) -> bool {
        if delta < 0.0 {
            return true;
        }
        let p = acceptance_probability(delta, t_a, self.config.q_a);
        self.rng.random::<f64>() <= p
    }

    /// `best := current` if `current` is strictly better.
    pub(crate) fn update_best(&mut self) {
        let func = self.workspace.func(Slot::Current);
        if func < self.workspace.func(Slot::Best) {
            self.workspace.assign(Slot::Best, Slot::Current);
            trace!(func, "updated best");
        }
    }

    /// Counts evaluations performed on the chain's behalf, e.g. by local
    /// search.
    pub(crate) fn record_evaluations(&mut self, n: usize) {
        self.state.num_f_evals += n;
    }

    pub(crate) fn objective(&self) -> &'a O {
        self.objective
    }

    pub(crate) fn workspace_mut(&mut self) -> &mut Workspace<'a> {
        &mut self.workspace
    }
}

impl<'a, O: ?Sized, R: ?Sized> Chain<'a, O, R> {
    pub fn workspace(&self) -> &Workspace<'a> {
        &self.workspace
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    pub fn iteration(&self) -> usize {
        self.state.iteration
    }

    pub fn num_f_evals(&self) -> usize {
        self.state.num_f_evals
    }

    /// Fraction of accepted moves, `num_accepted / (2 * iteration * D)`.
    ///
    /// NaN before the first completed iteration.
    pub fn acceptance(&self) -> f64 {
        let moves = 2 * self.state.iteration * self.workspace.dim();
        self.state.num_accepted as f64 / moves as f64
    }

    /// Hands the workspace back, e.g. to read the final best point.
    pub fn into_workspace(self) -> Workspace<'a> {
        self.workspace
    }
}

impl<O: ?Sized, R: ?Sized> std::fmt::Debug for Chain<'_, O, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("workspace", &self.workspace)
            .field("sampler", &self.sampler)
            .field("state", &self.state)
            .finish()
    }
}
