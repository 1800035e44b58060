//! Local refinement between annealing steps.
//!
//! [`LocalSolver`] is the seam to a gradient-based minimiser (the crate
//! ships [`Lbfgs`](crate::lbfgs::Lbfgs)). [`LocalSearch`] wraps a solver
//! and decides what its outcome means for the chain:
//!
//! | status | value improved | effect |
//! |---|---|---|
//! | soft failure | no | nothing happens, reported as success |
//! | soft failure | yes | refined point replaces `current` |
//! | success | any | refined point replaces `current` unless it is worse |
//! | hard failure | any | nothing happens, status returned as error |

use super::chain::Chain;
use super::types::{Differentiable, Objective};
use crate::workspace::Slot;
use rand::Rng;
use tracing::debug;

/// Termination status of a local solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LocalStatus {
    /// A convergence test was satisfied.
    #[error("converged")]
    Success,
    #[error("reached the maximum number of iterations")]
    TooManyIterations,
    #[error("reached the maximum number of line-search evaluations")]
    TooManyLineSearchEvaluations,
    #[error("line-search step became smaller than the minimum")]
    MinimumStep,
    #[error("line-search step became larger than the maximum")]
    MaximumStep,
    #[error("rounding errors prevent further progress")]
    RoundingErrors,
    /// The search direction does not decrease the objective.
    #[error("search direction increases the objective")]
    IncreaseGradient,
    #[error("objective value or gradient is not finite")]
    NonFiniteValue,
    #[error("invalid solver parameters")]
    InvalidParameters,
}

impl LocalStatus {
    pub fn is_success(self) -> bool {
        self == LocalStatus::Success
    }

    /// Limits and numerical trouble that still leave a usable point.
    pub fn is_soft_failure(self) -> bool {
        matches!(
            self,
            LocalStatus::TooManyIterations
                | LocalStatus::TooManyLineSearchEvaluations
                | LocalStatus::MinimumStep
                | LocalStatus::MaximumStep
                | LocalStatus::RoundingErrors
        )
    }

    pub fn is_hard_failure(self) -> bool {
        !self.is_success() && !self.is_soft_failure()
    }
}

/// What a [`LocalSolver`] reports after refining a point in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalOutcome {
    pub status: LocalStatus,
    /// Objective value at the refined point.
    pub func: f64,
    /// Evaluations of `value_and_gradient` performed.
    pub num_f_evals: usize,
}

/// A gradient-based minimiser working in place on `x`.
pub trait LocalSolver {
    /// Minimises `objective` starting from `x`, leaving the final point in
    /// `x`.
    fn minimize<O: Differentiable + ?Sized>(&mut self, objective: &O, x: &mut [f32]) -> LocalOutcome;
}

impl<S: LocalSolver + ?Sized> LocalSolver for &mut S {
    fn minimize<O: Differentiable + ?Sized>(&mut self, objective: &O, x: &mut [f32]) -> LocalOutcome {
        (**self).minimize(objective, x)
    }
}

/// Applies a [`LocalSolver`] to the current point of a [`Chain`].
#[derive(Debug, Clone)]
pub struct LocalSearch<S> {
    solver: S,
}

impl<S: LocalSolver> LocalSearch<S> {
    pub fn new(solver: S) -> Self {
        Self { solver }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn into_inner(self) -> S {
        self.solver
    }

    /// Refines `chain`'s current point.
    ///
    /// The solver works on a copy in the `proposed` slot; `current` only
    /// changes if the refined value is not worse. A hard solver failure is
    /// returned as `Err` with `current` untouched.
    pub fn run<O, R>(&mut self, chain: &mut Chain<'_, O, R>) -> Result<(), LocalStatus>
    where
        O: Differentiable + ?Sized,
        R: Rng + ?Sized,
    {
        let objective = chain.objective();
        let workspace = chain.workspace_mut();
        workspace.assign(Slot::Proposed, Slot::Current);
        let before = workspace.func(Slot::Current);
        let outcome = self
            .solver
            .minimize(objective, workspace.x_mut(Slot::Proposed));
        chain.record_evaluations(outcome.num_f_evals);

        let status = outcome.status;
        if status.is_hard_failure() {
            debug!(?status, "local search failed");
            return Err(status);
        }
        if status.is_soft_failure() && !(outcome.func < before) {
            debug!(?status, func = before, "local search made no progress");
            return Ok(());
        }
        if outcome.func <= before {
            let workspace = chain.workspace_mut();
            workspace.set_func(Slot::Proposed, outcome.func);
            workspace.swap(Slot::Current, Slot::Proposed);
            chain.update_best();
            debug!(?status, before, after = outcome.func, "local search accepted");
        }
        Ok(())
    }
}

/// Optional refinement step of the driver loop.
pub(crate) trait Refine<O: ?Sized> {
    fn refine<R: Rng + ?Sized>(&mut self, chain: &mut Chain<'_, O, R>) -> Result<(), LocalStatus>;
}

/// Annealing only.
pub(crate) struct NoRefine;

impl<O: Objective + ?Sized> Refine<O> for NoRefine {
    fn refine<R: Rng + ?Sized>(&mut self, _chain: &mut Chain<'_, O, R>) -> Result<(), LocalStatus> {
        Ok(())
    }
}

impl<O: Differentiable + ?Sized, S: LocalSolver> Refine<O> for LocalSearch<S> {
    fn refine<R: Rng + ?Sized>(&mut self, chain: &mut Chain<'_, O, R>) -> Result<(), LocalStatus> {
        self.run(chain)
    }
}
