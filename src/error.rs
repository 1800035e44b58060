//! Error types.
//!
//! Only two outcomes of a run are distinguishable failures: the buffer pool
//! could not provide a workspace ([`GsaError::AllocationFailure`]), or the
//! local solver failed hard. The latter is not an error value; it is
//! reported through [`Termination::LocalSearchFailed`](crate::gsa::Termination)
//! together with the best point found so far.

use std::collections::TryReserveError;

/// The workspace arena could not be sized for the requested dimension.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    /// The byte size of the arena does not fit in `isize`.
    #[error("workspace capacity for dimension {dim} overflows the address space")]
    CapacityOverflow { dim: usize },

    /// The allocator refused the request.
    #[error("workspace allocation failed: {0}")]
    Reserve(#[from] TryReserveError),
}

/// Failure of a [`GsaRunner`](crate::gsa::GsaRunner) run.
///
/// On this path the caller's vector is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GsaError {
    #[error("could not acquire a workspace: {0}")]
    AllocationFailure(#[from] AllocationError),
}
