//! Generalized Simulated Annealing (dual annealing) for box-bounded
//! continuous minimisation.
//!
//! - **GSA** ([`gsa`]): the annealing Markov chain, generalised Metropolis
//!   acceptance, and the driver that interleaves annealing with local
//!   search under a patience policy.
//! - **Tsallis distribution** ([`tsallis`]): exact D-dimensional sampler of
//!   the visiting distribution and its analytic density.
//! - **Workspace** ([`workspace`]): cache-line aligned arena holding the
//!   chain's current, proposed and best points, with per-thread reuse.
//! - **L-BFGS** ([`lbfgs`]): the default gradient-based local solver.
//! - **Benchmark functions** ([`functions`]): Rastrigin and Sphere.
//!
//! # Example
//!
//! ```
//! use u_gsa::functions::Rastrigin;
//! use u_gsa::gsa::{GsaConfig, GsaRunner};
//!
//! let config = GsaConfig::default()
//!     .with_initial_temperature(10.0)
//!     .with_max_iterations(200)
//!     .with_seed(42);
//! let mut x = vec![3.0_f32, -2.0, 1.5];
//! let start = vec![3.0_f32, -2.0, 1.5];
//!
//! let result = GsaRunner::run(&Rastrigin::default(), &mut x, &config).unwrap();
//! assert!(result.func <= u_gsa::gsa::Objective::value(&Rastrigin::default(), &start));
//! ```

pub mod error;
pub mod functions;
pub mod gsa;
pub mod lbfgs;
pub mod random;
pub mod tsallis;
pub mod workspace;

mod special;

pub use error::{AllocationError, GsaError};
