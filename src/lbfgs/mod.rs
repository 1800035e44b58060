//! Limited-memory BFGS local solver.
//!
//! The default [`LocalSolver`](crate::gsa::LocalSolver) for GSA runs. Each
//! iteration builds a quasi-Newton direction from the last `m` correction
//! pairs (two-loop recursion) and picks a step by backtracking until the
//! strong Wolfe conditions hold.
//!
//! # References
//!
//! - Liu & Nocedal (1989), "On the limited memory BFGS method for large
//!   scale optimization"
//! - Nocedal & Wright (2006), "Numerical Optimization", ch. 3 and 7

mod config;
mod line_search;
mod runner;

pub use config::LbfgsConfig;
pub use runner::Lbfgs;
