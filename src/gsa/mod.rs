//! Generalized Simulated Annealing (GSA, "dual annealing").
//!
//! A stochastic global minimiser over a bounded box. A non-homogeneous
//! Markov chain draws moves from the heavy-tailed Tsallis visiting
//! distribution and accepts them with a generalised Metropolis rule, while
//! a gradient-based local solver polishes every new best point. Search
//! stops after a fixed number of steps or when the best value stops
//! improving.
//!
//! # References
//!
//! - Tsallis & Stariolo (1996), "Generalized simulated annealing"
//! - Xiang, Sun, Fan & Gong (1997), "Generalized simulated annealing
//!   algorithm and its application to the Thomson model"
//! - Xiang, Gubian, Suomela & Hoeng (2013), "Generalized Simulated Annealing
//!   for Global Optimization: The GenSA Package"

mod chain;
mod config;
mod local;
mod runner;
mod types;

pub use chain::{acceptance_probability, visiting_temperature, Chain, ChainState};
pub use config::GsaConfig;
pub use local::{LocalOutcome, LocalSearch, LocalSolver, LocalStatus};
pub use runner::{GsaResult, GsaRunner, Termination};
pub use types::{wrap_periodic, Differentiable, Objective};
