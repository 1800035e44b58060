//! Tsallis visiting distribution.
//!
//! A heavy-tailed generalisation of the normal distribution, parameterised
//! by the shape `q_V` (Gaussian as `q_V → 1`) and the visiting temperature
//! `t_V`. GSA draws its moves from it.
//!
//! # References
//!
//! - Tsallis & Stariolo (1996), "Generalized simulated annealing"
//! - Schanze (2006), "An exact D-dimensional Tsallis random number
//!   generator for generalized simulated annealing"

mod density;
mod distribution;

pub use density::{density, density_1d, ln_density};
pub use distribution::{Tsallis, TsallisParams, Visits};
