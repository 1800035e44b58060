//! Minimises the 100-dimensional Rastrigin function with GSA and L-BFGS.
//!
//! ```text
//! RUST_LOG=u_gsa=debug cargo run --release --example rastrigin
//! ```

use rand::Rng;
use tracing_subscriber::EnvFilter;
use u_gsa::functions::Rastrigin;
use u_gsa::gsa::{GsaConfig, GsaRunner, Objective};
use u_gsa::lbfgs::{Lbfgs, LbfgsConfig};
use u_gsa::random::create_rng;

fn enable_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

fn format_point(x: &[f32]) -> String {
    let coords: Vec<String> = x.iter().map(|v| format!("{v:.5}")).collect();
    format!("[{}]", coords.join(", "))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    enable_tracing();

    let config = GsaConfig::default()
        .with_visiting(2.67)
        .with_acceptance(-5.0)
        .with_initial_temperature(10.0)
        .with_max_iterations(1000)
        .with_patience(20)
        .with_seed(1_230_045);

    let objective = Rastrigin::default();
    let mut rng = create_rng(1_230_045);
    let mut x: Vec<f32> = (0..100).map(|_| rng.random_range(-1.0..3.0)).collect();

    println!("Before: f({}) = {}", format_point(&x), objective.value(&x));

    let solver = Lbfgs::new(LbfgsConfig::default().with_x_tol(1e-5));
    let result = GsaRunner::run_with_local_search(&objective, &mut x, &config, solver)?;

    println!("After : f({}) = {}", format_point(&x), result.func);
    println!("Number iterations: {}", result.iterations);
    println!("Number function evaluations: {}", result.num_f_evals);
    println!("Acceptance: {}", result.acceptance);
    println!("Termination: {:?}", result.termination);
    Ok(())
}
