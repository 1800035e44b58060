//! Compares a histogram of one-dimensional Tsallis draws with the exact
//! density.
//!
//! ```text
//! cargo run --release --example tsallis -- <q_V> <t_V> [<output>|-]
//! ```
//!
//! Writes `x  ln(empirical density)  ln(exact density)` per bin.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;
use u_gsa::random::create_rng;
use u_gsa::tsallis::{density_1d, Tsallis};

const SAMPLES: usize = 1_000_000;
const BINS: usize = 400;
const MIN: f64 = -100.0;
const MAX: f64 = 100.0;

fn enable_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .try_init();
}

fn parse(arg: Option<String>, name: &str) -> Result<f64, String> {
    let arg = arg.ok_or_else(|| format!("missing <{name}>"))?;
    arg.parse()
        .map_err(|_| format!("failed to interpret {arg:?} as {name}"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    enable_tracing();

    let mut args = std::env::args().skip(1);
    let q_v = parse(args.next(), "q_V")?;
    let t_v = parse(args.next(), "t_V")?;
    if !(q_v > 1.0 && q_v < 3.0) {
        return Err(format!("invalid q_V: {q_v}; expected 1 < q_V < 3").into());
    }
    if !(t_v > 0.0) {
        return Err(format!("invalid t_V: {t_v}; expected t_V > 0").into());
    }
    let mut out: Box<dyn Write> = match args.next().as_deref() {
        None | Some("-") => Box::new(io::stdout().lock()),
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
    };

    let dist = Tsallis::new(q_v, t_v);
    let mut rng = create_rng(12_349_827);
    let width = (MAX - MIN) / BINS as f64;
    let mut counts = vec![0usize; BINS];
    let mut outside = 0usize;
    for _ in 0..SAMPLES {
        let x = f64::from(dist.sample_one(&mut rng));
        if (MIN..MAX).contains(&x) {
            counts[((x - MIN) / width) as usize] += 1;
        } else {
            outside += 1;
        }
    }
    info!(q_v, t_v, samples = SAMPLES, outside, "sampling done");

    for (i, &count) in counts.iter().enumerate() {
        let x = MIN + (i as f64 + 0.5) * width;
        let empirical = (count as f64 / SAMPLES as f64 / width).ln();
        let exact = density_1d(q_v, t_v, x).ln();
        writeln!(out, "{x}\t{empirical}\t{exact}")?;
    }
    out.flush()?;
    Ok(())
}
