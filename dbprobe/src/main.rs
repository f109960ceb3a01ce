//! Boundary test driver for a line-oriented database REPL.
//!
//! Spawns the target executable, runs a batch of exploratory smoke
//! iterations, then the table-capacity and field-capacity probes, each
//! against a fresh subordinate. Verdicts are printed as reports; the
//! driver exits 0 on normal completion regardless of probe outcomes.
//!
//! # Usage
//!
//! ```bash
//! dbprobe [--program ./main] [--smoke 20] [--rows 1400] [--timeout 5]
//! ```

use std::env;
use std::time::Duration;

use dbprobe::{BoundaryProbe, ProcessConfig, DEFAULT_MAX_ROWS};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse()?;
    let config = ProcessConfig::new(&args.program)
        .read_timeout(Duration::from_secs(args.timeout));

    // Smoke phase: exploratory insert/select rounds against one session.
    let mut probe = BoundaryProbe::open(config.clone())?;
    for id in 0..args.smoke {
        let report = probe.smoke_test(id).await?;
        print!("{}", report.evidence);
    }
    probe.close().await?;

    // Each boundary probe gets a fresh subordinate so a failure in one
    // cannot leave the other with a session in an unknown state.
    let probe = BoundaryProbe::open(config.clone())?;
    let capacity = probe.table_capacity(args.rows).await?;
    println!("{capacity}");

    let mut probe = BoundaryProbe::open(config)?;
    let field = probe.field_capacity().await?;
    println!("{field}");
    probe.close().await?;

    Ok(())
}

struct Args {
    program: String,
    smoke: usize,
    rows: usize,
    timeout: u64,
}

impl Args {
    fn parse() -> Result<Self, String> {
        let mut args = Self {
            program: "./main".to_owned(),
            smoke: 20,
            rows: DEFAULT_MAX_ROWS,
            timeout: 5,
        };

        let mut iter = env::args().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--program" => {
                    args.program = iter.next().ok_or("--program requires a value")?;
                }
                "--smoke" => {
                    args.smoke = Self::value(&mut iter, "--smoke")?;
                }
                "--rows" => {
                    args.rows = Self::value(&mut iter, "--rows")?;
                }
                "--timeout" => {
                    args.timeout = Self::value(&mut iter, "--timeout")?;
                }
                "--help" | "-h" => {
                    println!(
                        "Usage: dbprobe [--program PATH] [--smoke N] [--rows N] [--timeout SECS]"
                    );
                    std::process::exit(0);
                }
                other => return Err(format!("unknown argument: {other}")),
            }
        }
        Ok(args)
    }

    fn value<T: std::str::FromStr>(
        iter: &mut impl Iterator<Item = String>,
        flag: &str,
    ) -> Result<T, String>
    where
        T::Err: std::fmt::Display,
    {
        iter.next()
            .ok_or_else(|| format!("{flag} requires a value"))?
            .parse()
            .map_err(|e| format!("invalid value for {flag}: {e}"))
    }
}
