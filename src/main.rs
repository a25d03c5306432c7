//! Command-line front end: reads an instance, prints the solution text.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use cflp_milp::format::{render, render_summary};
use cflp_milp::{solve, Instance, LinkingForm, SolveOutcome, SolverConfig};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LinkingChoice {
    Inequality,
    Equality,
}

impl From<LinkingChoice> for LinkingForm {
    fn from(choice: LinkingChoice) -> Self {
        match choice {
            LinkingChoice::Inequality => LinkingForm::Inequality,
            LinkingChoice::Equality => LinkingForm::Equality,
        }
    }
}

/// Solve a capacitated facility location instance exactly with HiGHS.
#[derive(Parser, Debug)]
#[command(name = "cflp-milp", version)]
struct Args {
    /// Instance file; reads stdin when omitted
    input: Option<PathBuf>,

    /// Engine time limit in seconds
    #[arg(long, value_parser = non_negative_f64)]
    time_limit: Option<f64>,

    /// Relative MIP gap at which the engine may stop
    #[arg(long, value_parser = non_negative_f64)]
    gap: Option<f64>,

    /// Engine threads
    #[arg(long, value_parser = clap::value_parser!(u32).range(..=i32::MAX as i64))]
    threads: Option<u32>,

    /// Encoding of the open/assign linking rows
    #[arg(long, value_enum, default_value = "inequality")]
    linking: LinkingChoice,

    /// Show the engine's own log
    #[arg(short, long)]
    verbose: bool,

    /// Print opened facilities and utilization to stderr
    #[arg(long)]
    summary: bool,
}

fn non_negative_f64(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if value.is_nan() || value < 0.0 {
        return Err(format!("must be a non-negative number, got {}", s));
    }
    Ok(value)
}

impl Args {
    fn config(&self) -> SolverConfig {
        SolverConfig {
            time_limit: self.time_limit,
            mip_rel_gap: self.gap,
            threads: self.threads.map(|t| t as usize),
            linking: self.linking.into(),
            verbose: self.verbose,
            ..SolverConfig::default()
        }
    }
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read instance from stdin")?;
            Ok(buf)
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = args.config();

    let text = read_input(args.input.as_ref())?;
    let instance: Instance = text.parse().context("Failed to parse instance")?;
    log::info!(
        "Loaded {} facilities and {} customers",
        instance.facility_count(),
        instance.customer_count()
    );

    let outcome = solve(&instance, &config).context("Solve failed")?;
    print!("{}", render(&outcome));
    if let SolveOutcome::NotOptimal(status) = &outcome {
        println!();
        log::info!("Engine status: {}", status);
    }

    if args.summary {
        if let Some(solution) = outcome.solution() {
            eprint!("{}", render_summary(&instance, solution));
        }
    }

    Ok(())
}
