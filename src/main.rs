use std::io::{self, BufRead, Write};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use treesum::reduce::{DEFAULT_THREAD_LIMIT, DEFAULT_WORKERS};
use treesum::{BenchConfig, BenchReport, Benchmark, Strategy, TreeSumError};

#[derive(Parser, Debug)]
#[command(
    name = "treesum",
    about = "Time sequential, task-pool and thread-spawn sums over a complete binary tree",
    allow_negative_numbers = true
)]
struct Cli {
    /// Tree depth (prompted for on stdin when omitted).
    #[arg(long)]
    depth: Option<i64>,
    /// Value of every node, also its simulated cost in ms (prompted for when omitted).
    #[arg(long)]
    value: Option<i32>,
    /// Worker threads in the task pool.
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,
    /// Thread-spawn limit: spawn at depth d only while 2^d < limit.
    #[arg(long, default_value_t = DEFAULT_THREAD_LIMIT)]
    thread_limit: usize,
    /// Strategy to run (repeatable; default: all, in order).
    #[arg(long = "strategy", value_enum)]
    strategies: Vec<Strategy>,
    /// Log phase timings and spawn accounting.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let depth = match cli.depth {
        Some(depth) => depth,
        None => prompt("Tree depth:", &mut input)?,
    };
    let value = match cli.value {
        Some(value) => value,
        None => prompt("Node value:", &mut input)?,
    };

    let config = BenchConfig::new(depth, value)
        .and_then(|config| config.with_workers(cli.workers))
        .and_then(|config| config.with_thread_limit(cli.thread_limit))
        .context("invalid benchmark configuration")?;

    let strategies = if cli.strategies.is_empty() {
        Strategy::ALL.to_vec()
    } else {
        cli.strategies
    };

    let report = Benchmark::with_strategies(config, &strategies).run();
    print_report(&report);

    if !report.all_agree() {
        bail!(
            "reducers disagree: expected {} for every strategy",
            report.config.expected_sum()
        );
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn prompt<T: FromStr>(label: &str, input: &mut impl BufRead) -> Result<T> {
    println!("{label}");
    io::stdout().flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .with_context(|| format!("failed to read answer to '{label}'"))?;

    let answer = line.trim();
    answer
        .parse()
        .map_err(|_| TreeSumError::InvalidInput(format!("'{answer}' is not a valid integer")))
        .with_context(|| format!("bad answer to '{label}'"))
}

fn print_report(report: &BenchReport) {
    println!(
        "Tree generated with depth {} and node value {} in {:.3} ms",
        report.config.depth, report.config.value, report.build_ms
    );
    for result in &report.results {
        println!("{result}");
    }
    println!("Tree destroyed.");
}
