//! # Main — CLI Entry Point
//!
//! Parses flags, assembles the search configuration and hands off to
//! [`cli::run_search`]. Logging goes to stderr; solutions go to stdout.
//!
//! ## Options
//!
//! - `--start` / `DSF_START`: first n to test (default 1).
//! - `--chunk-size` / `DSF_CHUNK_SIZE`: n values per chunk (default 100).
//! - `--workers` / `DSF_WORKERS`: worker pool size (default: all cores).
//! - `--growth` / `DSF_GROWTH`: `double` (m·(m-2)·…) or `super` (m!·(m-2)!·…).
//! - `--max-cycles`: stop after N scheduling cycles (default: run until Ctrl-C).
//! - `--config` / `DSF_CONFIG`: TOML file with a `[search]` table.
//! - `--format`: `text` or `json` (one JSON object per line).
//!
//! `LOG_FORMAT=json` switches log output to JSON; `RUST_LOG` sets the filter.

mod cli;

use anyhow::Result;
use clap::Parser;
use dsf_search::Growth;
use std::path::PathBuf;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(
    name = "dsf-search",
    version,
    about = "Search for n! = dsf(m), the double super factorial"
)]
struct Cli {
    /// First n to test (must be >= 1) [default: 1]
    #[arg(long, env = "DSF_START")]
    start: Option<u64>,

    /// Number of n values per chunk (must be >= 1) [default: 100]
    #[arg(long, env = "DSF_CHUNK_SIZE")]
    chunk_size: Option<u64>,

    /// Worker threads; one chunk per worker per cycle [default: all logical cores]
    #[arg(long, env = "DSF_WORKERS")]
    workers: Option<usize>,

    /// Growth function: double (m·(m-2)·…) or super (m!·(m-2)!·…) [default: double]
    #[arg(long, value_enum, env = "DSF_GROWTH")]
    growth: Option<Growth>,

    /// Stop after this many scheduling cycles (default: search until interrupted)
    #[arg(long)]
    max_cycles: Option<u64>,

    /// TOML config file with a [search] table; flags override its values
    #[arg(long, env = "DSF_CONFIG")]
    config: Option<PathBuf>,

    /// Output format for found solutions
    #[arg(long, value_enum, default_value_t = cli::OutputFormat::Text)]
    format: cli::OutputFormat,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Structured logging: LOG_FORMAT=json for log shippers, human-readable otherwise
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    let config = cli::build_config(&cli)?;
    cli::run_search(config, cli.format)
}
