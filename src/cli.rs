//! # CLI Execution Functions
//!
//! Extracted from `main.rs` to keep the entry point slim: configuration
//! layering, signal wiring, solution printing and the search run itself.

use anyhow::{Context, Result};
use dsf_search::config::FileConfig;
use dsf_search::progress::Progress;
use dsf_search::{
    CycleReport, Scheduler, SearchConfig, SearchObserver, Solution, StopHandle, StopReason,
};
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::Cli;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

// ── Configuration ───────────────────────────────────────────────

/// Defaults, then the config file, then flags and env vars.
pub fn build_config(cli: &Cli) -> Result<SearchConfig> {
    let mut config = SearchConfig::default();
    if let Some(path) = &cli.config {
        let file = FileConfig::load(path)?;
        config = config.merge_file(&file);
    }
    if let Some(v) = cli.start {
        config.start = v;
    }
    if let Some(v) = cli.chunk_size {
        config.chunk_size = v;
    }
    if let Some(v) = cli.workers {
        config.workers = v;
    }
    if let Some(v) = cli.growth {
        config.growth = v;
    }
    if cli.max_cycles.is_some() {
        config.max_cycles = cli.max_cycles;
    }
    config.validate().context("Invalid search configuration")?;
    Ok(config)
}

// ── Search ──────────────────────────────────────────────────────

/// Prints solutions to stdout and feeds the progress counters.
struct Reporter<W: Write> {
    out: W,
    format: OutputFormat,
    growth: dsf_search::Growth,
    progress: Arc<Progress>,
    stop: StopHandle,
    write_error: Option<std::io::Error>,
}

impl<W: Write> Reporter<W> {
    fn write_solution(&mut self, solution: &Solution) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(
                self.out,
                "Found solution: {}! = dsf({}) = {}",
                solution.n, solution.m, solution.value
            )?,
            OutputFormat::Json => {
                // Solutions are positive, so the decimal string has no sign.
                let value = solution.value.to_string();
                let line = serde_json::json!({
                    "n": solution.n,
                    "m": solution.m,
                    "growth": self.growth.to_string(),
                    "digits": value.len(),
                    "value": value,
                });
                writeln!(self.out, "{}", line)?
            }
        }
        self.out.flush()
    }
}

impl<W: Write> SearchObserver for Reporter<W> {
    fn on_solution(&mut self, solution: &Solution) {
        self.progress.record_solution();
        if self.write_error.is_some() {
            return;
        }
        if let Err(e) = self.write_solution(solution) {
            warn!(error = %e, "Could not write solution, stopping search");
            self.write_error = Some(e);
            self.stop.request_stop();
        }
    }

    fn on_cycle(&mut self, report: &CycleReport) {
        self.progress.record_cycle(report);
        debug!(
            cursor = report.cursor,
            found = report.found,
            "Checked up to n = {}, continuing search",
            report.cursor
        );
    }
}

/// Run the search until interrupted, the cycle limit, or a fatal error.
pub fn run_search(config: SearchConfig, format: OutputFormat) -> Result<()> {
    info!(
        cores = config.workers,
        chunk_size = config.chunk_size,
        start = config.start,
        growth = %config.growth,
        "dsf-search starting"
    );
    if config.max_cycles.is_none() {
        info!("Searching for solutions to n! = dsf(m); this runs until Ctrl-C");
    }

    let growth = config.growth;
    let progress = Progress::new(config.start);
    let stop = StopHandle::new();
    let mut scheduler = Scheduler::new(config)?.with_stop_handle(stop.clone());

    // Background threads start only once the pool exists.
    spawn_signal_listener(stop.clone());
    let reporter_handle = progress.start_reporter();

    let mut reporter = Reporter {
        out: std::io::stdout().lock(),
        format,
        growth,
        progress: Arc::clone(&progress),
        stop,
        write_error: None,
    };
    let result = scheduler.run(&mut reporter);

    progress.stop();
    let _ = reporter_handle.join();
    progress.print_status();

    let summary = result.context("Search aborted")?;
    if let Some(e) = reporter.write_error {
        return Err(e).context("Failed to write solution output");
    }
    match summary.reason {
        StopReason::Cancelled => eprintln!("\nSearch interrupted by user."),
        StopReason::CycleLimit => info!(cycles = summary.cycles, "Cycle limit reached"),
    }
    info!(cursor = summary.cursor, found = summary.found, "Search complete");
    Ok(())
}

// ── Signals ─────────────────────────────────────────────────────

/// First Ctrl-C / SIGTERM requests a cooperative stop; a second one exits at once.
fn spawn_signal_listener(stop: StopHandle) {
    std::thread::spawn(move || {
        let sig_rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                warn!(error = %e, "Could not start signal handler runtime");
                return;
            }
        };
        sig_rt.block_on(async {
            wait_for_signal().await;
            debug!("Shutdown signal received, finishing in-flight chunks");
            stop.request_stop();
            wait_for_signal().await;
            std::process::exit(130);
        });
    });
}

async fn wait_for_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                warn!(error = %e, "Could not install SIGTERM handler");
                let _ = ctrl_c.await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsf_search::{solve, Growth};

    fn reporter(format: OutputFormat) -> Reporter<Vec<u8>> {
        Reporter {
            out: Vec::new(),
            format,
            growth: Growth::SuperDouble,
            progress: Progress::new(1),
            stop: StopHandle::new(),
            write_error: None,
        }
    }

    #[test]
    fn text_output_matches_classic_format() {
        let mut r = reporter(OutputFormat::Text);
        r.on_solution(&solve(6, Growth::SuperDouble).unwrap());
        assert_eq!(
            String::from_utf8(r.out).unwrap(),
            "Found solution: 6! = dsf(5) = 720\n"
        );
    }

    #[test]
    fn json_output_is_one_object_per_line() {
        let mut r = reporter(OutputFormat::Json);
        r.on_solution(&solve(3, Growth::SuperDouble).unwrap());
        r.on_solution(&solve(6, Growth::SuperDouble).unwrap());
        let text = String::from_utf8(r.out).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["n"], 6);
        assert_eq!(lines[1]["m"], 5);
        assert_eq!(lines[1]["value"], "720");
        assert_eq!(lines[1]["growth"], "super");
    }

    #[test]
    fn json_digits_is_exact_decimal_length() {
        // 720 has a bit-length estimate of 4 digits
        let mut r = reporter(OutputFormat::Json);
        r.on_solution(&solve(6, Growth::SuperDouble).unwrap());
        r.on_solution(&solve(10, Growth::SuperDouble).unwrap());
        let text = String::from_utf8(r.out).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0]["value"], "720");
        assert_eq!(lines[0]["digits"], 3);
        assert_eq!(lines[1]["value"], "3628800");
        assert_eq!(lines[1]["digits"], 7);
    }

    #[test]
    fn run_search_fails_fast_when_scheduler_cannot_be_built() {
        let config = SearchConfig {
            workers: 0,
            max_cycles: Some(1),
            ..SearchConfig::default()
        };
        let started = std::time::Instant::now();
        let err = run_search(config, OutputFormat::Text).unwrap_err();
        assert!(format!("{:#}", err).contains("workers"));
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_requests_stop() {
        let stop = StopHandle::new();
        let mut r = Reporter {
            out: BrokenPipe,
            format: OutputFormat::Text,
            growth: Growth::DoubleFactorial,
            progress: Progress::new(1),
            stop: stop.clone(),
            write_error: None,
        };
        r.on_solution(&solve(1, Growth::DoubleFactorial).unwrap());
        assert!(stop.is_stop_requested());
        assert!(r.write_error.is_some());
        assert_eq!(
            r.progress.found.load(std::sync::atomic::Ordering::Relaxed),
            1
        );
    }
}
