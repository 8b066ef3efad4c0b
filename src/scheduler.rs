//! # Scheduler — Infinite Chunk Dispatch over a Bounded Worker Pool
//!
//! Drives an unbounded stream of chunks through a dedicated rayon pool of P
//! threads. One scheduling cycle:
//!
//! 1. Reserve the next P chunks of `chunk_size` n values each, in ascending,
//!    non-overlapping order, advancing the search cursor by P · chunk_size.
//! 2. Submit all P chunks to the pool.
//! 3. Drain results in completion order (not submission order), forwarding
//!    each chunk's solutions to the [`SearchObserver`] as it arrives.
//! 4. Report the cycle and go back to step 1.
//!
//! ## States
//!
//! | State | Meaning |
//! |-------|---------|
//! | `Idle` | No chunk outstanding; the stop flag is checked here |
//! | `CycleRunning` | Chunks of the current cycle are being submitted |
//! | `Draining` | All chunks submitted, collecting completions |
//! | `Stopped` | Terminal: cancelled, cycle limit reached, or fatal error |
//!
//! ## Cancellation
//!
//! [`StopHandle::request_stop`] is observed before every cycle. A cycle's P
//! chunks are submitted as a unit, so a stop never splits a cycle: chunks
//! already in flight run to completion and their solutions are still
//! reported, then the scheduler enters `Stopped`. No chunk is submitted twice
//! and no worker task outlives the call that submitted it.
//!
//! ## Failure
//!
//! A panic inside a chunk is caught on the worker, the rest of the cycle is
//! drained and discarded, and the chunk range comes back in
//! [`SearchError::ChunkFailed`]. Chunks are never retried.

use rayon::{ThreadPool, ThreadPoolBuilder};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, debug_span, info};

use crate::chunk::Chunk;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::solver::Solution;

/// Cooperative stop flag, cheap to clone and share with a signal handler.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    CycleRunning,
    Draining,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    CycleLimit,
}

/// Outcome of one completed cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// 1-based cycle number.
    pub cycle: u64,
    /// Search cursor after the cycle: the next unassigned n.
    pub cursor: u64,
    /// n values tested in this cycle.
    pub tested: u64,
    /// Solutions found in this cycle.
    pub found: u64,
    /// Chunks of this cycle, in the order they completed.
    pub chunks: Vec<Chunk>,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub cursor: u64,
    pub found: u64,
    pub reason: StopReason,
}

/// Receives solutions as chunks complete, and one report per cycle.
pub trait SearchObserver {
    fn on_solution(&mut self, solution: &Solution);

    fn on_cycle(&mut self, _report: &CycleReport) {}
}

impl SearchObserver for Vec<Solution> {
    fn on_solution(&mut self, solution: &Solution) {
        self.push(solution.clone());
    }
}

/// Evaluates one chunk on a worker thread.
pub type ChunkRunner = Arc<dyn Fn(Chunk) -> Vec<Solution> + Send + Sync>;

type ChunkOutcome = (Chunk, Result<Vec<Solution>, String>);

pub struct Scheduler {
    config: SearchConfig,
    pool: ThreadPool,
    runner: ChunkRunner,
    stop: StopHandle,
    state: SchedulerState,
    cursor: u64,
    cycles: u64,
    found: u64,
    reason: Option<StopReason>,
}

impl Scheduler {
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        let growth = config.growth;
        Self::with_runner(config, Arc::new(move |chunk: Chunk| chunk.run(growth)))
    }

    /// Build a scheduler that evaluates chunks with `runner` instead of the solver.
    pub fn with_runner(config: SearchConfig, runner: ChunkRunner) -> Result<Self, SearchError> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("dsf-worker-{}", i))
            .build()?;
        Ok(Scheduler {
            cursor: config.start,
            config,
            pool,
            runner,
            stop: StopHandle::new(),
            state: SchedulerState::Idle,
            cycles: 0,
            found: 0,
            reason: None,
        })
    }

    /// Share an externally owned stop flag (e.g. one wired to Ctrl-C).
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Next unassigned n.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.reason
    }

    /// The chunks the next cycle would submit. Reserves nothing.
    pub fn peek_cycle(&self) -> Result<Vec<Chunk>, SearchError> {
        self.plan(self.cursor).map(|(chunks, _)| chunks)
    }

    fn plan(&self, cursor: u64) -> Result<(Vec<Chunk>, u64), SearchError> {
        let size = self.config.chunk_size;
        let overflow = || SearchError::CursorOverflow {
            cursor,
            span: size.saturating_mul(self.config.workers as u64),
        };
        let span = self.config.cycle_span().ok_or_else(overflow)?;
        let next = cursor.checked_add(span).ok_or_else(overflow)?;
        let chunks = (0..self.config.workers as u64)
            .map(|i| Chunk::new(cursor + i * size, size))
            .collect();
        Ok((chunks, next))
    }

    fn halt(&mut self, reason: StopReason) {
        self.state = SchedulerState::Stopped;
        if self.reason.is_none() {
            self.reason = Some(reason);
        }
    }

    /// Run one scheduling cycle.
    ///
    /// Returns `Ok(None)` once the scheduler has stopped (cancellation or
    /// cycle limit); every later call also returns `Ok(None)`.
    pub fn step(
        &mut self,
        observer: &mut dyn SearchObserver,
    ) -> Result<Option<CycleReport>, SearchError> {
        if self.state == SchedulerState::Stopped {
            return Ok(None);
        }
        if self.stop.is_stop_requested() {
            info!(cursor = self.cursor, cycles = self.cycles, "Stop requested, no further chunks");
            self.halt(StopReason::Cancelled);
            return Ok(None);
        }
        if self.config.max_cycles.is_some_and(|max| self.cycles >= max) {
            debug!(cycles = self.cycles, "Cycle limit reached");
            self.halt(StopReason::CycleLimit);
            return Ok(None);
        }

        let (chunks, next_cursor) = match self.plan(self.cursor) {
            Ok(plan) => plan,
            Err(e) => {
                self.state = SchedulerState::Stopped;
                return Err(e);
            }
        };
        let cycle = self.cycles + 1;
        let _span = debug_span!("cycle", cycle, from = self.cursor, to = next_cursor).entered();

        self.state = SchedulerState::CycleRunning;
        self.cursor = next_cursor;
        let started = Instant::now();
        let (tx, rx) = mpsc::channel::<ChunkOutcome>();
        for &chunk in &chunks {
            let tx = tx.clone();
            let runner = Arc::clone(&self.runner);
            self.pool.spawn(move || {
                let outcome =
                    panic::catch_unwind(AssertUnwindSafe(|| runner(chunk))).map_err(panic_message);
                let _ = tx.send((chunk, outcome));
            });
        }
        drop(tx);

        self.state = SchedulerState::Draining;
        let mut completed = Vec::with_capacity(chunks.len());
        let mut found = 0u64;
        let mut failure = None;
        while completed.len() < chunks.len() {
            let (chunk, outcome) = match rx.recv() {
                Ok(received) => received,
                Err(_) => {
                    self.state = SchedulerState::Stopped;
                    return Err(SearchError::WorkerLost {
                        outstanding: chunks.len() - completed.len(),
                    });
                }
            };
            completed.push(chunk);
            match outcome {
                Ok(solutions) if failure.is_none() => {
                    debug!(chunk = %chunk, found = solutions.len(), "Chunk complete");
                    for solution in &solutions {
                        observer.on_solution(solution);
                    }
                    found += solutions.len() as u64;
                }
                Ok(_) => {}
                Err(message) => {
                    debug!(chunk = %chunk, error = %message, "Chunk failed");
                    if failure.is_none() {
                        failure = Some(SearchError::ChunkFailed {
                            start: chunk.start,
                            end: chunk.end(),
                            message,
                        });
                    }
                }
            }
        }

        if let Some(err) = failure {
            self.state = SchedulerState::Stopped;
            return Err(err);
        }

        self.cycles = cycle;
        self.found += found;
        self.state = SchedulerState::Idle;
        let report = CycleReport {
            cycle,
            cursor: self.cursor,
            tested: self.config.chunk_size * chunks.len() as u64,
            found,
            chunks: completed,
            elapsed: started.elapsed(),
        };
        debug!(
            cursor = report.cursor,
            found = report.found,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Cycle complete"
        );
        observer.on_cycle(&report);
        Ok(Some(report))
    }

    /// Run cycles until stopped. Only returns early on a fatal error.
    pub fn run(&mut self, observer: &mut dyn SearchObserver) -> Result<RunSummary, SearchError> {
        info!(
            start = self.cursor,
            chunk_size = self.config.chunk_size,
            workers = self.config.workers,
            growth = %self.config.growth,
            "Search starting"
        );
        while self.step(observer)?.is_some() {}
        let summary = self.summary();
        info!(
            cycles = summary.cycles,
            cursor = summary.cursor,
            found = summary.found,
            reason = ?summary.reason,
            "Search stopped"
        );
        Ok(summary)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            cycles: self.cycles,
            cursor: self.cursor,
            found: self.found,
            reason: self.reason.unwrap_or(StopReason::Cancelled),
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
