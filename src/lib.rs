//! Unbounded parallel search for pairs (n, m) with n! = dsf(m).
//!
//! Leaves first: [`arith`] (exact GMP arithmetic), [`growth`] (dsf and its
//! incremental sequence), [`solver`] (one n), [`chunk`] (a range of n),
//! [`scheduler`] (infinite dispatch over a worker pool). [`config`] and
//! [`progress`] are shared with the binary.

pub mod arith;
pub mod chunk;
pub mod config;
pub mod error;
pub mod growth;
pub mod progress;
pub mod scheduler;
pub mod solver;

pub use arith::{estimate_digits, exact_digits, factorial, multiply, try_factorial};
pub use chunk::{run_chunk, Chunk};
pub use config::SearchConfig;
pub use error::SearchError;
pub use growth::{dsf, DsfSequence, Growth};
pub use scheduler::{
    CycleReport, RunSummary, Scheduler, SchedulerState, SearchObserver, StopHandle, StopReason,
};
pub use solver::{solve, Scanner, Solution};
