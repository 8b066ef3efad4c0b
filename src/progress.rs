//! # Progress — Atomic Search Progress Counters
//!
//! Thread-safe progress tracking shared between the scheduler's observer and
//! a background status reporter. Everything is an atomic: the scheduler
//! writes once per solution and once per completed cycle, the reporter only
//! reads.
//!
//! ## Background Reporter
//!
//! A dedicated thread logs a status line at a fixed interval (30 seconds by
//! default): search cursor, n values tested, rate (n/sec), solutions found
//! and elapsed time. It polls the `shutdown` flag in short slices so that
//! [`Progress::stop`] followed by a join returns promptly.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

use crate::scheduler::CycleReport;

pub const REPORT_INTERVAL: Duration = Duration::from_secs(30);
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

pub struct Progress {
    pub tested: AtomicU64,
    pub found: AtomicU64,
    pub cycles: AtomicU64,
    pub cursor: AtomicU64,
    start: Instant,
    shutdown: AtomicBool,
}

impl Progress {
    pub fn new(cursor: u64) -> Arc<Self> {
        Arc::new(Progress {
            tested: AtomicU64::new(0),
            found: AtomicU64::new(0),
            cycles: AtomicU64::new(0),
            cursor: AtomicU64::new(cursor),
            start: Instant::now(),
            shutdown: AtomicBool::new(false),
        })
    }

    pub fn record_solution(&self) {
        self.found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cycle(&self, report: &CycleReport) {
        self.tested.fetch_add(report.tested, Ordering::Relaxed);
        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.cursor.store(report.cursor, Ordering::Relaxed);
    }

    pub fn start_reporter(self: &Arc<Self>) -> thread::JoinHandle<()> {
        self.start_reporter_every(REPORT_INTERVAL)
    }

    pub fn start_reporter_every(self: &Arc<Self>, interval: Duration) -> thread::JoinHandle<()> {
        let progress = Arc::clone(self);
        thread::spawn(move || {
            let mut last = Instant::now();
            loop {
                thread::sleep(SHUTDOWN_POLL.min(interval));
                if progress.shutdown.load(Ordering::Relaxed) {
                    break;
                }
                if last.elapsed() >= interval {
                    progress.print_status();
                    last = Instant::now();
                }
            }
        })
    }

    pub fn print_status(&self) {
        let elapsed = self.start.elapsed();
        let tested = self.tested.load(Ordering::Relaxed);
        let found = self.found.load(Ordering::Relaxed);
        let cycles = self.cycles.load(Ordering::Relaxed);
        let cursor = self.cursor.load(Ordering::Relaxed);
        let rate = if elapsed.as_secs() > 0 {
            tested as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };
        let h = elapsed.as_secs() / 3600;
        let m = (elapsed.as_secs() % 3600) / 60;
        let s = elapsed.as_secs() % 60;
        info!(
            cursor,
            tested,
            cycles,
            rate = format_args!("{:.2}", rate),
            found,
            elapsed = format_args!("{:02}:{:02}:{:02}", h, m, s),
            "search progress"
        );
    }

    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(cycle: u64, cursor: u64, tested: u64) -> CycleReport {
        CycleReport {
            cycle,
            cursor,
            tested,
            found: 0,
            chunks: Vec::new(),
            elapsed: Duration::from_millis(5),
        }
    }

    #[test]
    fn counters_start_at_zero() {
        let p = Progress::new(1);
        assert_eq!(p.tested.load(Ordering::Relaxed), 0);
        assert_eq!(p.found.load(Ordering::Relaxed), 0);
        assert_eq!(p.cycles.load(Ordering::Relaxed), 0);
        assert_eq!(p.cursor.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn record_cycle_accumulates() {
        let p = Progress::new(1);
        p.record_cycle(&report(1, 41, 40));
        p.record_cycle(&report(2, 81, 40));
        assert_eq!(p.tested.load(Ordering::Relaxed), 80);
        assert_eq!(p.cycles.load(Ordering::Relaxed), 2);
        assert_eq!(p.cursor.load(Ordering::Relaxed), 81);
    }

    /// 8 threads each record 1000 solutions; no increment may be lost.
    #[test]
    fn concurrent_solutions_are_accurate() {
        let p = Progress::new(1);
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let p = Arc::clone(&p);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        p.record_solution();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(p.found.load(Ordering::Relaxed), 8000);
    }

    #[test]
    fn print_status_with_zero_elapsed() {
        // Immediately after creation elapsed is ~0s; rate must not divide by zero
        let p = Progress::new(1);
        p.print_status();
    }

    #[test]
    fn reporter_exits_promptly_after_stop() {
        let p = Progress::new(1);
        let handle = p.start_reporter();
        thread::sleep(Duration::from_millis(20));
        let stopped_at = Instant::now();
        p.stop();
        handle.join().unwrap();
        assert!(stopped_at.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn reporter_prints_at_short_interval() {
        let p = Progress::new(1);
        p.record_cycle(&report(1, 11, 10));
        let handle = p.start_reporter_every(Duration::from_millis(10));
        thread::sleep(Duration::from_millis(50));
        p.stop();
        handle.join().unwrap();
    }

    #[test]
    fn multiple_stops_are_idempotent() {
        let p = Progress::new(1);
        p.stop();
        p.stop();
        assert!(p.shutdown.load(Ordering::Relaxed));
    }
}
