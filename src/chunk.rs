//! # Chunk — Contiguous Block of n Values
//!
//! A chunk is the unit of work handed to one worker: the half-open range
//! [start, start + size). [`run_chunk`] is a pure function of its arguments;
//! it touches no shared state, which is what lets chunks run concurrently
//! without locks.
//!
//! Within a chunk n! is carried forward with one multiplication per n (one
//! GMP factorial at the chunk start), and a single [`Scanner`] walks dsf
//! upward across the whole chunk.

use crate::arith;
use crate::growth::Growth;
use crate::solver::{Scanner, Solution};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub start: u64,
    pub size: u64,
}

impl Chunk {
    pub fn new(start: u64, size: u64) -> Self {
        Chunk { start, size }
    }

    /// Exclusive upper bound. Saturates at `u64::MAX`.
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.size)
    }

    pub fn contains(&self, n: u64) -> bool {
        n >= self.start && n < self.end()
    }

    pub fn run(&self, growth: Growth) -> Vec<Solution> {
        run_chunk(self.start, self.size, growth)
    }
}

impl std::fmt::Display for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end())
    }
}

/// Solve every n in [start, start + size), returning hits in ascending n.
pub fn run_chunk(start: u64, size: u64, growth: Growth) -> Vec<Solution> {
    let mut solutions = Vec::new();
    let end = start.saturating_add(size);
    if start >= end {
        return solutions;
    }

    let mut factorial = arith::factorial(start);
    let mut scanner = Scanner::new(growth);
    for n in start..end {
        if n > start {
            factorial *= n;
        }
        if let Some(m) = scanner.solve_next(n, &factorial) {
            solutions.push(Solution {
                n,
                m,
                value: factorial.clone(),
            });
        }
    }
    solutions
}
