//! # Solver — Find m with dsf(m) = n!
//!
//! For a fixed n the scan walks m = 1, 2, 3, … comparing dsf(m) with n!.
//! Because dsf is strictly increasing, each step has exactly three outcomes:
//! equal (solution), greater (no m can ever match, stop), or less (continue).
//! The scan always terminates and at most one m matches.
//!
//! [`Scanner`] keeps the dsf sequence alive across ascending n. Since n! never
//! decreases, every m already passed for a smaller n is still below the new
//! target, so the scan resumes where it stopped instead of restarting at 1.

use rug::Integer;
use std::cmp::Ordering;

use crate::arith;
use crate::growth::{DsfSequence, Growth};

/// A pair with n! = dsf(m). `value` holds n! for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub n: u64,
    pub m: u64,
    pub value: Integer,
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}! = dsf({}) = {}", self.n, self.m, self.value)
    }
}

/// Solve a single n from scratch.
pub fn solve(n: u64, growth: Growth) -> Option<Solution> {
    let target = arith::factorial(n);
    let m = Scanner::new(growth).solve_next(n, &target)?;
    Some(Solution {
        n,
        m,
        value: target,
    })
}

/// Monotone dsf scan shared by consecutive, non-decreasing targets.
pub struct Scanner {
    seq: DsfSequence,
    last_n: Option<u64>,
}

impl Scanner {
    pub fn new(growth: Growth) -> Self {
        let mut seq = DsfSequence::new(growth);
        seq.advance();
        Scanner { seq, last_n: None }
    }

    /// Return the m with dsf(m) == target, if any.
    ///
    /// `target` must be n!, and successive calls must pass non-decreasing n.
    pub fn solve_next(&mut self, n: u64, target: &Integer) -> Option<u64> {
        debug_assert!(
            self.last_n.map_or(true, |last| last <= n),
            "scanner fed n = {} after n = {:?}",
            n,
            self.last_n
        );
        self.last_n = Some(n);
        loop {
            match self.seq.current().cmp(target) {
                // Not advanced: 0! == 1! so the next target may equal this one.
                Ordering::Equal => return Some(self.seq.m()),
                Ordering::Greater => return None,
                Ordering::Less => {
                    self.seq.advance();
                }
            }
        }
    }

    /// The m the scan currently rests on.
    pub fn position(&self) -> u64 {
        self.seq.m()
    }
}
