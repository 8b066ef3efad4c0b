//! Property-based tests for dsf-search's arithmetic core.
//!
//! These tests use the `proptest` framework to check invariants across many
//! generated inputs instead of a handful of known values.
//!
//! # How to run
//!
//! ```bash
//! cargo test --test property_tests
//!
//! # Increase case count for thorough testing (default is 256):
//! PROPTEST_CASES=10000 cargo test --test property_tests
//! ```
//!
//! Each property is named `prop_<function>_<invariant>`.

use dsf_search::{dsf, factorial, run_chunk, solve, DsfSequence, Growth, Scanner};
use proptest::prelude::*;
use rug::Integer;

fn growth_strategy() -> impl Strategy<Value = Growth> {
    prop_oneof![Just(Growth::DoubleFactorial), Just(Growth::SuperDouble)]
}

// == Growth Function ===========================================================
// Strict monotonicity of dsf is what makes the solver's early exit correct.
// ==============================================================================

proptest! {
    /// dsf(m+1) > dsf(m) for every m >= 1.
    #[test]
    fn prop_dsf_strictly_increasing(m in 1u64..300, growth in growth_strategy()) {
        let a = dsf(m, growth);
        let b = dsf(m + 1, growth);
        prop_assert!(b > a, "{}: dsf({}) = {} !> dsf({}) = {}", growth, m + 1, b, m, a);
    }

    /// The incremental sequence agrees with the from-scratch product.
    #[test]
    fn prop_sequence_matches_dsf(m in 1u64..200, growth in growth_strategy()) {
        let (seq_m, value) = DsfSequence::new(growth).nth((m - 1) as usize).unwrap();
        prop_assert_eq!(seq_m, m);
        prop_assert_eq!(value, dsf(m, growth));
    }

    /// dsf(m) = factor(m) · dsf(m-2).
    #[test]
    fn prop_dsf_recurrence(m in 3u64..200) {
        let double = Integer::from(&dsf(m - 2, Growth::DoubleFactorial) * m);
        prop_assert_eq!(dsf(m, Growth::DoubleFactorial), double);
        let sup = Integer::from(&dsf(m - 2, Growth::SuperDouble) * &factorial(m));
        prop_assert_eq!(dsf(m, Growth::SuperDouble), sup);
    }

    /// (k+1)! = (k+1) · k!
    #[test]
    fn prop_factorial_recurrence(k in 0u64..500) {
        let next = Integer::from(&factorial(k) * (k + 1));
        prop_assert_eq!(factorial(k + 1), next);
    }
}

// == Solver ====================================================================
// solve(n) returns the unique m or none, and does so deterministically.
// ==============================================================================

proptest! {
    /// A returned m really satisfies dsf(m) = n!, and m-1 / m+1 do not.
    #[test]
    fn prop_solve_result_is_exact_and_unique(n in 1u64..150, growth in growth_strategy()) {
        if let Some(s) = solve(n, growth) {
            let target = factorial(n);
            prop_assert_eq!(&s.value, &target);
            prop_assert_eq!(dsf(s.m, growth), target.clone());
            prop_assert!(dsf(s.m + 1, growth) > target);
            if s.m > 1 {
                prop_assert!(dsf(s.m - 1, growth) < target);
            }
        }
    }

    /// "No solution" means the scan overshot: some m has dsf(m-1) < n! < dsf(m).
    #[test]
    fn prop_no_solution_means_bracketed(n in 1u64..150, growth in growth_strategy()) {
        if solve(n, growth).is_none() {
            let target = factorial(n);
            let (m, _) = DsfSequence::new(growth).find(|(_, v)| *v > target).unwrap();
            prop_assert!(m > 1);
            prop_assert!(dsf(m - 1, growth) < target);
        }
    }

    /// Repeated calls agree.
    #[test]
    fn prop_solve_idempotent(n in 1u64..200, growth in growth_strategy()) {
        prop_assert_eq!(solve(n, growth), solve(n, growth));
    }

    /// A scanner that skips ahead gives the same answer as a fresh solve.
    #[test]
    fn prop_scanner_matches_solve(first in 1u64..100, gap in 0u64..50, growth in growth_strategy()) {
        let mut scanner = Scanner::new(growth);
        scanner.solve_next(first, &factorial(first));
        let n = first + gap;
        let expected = solve(n, growth).map(|s| s.m);
        prop_assert_eq!(scanner.solve_next(n, &factorial(n)), expected);
    }
}

// == Chunk Worker ==============================================================
// A chunk is a pure function of (start, size).
// ==============================================================================

proptest! {
    #[test]
    fn prop_run_chunk_pure(start in 1u64..200, size in 0u64..40, growth in growth_strategy()) {
        prop_assert_eq!(run_chunk(start, size, growth), run_chunk(start, size, growth));
    }

    /// Splitting a range into two chunks yields the same solutions.
    #[test]
    fn prop_run_chunk_splits(start in 1u64..100, left in 0u64..30, right in 0u64..30, growth in growth_strategy()) {
        let whole = run_chunk(start, left + right, growth);
        let mut parts = run_chunk(start, left, growth);
        parts.extend(run_chunk(start + left, right, growth));
        prop_assert_eq!(whole, parts);
    }

    /// Every solution lies inside the chunk and order is ascending in n.
    #[test]
    fn prop_run_chunk_in_range_and_ordered(start in 1u64..100, size in 0u64..40, growth in growth_strategy()) {
        let found = run_chunk(start, size, growth);
        for s in &found {
            prop_assert!(s.n >= start && s.n < start + size);
        }
        for pair in found.windows(2) {
            prop_assert!(pair[0].n < pair[1].n);
        }
    }
}
