//! # Growth — Double Super Factorial
//!
//! dsf(m) is a product over the descending step-2 sequence m, m-2, …, 1 or 2.
//! Two readings of the factor are supported:
//!
//! | Variant | Factor for i | dsf(1..=6) |
//! |---------|--------------|------------|
//! | `DoubleFactorial` | i | 1, 2, 3, 8, 15, 48 |
//! | `SuperDouble` | i! | 1, 2, 6, 48, 720, 34560 |
//!
//! Both are strictly increasing for m ≥ 1, which is what lets the solver stop
//! scanning m as soon as dsf(m) overshoots n!.
//!
//! Since dsf(m) = factor(m)·dsf(m-2), [`DsfSequence`] produces successive
//! values with one multiplication each instead of recomputing the product.

use rug::Integer;
use serde::{Deserialize, Serialize};

use crate::arith;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum Growth {
    /// m·(m-2)·(m-4)·…·(1 or 2)
    #[default]
    #[value(name = "double")]
    #[serde(rename = "double")]
    DoubleFactorial,
    /// m!·(m-2)!·(m-4)!·…·(1! or 2!)
    #[value(name = "super")]
    #[serde(rename = "super")]
    SuperDouble,
}

impl std::fmt::Display for Growth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Growth::DoubleFactorial => write!(f, "double"),
            Growth::SuperDouble => write!(f, "super"),
        }
    }
}

/// dsf(m) computed from scratch. dsf(0) is the empty product, 1.
pub fn dsf(m: u64, growth: Growth) -> Integer {
    let mut acc = Integer::from(1u32);
    let mut i = m;
    while i > 0 {
        match growth {
            Growth::DoubleFactorial => acc *= i,
            Growth::SuperDouble => acc *= arith::factorial(i),
        }
        i = i.saturating_sub(2);
    }
    acc
}

/// Incremental dsf(1), dsf(2), dsf(3), …
pub struct DsfSequence {
    growth: Growth,
    m: u64,
    /// dsf(m)
    current: Integer,
    /// dsf(m-1)
    previous: Integer,
    /// m!, only advanced for `SuperDouble`
    running_factorial: Integer,
}

impl DsfSequence {
    pub fn new(growth: Growth) -> Self {
        DsfSequence {
            growth,
            m: 0,
            current: Integer::from(1u32),
            previous: Integer::from(1u32),
            running_factorial: Integer::from(1u32),
        }
    }

    /// Step to m+1 and return the new dsf value.
    pub fn advance(&mut self) -> &Integer {
        self.m += 1;
        // self.previous is dsf(m-2) relative to the new m
        let next = match self.growth {
            Growth::DoubleFactorial => Integer::from(&self.previous * self.m),
            Growth::SuperDouble => {
                self.running_factorial *= self.m;
                Integer::from(&self.previous * &self.running_factorial)
            }
        };
        self.previous = std::mem::replace(&mut self.current, next);
        &self.current
    }

    /// The m of the most recent [`advance`](Self::advance); 0 before the first.
    pub fn m(&self) -> u64 {
        self.m
    }

    pub fn current(&self) -> &Integer {
        &self.current
    }

    pub fn growth(&self) -> Growth {
        self.growth
    }
}

impl Iterator for DsfSequence {
    type Item = (u64, Integer);

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.advance().clone();
        Some((self.m, value))
    }
}
