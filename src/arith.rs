//! # Arith — Exact Big-Integer Primitives
//!
//! Thin layer over GMP (`rug::Integer`): factorials, products and digit
//! counts. Nothing here can overflow; magnitude is bounded only by memory.

use rug::Integer;

use crate::error::SearchError;

/// Exact k!.
///
/// GMP's binary-splitting factorial covers every k that fits in a `u32`;
/// beyond that the product is continued one factor at a time.
pub fn factorial(k: u64) -> Integer {
    match u32::try_from(k) {
        Ok(k) => Integer::from(Integer::factorial(k)),
        Err(_) => {
            let mut acc = Integer::from(Integer::factorial(u32::MAX));
            for i in u64::from(u32::MAX) + 1..=k {
                acc *= i;
            }
            acc
        }
    }
}

/// k! for a signed argument. Negative k is outside the factorial's domain.
pub fn try_factorial(k: i64) -> Result<Integer, SearchError> {
    u64::try_from(k)
        .map(factorial)
        .map_err(|_| SearchError::domain("k", format!("factorial undefined for {}", k)))
}

/// Exact product a·b.
pub fn multiply(a: &Integer, b: &Integer) -> Integer {
    Integer::from(a * b)
}

/// Estimate decimal digit count from bit length, avoiding expensive to_string conversion.
pub fn estimate_digits(n: &Integer) -> u64 {
    let bits = n.significant_bits();
    if bits == 0 {
        return 1;
    }
    (bits as f64 * std::f64::consts::LOG10_2) as u64 + 1
}

/// Exact decimal digit count (expensive for very large numbers).
pub fn exact_digits(n: &Integer) -> u64 {
    n.to_string_radix(10).len() as u64
}
