//! Numeric primitives for fedeval.
//!
//! - [`sum`] - Order-independent floating-point summation

pub mod sum;

pub use sum::ordered_sum;
