//! Mathematical utilities: least-squares line fitting and fit diagnostics.

pub mod ols;

pub use ols::*;
