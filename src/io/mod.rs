//! Input/output helpers.
//!
//! - CSV persistence for collected records and predictions (`store`)

pub mod store;

pub use store::*;
