//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the collected record kinds (`ScoreRecord`, `RateRecord`)
//! - the school roster built from static configuration (`School`,
//!   `SchoolRoster`, `SchoolCategory`)
//! - forecast output (`Prediction`)

pub mod types;

pub use types::*;
