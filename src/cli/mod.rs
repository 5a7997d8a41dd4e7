//! Command-line parsing for the admission-data collector.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the parsing/forecast code.

use clap::{Parser, Subcommand};

use crate::config;
use crate::domain::SchoolCategory;

pub mod menu;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "zk",
    version,
    about = "Shanghai high-school admission data collector & forecaster"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Query one school's admission scores for a year and print them.
    Score(QueryArgs),
    /// Query one school's C9/985/211 admission-line rates for a year.
    Rate(QueryArgs),
    /// Collect scores and rates for whole categories and save them as CSV.
    Collect(CollectArgs),
    /// Forecast admission scores from stored history.
    Predict(PredictArgs),
    /// Summarize stored records for a category and year.
    Stats(StatsArgs),
    /// Interactive menu (default when no subcommand is given).
    ///
    /// Walks category -> school -> year pickers and runs the same pipeline
    /// as the subcommands.
    Menu(MenuArgs),
}

/// Options for single-school queries.
#[derive(Debug, Parser, Clone)]
pub struct QueryArgs {
    /// School name, exactly as configured (e.g. 上海中学).
    pub school: String,

    /// Year to ask about.
    #[arg(short, long, default_value_t = config::LATEST_YEAR)]
    pub year: i32,

    /// Answer offline with generated data instead of the live endpoint.
    #[arg(long)]
    pub mock: bool,
}

/// Options for batch collection.
#[derive(Debug, Parser, Clone)]
pub struct CollectArgs {
    /// Restrict collection to one category (default: all categories).
    #[arg(short, long, value_enum)]
    pub category: Option<SchoolCategory>,

    /// Answer offline with generated data instead of the live endpoint.
    #[arg(long)]
    pub mock: bool,
}

/// Options for forecasting.
#[derive(Debug, Parser, Clone)]
pub struct PredictArgs {
    /// Forecast a single school (default: every school with stored data).
    pub school: Option<String>,

    /// Restrict the batch forecast to one category.
    #[arg(short, long, value_enum)]
    pub category: Option<SchoolCategory>,

    /// Target year (default: one year beyond the latest configured year).
    #[arg(short, long)]
    pub year: Option<i32>,
}

/// Options for stored-data summaries.
#[derive(Debug, Parser, Clone)]
pub struct StatsArgs {
    /// Category to summarize.
    #[arg(value_enum)]
    pub category: SchoolCategory,

    /// Year to summarize.
    #[arg(short, long, default_value_t = config::LATEST_YEAR)]
    pub year: i32,
}

/// Options for the interactive menu.
#[derive(Debug, Parser, Clone)]
pub struct MenuArgs {
    /// Answer offline with generated data instead of the live endpoint.
    #[arg(long)]
    pub mock: bool,
}
