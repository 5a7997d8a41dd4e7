//! Shared collection workflow used by both the CLI subcommands and the
//! interactive menu:
//!
//! query -> parse -> store
//!
//! Keeping this in one place avoids duplicating the degrade-on-failure
//! policy: a failed query is logged and parsed as empty text, so the batch
//! keeps going and the record carries defaults instead of aborting.

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};

use crate::config;
use crate::data::QueryService;
use crate::domain::{RateRecord, ScoreRecord};
use crate::error::AppError;
use crate::io::store;
use crate::parse;

/// Query and parse one school-year's admission scores.
///
/// Upstream failure degrades to a defaulted record; it never propagates.
pub fn fetch_score(service: &dyn QueryService, school: &str, year: i32) -> ScoreRecord {
    let prompt = config::score_prompt(school, year);
    let text = match service.query(&prompt) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(%err, school, year, "score query failed; recording defaults");
            String::new()
        }
    };
    parse::parse_score_reply(&text, school, year)
}

/// Query and parse one school-year's admission-line rates.
pub fn fetch_rate(service: &dyn QueryService, school: &str, year: i32) -> RateRecord {
    let prompt = config::rate_prompt(school, year);
    let text = match service.query(&prompt) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(%err, school, year, "rate query failed; recording defaults");
            String::new()
        }
    };
    parse::parse_rate_reply(&text, school, year)
}

/// Collect scores for every school x year combination, in order.
pub fn collect_scores(
    service: &dyn QueryService,
    schools: &[&str],
    years: &[i32],
) -> Vec<ScoreRecord> {
    let bar = progress_bar(schools.len() * years.len(), "收集录取分数");

    let mut records = Vec::with_capacity(schools.len() * years.len());
    for &school in schools {
        for &year in years {
            records.push(fetch_score(service, school, year));
            bar.inc(1);
        }
    }

    bar.finish_and_clear();
    records
}

/// Collect rates for every school x year combination, in order.
pub fn collect_rates(
    service: &dyn QueryService,
    schools: &[&str],
    years: &[i32],
) -> Vec<RateRecord> {
    let bar = progress_bar(schools.len() * years.len(), "收集升学率");

    let mut records = Vec::with_capacity(schools.len() * years.len());
    for &school in schools {
        for &year in years {
            records.push(fetch_rate(service, school, year));
            bar.inc(1);
        }
    }

    bar.finish_and_clear();
    records
}

/// Collect both record kinds and overwrite the configured store files.
///
/// Returns the number of score and rate records written.
pub fn collect_and_store(
    service: &dyn QueryService,
    schools: &[&str],
    years: &[i32],
) -> Result<(usize, usize), AppError> {
    let scores = collect_scores(service, schools, years);
    let rates = collect_rates(service, schools, years);

    store::save_scores(Path::new(config::SCORE_DATA_FILE), &scores)?;
    store::save_rates(Path::new(config::RATE_DATA_FILE), &rates)?;
    tracing::info!(
        scores = scores.len(),
        rates = rates.len(),
        "collection saved to {}",
        config::DATA_OUTPUT_DIR
    );

    Ok((scores.len(), rates.len()))
}

fn progress_bar(total: usize, message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template("{msg} [{bar:30}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar.set_message(message);
    bar
}
