//! Read-side filtering and summarization over stored records.
//!
//! Everything here is a pure function over a loaded record slice. The
//! empty case always yields a well-defined all-zero result so callers
//! never special-case "no data".

use std::collections::BTreeMap;

use crate::config;
use crate::domain::{RateRecord, ScoreRecord, SchoolCategory};

/// Score records for one school, optionally restricted to `years`.
pub fn scores_for_school<'a>(
    records: &'a [ScoreRecord],
    school_name: &str,
    years: Option<&[i32]>,
) -> Vec<&'a ScoreRecord> {
    records
        .iter()
        .filter(|r| r.school_name == school_name)
        .filter(|r| years.is_none_or(|ys| ys.contains(&r.year)))
        .collect()
}

/// Rate records for one school, optionally restricted to `years`.
pub fn rates_for_school<'a>(
    records: &'a [RateRecord],
    school_name: &str,
    years: Option<&[i32]>,
) -> Vec<&'a RateRecord> {
    records
        .iter()
        .filter(|r| r.school_name == school_name)
        .filter(|r| years.is_none_or(|ys| ys.contains(&r.year)))
        .collect()
}

/// Score records of a category's schools in one year, keyed by school name.
///
/// Category membership comes from the static configuration; a school with
/// several records for the year keeps the last one.
pub fn category_scores<'a>(
    records: &'a [ScoreRecord],
    category: SchoolCategory,
    year: i32,
) -> BTreeMap<&'a str, &'a ScoreRecord> {
    let members = config::schools_in(category);
    records
        .iter()
        .filter(|r| r.year == year && members.contains(&r.school_name.as_str()))
        .map(|r| (r.school_name.as_str(), r))
        .collect()
}

/// Rate records of a category's schools in one year, keyed by school name.
pub fn category_rates<'a>(
    records: &'a [RateRecord],
    category: SchoolCategory,
    year: i32,
) -> BTreeMap<&'a str, &'a RateRecord> {
    let members = config::schools_in(category);
    records
        .iter()
        .filter(|r| r.year == year && members.contains(&r.school_name.as_str()))
        .map(|r| (r.school_name.as_str(), r))
        .collect()
}

/// Five-number summary of a numeric field across a record set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation (denominator `n`).
    pub std_dev: f64,
}

/// Summarize `values`; an empty input yields all zeros.
pub fn summarize(values: &[f64]) -> Summary {
    if values.is_empty() {
        return Summary::default();
    }

    let n = values.len() as f64;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
        sum += v;
    }
    let mean = sum / n;

    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    };

    Summary {
        min,
        max,
        mean,
        median,
        std_dev: variance.sqrt(),
    }
}

/// Summary of the average-score field across score records.
pub fn score_statistics(scores: &[&ScoreRecord]) -> Summary {
    let values: Vec<f64> = scores.iter().map(|s| s.avg_score).collect();
    summarize(&values)
}

/// Min/max/mean of one rate metric.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RateSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Per-metric rate summaries across rate records.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RateStatistics {
    pub c9: RateSummary,
    pub r985: RateSummary,
    pub r211: RateSummary,
}

pub fn rate_statistics(rates: &[&RateRecord]) -> RateStatistics {
    let metric = |pick: fn(&RateRecord) -> f64| {
        let values: Vec<f64> = rates.iter().map(|r| pick(r)).collect();
        let s = summarize(&values);
        RateSummary {
            min: s.min,
            max: s.max,
            mean: s.mean,
        }
    };

    RateStatistics {
        c9: metric(|r| r.c9_rate),
        r985: metric(|r| r.rate_985),
        r211: metric(|r| r.rate_211),
    }
}
