//! Admission-score forecasting.
//!
//! For each school we independently fit an OLS line per metric
//! (min/max/avg score against year) over that school's historical records,
//! then evaluate each line at the target year. The confidence score blends
//! sample size with fit quality:
//!
//! ```text
//! volume     = min(n / 5, 1) * 0.7
//! fit        = mean R^2 of the three metric fits
//! confidence = volume * (0.3 + 0.7 * fit) * 100      (1 decimal)
//! ```
//!
//! Confidence is a heuristic ranking aid, not a statistical confidence
//! interval. Too little history is a reported outcome (`error` set,
//! metrics `None`), never a crash.

use rayon::prelude::*;

use crate::domain::{Prediction, ScoreRecord};
use crate::math::{fit_line, r_squared};
use crate::stats;

/// Minimum historical records required to fit a trend.
const MIN_HISTORY: usize = 2;

/// History saturates the data-volume factor at this many records.
const SATURATION_COUNT: f64 = 5.0;

/// Forecast one school's score metrics at `target_year` from its records in
/// `records` (other schools' records are ignored).
pub fn predict_scores(records: &[ScoreRecord], school_name: &str, target_year: i32) -> Prediction {
    let history = stats::scores_for_school(records, school_name, None);

    if history.len() < MIN_HISTORY {
        return failed(
            school_name,
            target_year,
            format!(
                "insufficient history: {} year(s) on record, need at least {MIN_HISTORY}",
                history.len()
            ),
        );
    }

    let years: Vec<f64> = history.iter().map(|r| r.year as f64).collect();
    let mins: Vec<f64> = history.iter().map(|r| r.min_score).collect();
    let maxes: Vec<f64> = history.iter().map(|r| r.max_score).collect();
    let avgs: Vec<f64> = history.iter().map(|r| r.avg_score).collect();

    let x = target_year as f64;
    let (Some(min_fit), Some(max_fit), Some(avg_fit)) = (
        fit_metric(&years, &mins, x),
        fit_metric(&years, &maxes, x),
        fit_metric(&years, &avgs, x),
    ) else {
        return failed(
            school_name,
            target_year,
            "degenerate history: could not fit a trend line".to_string(),
        );
    };

    let volume = (history.len() as f64 / SATURATION_COUNT).min(1.0) * 0.7;
    let mean_r2 = (min_fit.r2 + max_fit.r2 + avg_fit.r2) / 3.0;
    let confidence = round1(volume * (0.3 + 0.7 * mean_r2) * 100.0);

    Prediction {
        school_name: school_name.to_string(),
        year: target_year,
        min_score: Some(round1(min_fit.value)),
        max_score: Some(round1(max_fit.value)),
        avg_score: Some(round1(avg_fit.value)),
        confidence,
        r2_score: Some(round3(mean_r2)),
        error: None,
    }
}

/// Forecast every school in `school_names` independently.
///
/// Results correspond 1:1 and in order with the input; one school's
/// insufficient history never blocks the others. Each school's fit is
/// self-contained, so the batch fans out across threads.
pub fn batch_predict(
    records: &[ScoreRecord],
    school_names: &[&str],
    target_year: i32,
) -> Vec<Prediction> {
    school_names
        .par_iter()
        .map(|name| predict_scores(records, name, target_year))
        .collect()
}

struct MetricFit {
    value: f64,
    r2: f64,
}

fn fit_metric(years: &[f64], values: &[f64], target: f64) -> Option<MetricFit> {
    let line = fit_line(years, values)?;
    Some(MetricFit {
        value: line.at(target),
        r2: r_squared(years, values, &line),
    })
}

fn failed(school_name: &str, target_year: i32, reason: String) -> Prediction {
    Prediction {
        school_name: school_name.to_string(),
        year: target_year,
        min_score: None,
        max_score: None,
        avg_score: None,
        confidence: 0.0,
        r2_score: None,
        error: Some(reason),
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record(school: &str, year: i32, min: f64, max: f64, avg: f64) -> ScoreRecord {
        ScoreRecord {
            school_name: school.to_string(),
            year,
            min_score: min,
            max_score: max,
            avg_score: avg,
            student_sources: BTreeMap::new(),
        }
    }

    fn linear_history(school: &str, years: &[i32]) -> Vec<ScoreRecord> {
        years
            .iter()
            .map(|&y| {
                let base = 500.0 + 10.0 * (y - 2021) as f64;
                record(school, y, base, base + 28.0, base + 15.0)
            })
            .collect()
    }

    #[test]
    fn single_record_reports_insufficient_history() {
        let records = vec![record("上海中学", 2023, 555.0, 578.0, 565.0)];
        let prediction = predict_scores(&records, "上海中学", 2026);

        assert_eq!(prediction.confidence, 0.0);
        assert!(prediction.min_score.is_none());
        assert!(prediction.max_score.is_none());
        assert!(prediction.avg_score.is_none());
        assert!(prediction.r2_score.is_none());
        assert!(prediction.error.as_deref().unwrap().contains("insufficient history"));
    }

    #[test]
    fn three_year_linear_trend_projects_exactly() {
        // avg_score 500/510/520 over 2021-2023: slope 10/year, so 2026 is 550,
        // R^2 is 1, and confidence is min(3/5,1)*0.7 * (0.3+0.7*1) * 100 = 42.0.
        let records = vec![
            record("X", 2021, 490.0, 520.0, 500.0),
            record("X", 2022, 500.0, 530.0, 510.0),
            record("X", 2023, 510.0, 540.0, 520.0),
        ];
        let prediction = predict_scores(&records, "X", 2026);

        assert_eq!(prediction.avg_score, Some(550.0));
        assert_eq!(prediction.min_score, Some(540.0));
        assert_eq!(prediction.max_score, Some(570.0));
        assert_eq!(prediction.r2_score, Some(1.0));
        assert_eq!(prediction.confidence, 42.0);
        assert!(prediction.error.is_none());
    }

    #[test]
    fn saturated_perfect_fit_caps_confidence_at_seventy() {
        // Five records saturate the volume factor at 0.7; a perfect fit then
        // yields 0.7 * (0.3 + 0.7) * 100 = 70.0.
        let records = linear_history("X", &[2021, 2022, 2023, 2024, 2025]);
        let prediction = predict_scores(&records, "X", 2026);

        assert_eq!(prediction.confidence, 70.0);
        assert_eq!(prediction.r2_score, Some(1.0));
    }

    #[test]
    fn constant_history_counts_as_perfect_fit() {
        let records = vec![
            record("X", 2021, 600.0, 620.0, 610.0),
            record("X", 2022, 600.0, 620.0, 610.0),
            record("X", 2023, 600.0, 620.0, 610.0),
        ];
        let prediction = predict_scores(&records, "X", 2026);

        assert_eq!(prediction.r2_score, Some(1.0));
        assert_eq!(prediction.avg_score, Some(610.0));
    }

    #[test]
    fn other_schools_records_are_ignored() {
        let mut records = linear_history("X", &[2021, 2022, 2023]);
        records.push(record("Y", 2021, 400.0, 420.0, 410.0));
        let prediction = predict_scores(&records, "X", 2026);
        assert_eq!(prediction.avg_score, Some(565.0));
    }

    #[test]
    fn batch_is_order_preserving_and_failure_isolated() {
        let mut records = linear_history("甲", &[2021, 2022, 2023]);
        records.push(record("乙", 2023, 555.0, 578.0, 565.0));

        let predictions = batch_predict(&records, &["甲", "乙", "丙"], 2026);
        assert_eq!(predictions.len(), 3);

        assert_eq!(predictions[0].school_name, "甲");
        assert!(predictions[0].error.is_none());

        assert_eq!(predictions[1].school_name, "乙");
        assert!(predictions[1].error.is_some());

        assert_eq!(predictions[2].school_name, "丙");
        assert_eq!(predictions[2].confidence, 0.0);
    }
}
