//! Terminal formatting for query results, statistics, and forecasts.
//!
//! Formatting stays in one place so the parsing/forecast code remains
//! clean and testable, and output changes stay localized.

use crate::domain::{Prediction, RateRecord, ScoreRecord, SchoolCategory};
use crate::stats::{RateStatistics, Summary};

/// Format one school-year's admission scores.
pub fn format_score_record(record: &ScoreRecord) -> String {
    let mut out = String::new();

    out.push_str(&format!("学校: {}\n", record.school_name));
    out.push_str(&format!("年份: {}\n", record.year));
    out.push_str(&format!("最低分: {}\n", record.min_score));
    out.push_str(&format!("最高分: {}\n", record.max_score));
    out.push_str(&format!("平均分: {}\n", record.avg_score));

    if !record.student_sources.is_empty() {
        out.push_str("\n学生来源分布:\n");
        for (region, share) in &record.student_sources {
            out.push_str(&format!("  {region}: {share}%\n"));
        }
    }

    out
}

/// Format one school-year's admission-line rates.
pub fn format_rate_record(record: &RateRecord) -> String {
    let mut out = String::new();

    out.push_str(&format!("学校: {}\n", record.school_name));
    out.push_str(&format!("年份: {}\n", record.year));
    out.push_str(&format!("C9入线率: {}%\n", record.c9_rate));
    out.push_str(&format!("985入线率: {}%\n", record.rate_985));
    out.push_str(&format!("211入线率: {}%\n", record.rate_211));

    out
}

/// Format a forecast, including the reported-failure case.
pub fn format_prediction(prediction: &Prediction) -> String {
    let mut out = String::new();

    out.push_str(&format!("学校: {}\n", prediction.school_name));
    out.push_str(&format!("预测年份: {}\n", prediction.year));

    if let Some(reason) = &prediction.error {
        out.push_str(&format!("预测失败: {reason}\n"));
        return out;
    }

    let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v}"));
    out.push_str(&format!("预测最低分: {}\n", fmt(prediction.min_score)));
    out.push_str(&format!("预测最高分: {}\n", fmt(prediction.max_score)));
    out.push_str(&format!("预测平均分: {}\n", fmt(prediction.avg_score)));
    out.push_str(&format!("预测置信度: {}%\n", prediction.confidence));
    if let Some(r2) = prediction.r2_score {
        out.push_str(&format!("拟合度 (R²): {r2}\n"));
    }

    out
}

/// Format a category-wide score summary for one year.
pub fn format_score_summary(
    category: SchoolCategory,
    year: i32,
    per_school: &[(&str, f64)],
    summary: &Summary,
) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {} {}年 平均分汇总 ===\n", category.label(), year));

    if per_school.is_empty() {
        out.push_str("（暂无数据）\n");
        return out;
    }

    for (school, avg) in per_school {
        out.push_str(&format!("  {school}: {avg}\n"));
    }

    out.push('\n');
    out.push_str(&format!(
        "最低 {} | 最高 {} | 均值 {:.1} | 中位数 {:.1} | 标准差 {:.2}\n",
        summary.min, summary.max, summary.mean, summary.median, summary.std_dev
    ));

    out
}

/// Format a category-wide rate summary for one year.
pub fn format_rate_summary(
    category: SchoolCategory,
    year: i32,
    per_school: &[(&str, f64, f64, f64)],
    stats: &RateStatistics,
) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {} {}年 入线率汇总 ===\n", category.label(), year));

    if per_school.is_empty() {
        out.push_str("（暂无数据）\n");
        return out;
    }

    for (school, c9, r985, r211) in per_school {
        out.push_str(&format!("  {school}: C9 {c9}% | 985 {r985}% | 211 {r211}%\n"));
    }

    out.push('\n');
    out.push_str(&format!(
        "C9  均值 {:.1}% (区间 {:.1}%-{:.1}%)\n",
        stats.c9.mean, stats.c9.min, stats.c9.max
    ));
    out.push_str(&format!(
        "985 均值 {:.1}% (区间 {:.1}%-{:.1}%)\n",
        stats.r985.mean, stats.r985.min, stats.r985.max
    ));
    out.push_str(&format!(
        "211 均值 {:.1}% (区间 {:.1}%-{:.1}%)\n",
        stats.r211.mean, stats.r211.min, stats.r211.max
    ));

    out
}
