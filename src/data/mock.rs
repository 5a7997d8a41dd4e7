//! Deterministic offline stand-in for the chat endpoint.
//!
//! Generates plausible reply prose so collection, parsing, storage, and
//! forecasting can run end to end without network access or an API key.
//! Each school gets a stable base level from a hash of its name, a gentle
//! upward year trend, and seeded Gaussian noise, so repeated runs produce
//! identical files and the forecaster has a real trend to find.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::error::AppError;

use super::QueryService;

const DISTRICTS: [&str; 6] = ["徐汇区", "浦东新区", "静安区", "黄浦区", "闵行区", "杨浦区"];

/// Offline query service answering from generated data.
pub struct MockService {
    seed: u64,
}

impl MockService {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new(42)
    }
}

impl QueryService for MockService {
    fn query(&self, prompt: &str) -> Result<String, AppError> {
        tracing::debug!(prompt = %prompt, "answering query offline");

        let school = school_in_prompt(prompt);
        let year = year_in_prompt(prompt).unwrap_or(2023);
        let mut rng = StdRng::seed_from_u64(mix(self.seed, prompt));

        if prompt.contains("录取分数") {
            score_reply(school, year, &mut rng)
        } else if prompt.contains("入线率") {
            rate_reply(school, year, &mut rng)
        } else {
            Ok("无法识别的查询类型".to_string())
        }
    }
}

fn score_reply(school: &str, year: i32, rng: &mut StdRng) -> Result<String, AppError> {
    let noise = Normal::new(0.0, 2.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let base = school_base(school);
    let trend = 4.0 * (year - 2021) as f64;
    let min = (base + trend + noise.sample(rng)).round();
    let avg = (min + 8.0 + noise.sample(rng).abs()).round();
    let max = (avg + 12.0 + noise.sample(rng).abs()).round();

    let mut out = format!("{year}年上海{school}录取分数情况如下：\n");
    out.push_str(&format!("最低分：{min:.0}分\n最高分：{max:.0}分\n平均分：{avg:.0}分\n"));

    out.push_str("\n学生来源分布：\n");
    let mut remaining: f64 = 100.0;
    for (i, district) in DISTRICTS.iter().take(4).enumerate() {
        let share = if i == 3 {
            remaining
        } else {
            let s = (remaining * rng.gen_range(0.25..0.45)).round();
            remaining -= s;
            s
        };
        out.push_str(&format!("{district}：{share:.0}%\n"));
    }

    Ok(out)
}

fn rate_reply(school: &str, year: i32, rng: &mut StdRng) -> Result<String, AppError> {
    let noise = Normal::new(0.0, 1.5)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let base = (school_base(school) - 520.0).clamp(5.0, 55.0);
    let trend = 0.5 * (year - 2021) as f64;
    let c9 = (base + trend + noise.sample(rng)).clamp(1.0, 60.0);
    let r985 = (c9 + 20.0 + noise.sample(rng)).clamp(c9, 90.0);
    let r211 = (r985 + 20.0 + noise.sample(rng)).clamp(r985, 99.0);

    Ok(format!(
        "{year}年上海{school}升学率情况：\nC9入线率：{c9:.1}%\n985入线率：{r985:.1}%\n211入线率：{r211:.1}%"
    ))
}

/// Stable per-school base admission score in the mid-500s.
fn school_base(school: &str) -> f64 {
    let mut hasher = DefaultHasher::new();
    school.hash(&mut hasher);
    540.0 + (hasher.finish() % 40) as f64
}

fn mix(seed: u64, prompt: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    prompt.hash(&mut hasher);
    hasher.finish()
}

/// School name embedded in a collection prompt, e.g.
/// `2023年上海{school}录取分数及学生来源`.
fn school_in_prompt(prompt: &str) -> &str {
    let Some(start) = prompt.find("年上海").map(|i| i + "年上海".len()) else {
        return "该校";
    };
    let rest = &prompt[start..];
    let end = rest
        .find("录取分数")
        .or_else(|| rest.find("C9"))
        .unwrap_or(rest.len());
    let school = rest[..end].trim();
    if school.is_empty() { "该校" } else { school }
}

fn year_in_prompt(prompt: &str) -> Option<i32> {
    let digits: String = prompt.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() == 4 {
        digits.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::parse::{parse_rate_reply, parse_score_reply};

    #[test]
    fn replies_are_deterministic_per_seed() {
        let svc = MockService::new(7);
        let prompt = config::score_prompt("上海中学", 2023);
        assert_eq!(svc.query(&prompt).unwrap(), svc.query(&prompt).unwrap());

        let other = MockService::new(8);
        assert_ne!(svc.query(&prompt).unwrap(), other.query(&prompt).unwrap());
    }

    #[test]
    fn score_reply_parses_into_a_populated_record() {
        let svc = MockService::default();
        let text = svc.query(&config::score_prompt("上海中学", 2023)).unwrap();
        let record = parse_score_reply(&text, "上海中学", 2023);

        assert!(record.min_score > 0.0);
        assert!(record.max_score > record.min_score);
        assert!(!record.student_sources.is_empty());
    }

    #[test]
    fn rate_reply_parses_into_a_populated_record() {
        let svc = MockService::default();
        let text = svc.query(&config::rate_prompt("复旦附中", 2024)).unwrap();
        let record = parse_rate_reply(&text, "复旦附中", 2024);

        assert!(record.c9_rate > 0.0);
        assert!(record.rate_985 >= record.c9_rate);
        assert!(record.rate_211 >= record.rate_985);
    }

    #[test]
    fn score_levels_trend_upward_over_years() {
        // The generator bakes in a per-year trend so forecasts have signal.
        let svc = MockService::default();
        let early = parse_score_reply(
            &svc.query(&config::score_prompt("上海中学", 2021)).unwrap(),
            "上海中学",
            2021,
        );
        let late = parse_score_reply(
            &svc.query(&config::score_prompt("上海中学", 2025)).unwrap(),
            "上海中学",
            2025,
        );
        assert!(late.min_score > early.min_score);
    }

    #[test]
    fn unrecognized_prompt_gets_a_harmless_reply() {
        let svc = MockService::default();
        let text = svc.query("随便问点别的").unwrap();
        let record = parse_score_reply(&text, "上海中学", 2023);
        assert_eq!(record.min_score, 0.0);
    }

    #[test]
    fn prompt_fields_are_recovered() {
        assert_eq!(school_in_prompt("2023年上海上海中学录取分数及学生来源"), "上海中学");
        assert_eq!(school_in_prompt("2023年上海复旦附中C9、985、211入线率"), "复旦附中");
        assert_eq!(year_in_prompt("2023年上海..."), Some(2023));
        assert_eq!(year_in_prompt("无年份"), None);
    }
}
