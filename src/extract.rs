//! Regex-based field extraction from free-text replies.
//!
//! The upstream endpoint answers in prose, not JSON; these helpers pull
//! labeled numbers out of whatever came back. Extraction never fails: a
//! pattern miss or an unparseable capture degrades to the caller-supplied
//! default. Callers that need "found vs. defaulted" use [`try_number`].
//!
//! Patterns must tolerate both the ASCII and fullwidth variants of the
//! colon (`:` / `：`) and percent sign (`%` / `％`) since replies mix them
//! freely.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// Generic `label：pct%` pair anywhere in the text. The label may not span
/// separators, so list items like `徐汇区：35%，浦东新区：25%` split cleanly.
static LABELED_PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^：:,，、\n]+)[：:]\s*(\d+(?:\.\d+)?)\s*[%％]").unwrap());

/// First number captured by `pattern`, or `default` when the pattern misses
/// or the capture fails numeric conversion.
pub fn extract_number(text: &str, pattern: &Regex, default: f64) -> f64 {
    try_number(text, pattern).unwrap_or(default)
}

/// Like [`extract_number`] but tries `fallback` when `primary` misses.
///
/// Score labels usually arrive as `最低分：555`, but prose replies also say
/// `最低分为555分`; the fallback pattern covers the unit-suffixed form.
pub fn extract_number_with_fallback(
    text: &str,
    primary: &Regex,
    fallback: &Regex,
    default: f64,
) -> f64 {
    try_number(text, primary)
        .or_else(|| try_number(text, fallback))
        .unwrap_or(default)
}

/// First capture of `pattern` parsed as `f64`, if any.
pub fn try_number(text: &str, pattern: &Regex) -> Option<f64> {
    pattern
        .captures(text)?
        .get(1)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Scan the whole reply for `label: pct%` pairs and keep only labels that
/// look like an administrative region (they contain `区` or `县`).
///
/// This is the disambiguation step: replies quote plenty of unrelated
/// percentages (admission-line rates, growth figures) and the region marker
/// is what separates the origin distribution from them. On a duplicated
/// label the last occurrence wins.
pub fn extract_region_shares(text: &str) -> BTreeMap<String, f64> {
    let mut shares = BTreeMap::new();
    for caps in LABELED_PERCENT.captures_iter(text) {
        let label = caps[1].trim();
        if !label.contains('区') && !label.contains('县') {
            continue;
        }
        if let Ok(value) = caps[2].parse::<f64>() {
            shares.insert(label.to_string(), value);
        }
    }
    shares
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(re: &str) -> Regex {
        Regex::new(re).unwrap()
    }

    #[test]
    fn extract_number_returns_first_match() {
        let re = pattern(r"最低分[：:]\s*(\d+(?:\.\d+)?)");
        assert_eq!(extract_number("最低分：555分，最低分：600分", &re, 0.0), 555.0);
    }

    #[test]
    fn extract_number_defaults_on_miss() {
        let re = pattern(r"最低分[：:]\s*(\d+(?:\.\d+)?)");
        assert_eq!(extract_number("这段文字没有任何分数信息", &re, 0.0), 0.0);
        assert_eq!(extract_number("", &re, -1.0), -1.0);
    }

    #[test]
    fn extract_number_accepts_fullwidth_colon() {
        let re = pattern(r"平均分[：:]\s*(\d+(?:\.\d+)?)");
        assert_eq!(extract_number("平均分：565", &re, 0.0), 565.0);
        assert_eq!(extract_number("平均分: 565", &re, 0.0), 565.0);
    }

    #[test]
    fn fallback_pattern_covers_unit_suffixed_prose() {
        let primary = pattern(r"最低分[：:]\s*(\d+(?:\.\d+)?)");
        let fallback = pattern(r"最低分[^\d\n]{0,4}(\d+(?:\.\d+)?)\s*分");
        let text = "2023年该校最低分为555分。";
        assert_eq!(
            extract_number_with_fallback(text, &primary, &fallback, 0.0),
            555.0
        );
    }

    #[test]
    fn region_scan_keeps_only_region_labels() {
        let text = "徐汇区：35%\n浦东新区：25%\n985入线率：68%\n增长：3%";
        let shares = extract_region_shares(text);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares["徐汇区"], 35.0);
        assert_eq!(shares["浦东新区"], 25.0);
    }

    #[test]
    fn region_scan_accepts_fullwidth_percent() {
        let shares = extract_region_shares("崇明县：12.5％");
        assert_eq!(shares["崇明县"], 12.5);
    }

    #[test]
    fn region_scan_last_occurrence_wins() {
        let shares = extract_region_shares("徐汇区：35%\n徐汇区：40%");
        assert_eq!(shares["徐汇区"], 40.0);
    }

    #[test]
    fn region_scan_empty_on_unrelated_text() {
        assert!(extract_region_shares("无法识别的查询类型").is_empty());
    }
}
