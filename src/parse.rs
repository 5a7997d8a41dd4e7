//! Reply parsers: free text in, typed records out.
//!
//! Both parsers are pure functions of `(text, school, year)`: no I/O, no
//! retries. Missing or unrecognizable data degrades to zero/empty rather
//! than failing, so an upstream error description arriving as reply text
//! yields a defaulted record instead of aborting a batch. The same text
//! always parses to the same record.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{RateRecord, ScoreRecord};
use crate::extract::{extract_number, extract_number_with_fallback, extract_region_shares};

// Score labels: primary form is `label：number`; the fallback accepts prose
// like `最低分为555分` where only the trailing unit anchors the number.
static MIN_SCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"最低分[：:]\s*(\d+(?:\.\d+)?)").unwrap());
static MIN_SCORE_SUFFIXED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"最低分[^\d\n]{0,4}(\d+(?:\.\d+)?)\s*分").unwrap());

static MAX_SCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"最高分[：:]\s*(\d+(?:\.\d+)?)").unwrap());
static MAX_SCORE_SUFFIXED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"最高分[^\d\n]{0,4}(\d+(?:\.\d+)?)\s*分").unwrap());

static AVG_SCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"平均分[：:]\s*(\d+(?:\.\d+)?)").unwrap());
static AVG_SCORE_SUFFIXED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"平均分[^\d\n]{0,4}(\d+(?:\.\d+)?)\s*分").unwrap());

// Rate labels are anchored on their tier name so `C9入线率：45% 985入线率：68%`
// in one line cannot cross-match.
static C9_RATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"C9\s*入线率\s*[：:]\s*(\d+(?:\.\d+)?)\s*[%％]").unwrap());
static RATE_985: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"985\s*入线率\s*[：:]\s*(\d+(?:\.\d+)?)\s*[%％]").unwrap());
static RATE_211: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"211\s*入线率\s*[：:]\s*(\d+(?:\.\d+)?)\s*[%％]").unwrap());

/// Default substituted for every numeric field the reply does not contain.
const MISSING: f64 = 0.0;

/// Parse an admission-score reply.
///
/// Never fails: a reply with no recognizable fields produces a record with
/// zeroed scores and an empty origin distribution.
pub fn parse_score_reply(text: &str, school_name: &str, year: i32) -> ScoreRecord {
    ScoreRecord {
        school_name: school_name.to_string(),
        year,
        min_score: extract_number_with_fallback(text, &MIN_SCORE, &MIN_SCORE_SUFFIXED, MISSING),
        max_score: extract_number_with_fallback(text, &MAX_SCORE, &MAX_SCORE_SUFFIXED, MISSING),
        avg_score: extract_number_with_fallback(text, &AVG_SCORE, &AVG_SCORE_SUFFIXED, MISSING),
        student_sources: extract_region_shares(text),
    }
}

/// Parse an admission-line-rate reply under the same zero-default policy.
pub fn parse_rate_reply(text: &str, school_name: &str, year: i32) -> RateRecord {
    RateRecord {
        school_name: school_name.to_string(),
        year,
        c9_rate: extract_number(text, &C9_RATE, MISSING),
        rate_985: extract_number(text, &RATE_985, MISSING),
        rate_211: extract_number(text, &RATE_211, MISSING),
    }
}
