//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they
//! can be:
//!
//! - built in memory during collection
//! - exported to CSV
//! - reloaded later for aggregation and forecasting

use std::collections::BTreeMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::config;

/// Closed set of school tiers tracked by the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SchoolCategory {
    /// 上海四校.
    ShanghaiFour,
    /// 八大金刚.
    EightGiants,
    /// 市重点.
    CityKey,
    /// 闵行区重点.
    MinhangKey,
    /// 浦东新区重点.
    PudongKey,
}

impl SchoolCategory {
    pub const ALL: [SchoolCategory; 5] = [
        SchoolCategory::ShanghaiFour,
        SchoolCategory::EightGiants,
        SchoolCategory::CityKey,
        SchoolCategory::MinhangKey,
        SchoolCategory::PudongKey,
    ];

    /// Human-readable label for terminal output.
    pub fn label(self) -> &'static str {
        match self {
            SchoolCategory::ShanghaiFour => "上海四校",
            SchoolCategory::EightGiants => "八大金刚",
            SchoolCategory::CityKey => "市重点",
            SchoolCategory::MinhangKey => "闵行区重点",
            SchoolCategory::PudongKey => "浦东新区重点",
        }
    }
}

/// One school-year's admission scores plus the student-origin distribution.
///
/// `avg_score` is stored exactly as parsed; it is *not* clamped into
/// `[min_score, max_score]`. Upstream prose sometimes contradicts itself and
/// the store keeps what the source said (known data-quality gap).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub school_name: String,
    pub year: i32,
    pub min_score: f64,
    pub max_score: f64,
    pub avg_score: f64,
    /// Region name -> percentage of admitted students from that region.
    pub student_sources: BTreeMap<String, f64>,
}

/// One school-year's C9/985/211 admission-line rates, in percent.
///
/// Values are nominally in `[0, 100]` but are not enforced; a zero means
/// "not found in the reply" as much as it means a genuine zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRecord {
    pub school_name: String,
    pub year: i32,
    pub c9_rate: f64,
    pub rate_985: f64,
    pub rate_211: f64,
}

/// Per-year admission-line rates attached to a `School`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateTriple {
    pub c9: f64,
    pub r985: f64,
    pub r211: f64,
}

/// A school and its per-year collected data.
///
/// Entries are only ever added during a run; nothing is removed.
#[derive(Debug, Clone)]
pub struct School {
    pub name: String,
    pub category: SchoolCategory,
    scores: BTreeMap<i32, ScoreRecord>,
    rates: BTreeMap<i32, RateTriple>,
}

impl School {
    pub fn new(name: impl Into<String>, category: SchoolCategory) -> Self {
        Self {
            name: name.into(),
            category,
            scores: BTreeMap::new(),
            rates: BTreeMap::new(),
        }
    }

    pub fn add_score(&mut self, record: ScoreRecord) {
        self.scores.insert(record.year, record);
    }

    pub fn add_rate(&mut self, year: i32, rate: RateTriple) {
        self.rates.insert(year, rate);
    }

    pub fn score(&self, year: i32) -> Option<&ScoreRecord> {
        self.scores.get(&year)
    }

    pub fn rate(&self, year: i32) -> Option<&RateTriple> {
        self.rates.get(&year)
    }
}

impl std::fmt::Display for School {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.category.label())
    }
}

/// All configured schools, keyed by name.
///
/// Constructed once at startup from the static category tables. A name
/// listed under two categories keeps the last-declared category.
#[derive(Debug, Clone)]
pub struct SchoolRoster {
    schools: BTreeMap<String, School>,
}

impl SchoolRoster {
    pub fn from_config() -> Self {
        let mut schools = BTreeMap::new();
        for category in SchoolCategory::ALL {
            for &name in config::schools_in(category) {
                schools.insert(name.to_string(), School::new(name, category));
            }
        }
        Self { schools }
    }

    pub fn school(&self, name: &str) -> Option<&School> {
        self.schools.get(name)
    }

    pub fn school_mut(&mut self, name: &str) -> Option<&mut School> {
        self.schools.get_mut(name)
    }

    /// Schools in a category, in configured display order.
    pub fn by_category(&self, category: SchoolCategory) -> Vec<&School> {
        config::schools_in(category)
            .iter()
            .filter_map(|name| self.schools.get(*name))
            .collect()
    }
}

/// Forecast output for one school and target year.
///
/// A failed forecast is still a `Prediction`: metrics are `None`, confidence
/// is 0, and `error` says why. Callers inspect rather than catch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub school_name: String,
    pub year: i32,
    pub min_score: Option<f64>,
    pub max_score: Option<f64>,
    pub avg_score: Option<f64>,
    /// Heuristic 0-100 score blending sample size and fit quality. Not a
    /// statistical confidence interval.
    pub confidence: f64,
    /// Mean coefficient of determination of the three metric fits.
    pub r2_score: Option<f64>,
    pub error: Option<String>,
}
