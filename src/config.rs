//! Static configuration: the school roster, query prompt templates, target
//! years, and output paths.
//!
//! Everything here is immutable lookup data handed to the rest of the crate
//! at startup. Keeping it in consts (rather than a mutable global) makes
//! the collection and aggregation code pure functions of their inputs.

use crate::domain::SchoolCategory;

/// 上海四校.
pub const SHANGHAI_FOUR: &[&str] = &["上海中学", "华师大二附中", "复旦附中", "交大附中"];

/// 八大金刚.
pub const EIGHT_GIANTS: &[&str] = &[
    "南洋模范",
    "格致中学",
    "大同中学",
    "控江中学",
    "七宝中学",
    "延安中学",
    "建平中学",
    "复兴高级中学",
];

/// 市重点.
pub const CITY_KEY: &[&str] = &[
    "上海市实验学校",
    "位育中学",
    "向明中学",
    "市西中学",
    "上海中学东校",
    "上海市平和双语学校",
    "华东师大一附中",
    "上海外国语大学附属中学",
    "上海市曹杨第二中学",
    "上海市晋元高级中学",
];

/// 闵行区重点.
pub const MINHANG_KEY: &[&str] = &["闵行中学", "莘庄中学", "北桥高级中学", "闵行区实验中学"];

/// 浦东新区重点.
pub const PUDONG_KEY: &[&str] = &[
    "浦东中学",
    "建平中学浦东校区",
    "进才中学",
    "上海中学东校",
    "华东师大二附中紫竹校区",
    "上海市实验学校东校",
];

/// School names belonging to a category, in display order.
pub fn schools_in(category: SchoolCategory) -> &'static [&'static str] {
    match category {
        SchoolCategory::ShanghaiFour => SHANGHAI_FOUR,
        SchoolCategory::EightGiants => EIGHT_GIANTS,
        SchoolCategory::CityKey => CITY_KEY,
        SchoolCategory::MinhangKey => MINHANG_KEY,
        SchoolCategory::PudongKey => PUDONG_KEY,
    }
}

/// Years the collector asks about.
pub const DATA_YEARS: [i32; 5] = [2021, 2022, 2023, 2024, 2025];

/// Most recent year with collectable data.
pub const LATEST_YEAR: i32 = DATA_YEARS[DATA_YEARS.len() - 1];

/// Default forecast target: one year beyond the latest configured year.
pub fn default_prediction_year() -> i32 {
    LATEST_YEAR + 1
}

/// Directory holding all collected CSV output.
pub const DATA_OUTPUT_DIR: &str = "data/output";
pub const SCORE_DATA_FILE: &str = "data/output/admission_scores.csv";
pub const RATE_DATA_FILE: &str = "data/output/admission_rates.csv";
pub const PREDICTION_FILE: &str = "data/output/predictions.csv";

/// Chat-completions endpoint the collector queries.
pub const CHAT_API_URL: &str = "https://www.doubao.com/api/chat/completions";
pub const CHAT_MODEL: &str = "doubao-pro";

/// Prompt asking for one school-year's admission scores and student origins.
pub fn score_prompt(school: &str, year: i32) -> String {
    format!("{year}年上海{school}录取分数及学生来源")
}

/// Prompt asking for one school-year's C9/985/211 admission-line rates.
pub fn rate_prompt(school: &str, year: i32) -> String {
    format!("{year}年上海{school}C9、985、211入线率")
}
