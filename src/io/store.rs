//! CSV persistence for collected records.
//!
//! One flat file per record kind, fully rewritten on every save; the
//! containing directory is created on first save. Loads return an empty
//! collection when the file does not exist yet.
//!
//! The origin-distribution column round-trips through a Python-style dict
//! literal (`{'徐汇区': 35.0}`) so the files stay hand-editable. A cell
//! that fails to decode falls back to an empty mapping for that one record
//! instead of failing the whole load.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Prediction, RateRecord, ScoreRecord};
use crate::error::AppError;

/// On-disk row shape for score records: the nested mapping travels as one
/// encoded cell so the file stays flat.
#[derive(Debug, Serialize, Deserialize)]
struct ScoreRow {
    school_name: String,
    year: i32,
    min_score: f64,
    max_score: f64,
    avg_score: f64,
    student_sources: String,
}

/// Save score records, overwriting any prior file content.
pub fn save_scores(path: &Path, scores: &[ScoreRecord]) -> Result<(), AppError> {
    ensure_parent_dir(path)?;

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", path.display())))?;

    for record in scores {
        let row = ScoreRow {
            school_name: record.school_name.clone(),
            year: record.year,
            min_score: record.min_score,
            max_score: record.max_score,
            avg_score: record.avg_score,
            student_sources: encode_sources(&record.student_sources),
        };
        writer
            .serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write '{}': {e}", path.display())))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush '{}': {e}", path.display())))
}

/// Load score records; a missing file is an empty collection, not an error.
pub fn load_scores(path: &Path) -> Result<Vec<ScoreRecord>, AppError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to open '{}': {e}", path.display())))?;

    let mut out = Vec::new();
    for row in reader.deserialize::<ScoreRow>() {
        let row =
            row.map_err(|e| AppError::new(2, format!("Invalid row in '{}': {e}", path.display())))?;

        let student_sources = match decode_sources(&row.student_sources) {
            Some(map) => map,
            None => {
                tracing::warn!(
                    school = %row.school_name,
                    year = row.year,
                    cell = %row.student_sources,
                    "undecodable student_sources cell; substituting an empty mapping"
                );
                BTreeMap::new()
            }
        };

        out.push(ScoreRecord {
            school_name: row.school_name,
            year: row.year,
            min_score: row.min_score,
            max_score: row.max_score,
            avg_score: row.avg_score,
            student_sources,
        });
    }

    Ok(out)
}

/// Save rate records, overwriting any prior file content.
pub fn save_rates(path: &Path, rates: &[RateRecord]) -> Result<(), AppError> {
    ensure_parent_dir(path)?;

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", path.display())))?;

    for record in rates {
        writer
            .serialize(record)
            .map_err(|e| AppError::new(2, format!("Failed to write '{}': {e}", path.display())))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush '{}': {e}", path.display())))
}

/// Load rate records; a missing file is an empty collection, not an error.
pub fn load_rates(path: &Path) -> Result<Vec<RateRecord>, AppError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to open '{}': {e}", path.display())))?;

    let mut out = Vec::new();
    for row in reader.deserialize::<RateRecord>() {
        out.push(
            row.map_err(|e| {
                AppError::new(2, format!("Invalid row in '{}': {e}", path.display()))
            })?,
        );
    }

    Ok(out)
}

/// Export forecast results for spreadsheet consumption.
pub fn save_predictions(path: &Path, predictions: &[Prediction]) -> Result<(), AppError> {
    ensure_parent_dir(path)?;

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", path.display())))?;

    for prediction in predictions {
        writer.serialize(prediction).map_err(|e| {
            AppError::new(2, format!("Failed to write '{}': {e}", path.display()))
        })?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush '{}': {e}", path.display())))
}

/// Encode an origin distribution as a Python-style dict literal.
///
/// The inverse of [`decode_sources`]: `decode(encode(m)) == m` for every
/// mapping the extractor can produce.
pub fn encode_sources(sources: &BTreeMap<String, f64>) -> String {
    let body = sources
        .iter()
        .map(|(region, share)| format!("'{region}': {share:?}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{body}}}")
}

/// Decode a Python-style dict literal back into an origin distribution.
///
/// Accepts single- or double-quoted keys. Returns `None` on any
/// malformation; the caller decides the fallback.
pub fn decode_sources(cell: &str) -> Option<BTreeMap<String, f64>> {
    let inner = cell.trim().strip_prefix('{')?.strip_suffix('}')?.trim();

    let mut out = BTreeMap::new();
    if inner.is_empty() {
        return Some(out);
    }

    for pair in inner.split(',') {
        let (key, value) = pair.split_once(':')?;
        let key = key.trim();
        let key = key
            .strip_prefix('\'')
            .and_then(|k| k.strip_suffix('\''))
            .or_else(|| key.strip_prefix('"').and_then(|k| k.strip_suffix('"')))?;
        let value: f64 = value.trim().parse().ok()?;
        out.insert(key.to_string(), value);
    }

    Some(out)
}

fn ensure_parent_dir(path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::new(
                    2,
                    format!("Failed to create directory '{}': {e}", parent.display()),
                )
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    fn score(school: &str, year: i32, srcs: BTreeMap<String, f64>) -> ScoreRecord {
        ScoreRecord {
            school_name: school.to_string(),
            year,
            min_score: 555.0,
            max_score: 578.0,
            avg_score: 565.0,
            student_sources: srcs,
        }
    }

    #[test]
    fn sources_round_trip_exactly() {
        let m = sources(&[("徐汇区", 35.0), ("浦东新区", 25.0), ("崇明县", 12.5)]);
        assert_eq!(decode_sources(&encode_sources(&m)), Some(m));

        let empty = BTreeMap::new();
        assert_eq!(encode_sources(&empty), "{}");
        assert_eq!(decode_sources("{}"), Some(empty));
    }

    #[test]
    fn decode_accepts_double_quotes_and_spacing() {
        let decoded = decode_sources(r#"{ "徐汇区": 35.0 ,'静安区':15 }"#).unwrap();
        assert_eq!(decoded["徐汇区"], 35.0);
        assert_eq!(decoded["静安区"], 15.0);
    }

    #[test]
    fn decode_rejects_malformed_cells() {
        assert!(decode_sources("not a dict").is_none());
        assert!(decode_sources("{'徐汇区' 35.0}").is_none());
        assert!(decode_sources("{'徐汇区': NaN-ish}").is_none());
        assert!(decode_sources("{'徐汇区': 35.0").is_none());
    }

    #[test]
    fn scores_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.csv");

        let records = vec![
            score("上海中学", 2023, sources(&[("徐汇区", 35.0), ("浦东新区", 25.0)])),
            score("复旦附中", 2024, BTreeMap::new()),
        ];

        save_scores(&path, &records).unwrap();
        let loaded = load_scores(&path).unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn save_creates_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("output").join("scores.csv");

        save_scores(&path, &[score("上海中学", 2023, BTreeMap::new())]).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn save_overwrites_prior_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.csv");

        save_scores(&path, &[score("上海中学", 2023, BTreeMap::new())]).unwrap();
        save_scores(&path, &[score("复旦附中", 2024, BTreeMap::new())]).unwrap();

        let loaded = load_scores(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].school_name, "复旦附中");
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_scores(&dir.path().join("absent.csv")).unwrap().is_empty());
        assert!(load_rates(&dir.path().join("absent.csv")).unwrap().is_empty());
    }

    #[test]
    fn undecodable_sources_cell_degrades_to_empty_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.csv");

        let contents = "school_name,year,min_score,max_score,avg_score,student_sources\n\
                        上海中学,2023,555.0,578.0,565.0,\"{'徐汇区': 35.0}\"\n\
                        复旦附中,2023,550.0,570.0,560.0,garbled\n";
        fs::write(&path, contents).unwrap();

        let loaded = load_scores(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].student_sources["徐汇区"], 35.0);
        assert!(loaded[1].student_sources.is_empty());
    }

    #[test]
    fn rates_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.csv");

        let records = vec![RateRecord {
            school_name: "上海中学".to_string(),
            year: 2023,
            c9_rate: 45.0,
            rate_985: 68.0,
            rate_211: 92.0,
        }];

        save_rates(&path, &records).unwrap();
        assert_eq!(load_rates(&path).unwrap(), records);
    }

    #[test]
    fn header_rows_use_exact_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let score_path = dir.path().join("scores.csv");
        let rate_path = dir.path().join("rates.csv");

        save_scores(&score_path, &[score("上海中学", 2023, BTreeMap::new())]).unwrap();
        save_rates(
            &rate_path,
            &[RateRecord {
                school_name: "上海中学".to_string(),
                year: 2023,
                c9_rate: 45.0,
                rate_985: 68.0,
                rate_211: 92.0,
            }],
        )
        .unwrap();

        let scores_head = fs::read_to_string(&score_path).unwrap();
        assert!(scores_head
            .starts_with("school_name,year,min_score,max_score,avg_score,student_sources"));

        let rates_head = fs::read_to_string(&rate_path).unwrap();
        assert!(rates_head.starts_with("school_name,year,c9_rate,rate_985,rate_211"));
    }

    #[test]
    fn predictions_export_includes_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.csv");

        let predictions = vec![
            Prediction {
                school_name: "上海中学".to_string(),
                year: 2026,
                min_score: Some(540.0),
                max_score: Some(570.0),
                avg_score: Some(550.0),
                confidence: 42.0,
                r2_score: Some(1.0),
                error: None,
            },
            Prediction {
                school_name: "复旦附中".to_string(),
                year: 2026,
                min_score: None,
                max_score: None,
                avg_score: None,
                confidence: 0.0,
                r2_score: None,
                error: Some("insufficient history".to_string()),
            },
        ];

        save_predictions(&path, &predictions).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with(
            "school_name,year,min_score,max_score,avg_score,confidence,r2_score,error"
        ));
        assert!(contents.contains("insufficient history"));
    }
}
