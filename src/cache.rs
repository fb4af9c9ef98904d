// src/cache.rs
//! Daily mean-polarity CSV cache.
//!
//! One row per calendar date (UTC). Re-running on the same day replaces the
//! existing row with the new batch's aggregate — last write wins, aggregates
//! are not merged. Rows keep insertion order, so the file is not guaranteed
//! to be date-sorted.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::sentiment::SentimentResult;

const HEADER: &str = "date,mean_compound,count,pos,neg,neu";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPolarityAggregate {
    pub date: NaiveDate,
    pub mean_compound: f64,
    pub count: usize,
    pub pos: usize,
    pub neg: usize,
    pub neu: usize,
}

impl DailyPolarityAggregate {
    pub fn from_results(date: NaiveDate, results: &[SentimentResult]) -> Self {
        let count = results.len();
        let mean_compound = if count > 0 {
            results.iter().map(|r| r.scores.compound).sum::<f64>() / count as f64
        } else {
            0.0
        };
        Self {
            date,
            mean_compound,
            count,
            pos: results.iter().filter(|r| r.label == 1).count(),
            neg: results.iter().filter(|r| r.label == -1).count(),
            neu: results.iter().filter(|r| r.label == 0).count(),
        }
    }

    fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{}",
            self.date, self.mean_compound, self.count, self.pos, self.neg, self.neu
        )
    }

    fn parse_csv_row(line: &str) -> Option<Self> {
        let mut parts = line.split(',');
        Some(Self {
            date: parts.next()?.parse().ok()?,
            mean_compound: parts.next()?.parse().ok()?,
            count: parts.next()?.parse().ok()?,
            pos: parts.next()?.parse().ok()?,
            neg: parts.next()?.parse().ok()?,
            neu: parts.next()?.parse().ok()?,
        })
    }
}

/// Append today's aggregate for `results`, replacing any existing row for
/// today. Empty input is a no-op that still reports the would-be path.
pub fn append_daily_aggregate(results: &[SentimentResult], csv_path: &Path) -> Result<PathBuf> {
    if results.is_empty() {
        return Ok(csv_path.to_path_buf());
    }

    let today = Utc::now().date_naive();
    let entry = DailyPolarityAggregate::from_results(today, results);

    let mut rows = read_rows(csv_path)?;
    rows.retain(|r| r.date != today);
    rows.push(entry);
    write_rows(csv_path, &rows)?;

    Ok(csv_path.to_path_buf())
}

/// All cache rows in file order; missing file reads as empty.
pub fn read_rows(csv_path: &Path) -> Result<Vec<DailyPolarityAggregate>> {
    if !csv_path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(csv_path)
        .with_context(|| format!("reading cache {}", csv_path.display()))?;
    Ok(content
        .lines()
        .skip(1)
        .filter_map(DailyPolarityAggregate::parse_csv_row)
        .collect())
}

fn write_rows(csv_path: &Path, rows: &[DailyPolarityAggregate]) -> Result<()> {
    if let Some(dir) = csv_path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let mut out = String::from(HEADER);
    out.push('\n');
    for row in rows {
        out.push_str(&row.to_csv_row());
        out.push('\n');
    }
    fs::write(csv_path, out).with_context(|| format!("writing cache {}", csv_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::{label_for, PolarityScore, SentimentResult};

    fn result(compound: f64) -> SentimentResult {
        SentimentResult {
            text: String::new(),
            scores: PolarityScore {
                neg: 0.0,
                neu: 1.0,
                pos: 0.0,
                compound,
            },
            label: label_for(compound),
            word_count: 0,
        }
    }

    #[test]
    fn aggregate_averages_and_counts_labels() {
        let agg = DailyPolarityAggregate::from_results(
            NaiveDate::from_ymd_opt(2026, 8, 27).unwrap(),
            &[result(0.5), result(-0.5), result(0.0)],
        );
        assert_eq!(agg.count, 3);
        assert!((agg.mean_compound - 0.0).abs() < 1e-9);
        assert_eq!((agg.pos, agg.neg, agg.neu), (1, 1, 1));
    }

    #[test]
    fn empty_input_reports_path_without_writing() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("mean_polarity.csv");
        let out = append_daily_aggregate(&[], &path).unwrap();
        assert_eq!(out, path);
        assert!(!path.exists());
    }

    #[test]
    fn same_day_rerun_overwrites_not_merges() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("mean_polarity.csv");

        append_daily_aggregate(&[result(0.4), result(0.6)], &path).unwrap();
        append_daily_aggregate(&[result(-0.9)], &path).unwrap();

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].count, 1);
        assert!((rows[0].mean_compound - (-0.9)).abs() < 1e-9);
        assert_eq!(rows[0].neg, 1);
    }

    #[test]
    fn csv_rows_survive_a_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("mean_polarity.csv");
        let past = DailyPolarityAggregate {
            date: NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
            mean_compound: 0.125,
            count: 8,
            pos: 4,
            neg: 3,
            neu: 1,
        };
        write_rows(&path, &[past.clone()]).unwrap();

        // A fresh append keeps the unrelated historical row.
        append_daily_aggregate(&[result(0.3)], &path).unwrap();
        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], past);
    }
}
