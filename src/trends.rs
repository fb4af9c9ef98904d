// src/trends.rs
//! Trend aggregation over persisted polarity records.
//!
//! Reads the `PolarityData` collection back, groups by calendar date, and
//! produces the per-date mean compound series plus a global summary. Also
//! home to the record shape written by the analyze path, so the writer and
//! reader agree on field names.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::extract::Article;
use crate::sentiment::SentimentResult;
use crate::store::{DocumentStore, POLARITY_DATA};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrendPoint {
    pub date: Option<NaiveDate>,
    pub avg_compound: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisualizationPayload {
    pub trends: Vec<TrendPoint>,
    /// `{}` when there are no records; otherwise
    /// `{count, avg_compound, pos, neg, neu}`.
    pub summary: Value,
}

/// One persisted row per analyzed article: sentiment fields plus article
/// metadata. Write-once; re-analyzing an article accumulates rows.
pub fn polarity_records(articles: &[Article], results: &[SentimentResult]) -> Vec<Value> {
    articles
        .iter()
        .zip(results)
        .map(|(art, res)| {
            json!({
                "headline": res.text,
                "compound": res.scores.compound,
                "neg": res.scores.neg,
                "neu": res.scores.neu,
                "pos": res.scores.pos,
                "label": res.label,
                "title": art.title,
                "author": art.author,
                "source": art.source,
                "description": art.description,
                "pub_date": art.pub_date,
            })
        })
        .collect()
}

/// Aggregate stored polarity records into per-date trends and a summary.
/// `source` filters on exact source-name match.
pub async fn get_visualization_payload(
    store: &dyn DocumentStore,
    source: Option<&str>,
) -> Result<VisualizationPayload, AppError> {
    let mut records = store.find_all(POLARITY_DATA).await?;
    if let Some(src) = source {
        records.retain(|r| r.get("source").and_then(Value::as_str) == Some(src));
    }

    if records.is_empty() {
        return Ok(VisualizationPayload {
            trends: Vec::new(),
            summary: json!({}),
        });
    }

    // Records without a parseable pub_date all land in one null bucket.
    let mut by_date: BTreeMap<Option<NaiveDate>, Vec<f64>> = BTreeMap::new();
    for rec in &records {
        let date = rec
            .get("pub_date")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<NaiveDate>().ok());
        let compound = rec.get("compound").and_then(Value::as_f64).unwrap_or(0.0);
        by_date.entry(date).or_default().push(compound);
    }

    // BTreeMap iteration gives ascending dates, null bucket first.
    let trends = by_date
        .into_iter()
        .map(|(date, compounds)| TrendPoint {
            date,
            avg_compound: compounds.iter().sum::<f64>() / compounds.len() as f64,
        })
        .collect();

    let count = records.len();
    let avg_compound = records
        .iter()
        .map(|r| r.get("compound").and_then(Value::as_f64).unwrap_or(0.0))
        .sum::<f64>()
        / count as f64;
    let label_count = |want: i64| {
        records
            .iter()
            .filter(|r| r.get("label").and_then(Value::as_i64) == Some(want))
            .count()
    };

    Ok(VisualizationPayload {
        trends,
        summary: json!({
            "count": count,
            "avg_compound": avg_compound,
            "pos": label_count(1),
            "neg": label_count(-1),
            "neu": label_count(0),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    async fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_many(
                POLARITY_DATA,
                &[
                    json!({"compound": 0.6, "label": 1, "source": "Reuters", "pub_date": "2026-08-25"}),
                    json!({"compound": -0.4, "label": -1, "source": "BBC News", "pub_date": "2026-08-25"}),
                    json!({"compound": 0.0, "label": 0, "source": "Reuters", "pub_date": "2026-08-26"}),
                ],
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn empty_store_yields_empty_payload() {
        let store = MemoryStore::new();
        let payload = get_visualization_payload(&store, None).await.unwrap();
        assert!(payload.trends.is_empty());
        assert_eq!(payload.summary, json!({}));
    }

    #[tokio::test]
    async fn groups_by_date_ascending_with_means() {
        let store = seeded_store().await;
        let payload = get_visualization_payload(&store, None).await.unwrap();

        assert_eq!(payload.trends.len(), 2);
        assert_eq!(
            payload.trends[0].date,
            NaiveDate::from_ymd_opt(2026, 8, 25)
        );
        assert!((payload.trends[0].avg_compound - 0.1).abs() < 1e-9);
        assert!((payload.trends[1].avg_compound - 0.0).abs() < 1e-9);

        assert_eq!(payload.summary["count"], json!(3));
        assert_eq!(payload.summary["pos"], json!(1));
        assert_eq!(payload.summary["neg"], json!(1));
        assert_eq!(payload.summary["neu"], json!(1));
    }

    #[tokio::test]
    async fn source_filter_is_exact_match() {
        let store = seeded_store().await;
        let payload = get_visualization_payload(&store, Some("Reuters"))
            .await
            .unwrap();
        assert_eq!(payload.summary["count"], json!(2));

        let none = get_visualization_payload(&store, Some("Reu"))
            .await
            .unwrap();
        assert_eq!(none.summary, json!({}));
    }

    #[tokio::test]
    async fn missing_pub_date_groups_into_null_bucket() {
        let store = MemoryStore::new();
        store
            .insert_many(
                POLARITY_DATA,
                &[
                    json!({"compound": 0.5, "label": 1}),
                    json!({"compound": -0.5, "label": -1}),
                ],
            )
            .await
            .unwrap();
        let payload = get_visualization_payload(&store, None).await.unwrap();
        assert_eq!(payload.trends.len(), 1);
        assert_eq!(payload.trends[0].date, None);
        assert!((payload.trends[0].avg_compound - 0.0).abs() < 1e-9);
    }

    #[test]
    fn polarity_records_carry_article_metadata() {
        use crate::sentiment::{label_for, PolarityScore};

        let art = Article {
            title: Some("T".into()),
            source: Some("Reuters".into()),
            pub_date: NaiveDate::from_ymd_opt(2026, 8, 25),
            ..Article::default()
        };
        let res = SentimentResult {
            text: "headline text".into(),
            scores: PolarityScore {
                neg: 0.0,
                neu: 0.5,
                pos: 0.5,
                compound: 0.6,
            },
            label: label_for(0.6),
            word_count: 2,
        };
        let recs = polarity_records(&[art], &[res]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0]["headline"], json!("headline text"));
        assert_eq!(recs[0]["source"], json!("Reuters"));
        assert_eq!(recs[0]["label"], json!(1));
        assert_eq!(recs[0]["pub_date"], json!("2026-08-25"));
    }
}
