// src/api.rs
//! HTTP surface: router, shared state, and request/response shapes.
//!
//! The analyze payload accepts several mutually exclusive fields; it is
//! resolved into a tagged `AnalyzeInput` exactly once at the boundary and
//! dispatched by exhaustive match from there on.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::cache;
use crate::config::Config;
use crate::error::AppError;
use crate::extract::{self, Article};
use crate::keywords;
use crate::report;
use crate::sentiment::{SentimentAnalyzer, SentimentResult};
use crate::store::{DocumentStore, JsonFileStore, POLARITY_DATA};
use crate::trends;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub analyzer: Arc<SentimentAnalyzer>,
    pub store: Arc<dyn DocumentStore>,
}

/// Build the production state from the environment. Lexicon parse failures
/// surface here, at startup.
pub fn default_state() -> anyhow::Result<AppState> {
    let config = Config::from_env();
    let analyzer = SentimentAnalyzer::from_embedded_lexicon()?;
    let store = JsonFileStore::new(config.data_dir.clone());
    Ok(AppState {
        config: Arc::new(config),
        analyzer: Arc::new(analyzer),
        store: Arc::new(store),
    })
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/analyze", post(analyze_handler))
        .route("/extract", post(extract_handler))
        .route("/visualize", get(visualize_handler))
        .route("/send-report", post(send_report_handler))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

// --- /analyze ---

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    pub text: Option<String>,
    pub texts: Option<Vec<String>>,
    pub articles: Option<Vec<Article>>,
}

/// The analyze input, decided once at the boundary.
#[derive(Debug)]
pub enum AnalyzeInput {
    SingleText(String),
    TextBatch(Vec<String>),
    ArticleBatch(Vec<Article>),
}

impl TryFrom<AnalyzeRequest> for AnalyzeInput {
    type Error = AppError;

    fn try_from(req: AnalyzeRequest) -> Result<Self, Self::Error> {
        if let Some(text) = req.text {
            Ok(AnalyzeInput::SingleText(text))
        } else if let Some(texts) = req.texts {
            Ok(AnalyzeInput::TextBatch(texts))
        } else if let Some(articles) = req.articles {
            Ok(AnalyzeInput::ArticleBatch(articles))
        } else {
            Err(AppError::Validation(
                "Provide one of: text, texts, or articles".to_string(),
            ))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub count: usize,
    pub items: Vec<SentimentResult>,
    pub keywords: Vec<String>,
}

async fn analyze_handler(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let input = AnalyzeInput::try_from(req)?;

    let results = match input {
        AnalyzeInput::SingleText(text) => state.analyzer.score_batch(&[text]),
        AnalyzeInput::TextBatch(texts) => state.analyzer.score_batch(&texts),
        AnalyzeInput::ArticleBatch(articles) => {
            let texts: Vec<String> = articles.iter().map(Article::combined_text).collect();
            let results = state.analyzer.score_batch(&texts);

            // Best-effort side write: the response still succeeds if the
            // polarity persistence fails.
            let records = trends::polarity_records(&articles, &results);
            if let Err(e) = state.store.insert_many(POLARITY_DATA, &records).await {
                warn!(error = ?e, "failed to persist polarity records");
            }
            results
        }
    };

    let texts: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
    let kws = keywords::extract_keywords(&texts, keywords::DEFAULT_TOP_K);

    // Best-effort daily cache append.
    if let Err(e) = cache::append_daily_aggregate(&results, &state.config.cache_csv_path) {
        warn!(error = ?e, "failed to append mean polarity cache");
    }

    Ok(Json(AnalyzeResponse {
        count: results.len(),
        items: results,
        keywords: kws,
    }))
}

// --- /extract ---

#[derive(Debug, Default, Deserialize)]
pub struct ExtractRequest {
    pub domains: Option<Vec<String>>,
    pub from_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub count: usize,
    pub items: Vec<Article>,
}

async fn extract_handler(
    State(state): State<AppState>,
    body: Option<Json<ExtractRequest>>,
) -> Result<Json<ExtractResponse>, AppError> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let articles = extract::extract_articles(
        &state.config,
        state.store.as_ref(),
        req.domains,
        req.from_date,
    )
    .await?;
    Ok(Json(ExtractResponse {
        count: articles.len(),
        items: articles,
    }))
}

// --- /visualize ---

#[derive(Debug, Deserialize)]
pub struct VisualizeParams {
    pub source: Option<String>,
}

async fn visualize_handler(
    State(state): State<AppState>,
    Query(params): Query<VisualizeParams>,
) -> Result<Json<trends::VisualizationPayload>, AppError> {
    let payload =
        trends::get_visualization_payload(state.store.as_ref(), params.source.as_deref()).await?;
    Ok(Json(payload))
}

// --- /send-report ---

#[derive(Debug, Deserialize)]
pub struct SendReportRequest {
    pub to: Vec<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub attachments: Option<Vec<PathBuf>>,
}

async fn send_report_handler(
    State(state): State<AppState>,
    Json(req): Json<SendReportRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    report::send_report(
        &state.config,
        &req.to,
        req.subject.as_deref().unwrap_or(report::DEFAULT_SUBJECT),
        req.body.as_deref().unwrap_or(report::DEFAULT_BODY),
        req.attachments.as_deref().unwrap_or_default(),
    )
    .await?;
    Ok(Json(serde_json::json!({ "status": "sent" })))
}
