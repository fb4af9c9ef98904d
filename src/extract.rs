// src/extract.rs
//! Article ingestion pipeline: fetch per configured domain from the news
//! API, normalize text, persist to the document store, and dump a dated
//! CSV file named after the effective from-date.
//!
//! A non-2xx response for any domain aborts the whole extraction call;
//! there is no partial-success accumulation across domains.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Config;
use crate::error::AppError;
use crate::normalize;
use crate::store::{DocumentStore, DAILY_NEWS};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const PAGE_SIZE: u32 = 100;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "extract_articles_total",
            "Articles fetched from the news API."
        );
        describe_counter!("extract_domains_total", "Domains queried per extraction.");
    });
}

/// A news article as stored and returned by the pipeline. All fields are
/// optional on input; `combined_text`, `tokens`, and `lems` are derived
/// during normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Article {
    pub title: Option<String>,
    pub author: Option<String>,
    pub source: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub pub_date: Option<NaiveDate>,
    pub url: Option<String>,
    pub photo_url: Option<String>,
    #[serde(default)]
    pub combined_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lems: Option<String>,
}

impl Article {
    /// `combined_text` when present, otherwise `title + " " + content`.
    pub fn combined_text(&self) -> String {
        if let Some(ct) = &self.combined_text {
            return ct.clone();
        }
        format!(
            "{} {}",
            self.title.as_deref().unwrap_or_default(),
            self.content.as_deref().unwrap_or_default()
        )
    }
}

// --- News API wire format ---

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
struct ApiArticle {
    title: Option<String>,
    author: Option<String>,
    source: Option<ApiSource>,
    description: Option<String>,
    content: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    url: Option<String>,
    #[serde(rename = "urlToImage")]
    url_to_image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiSource {
    name: Option<String>,
}

impl From<ApiArticle> for Article {
    fn from(it: ApiArticle) -> Self {
        Article {
            title: it.title,
            author: it.author,
            // Nested source objects flatten to their name field.
            source: it.source.and_then(|s| s.name),
            description: it.description,
            content: it.content,
            pub_date: it.published_at.as_deref().and_then(parse_pub_date),
            url: it.url,
            photo_url: it.url_to_image,
            combined_text: None,
            tokens: Vec::new(),
            lems: None,
        }
    }
}

fn parse_pub_date(raw: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .or_else(|_| raw.parse::<NaiveDate>())
        .ok()
}

/// Thin news-API client: one GET per domain, bounded timeout, no retries.
pub struct NewsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NewsClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| AppError::Upstream(format!("building http client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub async fn fetch_domain(
        &self,
        domain: &str,
        from_date: NaiveDate,
    ) -> Result<Vec<Article>, AppError> {
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[
                ("domains", domain),
                ("sortBy", "popularity"),
                ("pageSize", &PAGE_SIZE.to_string()),
                ("apiKey", &self.api_key),
                ("language", "en"),
                ("from", &from_date.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("news api request for {domain}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "news api returned {status} for {domain}"
            )));
        }

        let body: NewsResponse = resp
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("news api response for {domain}: {e}")))?;
        Ok(body.articles.into_iter().map(Article::from).collect())
    }
}

/// Derive `combined_text`, `tokens`, and `lems` for each article.
pub fn normalize_articles(mut articles: Vec<Article>) -> Vec<Article> {
    for art in &mut articles {
        let cleaned = normalize::clean(&format!(
            "{} {}",
            art.title.as_deref().unwrap_or_default(),
            art.content.as_deref().unwrap_or_default()
        ));
        let tokens = normalize::remove_stopwords(normalize::tokenize(&cleaned));
        let lems = tokens
            .iter()
            .map(|t| normalize::lemma(t))
            .collect::<Vec<_>>()
            .join(" ");
        art.combined_text = Some(cleaned);
        art.tokens = tokens;
        art.lems = Some(lems);
    }
    articles
}

/// Fetch, normalize, and persist articles for the given domains.
///
/// Defaults: `from_date` is yesterday (UTC), `domains` is the configured
/// list. The store write is the primary persistence and failures there are
/// fatal; the dated CSV dump is written alongside it.
pub async fn extract_articles(
    cfg: &Config,
    store: &dyn DocumentStore,
    domains: Option<Vec<String>>,
    from_date: Option<NaiveDate>,
) -> Result<Vec<Article>, AppError> {
    ensure_metrics_described();

    let (url, key) = cfg.news_api()?;
    let client = NewsClient::new(url, key)?;

    let from_date =
        from_date.unwrap_or_else(|| (Utc::now() - ChronoDuration::days(1)).date_naive());
    let domains = match domains {
        Some(d) if !d.is_empty() => d,
        _ => cfg.default_domains.clone(),
    };

    let mut articles = Vec::new();
    for domain in &domains {
        let mut batch = client.fetch_domain(domain, from_date).await?;
        counter!("extract_domains_total").increment(1);
        articles.append(&mut batch);
    }
    counter!("extract_articles_total").increment(articles.len() as u64);

    let articles = normalize_articles(articles);
    persist_articles(&articles, store, &cfg.assets_dir, from_date).await?;

    info!(
        count = articles.len(),
        domains = domains.len(),
        %from_date,
        "extraction complete"
    );
    Ok(articles)
}

/// Write articles to the `DailyNews` collection and a `<from_date>.csv` dump.
pub async fn persist_articles(
    articles: &[Article],
    store: &dyn DocumentStore,
    assets_dir: &Path,
    from_date: NaiveDate,
) -> Result<PathBuf, AppError> {
    let records: Vec<serde_json::Value> = articles
        .iter()
        .map(|a| serde_json::to_value(a).context("serializing article"))
        .collect::<Result<_, _>>()?;
    store.insert_many(DAILY_NEWS, &records).await?;

    let path = write_dump(articles, assets_dir, from_date).map_err(AppError::Storage)?;
    Ok(path)
}

fn write_dump(
    articles: &[Article],
    assets_dir: &Path,
    from_date: NaiveDate,
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(assets_dir)
        .with_context(|| format!("creating {}", assets_dir.display()))?;
    let path = assets_dir.join(format!("{from_date}.csv"));

    let mut out = String::from(
        "title,author,source,description,content,pub_date,url,photo_url,combined_text,tokens,lems\n",
    );
    for a in articles {
        let row = [
            a.title.as_deref().unwrap_or_default(),
            a.author.as_deref().unwrap_or_default(),
            a.source.as_deref().unwrap_or_default(),
            a.description.as_deref().unwrap_or_default(),
            a.content.as_deref().unwrap_or_default(),
            &a.pub_date.map(|d| d.to_string()).unwrap_or_default(),
            a.url.as_deref().unwrap_or_default(),
            a.photo_url.as_deref().unwrap_or_default(),
            a.combined_text.as_deref().unwrap_or_default(),
            &a.tokens.join(" "),
            a.lems.as_deref().unwrap_or_default(),
        ]
        .iter()
        .map(|f| csv_escape(f))
        .collect::<Vec<_>>()
        .join(",");
        out.push_str(&row);
        out.push('\n');
    }
    std::fs::write(&path, out).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn csv_escape(field: &str) -> String {
    if field.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
