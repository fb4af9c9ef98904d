// src/config.rs
//! Process configuration, read once from the environment at startup.
//!
//! There is deliberately no global settings singleton: `Config::from_env()`
//! is called once in `main` and the resulting struct travels through
//! `AppState`. Values that are only needed by some operations (news API key,
//! SMTP credentials) stay optional here and are checked by the operation
//! that uses them, so `/analyze` keeps working on a box with no mail setup.

use std::path::PathBuf;

use crate::error::AppError;

const DEFAULT_DOMAINS: &str = "wsj.com,aljazeera.com,bbc.co.uk,techcrunch.com,\
nytimes.com,bloomberg.com,businessinsider.com,cbc.ca,cnbc.com,cnn.com,\
apnews.com,reuters.com,theguardian.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,

    // News API
    pub news_url: Option<String>,
    pub api_key: Option<String>,
    pub default_domains: Vec<String>,

    // Storage
    pub data_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub cache_csv_path: PathBuf,

    // Email
    pub smtp_host: String,
    pub email_user: Option<String>,
    pub email_pass: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let env = |k: &str| std::env::var(k).ok().filter(|v| !v.trim().is_empty());

        let port = env("PORT")
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8000);

        Self {
            host: env("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            news_url: env("URL"),
            api_key: env("API_KEY"),
            default_domains: parse_domains(
                &env("DEFAULT_DOMAINS").unwrap_or_else(|| DEFAULT_DOMAINS.to_string()),
            ),
            data_dir: env("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            assets_dir: env("ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("assets")),
            cache_csv_path: env("CACHE_CSV_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("assets/mean_polarity.csv")),
            smtp_host: env("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
            email_user: env("EMAIL_USER"),
            email_pass: env("EMAIL_PASS"),
        }
    }

    /// News API endpoint + key, required by the ingestion pipeline.
    pub fn news_api(&self) -> Result<(&str, &str), AppError> {
        match (self.news_url.as_deref(), self.api_key.as_deref()) {
            (Some(url), Some(key)) => Ok((url, key)),
            _ => Err(AppError::Config(
                "URL and API_KEY must be configured".to_string(),
            )),
        }
    }

    /// SMTP credentials, required by the report dispatcher.
    /// Checked before any network I/O is attempted.
    pub fn email_credentials(&self) -> Result<(&str, &str), AppError> {
        match (self.email_user.as_deref(), self.email_pass.as_deref()) {
            (Some(user), Some(pass)) => Ok((user, pass)),
            _ => Err(AppError::Config(
                "EMAIL_USER and EMAIL_PASS must be configured".to_string(),
            )),
        }
    }
}

fn parse_domains(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
pub(crate) fn test_config(root: &std::path::Path) -> Config {
    Config {
        host: "127.0.0.1".into(),
        port: 0,
        news_url: None,
        api_key: None,
        default_domains: vec!["example.com".into()],
        data_dir: root.join("data"),
        assets_dir: root.join("assets"),
        cache_csv_path: root.join("assets/mean_polarity.csv"),
        smtp_host: "smtp.gmail.com".into(),
        email_user: None,
        email_pass: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_domains_trims_and_drops_empties() {
        let out = parse_domains(" wsj.com , ,cnn.com,");
        assert_eq!(out, vec!["wsj.com".to_string(), "cnn.com".to_string()]);
    }

    #[test]
    fn default_domain_list_is_nonempty() {
        let out = parse_domains(DEFAULT_DOMAINS);
        assert!(out.contains(&"reuters.com".to_string()));
        assert_eq!(out.len(), 13);
    }

    #[serial_test::serial]
    #[test]
    fn from_env_applies_overrides_and_defaults() {
        std::env::set_var("PORT", "9100");
        std::env::set_var("DEFAULT_DOMAINS", "a.com, b.com");
        std::env::remove_var("HOST");

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 9100);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.default_domains, vec!["a.com", "b.com"]);

        std::env::remove_var("PORT");
        std::env::remove_var("DEFAULT_DOMAINS");
    }

    #[test]
    fn missing_credentials_are_config_errors() {
        let tmp = std::env::temp_dir();
        let cfg = test_config(&tmp);
        assert!(matches!(cfg.news_api(), Err(AppError::Config(_))));
        assert!(matches!(cfg.email_credentials(), Err(AppError::Config(_))));
    }
}
