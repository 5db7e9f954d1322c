use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// The four completion-endpoint values come from the deployment's secret
/// store; locally a `.env` file stands in for it.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_endpoint: String,
    pub openai_api_key: String,
    pub openai_api_version: String,
    pub openai_deployment: String,
    pub output_dir: PathBuf,
    pub save_analysis: bool,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_endpoint: require_env("OPENAI_API_ENDPOINT")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_api_version: require_env("OPENAI_API_VERSION")?,
            openai_deployment: require_env("OPENAI_DEPLOYMENT_NAME")?,
            output_dir: std::env::var("ANALYSIS_OUTPUT_DIR")
                .unwrap_or_else(|_| "analysis_output".to_string())
                .into(),
            save_analysis: std::env::var("SAVE_ANALYSIS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
