mod analyzer;
mod config;
mod errors;
mod extractor;
mod llm_client;
mod models;
mod report;
mod state;

use std::path::PathBuf;

use anyhow::{bail, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analyzer::{AnalyzerConfig, ResumeAnalyzer};
use crate::config::Config;
use crate::llm_client::CompletionClient;
use crate::state::AppContext;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume analyzer v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        bail!("usage: analyzer <resume-file> [job-title] [job-requirements] [job-description]");
    }
    let file_path = PathBuf::from(&args[0]);
    let job_title = args.get(1).cloned().unwrap_or_default();
    let job_requirements = args.get(2).cloned().unwrap_or_default();
    let job_description = args.get(3).cloned().unwrap_or_default();

    // Initialize the completion client
    let llm = CompletionClient::new(&config);
    info!(
        "completion client initialized (deployment: {})",
        config.openai_deployment
    );

    // Build the pipeline context, constructed once and passed by reference
    let analyzer = ResumeAnalyzer::new(
        llm,
        AnalyzerConfig {
            output_format: "json".to_string(),
            output_dir: config.output_dir.clone(),
            save_to_file: config.save_analysis,
        },
    );
    let ctx = AppContext { analyzer, config };
    info!(
        output_dir = %ctx.config.output_dir.display(),
        save_analysis = ctx.config.save_analysis,
        "analyzer ready"
    );

    let analysis = ctx
        .analyzer
        .analyze_file(&job_title, &job_requirements, &job_description, &file_path)
        .await?;

    println!("{}", serde_json::to_string_pretty(&analysis)?);

    Ok(())
}
