//! Resume Analyzer — sequences extraction → analysis → optional persistence
//! for one document.
//!
//! Flow: extract text → completion analysis → (when enabled) write
//! `<stem>_analysis.json` and `<stem>_report.html` into the output
//! directory. Persistence is best-effort: its failures are logged and
//! swallowed, never propagated; the computed analysis is returned
//! regardless.
//!
//! One invocation is strictly sequential. Concurrent invocations are safe
//! (nothing here is shared mutable state), but two calls processing files
//! with the same base name race on the same output paths, a documented
//! hazard that nothing locks against.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extractor::DocumentExtractor;
use crate::llm_client::CompletionClient;
use crate::models::analysis::ResumeAnalysis;
use crate::report;

/// Static analyzer configuration; not mutated after construction.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Informational tag only; JSON plus HTML is what gets written today.
    pub output_format: String,
    pub output_dir: PathBuf,
    pub save_to_file: bool,
}

pub struct ResumeAnalyzer {
    llm: CompletionClient,
    extractor: DocumentExtractor,
    config: AnalyzerConfig,
}

impl ResumeAnalyzer {
    pub fn new(llm: CompletionClient, config: AnalyzerConfig) -> Self {
        ResumeAnalyzer {
            llm,
            extractor: DocumentExtractor::default(),
            config,
        }
    }

    /// Analyzes one resume file against a job opening.
    ///
    /// Extraction failure returns immediately; analysis is never attempted
    /// on an unreadable or unsupported document. Analysis failure (after the
    /// client's own retries) propagates with context. Persistence failure
    /// does neither: the analysis is still returned.
    ///
    /// Extraction itself is not bounded by any timeout; a caller that needs
    /// one wraps this future in its own.
    pub async fn analyze_file(
        &self,
        job_title: &str,
        job_requirements: &str,
        job_description: &str,
        file_path: &Path,
    ) -> Result<ResumeAnalysis, AppError> {
        info!(file = %file_path.display(), "parsing resume file");
        let resume_text = self.extractor.extract(file_path)?;
        info!(chars = resume_text.len(), "resume text extracted");

        info!("running AI analysis");
        let analysis = self
            .llm
            .analyze_resume(job_title, job_requirements, job_description, &resume_text)
            .await?;

        if self.config.save_to_file {
            if let Err(err) = self.save_analysis(file_path, &analysis) {
                warn!("failed to persist analysis outputs: {err:#}");
            }
        }

        Ok(analysis)
    }

    /// Writes `<stem>_analysis.json`, then `<stem>_report.html` only if the
    /// JSON write worked.
    fn save_analysis(&self, original_path: &Path, analysis: &ResumeAnalysis) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.config.output_dir).with_context(|| {
            format!(
                "creating output directory {}",
                self.config.output_dir.display()
            )
        })?;

        let stem = original_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("resume");

        let json_path = self.config.output_dir.join(format!("{stem}_analysis.json"));
        let json = serde_json::to_string_pretty(analysis).context("serializing analysis")?;
        std::fs::write(&json_path, json)
            .with_context(|| format!("writing {}", json_path.display()))?;
        info!(path = %json_path.display(), "analysis saved");

        let html_path = self.config.output_dir.join(format!("{stem}_report.html"));
        report::write_report(&html_path, analysis)
            .with_context(|| format!("writing {}", html_path.display()))?;
        info!(path = %html_path.display(), "report saved");

        Ok(())
    }
}
