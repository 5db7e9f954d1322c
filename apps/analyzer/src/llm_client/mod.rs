//! Completion Client — the single point of entry for all chat-completion
//! calls in the analysis pipeline.
//!
//! ARCHITECTURAL RULE: no other module may talk to the completion endpoint
//! directly. All model interactions go through [`CompletionClient`].
//!
//! Two failure classes get retried at two different levels: transport-level
//! failures (network errors, API errors, empty choice lists) consume outer
//! attempts with quadratic backoff; unparsable model output re-issues the
//! same request up to [`MAX_PARSE_ATTEMPTS`] times *inside* one outer
//! attempt, and only then counts as an outer failure.

pub mod prompts;
pub mod retry;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::analysis::ResumeAnalysis;

use prompts::{build_analysis_prompt, ANALYSIS_SYSTEM};
use retry::{quadratic_backoff, RetryPolicy};

/// Request-scoped deadline covering every attempt and backoff sleep. A
/// caller with a tighter budget wraps `analyze_resume`'s future in its own
/// `tokio::time::timeout`; the effective deadline is the minimum of the two.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const MAX_RETRIES: u32 = 3;
/// Same-request re-issues allowed when the model returns unparsable output.
const MAX_PARSE_ATTEMPTS: u32 = 2;
/// Generous output allowance so long structured analyses are not truncated.
const MAX_COMPLETION_TOKENS: u32 = 50_000;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("resume text must not be empty")]
    EmptyResumeText,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("completion returned no choices")]
    EmptyChoices,

    #[error("model returned invalid JSON after {attempts} attempts: {source}")]
    MalformedOutput {
        attempts: u32,
        source: serde_json::Error,
    },

    #[error("AI analysis failed after {retries} retries: {source}")]
    RetriesExhausted { retries: u32, source: Box<LlmError> },

    #[error("analysis deadline of {}s exceeded", DEFAULT_TIMEOUT.as_secs())]
    DeadlineExceeded,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Transport seam
// ────────────────────────────────────────────────────────────────────────────

/// The chat-completion transport: messages in, choices out. Production uses
/// [`HttpChatCompletions`]; tests inject scripted stubs. Carried as
/// `Arc<dyn ChatCompletions>` so one client serves concurrent callers.
#[async_trait]
pub trait ChatCompletions: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError>;
}

/// Azure-OpenAI-compatible HTTP transport: POST
/// `{endpoint}/chat/completions?api-version=…` with an `api-key` header.
pub struct HttpChatCompletions {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    api_version: String,
}

impl HttpChatCompletions {
    pub fn new(endpoint: String, api_key: String, api_version: String) -> Self {
        HttpChatCompletions {
            http: reqwest::Client::builder()
                .build()
                .expect("Failed to build HTTP client"),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            api_version,
        }
    }
}

#[async_trait]
impl ChatCompletions for HttpChatCompletions {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let url = format!("{}/chat/completions", self.endpoint);
        let response = self
            .http
            .post(&url)
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Prefer the structured error message when the endpoint sends one
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The completion client used by the analyzer. Holds only immutable
/// configuration plus the transport, so it is safe to share across
/// concurrent analysis calls.
#[derive(Clone)]
pub struct CompletionClient {
    backend: Arc<dyn ChatCompletions>,
    deployment: String,
    policy: RetryPolicy,
}

impl CompletionClient {
    pub fn new(config: &Config) -> Self {
        let backend = HttpChatCompletions::new(
            config.openai_endpoint.clone(),
            config.openai_api_key.clone(),
            config.openai_api_version.clone(),
        );
        Self::with_backend(Arc::new(backend), config.openai_deployment.clone())
    }

    /// Builds a client over an arbitrary transport. Production goes through
    /// [`CompletionClient::new`], tests inject scripted backends here.
    pub fn with_backend(backend: Arc<dyn ChatCompletions>, deployment: String) -> Self {
        CompletionClient {
            backend,
            deployment,
            policy: RetryPolicy::new(MAX_RETRIES, quadratic_backoff),
        }
    }

    /// Analyzes resume text against a job opening and parses the model's
    /// structured reply into a [`ResumeAnalysis`].
    ///
    /// Empty (after trimming) resume text fails immediately without a
    /// network call. Everything else (attempts, parse re-issues, backoff
    /// sleeps) runs under [`DEFAULT_TIMEOUT`]; when the deadline fires, the
    /// in-flight attempt is abandoned and the call fails instead of hanging.
    pub async fn analyze_resume(
        &self,
        job_title: &str,
        job_requirements: &str,
        job_description: &str,
        resume_text: &str,
    ) -> Result<ResumeAnalysis, LlmError> {
        if resume_text.trim().is_empty() {
            return Err(LlmError::EmptyResumeText);
        }

        let request = ChatRequest {
            model: self.deployment.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: ANALYSIS_SYSTEM.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_analysis_prompt(
                        job_title,
                        job_requirements,
                        job_description,
                        resume_text,
                    ),
                },
            ],
            max_completion_tokens: MAX_COMPLETION_TOKENS,
        };

        let request_ref = &request;
        let attempts = self
            .policy
            .run(move |attempt| self.attempt_analysis(request_ref, attempt));

        match tokio::time::timeout(DEFAULT_TIMEOUT, attempts).await {
            Ok(Ok(analysis)) => Ok(analysis),
            Ok(Err(exhausted)) => Err(LlmError::RetriesExhausted {
                retries: exhausted.attempts,
                source: Box::new(exhausted.last),
            }),
            Err(_) => Err(LlmError::DeadlineExceeded),
        }
    }

    /// One outer attempt. Transport failures and empty choice lists fail it
    /// immediately; unparsable output re-issues the same request up to
    /// [`MAX_PARSE_ATTEMPTS`] times before giving up on the attempt.
    async fn attempt_analysis(
        &self,
        request: &ChatRequest,
        attempt: u32,
    ) -> Result<ResumeAnalysis, LlmError> {
        let mut parse_attempt = 1;
        loop {
            let response = self.backend.complete(request).await?;

            let Some(choice) = response.choices.first() else {
                return Err(LlmError::EmptyChoices);
            };

            let raw = choice.message.content.as_str();
            match serde_json::from_str::<ResumeAnalysis>(strip_json_fences(raw)) {
                Ok(analysis) => {
                    debug!(attempt, parse_attempt, "resume analysis parsed");
                    return Ok(analysis);
                }
                Err(err) if parse_attempt >= MAX_PARSE_ATTEMPTS => {
                    warn!(attempt, parse_attempt, error = %err, raw, "model output failed to parse as JSON");
                    return Err(LlmError::MalformedOutput {
                        attempts: parse_attempt,
                        source: err,
                    });
                }
                Err(err) => {
                    warn!(attempt, parse_attempt, error = %err, raw, "model output failed to parse as JSON, re-issuing request");
                    parse_attempt += 1;
                }
            }
        }
    }
}

/// Strips ```json … ``` or ``` … ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Test support
// ────────────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[tokio::test]
    async fn test_empty_resume_text_fails_without_network_call() {
        let backend = ScriptedBackend::new(vec![ScriptedReply::Content(
            sample_analysis_json(50),
        )]);
        let client = client_with(backend.clone());

        let err = client
            .analyze_resume("Backend Engineer", "", "", "   \n\t ")
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::EmptyResumeText));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_choices_exhausts_exactly_three_outer_attempts() {
        let backend = ScriptedBackend::new(vec![ScriptedReply::NoChoices]);
        let client = client_with(backend.clone());

        let err = client
            .analyze_resume("Backend Engineer", "Go", "Payments", "Jane Doe")
            .await
            .unwrap_err();

        assert_eq!(backend.calls(), 3);
        let message = err.to_string();
        assert!(
            message.contains("after 3 retries"),
            "message must report the retry count: {message}"
        );
        assert!(matches!(
            err,
            LlmError::RetriesExhausted { retries: 3, .. }
        ));
    }

    #[tokio::test]
    async fn test_fenced_json_parses_on_first_inner_attempt() {
        let fenced = format!("```json\n{}\n```", sample_analysis_json(82));
        let backend = ScriptedBackend::new(vec![ScriptedReply::Content(fenced)]);
        let client = client_with(backend.clone());

        let analysis = client
            .analyze_resume("Backend Engineer", "Go", "Payments", "Jane Doe")
            .await
            .unwrap();

        assert_eq!(analysis.analysis.match_score, 82);
        assert_eq!(backend.calls(), 1, "a clean fenced payload must not be re-requested");
    }

    #[tokio::test]
    async fn test_malformed_output_reissues_same_request_once() {
        let backend = ScriptedBackend::new(vec![
            ScriptedReply::Content("Sure! Here's the analysis you asked for.".to_string()),
            ScriptedReply::Content(sample_analysis_json(64)),
        ]);
        let client = client_with(backend.clone());

        let analysis = client
            .analyze_resume("Backend Engineer", "Go", "Payments", "Jane Doe")
            .await
            .unwrap();

        assert_eq!(analysis.analysis.match_score, 64);
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_garbage_spends_inner_then_outer_attempts() {
        let backend = ScriptedBackend::new(vec![ScriptedReply::Content(
            "not json, not even close".to_string(),
        )]);
        let client = client_with(backend.clone());

        let err = client
            .analyze_resume("Backend Engineer", "Go", "Payments", "Jane Doe")
            .await
            .unwrap_err();

        // 2 parse attempts per outer attempt, 3 outer attempts.
        assert_eq!(backend.calls(), 6);
        match err {
            LlmError::RetriesExhausted { retries, source } => {
                assert_eq!(retries, 3);
                assert!(matches!(*source, LlmError::MalformedOutput { attempts: 2, .. }));
            }
            other => panic!("expected RetriesExhausted, got {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_errors_retry_with_backoff_then_surface() {
        let backend = ScriptedBackend::new(vec![ScriptedReply::Unavailable]);
        let client = client_with(backend.clone());
        let started = tokio::time::Instant::now();

        let err = client
            .analyze_resume("Backend Engineer", "Go", "Payments", "Jane Doe")
            .await
            .unwrap_err();

        assert_eq!(backend.calls(), 3);
        // Quadratic backoff: 1s after the first failure, 4s after the second.
        assert_eq!(started.elapsed(), Duration::from_secs(5));
        assert!(matches!(err, LlmError::RetriesExhausted { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_backend_hits_the_default_deadline() {
        let client = client_with(Arc::new(StalledBackend));
        let started = tokio::time::Instant::now();

        let err = client
            .analyze_resume("Backend Engineer", "Go", "Payments", "Jane Doe")
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::DeadlineExceeded));
        assert_eq!(started.elapsed(), DEFAULT_TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_caller_deadline_tighter_than_default_wins() {
        let client = client_with(Arc::new(StalledBackend));
        let started = tokio::time::Instant::now();

        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            client.analyze_resume("Backend Engineer", "Go", "Payments", "Jane Doe"),
        )
        .await;

        assert!(outcome.is_err(), "caller timeout must cancel the call");
        assert_eq!(started.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_recovered_analysis_normalizes_absent_arrays() {
        // Minimal-but-valid output: missing arrays must become empty, not null.
        let backend = ScriptedBackend::new(vec![ScriptedReply::Content(
            r#"{"summary": "ok", "analysis": {"match_score": 55}}"#.to_string(),
        )]);
        let client = client_with(backend);

        let analysis = client
            .analyze_resume("Backend Engineer", "Go", "Payments", "Jane Doe")
            .await
            .unwrap();

        assert_eq!(analysis.analysis.match_score, 55);
        assert!(analysis.work_experience.is_empty());
        assert!(analysis.personal_info.links.is_empty());
    }
}
