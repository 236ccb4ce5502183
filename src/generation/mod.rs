//! Content generation client and orchestration
//!
//! This module integrates the external generation service that turns a
//! keyword into a full article. The service is an opaque collaborator
//! reached over HTTP; [`GenerationClient`] owns the wire format and
//! [`orchestrator::GenerationOrchestrator`] drives the item lifecycle
//! around the call.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::models::{FaqEntry, GeneratedContent, Keyword};

pub mod orchestrator;

pub use orchestrator::{
    GenerationEvent, GenerationOrchestrator, GenerationPhase, OrchestratorConfig,
};

/// Errors from the generation service boundary
///
/// All of these are expected operational failures: the orchestrator records
/// them on the content item and the user retries explicitly. Nothing here is
/// retried automatically.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Network-level failure reaching the service
    #[error("generation request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("generation service error ({status}): {message}")]
    Service { status: u16, message: String },

    /// The bounded wait elapsed before the service answered
    #[error("generation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The service returned success but with empty content
    #[error("generation service returned empty content")]
    EmptyContent,
}

impl GenerationError {
    /// Check if the error is recoverable (worth a manual retry)
    pub fn is_recoverable(&self) -> bool {
        true
    }
}

/// Configuration for the generation client
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Generation service endpoint URL
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Default language passed to the service
    pub language: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8090".to_string(),
            timeout_secs: 120,
            language: "en".to_string(),
        }
    }
}

impl GenerationConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self {
            endpoint: std::env::var("PLUME_GENERATION_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:8090".to_string()),
            timeout_secs: std::env::var("PLUME_GENERATION_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(120),
            language: std::env::var("PLUME_GENERATION_LANGUAGE")
                .unwrap_or_else(|_| "en".to_string()),
        }
    }
}

/// Per-request generation options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub tone: String,
    pub target_length: u32,
    pub include_images: bool,
    pub include_faq: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            tone: "professional".to_string(),
            target_length: 1500,
            include_images: false,
            include_faq: true,
        }
    }
}

/// Generation service request
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    keyword: &'a str,
    tone: &'a str,
    target_length: u32,
    language: &'a str,
    include_images: bool,
    include_faq: bool,
}

/// Generation service response
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    title: String,
    slug: String,
    content: String,
    meta_title: String,
    meta_description: String,
    #[serde(default)]
    faq: Vec<FaqWire>,
    #[serde(default)]
    word_count: u32,
}

#[derive(Debug, Deserialize)]
struct FaqWire {
    question: String,
    answer: String,
}

impl From<GenerateResponse> for GeneratedContent {
    fn from(response: GenerateResponse) -> Self {
        Self {
            title: response.title,
            slug: response.slug,
            body: response.content,
            meta_title: response.meta_title,
            meta_description: response.meta_description,
            faq_entries: response
                .faq
                .into_iter()
                .map(|f| FaqEntry {
                    question: f.question,
                    answer: f.answer,
                })
                .collect(),
            word_count: response.word_count,
        }
    }
}

/// HTTP client for the generation service
pub struct GenerationClient {
    client: Client,
    config: GenerationConfig,
}

impl GenerationClient {
    /// Create a client with the default config
    pub fn new() -> Result<Self, GenerationError> {
        Self::with_config(GenerationConfig::default())
    }

    /// Create a client with a custom config
    pub fn with_config(config: GenerationConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Create a client from environment variables
    pub fn from_env() -> Result<Self, GenerationError> {
        Self::with_config(GenerationConfig::from_env())
    }

    /// Get the configured request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    /// Check if the generation service is reachable
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/health", self.config.endpoint);
        self.client.get(&url).send().await.is_ok()
    }

    /// Generate an article for a keyword
    ///
    /// One request, one article; the multi-phase progress the UI shows is
    /// pacing layered on by the orchestrator, not separate calls.
    pub async fn generate(
        &self,
        keyword: &Keyword,
        options: &GenerationOptions,
    ) -> Result<GeneratedContent, GenerationError> {
        let url = format!("{}/api/generate", self.config.endpoint);

        let request = GenerateRequest {
            keyword: &keyword.text,
            tone: &options.tone,
            target_length: options.target_length,
            language: &self.config.language,
            include_images: options.include_images,
            include_faq: options.include_faq,
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Service { status, message });
        }

        let generated: GenerateResponse = response.json().await?;
        if generated.content.trim().is_empty() {
            return Err(GenerationError::EmptyContent);
        }

        Ok(generated.into())
    }
}
