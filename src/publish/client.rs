//! HTTP client for site platform APIs
//!
//! The remote CMS is an opaque collaborator: this client owns the wire
//! format for connection tests and post pushes and nothing else. All calls
//! are single-shot; publish is never retried here because a duplicate
//! request could create a duplicate remote post.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::{ContentItem, Site, SiteCredentials};

use super::{PublishError, PublishMode};

/// Configuration for the site API client
#[derive(Debug, Clone)]
pub struct SiteClientConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SiteClientConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl SiteClientConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self {
            timeout_secs: std::env::var("PLUME_SITE_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }

    /// Set the request timeout
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Outcome of a connection test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionCheck {
    pub success: bool,
    /// Human-readable reason when the test failed
    pub error: Option<String>,
}

/// Permalink handed back by a successful publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    /// Live URL in publish mode; None for a remote draft
    pub url: Option<String>,
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct TestConnectionRequest<'a> {
    url: &'a str,
    username: &'a str,
    secret: &'a str,
}

#[derive(Debug, Deserialize)]
struct TestConnectionResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct PublishRequest<'a> {
    title: &'a str,
    content: &'a str,
    excerpt: &'a str,
    meta_title: &'a str,
    meta_description: &'a str,
    focus_keyword: &'a str,
    status: &'a str,
}

#[derive(Debug, Deserialize)]
struct PublishResponse {
    success: bool,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// The post payload pushed to a platform
///
/// FAQ entries are rendered into the content body; platform APIs accept a
/// single content field.
#[derive(Debug, Clone)]
pub struct PostPayload {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub meta_title: String,
    pub meta_description: String,
    pub focus_keyword: String,
}

impl PostPayload {
    /// Build a payload from a drafted item
    ///
    /// The item must carry a generated body; callers check this before
    /// reaching for the network.
    pub fn from_item(item: &ContentItem) -> Option<Self> {
        let body = item.body.as_deref()?;
        let mut content = body.to_string();

        if !item.faq_entries.is_empty() {
            content.push_str("\n\n## Frequently Asked Questions\n");
            for entry in &item.faq_entries {
                content.push_str(&format!("\n### {}\n\n{}\n", entry.question, entry.answer));
            }
        }

        let meta_description = item.meta_description.clone().unwrap_or_default();
        Some(Self {
            title: item.title.clone(),
            content,
            excerpt: meta_description.clone(),
            meta_title: item.meta_title.clone().unwrap_or_else(|| item.title.clone()),
            meta_description,
            focus_keyword: item.target_keyword.text.clone(),
        })
    }
}

// ============================================================================
// Site API Client
// ============================================================================

/// Client for talking to site platform APIs
pub struct SiteApiClient {
    client: Client,
    config: SiteClientConfig,
}

impl SiteApiClient {
    /// Create a client with the default config
    pub fn new() -> Result<Self, PublishError> {
        Self::with_config(SiteClientConfig::default())
    }

    /// Create a client with a custom config
    pub fn with_config(config: SiteClientConfig) -> Result<Self, PublishError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Create a client from environment variables
    pub fn from_env() -> Result<Self, PublishError> {
        Self::with_config(SiteClientConfig::from_env())
    }

    /// Get the configured request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    /// Verify credentials against the target platform
    ///
    /// A reachable platform that rejects the credentials is a failed check,
    /// not an error; only transport problems surface as `Err`.
    pub async fn test_connection(
        &self,
        credentials: &SiteCredentials,
    ) -> Result<ConnectionCheck, PublishError> {
        let url = format!(
            "{}/api/connection/test",
            credentials.url.trim_end_matches('/')
        );
        let request = TestConnectionRequest {
            url: &credentials.url,
            username: &credentials.username,
            secret: &credentials.secret,
        };

        let response = self.client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Ok(ConnectionCheck {
                success: false,
                error: Some(format!("connection test failed ({status}): {message}")),
            });
        }

        let check: TestConnectionResponse = response.json().await?;
        Ok(ConnectionCheck {
            success: check.success,
            error: check.error,
        })
    }

    /// Push a post to a site, as a live post or a remote draft
    ///
    /// Single-shot: a failure is returned verbatim and never retried,
    /// since the remote may have partially applied it.
    pub async fn publish(
        &self,
        site: &Site,
        payload: &PostPayload,
        mode: PublishMode,
    ) -> Result<PublishReceipt, PublishError> {
        let url = format!("{}/api/posts", site.url.trim_end_matches('/'));
        let request = PublishRequest {
            title: &payload.title,
            content: &payload.content,
            excerpt: &payload.excerpt,
            meta_title: &payload.meta_title,
            meta_description: &payload.meta_description,
            focus_keyword: &payload.focus_keyword,
            status: mode.as_str(),
        };

        let response = self.client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(PublishError::Rejected { status, message });
        }

        let result: PublishResponse = response.json().await?;
        if !result.success {
            return Err(PublishError::Rejected {
                status: 200,
                message: result.error.unwrap_or_else(|| "unknown platform error".to_string()),
            });
        }

        Ok(PublishReceipt { url: result.url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentType, FaqEntry, GeneratedContent, Keyword, Trend};
    use chrono::NaiveDate;

    fn drafted_item() -> ContentItem {
        let mut item = ContentItem::new(
            "Backlinks Explained",
            Keyword::new("backlinks", 900, 55, Trend::Up).unwrap(),
            ContentType::Explainer,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        );
        item.begin_generation().unwrap();
        item.complete_generation(GeneratedContent {
            title: "Backlinks Explained".to_string(),
            slug: "backlinks-explained".to_string(),
            body: "A backlink is an inbound link.".to_string(),
            meta_title: "Backlinks".to_string(),
            meta_description: "What backlinks are.".to_string(),
            faq_entries: vec![FaqEntry {
                question: "Do backlinks still matter?".to_string(),
                answer: "Yes.".to_string(),
            }],
            word_count: 800,
        })
        .unwrap();
        item
    }

    #[test]
    fn test_payload_from_drafted_item() {
        let item = drafted_item();
        let payload = PostPayload::from_item(&item).unwrap();

        assert_eq!(payload.focus_keyword, "backlinks");
        assert_eq!(payload.excerpt, "What backlinks are.");
        assert!(payload.content.contains("A backlink is an inbound link."));
        // FAQ rendered into the content body
        assert!(payload.content.contains("Frequently Asked Questions"));
        assert!(payload.content.contains("Do backlinks still matter?"));
    }

    #[test]
    fn test_payload_requires_body() {
        let item = ContentItem::new(
            "Ungenerated",
            Keyword::new("seo", 100, 10, Trend::Flat).unwrap(),
            ContentType::Guide,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        );
        assert!(PostPayload::from_item(&item).is_none());
    }

    #[test]
    fn test_config_from_builder() {
        let config = SiteClientConfig::default().with_timeout_secs(5);
        assert_eq!(config.timeout_secs, 5);
    }
}
