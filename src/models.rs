// Core data structures for the plume engine

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Search trend direction for a keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Flat => "flat",
        }
    }

    /// Create from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "flat" => Some(Self::Flat),
            _ => None,
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keyword difficulty out of the 0-100 range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("difficulty score {0} is out of range (0-100)")]
pub struct InvalidKeyword(pub u8);

/// A research keyword accepted for scheduling
///
/// Immutable once selected; volume and difficulty are advisory metadata
/// and only range-checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub text: String,
    pub search_volume: u32,
    pub difficulty_score: u8,
    pub trend: Trend,
}

impl Keyword {
    /// Create a keyword, validating the difficulty range
    pub fn new(
        text: impl Into<String>,
        search_volume: u32,
        difficulty_score: u8,
        trend: Trend,
    ) -> Result<Self, InvalidKeyword> {
        if difficulty_score > 100 {
            return Err(InvalidKeyword(difficulty_score));
        }
        Ok(Self {
            text: text.into(),
            search_volume,
            difficulty_score,
            trend,
        })
    }
}

/// Article format for a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    Guide,
    HowTo,
    List,
    Explainer,
    Tutorial,
}

impl ContentType {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guide => "guide",
            Self::HowTo => "how-to",
            Self::List => "list",
            Self::Explainer => "explainer",
            Self::Tutorial => "tutorial",
        }
    }

    /// Create from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "guide" => Some(Self::Guide),
            "how-to" | "howto" => Some(Self::HowTo),
            "list" => Some(Self::List),
            "explainer" => Some(Self::Explainer),
            "tutorial" => Some(Self::Tutorial),
            _ => None,
        }
    }

    /// Get all content types in rotation order
    pub fn all() -> Vec<Self> {
        vec![
            Self::Guide,
            Self::HowTo,
            Self::List,
            Self::Explainer,
            Self::Tutorial,
        ]
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Publication lifecycle status of a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    /// Placed on the calendar, not yet generated
    Scheduled,
    /// Generation in flight
    Generating,
    /// Generated, awaiting publish
    Draft,
    /// Pushed live to a site
    Published,
    /// Generation or publish error; terminal unless explicitly retried
    Failed,
}

impl ContentStatus {
    /// Check whether a transition to `next` is legal
    ///
    /// The machine admits exactly:
    /// - `Scheduled -> Generating` and `Failed -> Generating` (explicit retry)
    /// - `Generating -> Draft` and `Generating -> Failed`
    /// - `Draft -> Published`, `Draft -> Draft` (push-to-CMS-draft),
    ///   `Draft -> Failed`, `Published -> Failed`
    pub fn can_transition_to(self, next: ContentStatus) -> bool {
        use ContentStatus::*;
        matches!(
            (self, next),
            (Scheduled, Generating)
                | (Failed, Generating)
                | (Generating, Draft)
                | (Generating, Failed)
                | (Draft, Published)
                | (Draft, Draft)
                | (Draft, Failed)
                | (Published, Failed)
        )
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Generating => "generating",
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Failed => "failed",
        }
    }

    /// Create from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "scheduled" => Some(Self::Scheduled),
            "generating" => Some(Self::Generating),
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle contract violations
///
/// These indicate a caller bug, not an operational failure, and are never
/// recorded on the item itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// Attempted status transition the machine does not admit
    #[error("illegal status transition from '{from}' to '{to}'")]
    IllegalTransition {
        from: ContentStatus,
        to: ContentStatus,
    },

    /// Generated output is missing a required field
    #[error("generated content is missing required field '{field}'")]
    MissingContent { field: &'static str },
}

/// A question/answer pair attached to generated content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// Output of a successful generation call, in domain form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub title: String,
    pub slug: String,
    pub body: String,
    pub meta_title: String,
    pub meta_description: String,
    pub faq_entries: Vec<FaqEntry>,
    pub word_count: u32,
}

/// The unit scheduled on the calendar and driven through the lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    /// Unique id, stable across calendar moves
    pub id: Uuid,
    pub title: String,
    pub target_keyword: Keyword,
    pub content_type: ContentType,
    pub status: ContentStatus,
    /// Planning date; calendar bucket membership must always agree with it
    pub scheduled_date: NaiveDate,
    pub body: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub faq_entries: Vec<FaqEntry>,
    pub published_url: Option<String>,
    /// Site the item was last published or draft-pushed to
    pub site_id: Option<Uuid>,
    /// Reason for the most recent failure, if any
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentItem {
    /// Create a new item in `Scheduled` state
    pub fn new(
        title: impl Into<String>,
        target_keyword: Keyword,
        content_type: ContentType,
        scheduled_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            target_keyword,
            content_type,
            status: ContentStatus::Scheduled,
            scheduled_date,
            body: None,
            meta_title: None,
            meta_description: None,
            faq_entries: Vec::new(),
            published_url: None,
            site_id: None,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Guarded status transition; the single write path for `status`
    fn transition(&mut self, next: ContentStatus) -> Result<(), LifecycleError> {
        if !self.status.can_transition_to(next) {
            return Err(LifecycleError::IllegalTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Enter `Generating`; legal only from `Scheduled` or `Failed`
    ///
    /// Clears any previous failure reason so a retry starts clean.
    pub fn begin_generation(&mut self) -> Result<(), LifecycleError> {
        self.transition(ContentStatus::Generating)?;
        self.failure_reason = None;
        Ok(())
    }

    /// Apply successful generation output and move to `Draft`
    pub fn complete_generation(
        &mut self,
        content: GeneratedContent,
    ) -> Result<(), LifecycleError> {
        if content.body.trim().is_empty() {
            return Err(LifecycleError::MissingContent { field: "body" });
        }
        if content.meta_title.trim().is_empty() {
            return Err(LifecycleError::MissingContent { field: "meta_title" });
        }
        if content.meta_description.trim().is_empty() {
            return Err(LifecycleError::MissingContent {
                field: "meta_description",
            });
        }
        self.transition(ContentStatus::Draft)?;
        self.title = content.title;
        self.body = Some(content.body);
        self.meta_title = Some(content.meta_title);
        self.meta_description = Some(content.meta_description);
        self.faq_entries = content.faq_entries;
        Ok(())
    }

    /// Record an operational failure
    ///
    /// Prior `body` and `published_url` are preserved; a failed publish must
    /// not destroy generated content. An already-failed item (a retried
    /// publish that failed again) stays `Failed` with the reason refreshed.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), LifecycleError> {
        if self.status != ContentStatus::Failed {
            self.transition(ContentStatus::Failed)?;
        } else {
            self.updated_at = Utc::now();
        }
        self.failure_reason = Some(reason.into());
        Ok(())
    }

    /// Check whether a failed publish can be explicitly retried
    ///
    /// Failed is terminal unless explicitly retried; a publish retry needs
    /// the preserved draft body, which a generation failure never has.
    pub fn can_retry_publish(&self) -> bool {
        self.status == ContentStatus::Failed && self.body.is_some()
    }

    /// Restore `Draft` on the explicit publish-retry path
    ///
    /// A failed publish keeps the generated draft intact, so an explicit
    /// retry first restores `Draft` and then applies the publish transition
    /// as usual. This never fires for generation failures (no body).
    fn restore_draft_for_retry(&mut self) {
        if self.can_retry_publish() {
            self.status = ContentStatus::Draft;
            self.failure_reason = None;
            self.updated_at = Utc::now();
        }
    }

    /// Record a successful live publish
    pub fn mark_published(
        &mut self,
        url: impl Into<String>,
        site_id: Uuid,
    ) -> Result<(), LifecycleError> {
        self.restore_draft_for_retry();
        self.transition(ContentStatus::Published)?;
        self.published_url = Some(url.into());
        self.site_id = Some(site_id);
        Ok(())
    }

    /// Record a successful push-to-CMS-draft
    ///
    /// Status stays `Draft`; the remote post is not live so `published_url`
    /// remains unset.
    pub fn mark_drafted(&mut self, site_id: Uuid) -> Result<(), LifecycleError> {
        self.restore_draft_for_retry();
        self.transition(ContentStatus::Draft)?;
        self.site_id = Some(site_id);
        Ok(())
    }
}

/// Target publication platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SitePlatform {
    WordPress,
    Webflow,
    Framer,
}

impl SitePlatform {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WordPress => "wordpress",
            Self::Webflow => "webflow",
            Self::Framer => "framer",
        }
    }

    /// Create from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "wordpress" => Some(Self::WordPress),
            "webflow" => Some(Self::Webflow),
            "framer" => Some(Self::Framer),
            _ => None,
        }
    }
}

impl std::fmt::Display for SitePlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Health of a connected site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteStatus {
    Active,
    Error,
}

/// Opaque credentials for a site connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteCredentials {
    pub url: String,
    pub username: String,
    pub secret: String,
}

/// A connected publication target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: Uuid,
    pub url: String,
    pub platform: SitePlatform,
    pub credentials: SiteCredentials,
    /// Whether the stored credentials passed a connection test
    pub verified: bool,
    pub status: SiteStatus,
    pub connected_at: DateTime<Utc>,
}

impl Site {
    /// Create a verified, active site record
    pub fn new(platform: SitePlatform, credentials: SiteCredentials) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: credentials.url.clone(),
            platform,
            credentials,
            verified: true,
            status: SiteStatus::Active,
            connected_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyword(text: &str) -> Keyword {
        Keyword::new(text, 1000, 40, Trend::Up).unwrap()
    }

    fn item(text: &str) -> ContentItem {
        ContentItem::new(
            format!("The Complete Guide to {text}"),
            keyword(text),
            ContentType::Guide,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        )
    }

    fn generated() -> GeneratedContent {
        GeneratedContent {
            title: "The Complete Guide to Local SEO".to_string(),
            slug: "the-complete-guide-to-local-seo".to_string(),
            body: "Local SEO is the practice of...".to_string(),
            meta_title: "Local SEO Guide".to_string(),
            meta_description: "Everything about local SEO.".to_string(),
            faq_entries: vec![FaqEntry {
                question: "What is local SEO?".to_string(),
                answer: "Optimizing for local search results.".to_string(),
            }],
            word_count: 1500,
        }
    }

    #[test]
    fn test_keyword_difficulty_range() {
        assert!(Keyword::new("seo", 100, 100, Trend::Flat).is_ok());
        assert_eq!(
            Keyword::new("seo", 100, 101, Trend::Flat),
            Err(InvalidKeyword(101))
        );
    }

    #[test]
    fn test_new_item_is_scheduled() {
        let item = item("seo local");
        assert_eq!(item.status, ContentStatus::Scheduled);
        assert!(item.body.is_none());
        assert!(item.site_id.is_none());
    }

    #[test]
    fn test_generating_only_from_scheduled_or_failed() {
        use ContentStatus::*;
        assert!(Scheduled.can_transition_to(Generating));
        assert!(Failed.can_transition_to(Generating));
        assert!(!Generating.can_transition_to(Generating));
        assert!(!Draft.can_transition_to(Generating));
        assert!(!Published.can_transition_to(Generating));
    }

    #[test]
    fn test_full_success_path() {
        let mut item = item("seo local");
        item.begin_generation().unwrap();
        assert_eq!(item.status, ContentStatus::Generating);

        item.complete_generation(generated()).unwrap();
        assert_eq!(item.status, ContentStatus::Draft);
        assert!(item.body.is_some());
        assert_eq!(item.faq_entries.len(), 1);

        let site_id = Uuid::new_v4();
        item.mark_published("https://example.com/guide", site_id).unwrap();
        assert_eq!(item.status, ContentStatus::Published);
        assert_eq!(
            item.published_url.as_deref(),
            Some("https://example.com/guide")
        );
        assert_eq!(item.site_id, Some(site_id));
    }

    #[test]
    fn test_double_start_rejected() {
        let mut item = item("seo local");
        item.begin_generation().unwrap();
        let err = item.begin_generation().unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::IllegalTransition {
                from: ContentStatus::Generating,
                to: ContentStatus::Generating,
            }
        ));
    }

    #[test]
    fn test_generation_failure_keeps_body_null() {
        let mut item = item("seo local");
        item.begin_generation().unwrap();
        item.fail("generation service unavailable").unwrap();

        assert_eq!(item.status, ContentStatus::Failed);
        assert!(item.body.is_none());
        assert_eq!(
            item.failure_reason.as_deref(),
            Some("generation service unavailable")
        );
    }

    #[test]
    fn test_retry_clears_failure_reason() {
        let mut item = item("seo local");
        item.begin_generation().unwrap();
        item.fail("timeout").unwrap();

        item.begin_generation().unwrap();
        assert_eq!(item.status, ContentStatus::Generating);
        assert!(item.failure_reason.is_none());
    }

    #[test]
    fn test_empty_generation_output_rejected() {
        let mut item = item("seo local");
        item.begin_generation().unwrap();

        let mut content = generated();
        content.body = "   ".to_string();
        let err = item.complete_generation(content).unwrap_err();
        assert_eq!(err, LifecycleError::MissingContent { field: "body" });
        // Still generating; the caller decides whether to fail the item
        assert_eq!(item.status, ContentStatus::Generating);
    }

    #[test]
    fn test_draft_push_keeps_draft_status() {
        let mut item = item("seo local");
        item.begin_generation().unwrap();
        item.complete_generation(generated()).unwrap();

        let site_id = Uuid::new_v4();
        item.mark_drafted(site_id).unwrap();
        assert_eq!(item.status, ContentStatus::Draft);
        assert_eq!(item.site_id, Some(site_id));
        assert!(item.published_url.is_none());
    }

    #[test]
    fn test_publish_failure_preserves_content() {
        let mut item = item("seo local");
        item.begin_generation().unwrap();
        item.complete_generation(generated()).unwrap();
        let body_before = item.body.clone();

        item.fail("remote rejected the post").unwrap();
        assert_eq!(item.status, ContentStatus::Failed);
        assert_eq!(item.body, body_before);
    }

    #[test]
    fn test_publish_twice_rejected() {
        let mut item = item("seo local");
        item.begin_generation().unwrap();
        item.complete_generation(generated()).unwrap();
        item.mark_published("https://example.com/a", Uuid::new_v4())
            .unwrap();

        let err = item
            .mark_published("https://example.com/b", Uuid::new_v4())
            .unwrap_err();
        assert!(matches!(err, LifecycleError::IllegalTransition { .. }));
        // First permalink untouched
        assert_eq!(item.published_url.as_deref(), Some("https://example.com/a"));
    }

    #[test]
    fn test_second_failure_refreshes_reason() {
        let mut item = item("seo local");
        item.begin_generation().unwrap();
        item.complete_generation(generated()).unwrap();
        item.fail("first publish error").unwrap();

        // A retried publish that fails again stays Failed, new reason kept
        item.fail("second publish error").unwrap();
        assert_eq!(item.status, ContentStatus::Failed);
        assert_eq!(item.failure_reason.as_deref(), Some("second publish error"));
    }

    #[test]
    fn test_publish_retry_restores_draft_first() {
        let mut item = item("seo local");
        item.begin_generation().unwrap();
        item.complete_generation(generated()).unwrap();
        item.fail("remote rejected the post").unwrap();
        assert!(item.can_retry_publish());

        let site_id = Uuid::new_v4();
        item.mark_published("https://example.com/guide", site_id).unwrap();
        assert_eq!(item.status, ContentStatus::Published);
        assert!(item.failure_reason.is_none());
    }

    #[test]
    fn test_generation_failure_cannot_retry_publish() {
        let mut item = item("seo local");
        item.begin_generation().unwrap();
        item.fail("service down").unwrap();
        assert!(!item.can_retry_publish());

        let err = item
            .mark_published("https://example.com/guide", Uuid::new_v4())
            .unwrap_err();
        assert!(matches!(err, LifecycleError::IllegalTransition { .. }));
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            ContentStatus::Scheduled,
            ContentStatus::Generating,
            ContentStatus::Draft,
            ContentStatus::Published,
            ContentStatus::Failed,
        ] {
            assert_eq!(ContentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ContentStatus::parse("unknown"), None);
    }

    #[test]
    fn test_content_type_parse() {
        assert_eq!(ContentType::parse("how-to"), Some(ContentType::HowTo));
        assert_eq!(ContentType::parse("HOWTO"), Some(ContentType::HowTo));
        assert_eq!(ContentType::parse("sonnet"), None);
    }

    #[test]
    fn test_site_platform_parse() {
        assert_eq!(
            SitePlatform::parse("wordpress"),
            Some(SitePlatform::WordPress)
        );
        assert_eq!(SitePlatform::parse("medium"), None);
    }
}
