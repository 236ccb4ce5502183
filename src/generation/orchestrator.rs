//! Generation workflow orchestration
//!
//! Drives the asynchronous "generate content for a keyword" workflow: the
//! item enters `Generating`, progress is reported in phases, and exactly one
//! terminal transition (`Draft` or `Failed`) is applied afterwards — even
//! when nobody is observing, so an abandoned view never orphans an item in
//! `Generating`.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{ContentItem, ContentStatus, LifecycleError};
use crate::scheduler::SchedulerError;
use crate::workspace::Workspace;

use super::{GenerationClient, GenerationError, GenerationOptions};

// ============================================================================
// Phases and Events
// ============================================================================

/// Reportable phase of a generation run
///
/// Phases are cosmetic pacing for progress display; the underlying call to
/// the generation service is a single request, not three retryable steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationPhase {
    KeywordAnalysis,
    Drafting,
    SeoOptimization,
}

impl GenerationPhase {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeywordAnalysis => "keyword_analysis",
            Self::Drafting => "drafting",
            Self::SeoOptimization => "seo_optimization",
        }
    }

    /// All phases, in order
    pub fn all() -> [Self; 3] {
        [Self::KeywordAnalysis, Self::Drafting, Self::SeoOptimization]
    }
}

impl std::fmt::Display for GenerationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Progress events broadcast while a generation runs
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum GenerationEvent {
    /// A phase began for an item
    PhaseStarted {
        item_id: Uuid,
        phase: GenerationPhase,
    },

    /// Generation finished and the item is now a draft
    Completed { item_id: Uuid },

    /// Generation failed; reason is recorded on the item
    Failed { item_id: Uuid, reason: String },
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Configuration for the generation orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Bound on the whole generation call; elapsed => item fails with
    /// reason "timeout"
    pub timeout_secs: u64,

    /// Pause between phase reports, for progress pacing
    pub phase_pause_ms: u64,

    /// Progress event channel capacity
    pub event_channel_capacity: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 180,
            phase_pause_ms: 400,
            event_channel_capacity: 64,
        }
    }
}

impl OrchestratorConfig {
    /// Set the overall timeout
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the pacing pause between phases
    pub fn with_phase_pause_ms(mut self, ms: u64) -> Self {
        self.phase_pause_ms = ms;
        self
    }
}

/// Drives content items through the generation workflow
pub struct GenerationOrchestrator {
    workspace: Arc<Workspace>,
    client: GenerationClient,
    config: OrchestratorConfig,
    event_tx: broadcast::Sender<GenerationEvent>,
    /// Items with a generation run currently owned by this orchestrator
    in_flight: Mutex<HashSet<Uuid>>,
}

impl GenerationOrchestrator {
    /// Create an orchestrator for a workspace
    pub fn new(workspace: Arc<Workspace>, client: GenerationClient) -> Self {
        Self::with_config(workspace, client, OrchestratorConfig::default())
    }

    /// Create an orchestrator with custom pacing/timeout
    pub fn with_config(
        workspace: Arc<Workspace>,
        client: GenerationClient,
        config: OrchestratorConfig,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_channel_capacity);
        Self {
            workspace,
            client,
            config,
            event_tx,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Subscribe to progress events
    pub fn subscribe(&self) -> broadcast::Receiver<GenerationEvent> {
        self.event_tx.subscribe()
    }

    /// Generate content for an item
    ///
    /// Legal only when the item is `Scheduled` or `Failed`; any other state
    /// is rejected before the service is called, which also guarantees at
    /// most one in-flight generation per item. On failure the item moves to
    /// `Failed` with the raw error message and partial output is discarded.
    pub async fn generate(&self, item_id: Uuid, options: &GenerationOptions) -> Result<()> {
        let item = self.claim(item_id).await?;
        let result = self.run(item, options).await;
        self.in_flight.lock().await.remove(&item_id);
        result
    }

    /// Claim the item before touching the network
    ///
    /// Normally this is the `Scheduled`/`Failed` -> `Generating` transition.
    /// An item the assigner already flagged `Generating` (the first item of
    /// a fresh plan) is adopted instead, as long as no run owns it here;
    /// the in-flight set closes that gap.
    async fn claim(&self, item_id: Uuid) -> Result<ContentItem> {
        let mut in_flight = self.in_flight.lock().await;
        if in_flight.contains(&item_id) {
            return Err(LifecycleError::IllegalTransition {
                from: ContentStatus::Generating,
                to: ContentStatus::Generating,
            }
            .into());
        }

        let item = match self.workspace.begin_generation(item_id).await {
            Ok(item) => item,
            Err(Error::Lifecycle(LifecycleError::IllegalTransition {
                from: ContentStatus::Generating,
                ..
            })) => self
                .workspace
                .item(item_id)
                .await
                .ok_or(SchedulerError::UnknownItem { item_id })?,
            Err(err) => return Err(err),
        };

        in_flight.insert(item_id);
        Ok(item)
    }

    async fn run(&self, item: ContentItem, options: &GenerationOptions) -> Result<()> {
        let item_id = item.id;
        let keyword = item.target_keyword.clone();

        tracing::info!(%item_id, keyword = %keyword.text, "generation started");

        self.report_phase(item_id, GenerationPhase::KeywordAnalysis).await;
        self.report_phase(item_id, GenerationPhase::Drafting).await;

        // The network call runs without any workspace lock held.
        let outcome = tokio::time::timeout(
            Duration::from_secs(self.config.timeout_secs),
            self.client.generate(&keyword, options),
        )
        .await;

        let content = match outcome {
            Ok(Ok(content)) => content,
            Ok(Err(err)) => return self.fail(item_id, err).await,
            Err(_) => {
                return self
                    .fail(
                        item_id,
                        GenerationError::Timeout {
                            seconds: self.config.timeout_secs,
                        },
                    )
                    .await
            }
        };

        self.report_phase(item_id, GenerationPhase::SeoOptimization).await;

        match self.workspace.complete_generation(item_id, content).await {
            Ok(_) => {
                let _ = self.event_tx.send(GenerationEvent::Completed { item_id });
                tracing::info!(%item_id, "generation completed");
                Ok(())
            }
            // Empty output from the service is an operational failure, not
            // a caller bug: record it on the item like any other error.
            Err(Error::Lifecycle(LifecycleError::MissingContent { .. })) => {
                self.fail(item_id, GenerationError::EmptyContent).await
            }
            Err(err) => Err(err),
        }
    }

    /// Explicit user-triggered retry of a failed generation
    ///
    /// The only path back into `Generating` from `Failed`; nothing retries
    /// automatically.
    pub async fn retry_generation(
        &self,
        item_id: Uuid,
        options: &GenerationOptions,
    ) -> Result<()> {
        self.generate(item_id, options).await
    }

    async fn fail(&self, item_id: Uuid, err: GenerationError) -> Result<()> {
        let reason = match &err {
            GenerationError::Timeout { .. } => "timeout".to_string(),
            other => other.to_string(),
        };
        tracing::warn!(%item_id, %reason, "generation failed");

        // Terminal transition always applies, observed or not.
        self.workspace.fail_item(item_id, reason.clone()).await?;
        let _ = self.event_tx.send(GenerationEvent::Failed { item_id, reason });
        Err(err.into())
    }

    async fn report_phase(&self, item_id: Uuid, phase: GenerationPhase) {
        tracing::debug!(%item_id, %phase, "generation phase");
        let _ = self
            .event_tx
            .send(GenerationEvent::PhaseStarted { item_id, phase });
        if self.config.phase_pause_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.phase_pause_ms)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order() {
        let phases = GenerationPhase::all();
        assert_eq!(phases[0], GenerationPhase::KeywordAnalysis);
        assert_eq!(phases[1], GenerationPhase::Drafting);
        assert_eq!(phases[2], GenerationPhase::SeoOptimization);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(GenerationPhase::Drafting.to_string(), "drafting");
    }

    #[test]
    fn test_config_builders() {
        let config = OrchestratorConfig::default()
            .with_timeout_secs(30)
            .with_phase_pause_ms(0);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.phase_pause_ms, 0);
    }
}
