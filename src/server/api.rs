//! REST API handlers for the engine server
//!
//! This module defines the API routes and handlers exposing workspace
//! operations: planning, calendar reads, rescheduling, generation,
//! site connection and publishing.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;
use crate::generation::GenerationOptions;
use crate::models::{ContentItem, Keyword, Site, SiteCredentials, SitePlatform, Trend};
use crate::publish::{PublishError, PublishMode};
use crate::scheduler::SchedulerError;

use super::server::AppState;

// ============================================================================
// API Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Simple error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// One calendar day and its bucket
#[derive(Debug, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub item_ids: Vec<Uuid>,
}

/// Calendar snapshot response
#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub days: Vec<CalendarDay>,
}

/// Connection check response
#[derive(Debug, Serialize)]
pub struct ConnectionCheckResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// API Request Types
// ============================================================================

/// One keyword in a plan request
#[derive(Debug, Deserialize)]
pub struct KeywordRequest {
    pub text: String,
    pub search_volume: u32,
    pub difficulty_score: u8,
    pub trend: String,
}

/// Plan request: accepted keywords in priority order
#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub keywords: Vec<KeywordRequest>,
    pub start_date: NaiveDate,
}

/// Reschedule request
#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Generate request
#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub options: Option<GenerationOptions>,
}

/// Connection test request
#[derive(Debug, Deserialize)]
pub struct TestConnectionRequest {
    pub url: String,
    pub username: String,
    pub secret: String,
}

/// Site connect request
#[derive(Debug, Deserialize)]
pub struct ConnectSiteRequest {
    pub platform: String,
    pub url: String,
    pub username: String,
    pub secret: String,
}

/// Publish request
#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub site_id: Uuid,
    pub mode: String,
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/api/health", get(health_check))
        // Planning and calendar endpoints
        .route("/api/plan", post(plan_keywords))
        .route("/api/calendar", get(get_calendar))
        .route("/api/calendar/{date}", get(get_calendar_day))
        // Item endpoints
        .route("/api/items", get(list_items))
        .route("/api/items/{id}", get(get_item).delete(delete_item))
        .route("/api/items/{id}/reschedule", post(reschedule_item))
        .route("/api/items/{id}/generate", post(generate_item))
        .route("/api/items/{id}/publish", post(publish_item))
        // Site endpoints
        .route("/api/sites", get(list_sites))
        .route("/api/sites/test", post(test_site_connection))
        .route("/api/sites/connect", post(connect_site))
        .with_state(state)
}

/// Map an engine error to an HTTP status
fn error_status(err: &Error) -> StatusCode {
    match err {
        Error::Scheduler(SchedulerError::NotFound { .. })
        | Error::Scheduler(SchedulerError::UnknownItem { .. }) => StatusCode::NOT_FOUND,
        Error::Scheduler(SchedulerError::Conflict { .. }) => StatusCode::CONFLICT,
        Error::Scheduler(_) => StatusCode::BAD_REQUEST,
        Error::Lifecycle(_) => StatusCode::CONFLICT,
        Error::Publish(PublishError::UnknownSite { .. }) => StatusCode::NOT_FOUND,
        Error::Publish(PublishError::NotVerified { .. }) => StatusCode::PRECONDITION_FAILED,
        Error::Publish(_) | Error::Generation(_) => StatusCode::BAD_GATEWAY,
        Error::Config(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: Error) -> axum::response::Response {
    (error_status(&err), Json(ErrorResponse::new(err.to_string()))).into_response()
}

// ============================================================================
// Health Handlers
// ============================================================================

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = state.start_time.elapsed().as_secs();

    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: uptime,
    }))
}

// ============================================================================
// Planning and Calendar Handlers
// ============================================================================

/// Plan accepted keywords onto the calendar
///
/// The first planned item starts generating immediately in the background;
/// its terminal transition applies whether or not anyone keeps watching.
async fn plan_keywords(
    State(state): State<AppState>,
    Json(request): Json<PlanRequest>,
) -> axum::response::Response {
    let mut keywords = Vec::with_capacity(request.keywords.len());
    for kw in &request.keywords {
        let Some(trend) = Trend::parse(&kw.trend) else {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(format!("Invalid trend: {}", kw.trend))),
            )
                .into_response();
        };
        match Keyword::new(&kw.text, kw.search_volume, kw.difficulty_score, trend) {
            Ok(keyword) => keywords.push(keyword),
            Err(e) => {
                return (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e.to_string())))
                    .into_response();
            }
        }
    }

    let items = match state
        .workspace
        .plan(&state.assigner, &keywords, request.start_date)
        .await
    {
        Ok(items) => items,
        Err(e) => return error_response(e),
    };

    if let Some(first) = items.first() {
        let orchestrator = state.orchestrator.clone();
        let item_id = first.id;
        tokio::spawn(async move {
            let _ = orchestrator.generate(item_id, &GenerationOptions::default()).await;
        });
    }

    (StatusCode::OK, Json(ApiResponse::success(items))).into_response()
}

/// Get the full calendar snapshot
async fn get_calendar(State(state): State<AppState>) -> impl IntoResponse {
    let calendar = state.workspace.calendar().await;
    let days = calendar
        .iter()
        .map(|(date, ids)| CalendarDay {
            date,
            item_ids: ids.to_vec(),
        })
        .collect();

    Json(ApiResponse::success(CalendarResponse { days }))
}

/// Get the items scheduled on a specific date
async fn get_calendar_day(
    State(state): State<AppState>,
    Path(date_str): Path<String>,
) -> axum::response::Response {
    let date = match NaiveDate::parse_from_str(&date_str, "%Y-%m-%d") {
        Ok(d) => d,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(format!(
                    "Invalid date format: {}. Expected YYYY-MM-DD",
                    date_str
                ))),
            )
                .into_response();
        }
    };

    let items: Vec<ContentItem> = state.workspace.items_on(date).await;
    (StatusCode::OK, Json(ApiResponse::success(items))).into_response()
}

// ============================================================================
// Item Handlers
// ============================================================================

/// List all items in the workspace
async fn list_items(State(state): State<AppState>) -> impl IntoResponse {
    let mut items = state.workspace.items().await;
    items.sort_by_key(|item| (item.scheduled_date, item.id));
    Json(ApiResponse::success(items))
}

/// Get a single item
async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    match state.workspace.item(id).await {
        Some(item) => (StatusCode::OK, Json(ApiResponse::success(item))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("Item not found: {}", id))),
        )
            .into_response(),
    }
}

/// Delete an item (also removes it from the calendar)
async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    match state.workspace.delete_item(id).await {
        Some(item) => (StatusCode::OK, Json(ApiResponse::success(item))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("Item not found: {}", id))),
        )
            .into_response(),
    }
}

/// Move an item between calendar dates
async fn reschedule_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RescheduleRequest>,
) -> axum::response::Response {
    match state
        .workspace
        .reschedule(id, request.from, request.to)
        .await
    {
        Ok(item) => (StatusCode::OK, Json(ApiResponse::success(item))).into_response(),
        Err(e) => error_response(e),
    }
}

/// Start (or explicitly retry) generation for an item
///
/// Returns 202 immediately; the run continues in the background and the
/// item's terminal state is applied regardless of observers.
async fn generate_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<GenerateRequest>,
) -> axum::response::Response {
    // Claim synchronously so illegal starts are rejected here, not in the
    // background task.
    let item = match state.workspace.item(id).await {
        Some(item) => item,
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(format!("Item not found: {}", id))),
            )
                .into_response();
        }
    };

    let options = request.options.unwrap_or_default();
    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        let _ = orchestrator.generate(item.id, &options).await;
    });

    (StatusCode::ACCEPTED, Json(ApiResponse::success(item))).into_response()
}

/// Publish an item to a connected site
async fn publish_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<PublishRequest>,
) -> axum::response::Response {
    let Some(mode) = PublishMode::parse(&request.mode) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(format!(
                "Invalid publish mode: {}. Expected draft|publish",
                request.mode
            ))),
        )
            .into_response();
    };

    match state.coordinator.publish(id, request.site_id, mode).await {
        Ok(item) => (StatusCode::OK, Json(ApiResponse::success(item))).into_response(),
        Err(e) => error_response(e),
    }
}

// ============================================================================
// Site Handlers
// ============================================================================

/// List connected sites
async fn list_sites(State(state): State<AppState>) -> impl IntoResponse {
    let sites: Vec<Site> = state.workspace.sites().await;
    Json(ApiResponse::success(sites))
}

/// Test a site connection
async fn test_site_connection(
    State(state): State<AppState>,
    Json(request): Json<TestConnectionRequest>,
) -> axum::response::Response {
    let credentials = SiteCredentials {
        url: request.url,
        username: request.username,
        secret: request.secret,
    };

    match state.coordinator.test_connection(&credentials).await {
        Ok(check) => (
            StatusCode::OK,
            Json(ApiResponse::success(ConnectionCheckResponse {
                success: check.success,
                error: check.error,
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Connect a verified site
async fn connect_site(
    State(state): State<AppState>,
    Json(request): Json<ConnectSiteRequest>,
) -> axum::response::Response {
    let Some(platform) = SitePlatform::parse(&request.platform) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(format!(
                "Invalid platform: {}. Expected wordpress|webflow|framer",
                request.platform
            ))),
        )
            .into_response();
    };

    let credentials = SiteCredentials {
        url: request.url,
        username: request.username,
        secret: request.secret,
    };

    match state.coordinator.connect(platform, credentials).await {
        Ok(site) => (StatusCode::OK, Json(ApiResponse::success(site))).into_response(),
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_success() {
        let response = ApiResponse::success("test data");
        assert!(response.success);
        assert!(response.data.is_some());
        assert!(response.error.is_none());
    }

    #[test]
    fn test_error_response() {
        let response = ErrorResponse::new("test error");
        assert!(!response.success);
        assert_eq!(response.error, "test error");
    }

    #[test]
    fn test_error_status_mapping() {
        let not_found: Error = SchedulerError::unknown_item(Uuid::new_v4()).into();
        assert_eq!(error_status(&not_found), StatusCode::NOT_FOUND);

        let unverified: Error = PublishError::NotVerified {
            url: "https://a.example".to_string(),
        }
        .into();
        assert_eq!(error_status(&unverified), StatusCode::PRECONDITION_FAILED);
    }
}
