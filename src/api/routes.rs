//! Alerts HTTP API
//!
//! Endpoints:
//! - GET  /alerts/                          - List page
//! - GET  /alerts/browse/                   - Broker browser page
//! - GET  /api/health                       - Health check
//! - POST /api/sessions                     - New session (panels, filters, columns)
//! - DELETE /api/sessions/:id               - End a session
//! - POST /api/sessions/:id/select          - Broker selection
//! - POST /api/sessions/:id/input/:broker   - Filter input changed
//! - POST /api/sessions/:id/validate/:broker - Diagnostics without querying
//! - POST /api/sessions/:id/query/:broker   - Query cycle
//! - POST /api/sessions/:id/targets         - Create targets from selected rows
//!
//! Operations that decide there is nothing to do answer `204 No Content`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::pages::PageRenderer;
use crate::alerts::adapter::{BrokerAdapter, ResultColumnSpecification};
use crate::alerts::filters::FilterSpecification;
use crate::alerts::row::DisplayRow;
use crate::alerts::trigger::Update;
use crate::alerts::validation::ValidationMessage;
use crate::brokers::registry::BrokerRegistry;
use crate::dash::panel::QueryRequest;
use crate::dash::session::{SessionStore, SharedController};
use crate::dash::wiring::PanelWiring;
use crate::error::{ConfigError, DashError};

// ============================================================================
// State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub pages: Arc<PageRenderer>,
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    brokers: Vec<String>,
}

/// Everything a client needs to render one broker panel.
#[derive(Debug, Clone, Serialize)]
pub struct PanelDescriptor {
    pub name: String,
    pub filters: FilterSpecification,
    pub columns: ResultColumnSpecification,
    pub wiring: PanelWiring,
}

impl PanelDescriptor {
    fn for_adapter(adapter: &dyn BrokerAdapter) -> Self {
        PanelDescriptor {
            name: adapter.name().to_string(),
            filters: adapter.filter_inputs(),
            columns: adapter.result_columns(),
            wiring: PanelWiring::for_adapter(adapter),
        }
    }

    fn describe(registry: &BrokerRegistry) -> Vec<Self> {
        registry
            .list_adapters()
            .iter()
            .map(|entry| Self::for_adapter(entry.instantiate().as_ref()))
            .collect()
    }
}

#[derive(Serialize)]
struct SessionCreated {
    session_id: Uuid,
    brokers: Vec<PanelDescriptor>,
}

#[derive(Deserialize)]
struct SelectRequest {
    new_selection: String,
    #[serde(default)]
    previous_selection: Option<String>,
}

#[derive(Deserialize)]
struct ValidateRequest {
    #[serde(flatten)]
    query: QueryRequest,
    #[serde(default)]
    existing_messages: Vec<ValidationMessage>,
}

#[derive(Deserialize)]
struct TargetsRequest {
    #[serde(default)]
    trigger_count: Option<u64>,
    #[serde(default)]
    selected_rows: Vec<usize>,
    /// Current table contents; the session's last published rows when absent.
    #[serde(default)]
    row_data: Option<Vec<DisplayRow>>,
    #[serde(default)]
    active_broker: Option<String>,
    #[serde(default)]
    existing_messages: Vec<ValidationMessage>,
}

type ApiResult = Result<Response, (StatusCode, String)>;

fn respond<T: Serialize>(update: Update<T>) -> Response {
    match update {
        Update::Changed(body) => Json(body).into_response(),
        Update::NoUpdate => StatusCode::NO_CONTENT.into_response(),
    }
}

fn error_status(err: DashError) -> (StatusCode, String) {
    let status = match &err {
        DashError::Config(ConfigError::BrokerNotFound { .. }) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

async fn session(state: &AppState, id: Uuid) -> Result<SharedController, (StatusCode, String)> {
    state
        .sessions
        .get(id)
        .await
        .ok_or((StatusCode::NOT_FOUND, format!("Session {} not found", id)))
}

// ============================================================================
// Handlers
// ============================================================================

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        brokers: state
            .sessions
            .registry()
            .names()
            .into_iter()
            .map(String::from)
            .collect(),
    })
}

async fn list_page(State(state): State<AppState>) -> Result<Html<String>, (StatusCode, String)> {
    state
        .pages
        .render_list()
        .map(Html)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e)))
}

async fn browse_page(State(state): State<AppState>) -> Result<Html<String>, (StatusCode, String)> {
    let brokers = PanelDescriptor::describe(state.sessions.registry());
    state
        .pages
        .render_browse(&brokers)
        .map(Html)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e)))
}

async fn create_session(State(state): State<AppState>) -> Json<SessionCreated> {
    let (session_id, _) = state.sessions.create().await;
    let brokers = PanelDescriptor::describe(state.sessions.registry());
    Json(SessionCreated {
        session_id,
        brokers,
    })
}

async fn end_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult {
    if !state.sessions.remove(id).await {
        return Err((StatusCode::NOT_FOUND, format!("Session {} not found", id)));
    }
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn select_broker(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectRequest>,
) -> ApiResult {
    let controller = session(&state, id).await?;
    let mut controller = controller.lock().await;
    Ok(respond(controller.select_broker(
        &req.new_selection,
        req.previous_selection.as_deref(),
    )))
}

async fn input_changed(
    State(state): State<AppState>,
    Path((id, broker)): Path<(Uuid, String)>,
) -> ApiResult {
    let controller = session(&state, id).await?;
    controller
        .lock()
        .await
        .note_input_change(&broker)
        .map_err(error_status)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn validate(
    State(state): State<AppState>,
    Path((id, broker)): Path<(Uuid, String)>,
    Json(req): Json<ValidateRequest>,
) -> ApiResult {
    let controller = session(&state, id).await?;
    let controller = controller.lock().await;
    let update = controller
        .validate(&broker, &req.query, &req.existing_messages)
        .map_err(error_status)?;
    Ok(respond(update))
}

async fn query(
    State(state): State<AppState>,
    Path((id, broker)): Path<(Uuid, String)>,
    Json(req): Json<QueryRequest>,
) -> ApiResult {
    let controller = session(&state, id).await?;
    let mut controller = controller.lock().await;
    let update = controller
        .handle_query(&broker, &req)
        .await
        .map_err(error_status)?;
    Ok(respond(update))
}

async fn create_targets(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TargetsRequest>,
) -> ApiResult {
    let controller = session(&state, id).await?;
    let controller = controller.lock().await;

    let broker = req
        .active_broker
        .as_deref()
        .or(controller.active_broker())
        .map(String::from);
    let rows = match req.row_data {
        Some(rows) => rows,
        None => broker
            .as_deref()
            .and_then(|b| controller.panel(b))
            .map(|p| p.rows().to_vec())
            .unwrap_or_default(),
    };

    let update = controller
        .create_targets(
            req.trigger_count,
            &req.selected_rows,
            &rows,
            broker.as_deref(),
            &req.existing_messages,
        )
        .await
        .map_err(error_status)?;
    Ok(respond(update))
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/alerts/", get(list_page))
        .route("/alerts/browse/", get(browse_page))
        .route("/api/health", get(health))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", delete(end_session))
        .route("/api/sessions/:id/select", post(select_broker))
        .route("/api/sessions/:id/input/:broker", post(input_changed))
        .route("/api/sessions/:id/validate/:broker", post(validate))
        .route("/api/sessions/:id/query/:broker", post(query))
        .route("/api/sessions/:id/targets", post(create_targets))
        .with_state(state)
}
