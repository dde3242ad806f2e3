use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};
use tracing::{info, instrument, warn};

use super::{
    models::{LoadOrigin, ViewStatus},
    service::LoadOutcome,
    source::UploadSource,
    types::{LoadRequest, PlayerDetailResponse, ReportResponse, StatusResponse, UploadQuery},
};
use crate::shared::{AppError, AppState};

/// GET /
pub async fn root() -> &'static str {
    "Quiz log viewer"
}

/// HTTP handler for the current load status
///
/// GET /status
#[instrument(name = "get_status", skip(state))]
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let view = state.viewer.current().await;
    Json(StatusResponse::from(&view))
}

/// HTTP handler for the full derived report
///
/// GET /report
/// Returns 404 while no log is loaded
#[instrument(name = "get_report", skip(state))]
pub async fn get_report(State(state): State<AppState>) -> Result<Json<ReportResponse>, AppError> {
    let view = state.viewer.current().await;
    let report = view
        .report
        .as_ref()
        .ok_or_else(|| AppError::NotFound(view.status.message()))?;

    Ok(Json(ReportResponse::new(report, state.view, view.loaded_at)))
}

/// HTTP handler for one player's detail view
///
/// GET /players/:id
#[instrument(name = "get_player", skip(state))]
pub async fn get_player(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<PlayerDetailResponse>, AppError> {
    let view = state.viewer.current().await;
    let report = view
        .report
        .as_ref()
        .ok_or_else(|| AppError::NotFound(view.status.message()))?;

    let player = report
        .player(&player_id)
        .ok_or_else(|| AppError::NotFound(format!("Player {} not found", player_id)))?;

    Ok(Json(PlayerDetailResponse::new(report, player, state.view)))
}

/// HTTP handler for a user upload
///
/// POST /upload?filename=<name>.json
/// The raw request body is the log. A non-JSON filename is refused
/// before the current view is touched.
#[instrument(name = "upload_log", skip(state, body), fields(len = body.len()))]
pub async fn upload_log(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<StatusResponse>, AppError> {
    info!(filename = %query.filename, "Received upload");

    let source = UploadSource::new(query.filename, body.to_vec())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let outcome = state.viewer.load(&source, LoadOrigin::User).await;
    outcome_response(outcome)
}

/// HTTP handler for a user load from a URL or file path
///
/// POST /load
/// File paths are relative to the configured log directory and URLs need
/// remote loads enabled. Anything else is refused with 400 before the
/// current view is touched.
#[instrument(name = "load_log", skip(state))]
pub async fn load_log(
    State(state): State<AppState>,
    Json(request): Json<LoadRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    let source = state
        .load_scope
        .source_for(&request.location)
        .await
        .map_err(|e| {
            warn!(error = %e, "Refusing load location");
            AppError::BadRequest(e.to_string())
        })?;

    let outcome = state.viewer.load(source.as_ref(), LoadOrigin::User).await;
    outcome_response(outcome)
}

fn outcome_response(outcome: LoadOutcome) -> Result<Json<StatusResponse>, AppError> {
    let view = match outcome {
        LoadOutcome::Applied(view) => view,
        LoadOutcome::Superseded => return Err(AppError::Superseded),
    };

    match &view.status {
        ViewStatus::Loaded { .. } => Ok(Json(StatusResponse::from(&view))),
        ViewStatus::Rejected { .. } => Err(AppError::Rejected(view.status.message())),
        ViewStatus::TransportFailed { .. } => Err(AppError::Transport(view.status.message())),
        other => {
            warn!(status = ?other, "Load finished without a final status");
            Err(AppError::Internal)
        }
    }
}
