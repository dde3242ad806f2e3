use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{ViewOptions, ViewerConfig};
use crate::stats::StatsService;
use crate::viewer::{
    repository::{InMemoryViewRepository, ViewRepository},
    service::ViewerService,
    source::LoadScope,
};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub viewer: Arc<ViewerService>,
    pub view: ViewOptions,
    /// Limits on what `POST /load` may read
    pub load_scope: LoadScope,
}

impl AppState {
    pub fn new(repository: Arc<dyn ViewRepository>, config: &ViewerConfig) -> Self {
        Self {
            viewer: Arc::new(ViewerService::new(repository, StatsService::default())),
            view: config.view,
            load_scope: LoadScope {
                log_dir: config.log_dir.clone(),
                allow_remote: config.allow_remote,
                fetch_timeout: config.fetch_timeout,
            },
        }
    }

    /// In-memory view store with default config
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryViewRepository::new()),
            &ViewerConfig::default(),
        )
    }

    pub fn with_view_options(mut self, view: ViewOptions) -> Self {
        self.view = view;
        self
    }

    pub fn with_load_scope(mut self, load_scope: LoadScope) -> Self {
        self.load_scope = load_scope;
        self
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The log was read but is not a usable session log
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The log could not be read or fetched
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Superseded by a newer load")]
    Superseded,

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Rejected(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Transport(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Superseded => (
                StatusCode::CONFLICT,
                "Superseded by a newer load".to_string(),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn error_body_is_json() {
        let response = AppError::Rejected("Log has no players object".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Log has no players object");
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            AppError::Transport("x".into()).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Superseded.into_response().status(),
            StatusCode::CONFLICT
        );
    }
}
