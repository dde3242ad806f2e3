pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod source;
pub mod types;

pub use models::{LoadOrigin, LoadTicket, ViewState, ViewStatus};
pub use repository::{InMemoryViewRepository, ViewRepository};
pub use service::{LoadError, LoadOutcome, ViewerService};
pub use source::{
    source_for_location, FileSource, HttpSource, LoadScope, LogSource, SourceError, UploadSource,
};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::shared::AppState;

/// Session logs of a long game day easily exceed axum's 2 MB default
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/status", get(handlers::get_status))
        .route("/report", get(handlers::get_report))
        .route("/players/:id", get(handlers::get_player))
        .route("/upload", post(handlers::upload_log))
        .route("/load", post(handlers::load_log))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
