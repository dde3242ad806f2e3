use quizlog::{
    config::ViewerConfig,
    shared::AppState,
    viewer::{self, source_for_location, InMemoryViewRepository, LoadOrigin},
};
use axum::http::Method;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quizlog=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting quiz log viewer");

    let config = ViewerConfig::from_env();
    let app_state = AppState::new(Arc::new(InMemoryViewRepository::new()), &config);

    if let Some(location) = config.auto_load.clone() {
        spawn_auto_load(app_state.clone(), location);
    }

    // Other origins may read the report but not trigger loads
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    let app = viewer::router(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(bind_addr = %config.bind_addr, error = %e, "Failed to bind");
            return;
        }
    };
    info!("Server running on http://{}", config.bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server stopped");
    }
}

/// Background startup load. A failure never clears data a user already loaded.
fn spawn_auto_load(state: AppState, location: String) {
    tokio::spawn(async move {
        let source = match source_for_location(&location, state.load_scope.fetch_timeout) {
            Ok(source) => source,
            Err(e) => {
                warn!(location = %location, error = %e, "Skipping automatic load");
                return;
            }
        };

        info!(location = %location, "Automatic load started");
        state.viewer.load(source.as_ref(), LoadOrigin::Auto).await;
    });
}
