use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

use quizlog::{
    config::{ViewOptions, ViewerConfig},
    shared::AppState,
    viewer::{router, InMemoryViewRepository, ViewRepository},
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub app_state: AppState,
    pub repository: Arc<InMemoryViewRepository>,
    pub app: Router,
}

pub struct TestSetupBuilder {
    view: ViewOptions,
    log_dir: Option<PathBuf>,
}

impl Default for TestSetupBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            view: ViewOptions::default(),
            log_dir: None,
        }
    }

    pub fn with_log_dir(mut self, log_dir: PathBuf) -> Self {
        self.log_dir = Some(log_dir);
        self
    }

    pub fn with_all_sections_shown(mut self) -> Self {
        self.view = ViewOptions {
            hide_share_awards: false,
            hide_solo_section: false,
        };
        self
    }

    pub fn build(self) -> TestSetup {
        let repository = Arc::new(InMemoryViewRepository::new());
        let config = ViewerConfig {
            view: self.view,
            log_dir: self.log_dir,
            ..ViewerConfig::default()
        };
        let app_state = AppState::new(
            Arc::clone(&repository) as Arc<dyn ViewRepository>,
            &config,
        );
        let app = router(app_state.clone());

        TestSetup {
            app_state,
            repository,
            app,
        }
    }
}

impl TestSetup {
    pub async fn upload(&self, filename: &str, body: Vec<u8>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(format!("/upload?filename={}", filename))
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    pub async fn load(&self, location: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/load")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::json!({ "location": location }).to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }
}
