use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::models::ViewState;

/// Holds the view currently served to the renderer
#[async_trait]
pub trait ViewRepository: Send + Sync {
    async fn current(&self) -> ViewState;

    /// Swaps in a whole new view
    async fn replace(&self, state: ViewState);
}

#[derive(Debug, Default)]
pub struct InMemoryViewRepository {
    state: RwLock<ViewState>,
}

impl InMemoryViewRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ViewRepository for InMemoryViewRepository {
    async fn current(&self) -> ViewState {
        self.state.read().await.clone()
    }

    async fn replace(&self, state: ViewState) {
        let mut guard = self.state.write().await;
        debug!(
            previous_generation = guard.generation,
            generation = state.generation,
            has_data = state.has_data(),
            "Replacing view state"
        );
        *guard = state;
    }
}
