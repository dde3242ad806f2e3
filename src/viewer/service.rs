use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, instrument, warn};

use crate::{
    ingest::{ingest_bytes, IngestError},
    stats::{LogReport, StatsService},
};

use super::{
    models::{LoadOrigin, LoadTicket, ViewState, ViewStatus},
    repository::ViewRepository,
    source::{LogSource, SourceError},
};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Report worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// The view now reflects this load (or, for a failed automatic load, was kept)
    Applied(ViewState),
    /// A newer load started while this one was in flight; its result was dropped
    Superseded,
}

/// Coordinates ingestion cycles against the shared view.
///
/// Every load takes a generation number; only the most recently started
/// load may commit its result.
pub struct ViewerService {
    repository: Arc<dyn ViewRepository>,
    stats: Arc<StatsService>,
    latest: AtomicU64,
    commit_lock: AsyncMutex<()>,
}

impl ViewerService {
    pub fn new(repository: Arc<dyn ViewRepository>, stats: StatsService) -> Self {
        Self {
            repository,
            stats: Arc::new(stats),
            latest: AtomicU64::new(0),
            commit_lock: AsyncMutex::new(()),
        }
    }

    pub async fn current(&self) -> ViewState {
        self.repository.current().await
    }

    /// Starts a cycle. User loads clear the view immediately.
    #[instrument(skip(self))]
    pub async fn begin_load(&self, origin: LoadOrigin, source: &str) -> LoadTicket {
        let _guard = self.commit_lock.lock().await;
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        let reset = match origin {
            LoadOrigin::User => true,
            LoadOrigin::Auto => !self.repository.current().await.has_data(),
        };
        if reset {
            self.repository
                .replace(ViewState::loading(generation, source))
                .await;
        }

        debug!(generation, reset, "Load started");

        LoadTicket {
            generation,
            origin,
            source: source.to_string(),
        }
    }

    /// Commits a finished cycle unless a newer one has started since.
    #[instrument(skip(self, result), fields(generation = ticket.generation, origin = ?ticket.origin))]
    pub async fn finish_load(
        &self,
        ticket: LoadTicket,
        result: Result<LogReport, LoadError>,
    ) -> LoadOutcome {
        let _guard = self.commit_lock.lock().await;

        let latest = self.latest.load(Ordering::SeqCst);
        if latest != ticket.generation {
            info!(latest, source = %ticket.source, "Discarding stale load result");
            return LoadOutcome::Superseded;
        }

        let next = match result {
            Ok(report) => {
                info!(source = %ticket.source, players = report.players.len(), "Log loaded");
                ViewState {
                    generation: ticket.generation,
                    status: ViewStatus::Loaded {
                        source: ticket.source.clone(),
                    },
                    report: Some(Arc::new(report)),
                    loaded_at: Some(Utc::now()),
                }
            }
            Err(error) => {
                let current = self.repository.current().await;
                if ticket.origin == LoadOrigin::Auto && current.has_data() {
                    warn!(error = %error, source = %ticket.source, "Automatic load failed, keeping loaded data");
                    return LoadOutcome::Applied(current);
                }

                warn!(error = %error, source = %ticket.source, "Load failed");
                ViewState {
                    generation: ticket.generation,
                    status: failure_status(&ticket.source, &error),
                    report: None,
                    loaded_at: None,
                }
            }
        };

        self.repository.replace(next.clone()).await;
        LoadOutcome::Applied(next)
    }

    /// Full cycle: fetch, ingest, derive, commit.
    ///
    /// Ingestion and derivation run on the blocking pool so a large log
    /// does not stall the runtime's worker threads.
    pub async fn load(&self, source: &dyn LogSource, origin: LoadOrigin) -> LoadOutcome {
        let name = source.name();
        let ticket = self.begin_load(origin, &name).await;

        let result = match source.fetch().await {
            Ok(bytes) => {
                let stats = Arc::clone(&self.stats);
                let source_name = name.clone();
                tokio::task::spawn_blocking(move || derive_report(&stats, &bytes, &source_name))
                    .await
                    .unwrap_or_else(|error| Err(LoadError::from(error)))
            }
            Err(error) => Err(LoadError::from(error)),
        };

        self.finish_load(ticket, result).await
    }
}

fn derive_report(
    stats: &StatsService,
    bytes: &[u8],
    source_name: &str,
) -> Result<LogReport, LoadError> {
    let data = ingest_bytes(bytes)?;
    Ok(stats.build_report(data, source_name))
}

fn failure_status(source: &str, error: &LoadError) -> ViewStatus {
    match error {
        LoadError::Source(inner) => ViewStatus::TransportFailed {
            source: source.to_string(),
            reason: inner.to_string(),
        },
        LoadError::Ingest(_) | LoadError::Worker(_) => ViewStatus::Rejected {
            source: source.to_string(),
            reason: error.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{CollectedDataBatch, CollectionContext, StatCollector};
    use crate::viewer::{repository::InMemoryViewRepository, source::UploadSource};
    use std::sync::atomic::AtomicBool;
    use std::sync::{mpsc, Mutex};
    use std::time::Duration;

    const VALID_LOG: &str =
        r#"{"players":{"p1":{"name":"Ana","finalScore":10}},"mainGame":{"questions":[]}}"#;

    fn service() -> ViewerService {
        ViewerService::new(
            Arc::new(InMemoryViewRepository::new()),
            StatsService::default(),
        )
    }

    fn upload(name: &str, body: &str) -> UploadSource {
        UploadSource::new(name, body.as_bytes().to_vec()).unwrap()
    }

    struct FailingSource;

    #[async_trait::async_trait]
    impl LogSource for FailingSource {
        fn name(&self) -> String {
            "remote.json".to_string()
        }

        async fn fetch(&self) -> Result<Vec<u8>, SourceError> {
            Err(SourceError::Status {
                url: "https://example.com/remote.json".into(),
                status: 503,
            })
        }
    }

    #[tokio::test]
    async fn successful_load_replaces_view() {
        let service = service();
        let outcome = service
            .load(&upload("day.json", VALID_LOG), LoadOrigin::User)
            .await;

        let LoadOutcome::Applied(state) = outcome else {
            panic!("load should apply");
        };
        assert_eq!(
            state.status,
            ViewStatus::Loaded {
                source: "day.json".into()
            }
        );
        assert!(state.loaded_at.is_some());
        assert_eq!(service.current().await.report.unwrap().players.len(), 1);
    }

    #[tokio::test]
    async fn malformed_user_load_clears_view() {
        let service = service();
        service
            .load(&upload("good.json", VALID_LOG), LoadOrigin::User)
            .await;
        service
            .load(
                &upload("bad.json", r#"{"mainGame":{"questions":[]}}"#),
                LoadOrigin::User,
            )
            .await;

        let state = service.current().await;
        assert!(state.report.is_none());
        assert!(matches!(state.status, ViewStatus::Rejected { .. }));
    }

    #[tokio::test]
    async fn failed_auto_load_keeps_existing_data() {
        let service = service();
        service
            .load(&upload("manual.json", VALID_LOG), LoadOrigin::User)
            .await;
        service.load(&FailingSource, LoadOrigin::Auto).await;

        let state = service.current().await;
        assert!(state.has_data());
        assert_eq!(
            state.status,
            ViewStatus::Loaded {
                source: "manual.json".into()
            }
        );
    }

    #[tokio::test]
    async fn failed_auto_load_on_empty_view_reports_transport_failure() {
        let service = service();
        service.load(&FailingSource, LoadOrigin::Auto).await;

        let state = service.current().await;
        assert!(!state.has_data());
        assert!(matches!(state.status, ViewStatus::TransportFailed { .. }));
    }

    #[tokio::test]
    async fn failed_user_fetch_does_not_restore_old_view() {
        let service = service();
        service
            .load(&upload("manual.json", VALID_LOG), LoadOrigin::User)
            .await;
        service.load(&FailingSource, LoadOrigin::User).await;

        let state = service.current().await;
        assert!(!state.has_data());
        assert!(state.status.is_error());
    }

    #[tokio::test]
    async fn stale_result_is_discarded() {
        let service = service();

        let stale = service.begin_load(LoadOrigin::Auto, "slow.json").await;
        let fresh = service.begin_load(LoadOrigin::User, "fresh.json").await;

        let fresh_report = derive_report(&service.stats, VALID_LOG.as_bytes(), "fresh.json").unwrap();
        assert!(matches!(
            service.finish_load(fresh, Ok(fresh_report)).await,
            LoadOutcome::Applied(_)
        ));

        let stale_report = derive_report(&service.stats, VALID_LOG.as_bytes(), "slow.json").unwrap();
        assert!(matches!(
            service.finish_load(stale, Ok(stale_report)).await,
            LoadOutcome::Superseded
        ));

        let state = service.current().await;
        assert_eq!(
            state.status,
            ViewStatus::Loaded {
                source: "fresh.json".into()
            }
        );
    }

    #[tokio::test]
    async fn user_load_resets_view_when_it_starts() {
        let service = service();
        service
            .load(&upload("first.json", VALID_LOG), LoadOrigin::User)
            .await;

        let ticket = service.begin_load(LoadOrigin::User, "second.json").await;
        let state = service.current().await;
        assert_eq!(state.generation, ticket.generation);
        assert!(!state.has_data());
        assert_eq!(
            state.status,
            ViewStatus::Loading {
                source: "second.json".into()
            }
        );
    }

    /// Blocks inside `collect` until another task on the runtime signals it
    struct GatedCollector {
        gate: Mutex<mpsc::Receiver<()>>,
        opened: AtomicBool,
    }

    impl StatCollector for GatedCollector {
        fn collect(&self, _context: &CollectionContext) -> CollectedDataBatch {
            let signalled = self
                .gate
                .lock()
                .unwrap()
                .recv_timeout(Duration::from_secs(5))
                .is_ok();
            self.opened.store(signalled, Ordering::SeqCst);
            Vec::new()
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn derivation_does_not_block_the_runtime() {
        let (open, gate) = mpsc::channel();
        let gated = Arc::new(GatedCollector {
            gate: Mutex::new(gate),
            opened: AtomicBool::new(false),
        });
        let service = ViewerService::new(
            Arc::new(InMemoryViewRepository::new()),
            StatsService::builder().with_collector(gated.clone()).build(),
        );

        // only runs if the load yields the single runtime thread while deriving
        tokio::spawn(async move {
            let _ = open.send(());
        });

        let outcome = service
            .load(&upload("day.json", VALID_LOG), LoadOrigin::User)
            .await;

        assert!(gated.opened.load(Ordering::SeqCst));
        assert!(matches!(outcome, LoadOutcome::Applied(_)));
    }
}
