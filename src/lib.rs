// Library crate for the quiz log viewer
// This file exposes the public API for integration tests

pub mod config;
pub mod ingest;
pub mod shared;
pub mod stats;
pub mod viewer;

// Re-export commonly used types for easier access in tests
pub use config::{ViewOptions, ViewerConfig};
pub use ingest::{ingest_bytes, IngestError, LogData};
pub use shared::{AppError, AppState};
pub use stats::{LogReport, StatsService};
pub use viewer::{router, LoadOrigin, LoadOutcome, ViewerService};
