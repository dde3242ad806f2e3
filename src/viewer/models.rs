use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::stats::LogReport;

/// Who asked for a load. Failed automatic loads never destroy loaded data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOrigin {
    User,
    Auto,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewStatus {
    #[default]
    Empty,
    Loading {
        source: String,
    },
    Loaded {
        source: String,
    },
    /// Not JSON, or JSON without the required top-level shape
    Rejected {
        source: String,
        reason: String,
    },
    /// File unreadable or remote fetch failed
    TransportFailed {
        source: String,
        reason: String,
    },
}

impl ViewStatus {
    pub fn message(&self) -> String {
        match self {
            ViewStatus::Empty => "No file loaded".to_string(),
            ViewStatus::Loading { source } => format!("Reading {}...", source),
            ViewStatus::Loaded { source } => format!("Loaded file: {}", source),
            ViewStatus::Rejected { source, reason } => {
                format!("{} is not a quiz session log: {}", source, reason)
            }
            ViewStatus::TransportFailed { source, reason } => {
                format!("Could not read {}: {}", source, reason)
            }
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            ViewStatus::Rejected { .. } | ViewStatus::TransportFailed { .. }
        )
    }
}

/// The currently displayed view. Replaced as a whole, never patched.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub generation: u64,
    pub status: ViewStatus,
    pub report: Option<Arc<LogReport>>,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl ViewState {
    pub fn loading(generation: u64, source: &str) -> Self {
        Self {
            generation,
            status: ViewStatus::Loading {
                source: source.to_string(),
            },
            report: None,
            loaded_at: None,
        }
    }

    pub fn has_data(&self) -> bool {
        self.report.is_some()
    }
}

/// Handle for one in-flight load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub origin: LoadOrigin,
    pub source: String,
}
