pub mod aggregator;
pub mod collectors;
pub mod dedup;
pub mod models;
pub mod questions;
pub mod service;
pub mod summary;
pub mod timing;

pub use models::*;
pub use service::{StatsService, StatsServiceBuilder};
pub use summary::LogSummary;

use crate::ingest::{LogData, Section, ShareAward, SoloAttempt};

use timing::FirstAnswerIndex;

pub type CollectedDataBatch = Vec<CollectedData>;

/// A data point emitted by a collector and folded by the aggregator
#[derive(Debug, Clone, PartialEq)]
pub enum CollectedData {
    SectionAnswers {
        player_id: String,
        section: Section,
        totals: SectionTotals,
    },
    ShareAward {
        key: String,
        points: f64,
        shares: f64,
    },
    SoloAttempt {
        key: String,
        won: bool,
    },
}

pub trait StatCollector: Send + Sync {
    fn collect(&self, context: &CollectionContext) -> CollectedDataBatch;
}

/// Inputs shared by every collector within one ingestion cycle
pub struct CollectionContext<'a> {
    pub data: &'a LogData,
    /// Deduplicated
    pub share_awards: &'a [ShareAward],
    /// Deduplicated
    pub solo_attempts: &'a [SoloAttempt],
    pub first_answers: &'a FirstAnswerIndex,
}
