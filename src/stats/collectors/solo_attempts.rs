use crate::ingest::SoloOutcome;

use super::super::{aggregator::award_key, CollectedData, CollectionContext, StatCollector};

/// Solo attempt and win counts keyed like share awards.
pub struct SoloAttemptCollector;

impl Default for SoloAttemptCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl SoloAttemptCollector {
    pub fn new() -> Self {
        Self
    }
}

impl StatCollector for SoloAttemptCollector {
    fn collect(&self, context: &CollectionContext) -> Vec<CollectedData> {
        context
            .solo_attempts
            .iter()
            .filter_map(|attempt| {
                let key = award_key(attempt.user_id.as_deref(), attempt.name.as_deref())?;
                Some(CollectedData::SoloAttempt {
                    key,
                    won: attempt.outcome == SoloOutcome::Won,
                })
            })
            .collect()
    }
}
