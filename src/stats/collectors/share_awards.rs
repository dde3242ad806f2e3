use tracing::debug;

use super::super::{aggregator::award_key, CollectedData, CollectionContext, StatCollector};

/// Share points and counts keyed by award key. Orphaned awards are dropped.
pub struct ShareAwardCollector;

impl Default for ShareAwardCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ShareAwardCollector {
    pub fn new() -> Self {
        Self
    }
}

impl StatCollector for ShareAwardCollector {
    fn collect(&self, context: &CollectionContext) -> Vec<CollectedData> {
        let collected: Vec<CollectedData> = context
            .share_awards
            .iter()
            .filter_map(|award| {
                let key = award_key(award.user_id.as_deref(), award.name.as_deref())?;
                Some(CollectedData::ShareAward {
                    key,
                    points: award.points,
                    shares: award.share_count,
                })
            })
            .collect();

        let orphaned = context.share_awards.len() - collected.len();
        if orphaned > 0 {
            debug!(orphaned, "Share awards without user id or name");
        }

        collected
    }
}
