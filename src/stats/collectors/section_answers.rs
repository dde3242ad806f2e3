use strum::IntoEnumIterator;

use crate::ingest::Section;

use super::super::{aggregator::section_totals, CollectedData, CollectionContext, StatCollector};

/// Per-player, per-section answer totals, bounded below by the player's first answer.
pub struct SectionAnswerCollector;

impl Default for SectionAnswerCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionAnswerCollector {
    pub fn new() -> Self {
        Self
    }
}

impl StatCollector for SectionAnswerCollector {
    fn collect(&self, context: &CollectionContext) -> Vec<CollectedData> {
        let mut collected = Vec::new();

        for player in context.data.roster.iter() {
            let not_before = context.first_answers.first_answer_at(&player.id);

            for section in Section::iter() {
                let totals = section_totals(context.data.questions(section), &player.id, not_before);
                if totals.answers == 0 {
                    continue;
                }
                collected.push(CollectedData::SectionAnswers {
                    player_id: player.id.clone(),
                    section,
                    totals,
                });
            }
        }

        collected
    }
}
