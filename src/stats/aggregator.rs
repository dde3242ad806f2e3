use std::collections::HashMap;

use crate::ingest::{Correctness, Player, Question};

use super::{
    models::{CorrectRate, PlayerStats, SectionBreakdown, SectionTotals, ShareTotals, SoloTotals},
    timing::answer_timestamp,
    CollectedData,
};

/// Attribution key for awards and attempts: user id if present, else name.
/// `None` leaves the record orphaned.
pub fn award_key(user_id: Option<&str>, name: Option<&str>) -> Option<String> {
    user_id
        .filter(|id| !id.is_empty())
        .or_else(|| name.filter(|name| !name.is_empty()))
        .map(str::to_lowercase)
}

/// Answer/correct/wrong counts of one player over one section.
///
/// Answers resolved strictly before `not_before` are skipped; without a
/// bound, or without a resolved timestamp, nothing is filtered by time.
pub fn section_totals(
    questions: &[Question],
    player_id: &str,
    not_before: Option<f64>,
) -> SectionTotals {
    let mut totals = SectionTotals::default();

    for question in questions {
        let correct_key = question.correct_option_key.as_deref();

        for answer in question.answers.iter().filter(|a| a.belongs_to(player_id)) {
            if let (Some(bound), Some(at)) = (not_before, answer_timestamp(question, answer)) {
                if at < bound {
                    continue;
                }
            }

            totals.answers += 1;
            match answer.correctness(correct_key) {
                Correctness::Correct => totals.corrects += 1,
                Correctness::Wrong => totals.wrongs += 1,
                Correctness::Unknown => {}
            }
        }
    }

    totals
}

/// Stable sort by final score, highest first.
pub fn rank_players(players: &mut [Player]) {
    players.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
}

/// Running per-key sums folded from collected data.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    sections: HashMap<String, SectionBreakdown>,
    shares: HashMap<String, ShareTotals>,
    solo: HashMap<String, SoloTotals>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold(&mut self, batch: impl IntoIterator<Item = CollectedData>) {
        for data in batch {
            match data {
                CollectedData::SectionAnswers {
                    player_id,
                    section,
                    totals,
                } => {
                    *self.sections.entry(player_id).or_default().get_mut(section) += totals;
                }
                CollectedData::ShareAward {
                    key,
                    points,
                    shares,
                } => {
                    let entry = self.shares.entry(key).or_default();
                    entry.points += points;
                    entry.shares += shares;
                }
                CollectedData::SoloAttempt { key, won } => {
                    let entry = self.solo.entry(key).or_default();
                    entry.attempts += 1;
                    if won {
                        entry.wins += 1;
                    }
                }
            }
        }
    }

    pub fn player_stats(&self, player: &Player, first_answer_at: Option<f64>) -> PlayerStats {
        let sections = self
            .sections
            .get(&player.id)
            .copied()
            .unwrap_or_default();
        let combined = sections.combined();
        let key = Self::player_key(player);

        PlayerStats {
            player_id: player.id.clone(),
            sections,
            combined,
            correct_rate: CorrectRate::from_totals(&combined),
            shares: self.shares.get(&key).copied().unwrap_or_default(),
            solo: self.solo.get(&key).copied().unwrap_or_default(),
            first_answer_at,
        }
    }

    /// A player's own award key, id first, display name second
    pub fn player_key(player: &Player) -> String {
        award_key(Some(&player.id), Some(&player.display_name)).unwrap_or_else(|| player.id.clone())
    }
}
