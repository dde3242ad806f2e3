use std::sync::Arc;

use tracing::{info, instrument};

use crate::ingest::{LogData, Player, Section};

use super::{
    aggregator::{award_key, rank_players, StatsAggregator},
    collectors::{SectionAnswerCollector, ShareAwardCollector, SoloAttemptCollector},
    dedup::{dedupe_share_awards, dedupe_solo_attempts},
    questions::build_question_rows,
    summary::LogSummary,
    timing::FirstAnswerIndex,
    CollectionContext, LogReport, PlayerReport, QuestionTables, StatCollector,
};

/// Runs the derivation pipeline over a decoded log
pub struct StatsService {
    collectors: Vec<Arc<dyn StatCollector>>,
}

impl Default for StatsService {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl StatsService {
    pub fn builder() -> StatsServiceBuilder {
        StatsServiceBuilder::new()
    }

    pub fn collectors(&self) -> Vec<Arc<dyn StatCollector>> {
        self.collectors.clone()
    }

    /// Builds a fresh report. Nothing from earlier cycles is reused.
    #[instrument(skip(self, data), fields(players = data.roster.len()))]
    pub fn build_report(&self, data: LogData, source_name: &str) -> LogReport {
        let share_awards = dedupe_share_awards(&data.share_awards);
        let solo_attempts = dedupe_solo_attempts(&data.solo_attempts);
        let first_answers = FirstAnswerIndex::build(&data);

        let context = CollectionContext {
            data: &data,
            share_awards: &share_awards,
            solo_attempts: &solo_attempts,
            first_answers: &first_answers,
        };

        let mut aggregator = StatsAggregator::new();
        for collector in &self.collectors {
            aggregator.fold(collector.collect(&context));
        }

        let mut ranked: Vec<Player> = data.roster.iter().cloned().collect();
        rank_players(&mut ranked);

        let players: Vec<PlayerReport> = ranked
            .into_iter()
            .map(|player| {
                let key = StatsAggregator::player_key(&player);
                let attributed = |user_id: Option<&str>, name: Option<&str>| {
                    award_key(user_id, name).as_deref() == Some(key.as_str())
                };

                PlayerReport {
                    stats: aggregator
                        .player_stats(&player, first_answers.first_answer_at(&player.id)),
                    share_awards: share_awards
                        .iter()
                        .filter(|award| attributed(award.user_id.as_deref(), award.name.as_deref()))
                        .cloned()
                        .collect(),
                    // listed by user id only; name-only attempts still count in the totals
                    solo_attempts: solo_attempts
                        .iter()
                        .filter(|attempt| {
                            attempt.user_id.as_deref().map(str::to_lowercase).as_deref()
                                == Some(player.id.as_str())
                        })
                        .cloned()
                        .collect(),
                    player,
                }
            })
            .collect();

        let questions = QuestionTables {
            main: build_question_rows(data.questions(Section::Main), &data.roster),
            money: build_question_rows(data.questions(Section::Money), &data.roster),
            map: build_question_rows(data.questions(Section::Map), &data.roster),
        };

        let summary = LogSummary::build(&data, &solo_attempts, source_name);

        info!(
            source = %source_name,
            players = players.len(),
            share_awards = share_awards.len(),
            duplicate_share_awards = data.share_awards.len() - share_awards.len(),
            solo_attempts = solo_attempts.len(),
            duplicate_solo_attempts = data.solo_attempts.len() - solo_attempts.len(),
            "Report built"
        );

        LogReport {
            source_name: source_name.to_string(),
            summary,
            players,
            questions,
            share_awards,
            solo_attempts,
            team_events: data.team_events,
            roster: data.roster,
        }
    }
}

pub struct StatsServiceBuilder {
    collectors: Vec<Arc<dyn StatCollector>>,
}

impl Default for StatsServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsServiceBuilder {
    fn new() -> Self {
        Self {
            collectors: vec![
                Arc::new(SectionAnswerCollector::new()),
                Arc::new(ShareAwardCollector::new()),
                Arc::new(SoloAttemptCollector::new()),
            ],
        }
    }

    pub fn with_collector(mut self, collector: Arc<dyn StatCollector>) -> Self {
        self.collectors.push(collector);
        self
    }

    pub fn build(self) -> StatsService {
        StatsService {
            collectors: self.collectors,
        }
    }
}
