use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{
    config::ViewOptions,
    ingest::{PlayerRoster, Section, ShareAward, SoloAttempt, SoloOutcome, TeamEvent},
    stats::{
        questions::{format_seconds, QuestionRow},
        CorrectRate, LogReport, PlayerReport, SectionTotals,
    },
};

use super::models::{ViewState, ViewStatus};

/// Query for `POST /upload`
#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub filename: String,
}

/// Request payload for `POST /load`
#[derive(Debug, Deserialize)]
pub struct LoadRequest {
    pub location: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub generation: u64,
    pub status: ViewStatus,
    pub message: String,
    pub has_data: bool,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl From<&ViewState> for StatusResponse {
    fn from(state: &ViewState) -> Self {
        Self {
            generation: state.generation,
            status: state.status.clone(),
            message: state.status.message(),
            has_data: state.has_data(),
            loaded_at: state.loaded_at,
        }
    }
}

/// Millisecond timestamp to a UTC time, unset for 0 or out of range
pub fn to_datetime(millis: Option<f64>) -> Option<DateTime<Utc>> {
    millis
        .filter(|millis| millis.is_finite() && *millis != 0.0)
        .and_then(|millis| DateTime::from_timestamp_millis(millis as i64))
}

fn initial(name: &str, id: &str) -> String {
    [name, id]
        .into_iter()
        .find(|candidate| !candidate.is_empty())
        .and_then(|candidate| candidate.chars().next())
        .map(|first| first.to_uppercase().collect())
        .unwrap_or_else(|| "?".to_string())
}

#[derive(Debug, Serialize)]
pub struct SummaryView {
    pub source_name: String,
    pub day: Option<String>,
    pub meta_label: String,
    pub player_count: usize,
    pub main_questions: usize,
    pub money_questions: usize,
    pub map_questions: usize,
    /// Hidden along with the solo section
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solo_attempts: Option<usize>,
    pub team_events: usize,
    pub loaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct PlayerCard {
    pub rank: usize,
    pub id: String,
    pub name: String,
    pub avatar_url: Option<String>,
    /// Shown in place of a missing avatar
    pub initial: String,
    pub final_score: f64,
    pub last_seen: Option<DateTime<Utc>>,
    pub total_answers: u32,
    pub total_correct: u32,
    pub correct_rate: CorrectRate,
    pub correct_rate_label: String,
    pub solo_label: String,
    pub share_points: f64,
    pub share_count: f64,
}

impl PlayerCard {
    pub fn new(rank: usize, report: &PlayerReport) -> Self {
        let player = &report.player;
        let stats = &report.stats;

        let solo_label = if stats.solo.attempts > 0 {
            format!("{}/{}", stats.solo.wins, stats.solo.attempts)
        } else {
            stats.solo.wins.to_string()
        };

        Self {
            rank,
            id: player.id.clone(),
            name: player.display_name.clone(),
            avatar_url: Some(player.avatar_url.clone()).filter(|url| !url.is_empty()),
            initial: initial(&player.display_name, &player.id),
            final_score: player.final_score,
            last_seen: to_datetime(player.last_seen),
            total_answers: stats.combined.answers,
            total_correct: stats.combined.corrects,
            correct_rate: stats.correct_rate,
            correct_rate_label: stats.correct_rate.to_string(),
            solo_label,
            share_points: stats.shares.points,
            share_count: stats.shares.shares,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShareAwardRow {
    pub position: usize,
    pub player: String,
    pub shares: f64,
    pub points: f64,
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct SoloAttemptRow {
    pub position: usize,
    pub player: String,
    pub outcome: SoloOutcome,
    pub elapsed: String,
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct TeamEventRow {
    pub label: String,
    pub at: Option<DateTime<Utc>>,
}

impl From<&TeamEvent> for TeamEventRow {
    fn from(event: &TeamEvent) -> Self {
        Self {
            label: event.label.clone(),
            at: to_datetime(event.timestamp),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuestionTable {
    pub section: Section,
    pub rows: Vec<QuestionRow>,
}

/// Most recent first. Records without a timestamp sort as 0.
fn newest_first<T>(records: &[T], timestamp: impl Fn(&T) -> Option<f64>) -> Vec<&T> {
    let mut sorted: Vec<&T> = records.iter().collect();
    sorted.sort_by(|a, b| {
        let at = timestamp(*a).unwrap_or(0.0);
        let bt = timestamp(*b).unwrap_or(0.0);
        bt.total_cmp(&at)
    });
    sorted
}

fn record_label(roster: &PlayerRoster, user_id: Option<&str>, name: Option<&str>) -> String {
    match (user_id.filter(|id| !id.is_empty()), name.filter(|name| !name.is_empty())) {
        (Some(id), _) => roster.label(Some(id)),
        (None, Some(name)) => name.to_string(),
        (None, None) => "-".to_string(),
    }
}

pub fn share_award_rows(awards: &[ShareAward], roster: &PlayerRoster) -> Vec<ShareAwardRow> {
    newest_first(awards, |award| award.timestamp)
        .into_iter()
        .enumerate()
        .map(|(index, award)| ShareAwardRow {
            position: index + 1,
            player: record_label(roster, award.user_id.as_deref(), award.name.as_deref()),
            shares: award.share_count,
            points: award.points,
            at: to_datetime(award.timestamp),
        })
        .collect()
}

pub fn solo_attempt_rows(attempts: &[SoloAttempt], roster: &PlayerRoster) -> Vec<SoloAttemptRow> {
    newest_first(attempts, |attempt| attempt.timestamp)
        .into_iter()
        .enumerate()
        .map(|(index, attempt)| SoloAttemptRow {
            position: index + 1,
            player: record_label(roster, attempt.user_id.as_deref(), attempt.name.as_deref()),
            outcome: attempt.outcome,
            elapsed: format_seconds(attempt.elapsed_seconds),
            at: to_datetime(attempt.timestamp),
        })
        .collect()
}

/// Everything the renderer draws for one loaded log
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub summary: SummaryView,
    pub players: Vec<PlayerCard>,
    pub questions: Vec<QuestionTable>,
    pub team_events: Vec<TeamEventRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_awards: Option<Vec<ShareAwardRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solo_attempts: Option<Vec<SoloAttemptRow>>,
}

impl ReportResponse {
    pub fn new(
        report: &LogReport,
        options: ViewOptions,
        loaded_at: Option<DateTime<Utc>>,
    ) -> Self {
        let summary = &report.summary;

        let share_awards = (!options.hide_share_awards && !report.share_awards.is_empty())
            .then(|| share_award_rows(&report.share_awards, &report.roster));
        let solo_attempts = (!options.hide_solo_section && !report.solo_attempts.is_empty())
            .then(|| solo_attempt_rows(&report.solo_attempts, &report.roster));

        Self {
            summary: SummaryView {
                source_name: summary.source_name.clone(),
                day: summary.day.clone(),
                meta_label: summary.meta_label(),
                player_count: summary.player_count,
                main_questions: summary.main_questions,
                money_questions: summary.money_questions,
                map_questions: summary.map_questions,
                solo_attempts: (!options.hide_solo_section).then_some(summary.solo_attempts),
                team_events: summary.team_events,
                loaded_at,
            },
            players: report
                .players
                .iter()
                .enumerate()
                .map(|(index, player)| PlayerCard::new(index + 1, player))
                .collect(),
            questions: Section::iter()
                .map(|section| QuestionTable {
                    section,
                    rows: report.questions.get(section).to_vec(),
                })
                .collect(),
            team_events: report.team_events.iter().map(TeamEventRow::from).collect(),
            share_awards,
            solo_attempts,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SectionTile {
    pub section: Section,
    #[serde(flatten)]
    pub totals: SectionTotals,
}

/// Player detail view
#[derive(Debug, Serialize)]
pub struct PlayerDetailResponse {
    #[serde(flatten)]
    pub card: PlayerCard,
    pub sections: Vec<SectionTile>,
    pub solo_wins: u32,
    pub solo_attempt_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_awards: Option<Vec<ShareAwardRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solo_attempts: Option<Vec<SoloAttemptRow>>,
}

impl PlayerDetailResponse {
    pub fn new(report: &LogReport, player: &PlayerReport, options: ViewOptions) -> Self {
        let rank = report
            .players
            .iter()
            .position(|candidate| candidate.player.id == player.player.id)
            .map_or(0, |index| index + 1);

        Self {
            card: PlayerCard::new(rank, player),
            sections: Section::iter()
                .map(|section| SectionTile {
                    section,
                    totals: player.stats.sections.get(section),
                })
                .collect(),
            solo_wins: player.stats.solo.wins,
            solo_attempt_count: player.stats.solo.attempts,
            share_awards: (!options.hide_share_awards)
                .then(|| share_award_rows(&player.share_awards, &report.roster)),
            solo_attempts: (!options.hide_solo_section)
                .then(|| solo_attempt_rows(&player.solo_attempts, &report.roster)),
        }
    }
}
