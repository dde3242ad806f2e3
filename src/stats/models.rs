use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::AddAssign;

use crate::ingest::{Player, PlayerRoster, Section, ShareAward, SoloAttempt, TeamEvent};

use super::{questions::QuestionRow, summary::LogSummary};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SectionTotals {
    pub answers: u32,
    pub corrects: u32,
    pub wrongs: u32,
}

impl AddAssign for SectionTotals {
    fn add_assign(&mut self, other: Self) {
        self.answers += other.answers;
        self.corrects += other.corrects;
        self.wrongs += other.wrongs;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SectionBreakdown {
    pub main: SectionTotals,
    pub money: SectionTotals,
    pub map: SectionTotals,
}

impl SectionBreakdown {
    pub fn get(&self, section: Section) -> SectionTotals {
        match section {
            Section::Main => self.main,
            Section::Money => self.money,
            Section::Map => self.map,
        }
    }

    pub fn get_mut(&mut self, section: Section) -> &mut SectionTotals {
        match section {
            Section::Main => &mut self.main,
            Section::Money => &mut self.money,
            Section::Map => &mut self.map,
        }
    }

    /// Field-wise sum over all three sections
    pub fn combined(&self) -> SectionTotals {
        let mut total = self.main;
        total += self.money;
        total += self.map;
        total
    }
}

/// Rounded percentage of correct answers, unknown when nothing was answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectRate {
    Percent(u32),
    Unknown,
}

impl CorrectRate {
    pub fn from_totals(totals: &SectionTotals) -> Self {
        if totals.answers == 0 {
            return CorrectRate::Unknown;
        }
        let ratio = f64::from(totals.corrects) / f64::from(totals.answers);
        CorrectRate::Percent((ratio * 100.0).round() as u32)
    }
}

impl fmt::Display for CorrectRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrectRate::Percent(percent) => write!(f, "{}%", percent),
            CorrectRate::Unknown => write!(f, "-"),
        }
    }
}

impl Serialize for CorrectRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CorrectRate::Percent(percent) => serializer.serialize_u32(*percent),
            CorrectRate::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ShareTotals {
    pub points: f64,
    pub shares: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SoloTotals {
    pub wins: u32,
    pub attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStats {
    pub player_id: String,
    pub sections: SectionBreakdown,
    pub combined: SectionTotals,
    pub correct_rate: CorrectRate,
    pub shares: ShareTotals,
    pub solo: SoloTotals,
    /// Lower bound applied to this player's answers
    pub first_answer_at: Option<f64>,
}

/// A player with derived stats and the award/attempt records attributed to them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerReport {
    pub player: Player,
    pub stats: PlayerStats,
    pub share_awards: Vec<ShareAward>,
    pub solo_attempts: Vec<SoloAttempt>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuestionTables {
    pub main: Vec<QuestionRow>,
    pub money: Vec<QuestionRow>,
    pub map: Vec<QuestionRow>,
}

impl QuestionTables {
    pub fn get(&self, section: Section) -> &[QuestionRow] {
        match section {
            Section::Main => &self.main,
            Section::Money => &self.money,
            Section::Map => &self.map,
        }
    }
}

/// Everything derived from one ingestion cycle
#[derive(Debug, Clone)]
pub struct LogReport {
    pub source_name: String,
    pub roster: PlayerRoster,
    pub summary: LogSummary,
    /// Ranked by final score, ties in roster order
    pub players: Vec<PlayerReport>,
    pub questions: QuestionTables,
    pub share_awards: Vec<ShareAward>,
    pub solo_attempts: Vec<SoloAttempt>,
    pub team_events: Vec<TeamEvent>,
}

impl LogReport {
    pub fn player(&self, id: &str) -> Option<&PlayerReport> {
        let id = id.to_lowercase();
        self.players.iter().find(|report| report.player.id == id)
    }
}
