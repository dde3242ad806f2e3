use serde::Serialize;
use std::collections::HashMap;
use strum_macros::EnumIter;

/// Question category within a log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Main,
    Money,
    Map,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Main => "main",
            Section::Money => "money",
            Section::Map => "map",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    /// Lower-cased raw key
    pub id: String,
    pub display_name: String,
    pub avatar_url: String,
    pub final_score: f64,
    pub last_seen: Option<f64>,
}

/// Players in first-insertion order, unique by canonical id.
///
/// Re-inserting an existing id overwrites the record in place so the
/// original position is kept, the same way a keyed object assignment would.
#[derive(Debug, Clone, Default)]
pub struct PlayerRoster {
    players: Vec<Player>,
    index: HashMap<String, usize>,
    names: HashMap<String, String>,
}

impl PlayerRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, player: Player) {
        if !player.display_name.is_empty() {
            self.names
                .insert(player.id.clone(), player.display_name.clone());
        }

        match self.index.get(&player.id) {
            Some(&position) => self.players[position] = player,
            None => {
                self.index.insert(player.id.clone(), self.players.len());
                self.players.push(player);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Player> {
        self.index.get(id).map(|&position| &self.players[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Display name from the id → name side table
    pub fn display_name(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Label for an id that may not belong to a full player record
    pub fn label(&self, id: Option<&str>) -> String {
        match id.filter(|id| !id.is_empty()) {
            Some(id) => self
                .display_name(id)
                .or_else(|| self.display_name(&id.to_lowercase()))
                .unwrap_or(id)
                .to_string(),
            None => UNKNOWN_PLAYER_LABEL.to_string(),
        }
    }
}

pub const UNKNOWN_PLAYER_LABEL: &str = "unknown player";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Correctness {
    Correct,
    Wrong,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub user_id: Option<String>,
    pub option_key: Option<String>,
    /// Explicit `ok` flag, when the log carries one
    pub ok: Option<bool>,
    pub relative_seconds: Option<f64>,
}

impl Answer {
    /// Explicit flag first, then the option key against the question's key.
    pub fn correctness(&self, correct_option_key: Option<&str>) -> Correctness {
        let ok = match (self.ok, correct_option_key) {
            (Some(ok), _) => Some(ok),
            (None, Some(expected)) => Some(self.option_key.as_deref() == Some(expected)),
            (None, None) => None,
        };

        match ok {
            Some(true) => Correctness::Correct,
            Some(false) => Correctness::Wrong,
            None => Correctness::Unknown,
        }
    }

    pub fn belongs_to(&self, player_id: &str) -> bool {
        self.user_id.as_deref() == Some(player_id)
    }
}

/// Pre-computed per-question marker such as the first or fastest answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerMarker {
    pub user_id: String,
    pub seconds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub qid: Option<String>,
    pub correct_option_key: Option<String>,
    pub revealed_at: Option<f64>,
    pub answers: Vec<Answer>,
    pub first_answer: Option<AnswerMarker>,
    pub fastest_correct: Option<AnswerMarker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareAward {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub points: f64,
    pub share_count: f64,
    pub timestamp: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SoloOutcome {
    Won,
    Lost,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoloAttempt {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub outcome: SoloOutcome,
    pub elapsed_seconds: Option<f64>,
    pub timestamp: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamEvent {
    /// Event type, or the raw JSON of an untyped event
    pub label: String,
    pub timestamp: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LogMeta {
    pub day: Option<String>,
    pub addon_version: Option<String>,
}

/// One fully decoded log. Replaced as a whole on every ingestion.
#[derive(Debug, Clone, Default)]
pub struct LogData {
    pub roster: PlayerRoster,
    pub main: Vec<Question>,
    pub money: Vec<Question>,
    pub map: Vec<Question>,
    /// Share awards as found in the log, duplicates included
    pub share_awards: Vec<ShareAward>,
    /// Live attempts followed by every history batch, duplicates included
    pub solo_attempts: Vec<SoloAttempt>,
    pub team_events: Vec<TeamEvent>,
    pub meta: Option<LogMeta>,
}

impl LogData {
    pub fn questions(&self, section: Section) -> &[Question] {
        match section {
            Section::Main => &self.main,
            Section::Money => &self.money,
            Section::Map => &self.map,
        }
    }
}
