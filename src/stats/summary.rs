use serde::Serialize;

use crate::ingest::{LogData, SoloAttempt};

/// Top-level counts for the overview cards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogSummary {
    pub source_name: String,
    pub day: Option<String>,
    pub player_count: usize,
    pub main_questions: usize,
    pub money_questions: usize,
    pub map_questions: usize,
    pub solo_attempts: usize,
    pub team_events: usize,
    pub has_meta: bool,
    pub addon_version: Option<String>,
}

impl LogSummary {
    /// `solo_attempts` is the deduplicated attempt list
    pub fn build(data: &LogData, solo_attempts: &[SoloAttempt], source_name: &str) -> Self {
        let meta = data.meta.as_ref();

        Self {
            source_name: source_name.to_string(),
            day: meta.and_then(|meta| meta.day.clone()),
            player_count: data.roster.len(),
            main_questions: data.main.len(),
            money_questions: data.money.len(),
            map_questions: data.map.len(),
            solo_attempts: solo_attempts.len(),
            team_events: data.team_events.len(),
            has_meta: meta.is_some(),
            addon_version: meta.and_then(|meta| meta.addon_version.clone()),
        }
    }

    /// Addon version when the log names one, otherwise a plain snapshot
    pub fn meta_label(&self) -> String {
        match &self.addon_version {
            Some(version) => format!("Addon v{}", version),
            None => "Snapshot".to_string(),
        }
    }
}
