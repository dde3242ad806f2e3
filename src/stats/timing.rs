use std::collections::HashMap;
use strum::IntoEnumIterator;

use crate::ingest::{Answer, LogData, Question, Section};

/// Absolute answer time in milliseconds: reveal time plus the non-negative
/// relative offset. Zero counts as unset.
pub fn answer_timestamp(question: &Question, answer: &Answer) -> Option<f64> {
    let base = question.revealed_at.unwrap_or(0.0);
    let resolved = match answer.relative_seconds {
        Some(seconds) if seconds.is_finite() => base + (seconds * 1000.0).max(0.0),
        _ => base,
    };

    (resolved != 0.0).then_some(resolved)
}

/// Earliest resolved answer time per user id across every section.
///
/// Built once per ingestion cycle; lookups afterwards are map reads.
#[derive(Debug, Clone, Default)]
pub struct FirstAnswerIndex {
    first: HashMap<String, f64>,
}

impl FirstAnswerIndex {
    pub fn build(data: &LogData) -> Self {
        let mut first: HashMap<String, f64> = HashMap::new();

        for section in Section::iter() {
            for question in data.questions(section) {
                for answer in &question.answers {
                    let (Some(user_id), Some(at)) =
                        (answer.user_id.as_ref(), answer_timestamp(question, answer))
                    else {
                        continue;
                    };

                    first
                        .entry(user_id.clone())
                        .and_modify(|earliest| *earliest = earliest.min(at))
                        .or_insert(at);
                }
            }
        }

        Self { first }
    }

    pub fn first_answer_at(&self, user_id: &str) -> Option<f64> {
        self.first.get(user_id).copied()
    }
}
