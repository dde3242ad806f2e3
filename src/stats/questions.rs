use serde::Serialize;

use crate::ingest::{AnswerMarker, PlayerRoster, Question};

/// One row of a section's question table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionRow {
    /// 1-based
    pub position: usize,
    pub qid: Option<String>,
    pub correct_option_key: Option<String>,
    pub answer_count: usize,
    pub correct_count: usize,
    pub first_answer: Option<String>,
    pub fastest_correct: Option<String>,
}

/// Answers flagged correct, or whose key matches the question's correct key
fn correct_count(question: &Question) -> usize {
    let expected = question.correct_option_key.as_deref();
    question
        .answers
        .iter()
        .filter(|answer| {
            answer.ok == Some(true)
                || (expected.is_some() && answer.option_key.as_deref() == expected)
        })
        .count()
}

pub fn format_seconds(seconds: Option<f64>) -> String {
    match seconds {
        Some(seconds) if seconds.is_finite() => format!("{:.3} s", seconds),
        _ => "-".to_string(),
    }
}

fn marker_label(marker: Option<&AnswerMarker>, roster: &PlayerRoster) -> Option<String> {
    marker.map(|marker| {
        format!(
            "{} ({})",
            roster.label(Some(&marker.user_id)),
            format_seconds(marker.seconds)
        )
    })
}

pub fn build_question_rows(questions: &[Question], roster: &PlayerRoster) -> Vec<QuestionRow> {
    questions
        .iter()
        .enumerate()
        .map(|(index, question)| QuestionRow {
            position: index + 1,
            qid: question.qid.clone(),
            correct_option_key: question.correct_option_key.clone(),
            answer_count: question.answers.len(),
            correct_count: correct_count(question),
            first_answer: marker_label(question.first_answer.as_ref(), roster),
            fastest_correct: marker_label(question.fastest_correct.as_ref(), roster),
        })
        .collect()
}
