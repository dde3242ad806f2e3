use thiserror::Error;

/// Reasons a raw log is rejected as a whole
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Log is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Log is not a JSON object")]
    NotAnObject,

    #[error("Log has no players object")]
    MissingPlayers,

    #[error("Log has no mainGame.questions list")]
    MissingMainQuestions,
}
