use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error("A session needs at least one player")]
    EmptySession,

    #[error("Player {0} appears more than once in the session")]
    DuplicatePlayer(String),

    #[error("Field '{0}' is not part of the score template")]
    UnknownField(String),

    #[error("Invalid score template: {0}")]
    InvalidTemplate(String),

    #[error("Score details for player {0} require a score template")]
    MissingTemplate(String),

    #[error("Score total is out of range")]
    ScoreOverflow,
}
