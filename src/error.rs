//! Error types for answer ingestion, registration and moderator commands
//!
//! None of these are fatal: every rejection is checked before any state is
//! touched and is reported back to whoever issued the request.

use thiserror::Error;

/// Why a submitted answer was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("participant is not registered")]
    NotRegistered,

    #[error("no active question")]
    NoActiveQuestion,

    #[error("question already answered")]
    Duplicate,

    #[error("answer must be 1-4 or A-D")]
    InvalidFormat,

    #[error("answer is empty")]
    EmptyAnswer,
}

/// Why a name registration was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("display name is empty")]
    EmptyName,

    #[error("already registered as {0}")]
    AlreadyRegistered(String),
}

/// Why a moderator command was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("already at the first question")]
    AtFirstQuestion,

    #[error("not all participants answered ({answered}/{registered})")]
    NotAllAnswered { answered: usize, registered: usize },

    #[error("participant {0} not found")]
    UnknownParticipant(String),

    #[error("no round statistics to recompute")]
    NoStatistics,
}

impl CommandError {
    /// Stable code sent in targeted `error` events
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::AtFirstQuestion => "AT_FIRST_QUESTION",
            CommandError::NotAllAnswered { .. } => "NOT_ALL_ANSWERED",
            CommandError::UnknownParticipant(_) => "UNKNOWN_PARTICIPANT",
            CommandError::NoStatistics => "NO_STATISTICS",
        }
    }
}
