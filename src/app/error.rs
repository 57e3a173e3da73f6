use std::fmt;

use super::commit::{CommitError, SchemaCoordinate};

/// Lifecycle of an edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Created,
    Editing,
    Committed,
    Discarded,
}

impl SessionPhase {
    pub fn is_closed(self) -> bool {
        matches!(self, SessionPhase::Committed | SessionPhase::Discarded)
    }
}

/// A condition that keeps the save action disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveBlocker {
    MissingId,
    InvalidConcept,
    MissingConcept,
    DuplicateId(String),
    MissingRendering,
}

impl fmt::Display for SaveBlocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveBlocker::MissingId => write!(f, "question id is required"),
            SaveBlocker::InvalidConcept => write!(f, "bound concept could not be verified"),
            SaveBlocker::MissingConcept => write!(f, "obs questions need a concept"),
            SaveBlocker::DuplicateId(id) => write!(f, "question id '{id}' is already in use"),
            SaveBlocker::MissingRendering => write!(f, "a rendering type must be selected"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    SessionClosed(SessionPhase),
    SaveBlocked(Vec<SaveBlocker>),
    QuestionNotFound(SchemaCoordinate),
    Commit(CommitError),
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorError::SessionClosed(phase) => {
                write!(f, "edit session is closed ({phase:?})")
            }
            EditorError::SaveBlocked(blockers) => {
                write!(f, "question cannot be saved: ")?;
                let reasons: Vec<String> = blockers.iter().map(ToString::to_string).collect();
                write!(f, "{}", reasons.join("; "))
            }
            EditorError::QuestionNotFound(coordinate) => {
                write!(f, "no question at {coordinate}")
            }
            EditorError::Commit(err) => write!(f, "failed to save question: {err}"),
        }
    }
}

impl std::error::Error for EditorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EditorError::Commit(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CommitError> for EditorError {
    fn from(err: CommitError) -> Self {
        EditorError::Commit(err)
    }
}
