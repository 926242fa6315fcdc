//! Error types for refactoring flows.
//!
//! A flow that shows the user a message also returns the matching error so
//! callers can tell what happened. Picker dismissal is not an error; it is
//! reported as [`Outcome::Cancelled`](crate::model::Outcome::Cancelled).

/// Message shown when a multi-file move spans several directories
pub const DIFFERENT_DIRECTORIES_MESSAGE: &str =
    "Moving files of different directories are not supported. Please make sure they are from the same directory.";

#[derive(Debug, thiserror::Error)]
pub enum RefactorError {
    /// The files selected for a move do not share a parent directory
    #[error("{}", DIFFERENT_DIRECTORIES_MESSAGE)]
    DifferentDirectories,
    /// The server offered no destination for a move
    #[error("{0}")]
    NoDestinations(String),
    /// The server answered with an explicit error message
    #[error("{0}")]
    Server(String),
    /// An edit refactoring was requested without an editor to take formatting options from
    #[error("No active editor")]
    NoActiveEditor,
    #[error("Unsupported refactoring: {0}")]
    UnsupportedRefactoring(String),
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    /// The request to the language server failed
    #[error("Language server request failed: {0:#}")]
    Transport(anyhow::Error),
    /// The host editor failed to carry out an operation
    #[error("Editor operation failed: {0:#}")]
    Editor(anyhow::Error),
}

impl RefactorError {
    /// Whether the user has already been shown a message for this error
    pub fn is_reported(&self) -> bool {
        matches!(
            self,
            RefactorError::DifferentDirectories | RefactorError::NoDestinations(_) | RefactorError::Server(_)
        )
    }
}

impl From<serde_json::Error> for RefactorError {
    fn from(err: serde_json::Error) -> Self {
        RefactorError::InvalidArguments(err.to_string())
    }
}
