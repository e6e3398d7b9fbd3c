//! Error types for tutor operations.
//!
//! Every variant is a user-correctable condition meant to be shown as-is.

use crate::model::{EnrollmentId, LanguageId, UserId};
use thiserror::Error;

/// Errors from store and tutor operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TutorError {
    #[error("This email is already registered: {0}")]
    DuplicateEmail(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("No words to add after removing blanks and duplicates")]
    EmptyInput,

    #[error("None of the selected words are available for this story")]
    NoSelection,

    #[error("No vocabulary matches the current filter")]
    EmptyPool,

    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    #[error("Unknown language: {0}")]
    UnknownLanguage(LanguageId),

    #[error("Enrollment {0} not found for this user")]
    EnrollmentNotFound(EnrollmentId),
}

pub type Result<T> = std::result::Result<T, TutorError>;
