use serde::Serialize;
use thiserror::Error;

/// Everything that can go wrong while mutating the slot collection.
///
/// Validation errors reject bad input, conflict errors report a record that
/// is already there, and not-found covers a slot that vanished between read
/// and mutation. None of these are fatal; every one maps to a message the
/// page shows as a transient notification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlotError {
    #[error("End time must be after start time")]
    InvalidRange,

    #[error("Choose a date")]
    MissingDate,

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time")]
    InvalidTime,

    #[error("Name is required")]
    EmptyName,

    #[error("This time slot already exists")]
    SlotExists,

    #[error("Already signed up")]
    AlreadySignedUp,

    #[error("Time slot not found")]
    SlotNotFound,
}

pub type Result<T> = std::result::Result<T, SlotError>;

/// JSON body returned by every mutating endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
}

impl ActionOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
