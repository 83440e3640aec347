use thiserror::Error;

/// Error types for speakercheck data operations.
/// The web layer maps each variant onto an HTTP status; the message is shown to users verbatim.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("{kind} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid program date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid program time '{0}'. Expected HH:MM")]
    InvalidTime(String),

    #[error("Program date {0} is in the past")]
    DateInPast(chrono::NaiveDate),

    #[error("Speaker is already {from}")]
    InvalidTransition { from: String, to: String },

    #[error("Availability record is incomplete: {0}")]
    IncompleteAvailability(&'static str),

    #[error("Speaker was modified by someone else (expected version {expected}, found {actual})")]
    VersionConflict { expected: i64, actual: i64 },

    #[error("Cannot delete page: it still has {0} speaker(s)")]
    PageNotEmpty(i64),

    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not authorized")]
    Unauthenticated,

    #[error("Admin access required to {0}")]
    Forbidden(String),

    #[error("Invalid role '{0}'. Valid values: admin, user")]
    InvalidRole(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
}

impl DataError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        DataError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_not_empty_message_is_user_facing() {
        let err = DataError::PageNotEmpty(3);
        assert_eq!(
            err.to_string(),
            "Cannot delete page: it still has 3 speaker(s)"
        );
    }

    #[test]
    fn test_not_found_names_kind() {
        let err = DataError::not_found("Speaker", "abc");
        assert_eq!(err.to_string(), "Speaker not found");
    }
}
