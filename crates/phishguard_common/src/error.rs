//! Error types for PhishGuard.

use thiserror::Error;

/// Core error taxonomy. Every fallible operation in the training core
/// resolves to one of these four classes.
#[derive(Error, Debug)]
pub enum GuardError {
    /// A referenced trainee, simulation, campaign, or department is missing.
    #[error("{0} not found")]
    NotFound(String),

    /// Malformed or out-of-range input. Terminal for the triggering call.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The content generator or audio synthesis call failed. The message is
    /// already sanitized; raw provider text never reaches this variant.
    #[error("content generation failed: {0}")]
    UpstreamGeneration(String),

    /// Constraint violation or I/O failure in the persistence layer.
    #[error("store error: {0}")]
    Store(String),
}

impl GuardError {
    /// HTTP status the daemon maps this error to.
    pub fn http_status(&self) -> u16 {
        match self {
            GuardError::NotFound(_) => 404,
            GuardError::Validation(_) => 400,
            GuardError::UpstreamGeneration(_) => 502,
            GuardError::Store(_) => 500,
        }
    }
}

impl From<rusqlite::Error> for GuardError {
    fn from(e: rusqlite::Error) -> Self {
        GuardError::Store(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(GuardError::NotFound("trainee 3".into()).http_status(), 404);
        assert_eq!(GuardError::Validation("score".into()).http_status(), 400);
        assert_eq!(
            GuardError::UpstreamGeneration("timeout".into()).http_status(),
            502
        );
        assert_eq!(GuardError::Store("locked".into()).http_status(), 500);
    }

    #[test]
    fn test_messages_are_short_and_sanitized() {
        let e = GuardError::NotFound("campaign 12".into());
        assert_eq!(e.to_string(), "campaign 12 not found");
    }
}
