//! Error types for the profiling session

use thiserror::Error;

/// Errors raised when a datapoint or configuration value is malformed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("Datapoint for {location} was delivered before its end timestamp was set")]
    IncompleteDatapoint { location: String },

    #[error("Datapoint for {location} ends before it starts")]
    NegativeElapsed { location: String },

    #[error("Invalid profile configuration: {0}")]
    Config(String),
}

/// Result type for profiling operations
pub type Result<T> = std::result::Result<T, ProfileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_location() {
        let err = ProfileError::IncompleteDatapoint {
            location: "a.script:10".to_string(),
        };
        assert!(err.to_string().contains("a.script:10"));

        let err = ProfileError::NegativeElapsed {
            location: "b.script:3".to_string(),
        };
        assert!(err.to_string().contains("ends before it starts"));
    }

    #[test]
    fn test_config_error_message() {
        let err = ProfileError::Config("SCRIPTPROF_ENABLED=maybe".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid profile configuration: SCRIPTPROF_ENABLED=maybe"
        );
    }
}
