use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Unexpected response status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rejected input, caught before any mutation.
    Validation,
    NotFound,
    /// Backing store unreachable or answered with something unexpected.
    Transport,
    Configuration,
}

impl RegistryError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. } => ErrorCategory::Validation,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::ConfigError { .. } | Self::UrlError(_) => ErrorCategory::Configuration,
            Self::ApiError(_)
            | Self::UnexpectedStatus { .. }
            | Self::IoError(_)
            | Self::SerializationError(_) => ErrorCategory::Transport,
        }
    }

    /// Expected outcomes of a request, as opposed to infrastructure failures.
    pub fn is_business(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Validation | ErrorCategory::NotFound
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ValidationError { field, message } => format!("{}: {}", field, message),
            Self::NotFound { entity, .. } => format!("{} not found", entity),
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::UrlError(e) => format!("The service URL is invalid: {}", e),
            Self::ApiError(e) if e.is_timeout() => {
                "The registry service did not answer in time".to_string()
            }
            Self::ApiError(e) if e.is_connect() => {
                "Could not connect to the registry service".to_string()
            }
            Self::ApiError(_) | Self::UnexpectedStatus { .. } => {
                "The registry service returned an unexpected response".to_string()
            }
            Self::SerializationError(_) => {
                "The registry service sent data in an unexpected shape".to_string()
            }
            Self::IoError(e) => format!("File system error: {}", e),
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_errors_are_distinct_from_transport() {
        let invalid = RegistryError::validation("name", "Client name is required");
        assert_eq!(invalid.category(), ErrorCategory::Validation);
        assert!(invalid.is_business());
        assert_eq!(
            invalid.user_friendly_message(),
            "name: Client name is required"
        );

        let status = RegistryError::UnexpectedStatus {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(status.category(), ErrorCategory::Transport);
        assert!(!status.is_business());
    }

    #[test]
    fn test_not_found_message_names_entity() {
        let err = RegistryError::NotFound {
            entity: "Program".to_string(),
            id: "42".to_string(),
        };
        assert_eq!(err.to_string(), "Program not found: 42");
        assert_eq!(err.user_friendly_message(), "Program not found");
    }
}
