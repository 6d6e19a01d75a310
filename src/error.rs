use thiserror::Error;

/// Machine-checkable classification attached to every [`RelayError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    SizeLimit,
    Upload,
    QueueFull,
    InvalidResponse,
    Provider,
    Transport,
    Config,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::SizeLimit => "size_limit",
            ErrorKind::Upload => "upload",
            ErrorKind::QueueFull => "queue_full",
            ErrorKind::InvalidResponse => "invalid_response",
            ErrorKind::Provider => "provider",
            ErrorKind::Transport => "transport",
            ErrorKind::Config => "config",
        }
    }
}

#[derive(Debug, Error)]
pub enum RelayError {
    /// Missing or malformed image, unsupported format.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    SizeLimit(String),
    /// The provider rejected or failed the asset upload.
    #[error("{0}")]
    Upload(String),
    #[error("{0}")]
    QueueFull(String),
    /// The provider answered, but not with the payload we expected.
    #[error("{0}")]
    InvalidResponse(String),
    #[error("{0}")]
    Provider(String),
    /// No response reached us.
    #[error("{0}")]
    Transport(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RelayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::Validation(_) => ErrorKind::Validation,
            RelayError::SizeLimit(_) => ErrorKind::SizeLimit,
            RelayError::Upload(_) => ErrorKind::Upload,
            RelayError::QueueFull(_) => ErrorKind::QueueFull,
            RelayError::InvalidResponse(_) => ErrorKind::InvalidResponse,
            RelayError::Provider(_) => ErrorKind::Provider,
            RelayError::Transport(_) => ErrorKind::Transport,
            RelayError::Config(_) => ErrorKind::Config,
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_bare_message() {
        let err = RelayError::Upload("Image upload failed: TOKEN_INVALID".into());
        assert_eq!(err.to_string(), "Image upload failed: TOKEN_INVALID");
        assert_eq!(err.kind(), ErrorKind::Upload);
    }

    #[test]
    fn config_errors_are_prefixed() {
        let err = RelayError::Config("RUNNINGHUB_API_KEY is not set".into());
        assert_eq!(
            err.to_string(),
            "Configuration error: RUNNINGHUB_API_KEY is not set"
        );
        assert_eq!(err.kind().as_str(), "config");
    }
}
