use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed message: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("Message too large: {len} bytes (max: {max} bytes)")]
    FrameTooLarge { len: usize, max: usize },

    #[error("Lock poisoned")]
    LockPoisoned,

    #[error("Lock screen host is not running")]
    HostUnavailable,

    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),

    #[error("UI channel error: {0}")]
    Ui(String),
}

// For Tauri command returns - converts AppError to String
impl From<AppError> for String {
    fn from(e: AppError) -> Self {
        e.to_string()
    }
}

impl AppError {
    /// Stable machine-readable code reported in bridge error responses
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput { .. } => "invalid_input",
            AppError::Database(_) => "database",
            AppError::Io(_) => "io",
            AppError::Protocol(_) => "protocol",
            AppError::FrameTooLarge { .. } => "frame_too_large",
            AppError::LockPoisoned => "lock_poisoned",
            AppError::HostUnavailable => "host_unavailable",
            AppError::Unsupported(_) => "unsupported",
            AppError::Ui(_) => "ui",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_converts_to_display_string() {
        let err = AppError::InvalidInput {
            field: "package",
            reason: "must not be empty".into(),
        };
        let message: String = err.into();
        assert_eq!(message, "Invalid package: must not be empty");
    }

    #[test]
    fn test_frame_too_large_message_and_code() {
        let err = AppError::FrameTooLarge { len: 10, max: 4 };
        assert_eq!(err.code(), "frame_too_large");
        assert_eq!(err.to_string(), "Message too large: 10 bytes (max: 4 bytes)");
    }
}
