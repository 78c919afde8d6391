use crate::domain::model::GroupId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SelectorError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned HTTP {status}: {body}")]
    HttpStatusError { status: u16, body: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Inconsistent page for group {group} at offset {offset}: {message}")]
    InconsistentPageError {
        group: GroupId,
        offset: usize,
        message: String,
    },

    #[error("A save is already in flight for group {group}")]
    SaveInFlight { group: GroupId },

    #[error("Group {group} has {pending} unsaved change(s)")]
    UnsavedChanges { group: GroupId, pending: usize },

    #[error("Cannot {action} while editor is {state}")]
    InvalidTransition { action: String, state: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    Editor,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SelectorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) | Self::HttpStatusError { .. } => ErrorCategory::Network,
            Self::CsvError(_) | Self::SerializationError(_) | Self::InconsistentPageError { .. } => {
                ErrorCategory::Data
            }
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::SaveInFlight { .. } | Self::UnsavedChanges { .. } | Self::InvalidTransition { .. } => {
                ErrorCategory::Editor
            }
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Editor => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Whether a user-initiated retry of the same operation can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::Data
        ) && !matches!(self, Self::CsvError(_))
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError(_) => "Could not reach the units API".to_string(),
            Self::HttpStatusError { status, .. } => {
                format!("The units API rejected the request (HTTP {})", status)
            }
            Self::InconsistentPageError { group, .. } => {
                format!("Units for group {} changed while loading", group)
            }
            Self::SaveInFlight { .. } => "A save is already running".to_string(),
            Self::UnsavedChanges { pending, .. } => {
                format!("There are {} unsaved change(s)", pending)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the API base URL and token, then retry",
            ErrorCategory::Data => "Reload the group and try again",
            ErrorCategory::Configuration => "Fix the configuration file or command line flags",
            ErrorCategory::Editor => "Wait for the current operation or confirm discarding changes",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, SelectorError>;
