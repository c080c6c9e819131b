use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutoGitError {
    #[error("Unsupported archive format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Failed to extract archive: {message}")]
    Extraction { message: String },

    #[error("Git operation failed: {message}")]
    VersionControl {
        message: String,
        #[source]
        source: git2::Error,
    },

    /// Displays exactly the platform-provided message so that a failed job
    /// reports what the hosting service said.
    #[error("{message}")]
    RemoteApi { status: Option<u16>, message: String },

    #[error("{message}")]
    InvalidInput { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Settings store error: {message}")]
    Settings { message: String },

    #[error("Upload worker failed: {message}")]
    Worker { message: String },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a failure, carried by failed upload outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    InvalidInput,
    UnsupportedFormat,
    Extraction,
    VersionControl,
    RemoteApi,
    Config,
    Other,
}

impl ErrorCategory {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorCategory::Other => 1,
            ErrorCategory::InvalidInput => 2,
            ErrorCategory::UnsupportedFormat => 3,
            ErrorCategory::Extraction => 4,
            ErrorCategory::VersionControl => 5,
            ErrorCategory::RemoteApi => 6,
            ErrorCategory::Config => 7,
        }
    }
}

impl AutoGitError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AutoGitError::UnsupportedFormat { .. } => ErrorCategory::UnsupportedFormat,
            AutoGitError::Extraction { .. } => ErrorCategory::Extraction,
            AutoGitError::VersionControl { .. } => ErrorCategory::VersionControl,
            AutoGitError::RemoteApi { .. } => ErrorCategory::RemoteApi,
            AutoGitError::InvalidInput { .. } => ErrorCategory::InvalidInput,
            AutoGitError::Config { .. } | AutoGitError::Settings { .. } => ErrorCategory::Config,
            AutoGitError::Worker { .. } | AutoGitError::Io(_) => ErrorCategory::Other,
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for AutoGitError {
    fn user_message(&self) -> String {
        match self {
            AutoGitError::RemoteApi {
                status: Some(status),
                message,
            } => {
                format!("GitHub rejected the request (HTTP {}): {}", status, message)
            }
            AutoGitError::RemoteApi { status: None, message } => {
                format!("Could not reach GitHub: {}", message)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            AutoGitError::UnsupportedFormat { .. } => Some(
                "Supported archives are .zip, .tar, .gz and .tgz files.".to_string()
            ),
            AutoGitError::Extraction { .. } => Some(
                "The archive may be corrupt or truncated. Try re-creating it and run again.".to_string()
            ),
            AutoGitError::VersionControl { .. } => Some(
                "Check that the token has the 'repo' scope and that the remote accepts pushes.".to_string()
            ),
            AutoGitError::RemoteApi { status: Some(401), .. } => Some(
                "The token was rejected. Create a new personal access token and pass it with --token or GITHUB_TOKEN.".to_string()
            ),
            AutoGitError::RemoteApi { status: Some(422), .. } => Some(
                "A repository with this name may already exist. Choose another name with --name.".to_string()
            ),
            AutoGitError::RemoteApi { status: None, .. } => Some(
                "Check your internet connection and try again.".to_string()
            ),
            AutoGitError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<git2::Error> for AutoGitError {
    fn from(error: git2::Error) -> Self {
        AutoGitError::VersionControl {
            message: error.message().to_string(),
            source: error,
        }
    }
}

impl From<zip::result::ZipError> for AutoGitError {
    fn from(error: zip::result::ZipError) -> Self {
        AutoGitError::Extraction {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AutoGitError>;
