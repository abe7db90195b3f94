use std::path::PathBuf;

use thiserror::Error;

/// HTTP status the workload service returns when a resource already exists.
pub const CONFLICT_STATUS: u16 = 409;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("Environment CRN not found for Service CRN [{service_crn}]")]
    Resolution { service_crn: String },

    #[error("The file size exceeds the {} MB limit, file: [{}] ({size} bytes)", .limit / (1024 * 1024), .path.display())]
    AssetTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("{service}.{operation} failed{}: {message}", .status.map(|s| format!(" with status {}", s)).unwrap_or_default())]
    Remote {
        service: String,
        operation: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Unexpected response from {service}.{operation}: {message}")]
    UnexpectedResponse {
        service: String,
        operation: String,
        message: String,
    },

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Workload token error: {0}")]
    Token(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error on [{}]: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DeployError {
    pub fn remote(
        service: impl Into<String>,
        operation: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        DeployError::Remote {
            service: service.into(),
            operation: operation.into(),
            status,
            message: message.into(),
        }
    }

    pub fn unexpected(
        service: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        DeployError::UnexpectedResponse {
            service: service.into(),
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DeployError::Io {
            path: path.into(),
            source,
        }
    }

    /// Status code of a failed remote call, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            DeployError::Remote { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(CONFLICT_STATUS)
    }
}

impl From<validator::ValidationErrors> for DeployError {
    fn from(err: validator::ValidationErrors) -> Self {
        DeployError::Validation(err.to_string())
    }
}

pub type DeployResult<T> = Result<T, DeployError>;
