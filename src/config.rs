use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{DeployError, DeployResult};

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Runtime settings read from `DFDEPLOY_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub df_endpoint: String,
    pub iam_endpoint: String,
    /// Usually left unset; the token provisioner installs the workload endpoint.
    pub dfworkload_endpoint: Option<String>,
    pub access_token: Option<String>,
    pub timeout: Duration,
    pub request_file: Option<PathBuf>,
    pub log_filter: String,
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Loads `.env` when present, then reads the process environment.
    pub fn from_env() -> DeployResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> DeployResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| {
            var(key).ok_or_else(|| DeployError::Config(format!("Missing required variable {}", key)))
        };

        let timeout_secs = match var("DFDEPLOY_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                DeployError::Config(format!("DFDEPLOY_TIMEOUT_SECS is not a number: {}", raw))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            df_endpoint: required("DFDEPLOY_DF_ENDPOINT")?,
            iam_endpoint: required("DFDEPLOY_IAM_ENDPOINT")?,
            dfworkload_endpoint: var("DFDEPLOY_DFWORKLOAD_ENDPOINT"),
            access_token: var("DFDEPLOY_ACCESS_TOKEN"),
            timeout: Duration::from_secs(timeout_secs),
            request_file: var("DFDEPLOY_REQUEST_FILE").map(PathBuf::from),
            log_filter: var("DFDEPLOY_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            log_dir: var("DFDEPLOY_LOG_DIR").map(PathBuf::from),
        })
    }
}
