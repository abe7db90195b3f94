use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::core::client::api_client::{operations, to_payload, ApiClient, IAM_SERVICE};
use crate::core::client::http_api_client::SharedCredentials;
use crate::domain::deployment::dto::identifiers::EnvironmentCrn;
use crate::errors::{DeployError, DeployResult};

/// Obtains an access token for a workload service and installs it on the
/// client that talks to that workload.
#[async_trait]
pub trait TokenProvisioner: Send + Sync {
    async fn acquire_and_install(
        &self,
        target_service: &str,
        environment: &EnvironmentCrn,
    ) -> DeployResult<()>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateWorkloadAuthTokenRequest<'a> {
    workload_name: String,
    environment_crn: &'a str,
}

/// Exchanges the control-plane identity for a workload token through IAM.
pub struct WorkloadTokenProvisioner {
    iam: Arc<dyn ApiClient>,
    workload_credentials: SharedCredentials,
}

impl WorkloadTokenProvisioner {
    pub fn new(iam: Arc<dyn ApiClient>, workload_credentials: SharedCredentials) -> Self {
        Self {
            iam,
            workload_credentials,
        }
    }
}

#[async_trait]
impl TokenProvisioner for WorkloadTokenProvisioner {
    async fn acquire_and_install(
        &self,
        target_service: &str,
        environment: &EnvironmentCrn,
    ) -> DeployResult<()> {
        let operation = operations::GENERATE_WORKLOAD_AUTH_TOKEN;
        let body = GenerateWorkloadAuthTokenRequest {
            workload_name: target_service.to_uppercase(),
            environment_crn: environment.as_str(),
        };
        let resp = self
            .iam
            .call(operation, to_payload(IAM_SERVICE, operation, &body)?)
            .await?;

        let token = resp
            .str_at("/token")
            .ok_or_else(|| DeployError::Token(format!("{} returned no token", operation)))?
            .to_string();
        let endpoint = resp.str_at("/endpointUrl").map(str::to_string);

        let mut creds = self.workload_credentials.write().await;
        creds.token = Some(token);
        if let Some(url) = endpoint {
            debug!(endpoint = %url, "Using workload endpoint from token response");
            creds.endpoint = Some(url);
        }

        debug!(workload = %target_service, environment = %environment, "Installed workload access token");
        Ok(())
    }
}
