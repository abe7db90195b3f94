use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::core::client::api_client::{operations, ApiClient};
use crate::domain::deployment::dto::identifiers::EnvironmentCrn;
use crate::errors::{DeployError, DeployResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeployableServicesResponse {
    #[serde(default)]
    services: Vec<DeployableService>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeployableService {
    crn: Option<String>,
    environment_crn: Option<String>,
}

/// Finds the environment that owns `service_crn` in the deployable-services listing.
pub async fn resolve_environment(df: &dyn ApiClient, service_crn: &str) -> DeployResult<EnvironmentCrn> {
    let operation = operations::LIST_DEPLOYABLE_SERVICES;
    let resp = df.call(operation, json!({})).await?;

    let listing: DeployableServicesResponse = serde_json::from_value(resp.body)
        .map_err(|e| DeployError::unexpected(df.service_name(), operation, e.to_string()))?;

    let environment = listing
        .services
        .into_iter()
        .find(|s| s.crn.as_deref() == Some(service_crn))
        .and_then(|s| s.environment_crn)
        .ok_or_else(|| DeployError::Resolution {
            service_crn: service_crn.to_string(),
        })?;

    debug!(environment_crn = %environment, "Found Environment CRN");
    Ok(EnvironmentCrn::new(environment))
}
