use serde_json::json;
use tracing::{debug, info, warn};

use crate::core::client::api_client::{operations, to_payload, ApiClient, ApiResponse};
use crate::domain::deployment::dto::identifiers::EnvironmentCrn;
use crate::domain::deployment::dto::nar_configuration::{
    CommittedNarConfiguration, CustomNarConfigurationRequest, NarConfigurationPayload,
    NarConfigurationResource, NarOrigin,
};
use crate::errors::{DeployError, DeployResult};

/// Creates the environment's custom NAR configuration, or adopts the existing
/// default one when the workload reports a conflict. An environment holds at
/// most one custom NAR configuration.
pub async fn ensure_nar_configuration(
    workload: &dyn ApiClient,
    environment: &EnvironmentCrn,
    requested: Option<&CustomNarConfigurationRequest>,
) -> DeployResult<Option<CommittedNarConfiguration>> {
    let Some(requested) = requested else {
        return Ok(None);
    };

    let operation = operations::CREATE_CUSTOM_NAR_CONFIGURATION;
    let payload = NarConfigurationPayload::for_create(requested, environment.as_str());
    let created = workload
        .call(operation, to_payload(workload.service_name(), operation, &payload)?)
        .await;

    match created {
        Ok(resp) => {
            let committed = created_from(workload, environment, operation, resp).await?;
            debug!(crn = %committed.crn, "Created Custom NAR Configuration");
            Ok(Some(committed))
        }
        Err(err) if err.is_conflict() => {
            info!(environment = %environment, "Custom NAR Configuration exists; adopting the default");
            adopt_default(workload, environment, requested).await.map(Some)
        }
        Err(err) => Err(err),
    }
}

async fn adopt_default(
    workload: &dyn ApiClient,
    environment: &EnvironmentCrn,
    requested: &CustomNarConfigurationRequest,
) -> DeployResult<CommittedNarConfiguration> {
    let (crn, version) = fetch_default(workload, environment).await?;

    let update_op = operations::UPDATE_CUSTOM_NAR_CONFIGURATION;
    let payload = NarConfigurationPayload::for_update(requested, environment.as_str(), &crn, version);
    workload
        .call(update_op, to_payload(workload.service_name(), update_op, &payload)?)
        .await?;

    debug!(crn = %crn, "Updated Custom NAR Configuration");
    Ok(CommittedNarConfiguration {
        crn,
        configuration_version: version,
        origin: NarOrigin::AdoptedDefault,
    })
}

/// CRN and version of the environment's default configuration.
async fn fetch_default(workload: &dyn ApiClient, environment: &EnvironmentCrn) -> DeployResult<(String, i64)> {
    let operation = operations::GET_DEFAULT_CUSTOM_NAR_CONFIGURATION;
    let resp = workload
        .call(operation, json!({ "environmentCrn": environment.as_str() }))
        .await?;
    let default = parse_resource(workload, operation, resp)?;
    let crn = default
        .crn
        .ok_or_else(|| DeployError::unexpected(workload.service_name(), operation, "default configuration has no crn"))?;
    Ok((crn, default.configuration_version.unwrap_or_default()))
}

fn parse_resource(
    workload: &dyn ApiClient,
    operation: &str,
    resp: ApiResponse,
) -> DeployResult<NarConfigurationResource> {
    if resp.body.is_null() {
        return Ok(NarConfigurationResource::default());
    }
    serde_json::from_value(resp.body)
        .map_err(|e| DeployError::unexpected(workload.service_name(), operation, e.to_string()))
}

/// A created configuration is the environment's only one, so a response
/// without a crn is resolved through the default lookup.
async fn created_from(
    workload: &dyn ApiClient,
    environment: &EnvironmentCrn,
    operation: &str,
    resp: ApiResponse,
) -> DeployResult<CommittedNarConfiguration> {
    let resource = parse_resource(workload, operation, resp)?;
    let (crn, configuration_version) = match resource.crn {
        Some(crn) => (crn, resource.configuration_version.unwrap_or_default()),
        None => {
            warn!(operation, "Response has no crn; looking up the created configuration");
            fetch_default(workload, environment).await?
        }
    };
    Ok(CommittedNarConfiguration {
        crn,
        configuration_version,
        origin: NarOrigin::Created,
    })
}
