use serde::{Deserialize, Serialize};

/// What the workflow hands back once the workload accepted the deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeploymentResponse {
    pub deployment_crn: String,
}
