use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::errors::{DeployError, DeployResult};

pub const DF_SERVICE: &str = "df";
pub const DF_WORKLOAD_SERVICE: &str = "dfworkload";
pub const IAM_SERVICE: &str = "iam";

/// Remote operation names, grouped by owning service.
pub mod operations {
    pub const INITIATE_DEPLOYMENT: &str = "initiateDeployment";
    pub const LIST_DEPLOYABLE_SERVICES: &str = "listDeployableServicesForNewDeployments";

    pub const GET_DEPLOYMENT_REQUEST_DETAILS: &str = "getDeploymentRequestDetails";
    pub const UPLOAD_ASSET: &str = "uploadAsset";
    pub const CREATE_CUSTOM_NAR_CONFIGURATION: &str = "createCustomNarConfiguration";
    pub const GET_DEFAULT_CUSTOM_NAR_CONFIGURATION: &str = "getDefaultCustomNarConfiguration";
    pub const UPDATE_CUSTOM_NAR_CONFIGURATION: &str = "updateCustomNarConfiguration";
    pub const DELETE_CUSTOM_NAR_CONFIGURATION: &str = "deleteCustomNarConfiguration";
    pub const CREATE_DEPLOYMENT: &str = "createDeployment";
    pub const ABORT_DEPLOYMENT_REQUEST: &str = "abortDeploymentRequest";

    pub const GENERATE_WORKLOAD_AUTH_TOKEN: &str = "generateWorkloadAuthToken";
}

/// Transport details of a completed call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
    pub status: u16,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub metadata: ResponseMetadata,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            metadata: ResponseMetadata {
                status: 200,
                request_id: None,
            },
            body,
        }
    }

    /// String at a JSON pointer (`/deployment/crn`), if present.
    pub fn str_at(&self, pointer: &str) -> Option<&str> {
        self.body.pointer(pointer).and_then(Value::as_str)
    }
}

/// Metadata that accompanies an uploaded asset file. `file_path` is already
/// expanded and `size` is its length on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetUpload {
    pub deployment_name: String,
    pub deployment_request_crn: String,
    pub parameter_group: String,
    pub parameter_name: String,
    pub file_path: PathBuf,
    pub size: u64,
}

/// Client for one remote service.
///
/// Implementations own transport, authentication and retries; failures come
/// back as [`DeployError::Remote`] carrying the HTTP status when one exists.
#[async_trait]
pub trait ApiClient: Send + Sync {
    fn service_name(&self) -> &str;

    async fn call(&self, operation: &str, payload: Value) -> DeployResult<ApiResponse>;

    async fn upload_asset(&self, upload: &AssetUpload) -> DeployResult<ApiResponse>;
}

/// Serializes a typed request body for [`ApiClient::call`].
pub fn to_payload<T: Serialize>(service: &str, operation: &str, body: &T) -> DeployResult<Value> {
    serde_json::to_value(body).map_err(|e| {
        DeployError::unexpected(service, operation, format!("failed to encode request: {}", e))
    })
}
