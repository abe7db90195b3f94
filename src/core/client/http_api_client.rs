use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client, RequestBuilder, Response};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::core::client::api_client::{operations, ApiClient, ApiResponse, AssetUpload, ResponseMetadata};
use crate::errors::{DeployError, DeployResult};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Endpoint and bearer token a client sends its calls with.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub endpoint: Option<String>,
    pub token: Option<String>,
}

pub type SharedCredentials = Arc<RwLock<Credentials>>;

pub fn shared_credentials(endpoint: Option<String>, token: Option<String>) -> SharedCredentials {
    Arc::new(RwLock::new(Credentials { endpoint, token }))
}

/// JSON-over-HTTP client: `POST {endpoint}/api/v1/{service}/{operation}`.
pub struct HttpApiClient {
    client: Client,
    service: String,
    credentials: SharedCredentials,
}

impl HttpApiClient {
    pub fn new(client: Client, service: impl Into<String>, credentials: SharedCredentials) -> Self {
        Self {
            client,
            service: service.into(),
            credentials,
        }
    }

    pub fn build_http_client(timeout: Duration) -> DeployResult<Client> {
        Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeployError::Config(format!("Failed to build HTTP client: {}", e)))
    }

    /// Slot the token provisioner writes workload credentials into.
    pub fn credentials(&self) -> SharedCredentials {
        self.credentials.clone()
    }

    async fn request(&self, operation: &str) -> DeployResult<RequestBuilder> {
        let creds = self.credentials.read().await;
        let endpoint = creds.endpoint.as_deref().ok_or_else(|| {
            DeployError::Config(format!("No endpoint configured for service '{}'", self.service))
        })?;
        let url = format!(
            "{}/api/v1/{}/{}",
            endpoint.trim_end_matches('/'),
            self.service,
            operation
        );

        let mut req = self.client.post(url);
        if let Some(token) = creds.token.as_deref() {
            req = req.bearer_auth(token);
        }
        Ok(req)
    }

    async fn send(&self, operation: &str, req: RequestBuilder) -> DeployResult<ApiResponse> {
        let resp = req
            .send()
            .await
            .map_err(|e| DeployError::remote(&self.service, operation, None, e.to_string()))?;
        self.read_response(operation, resp).await
    }

    async fn read_response(&self, operation: &str, resp: Response) -> DeployResult<ApiResponse> {
        let status = resp.status();
        let request_id = resp
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = resp
            .text()
            .await
            .map_err(|e| DeployError::remote(&self.service, operation, Some(status.as_u16()), e.to_string()))?;

        debug!(
            service = %self.service,
            operation,
            status = status.as_u16(),
            request_id = request_id.as_deref().unwrap_or("-"),
            "Remote call completed"
        );

        if !status.is_success() {
            return Err(DeployError::remote(
                &self.service,
                operation,
                Some(status.as_u16()),
                error_message(&text, status.canonical_reason()),
            ));
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| {
                DeployError::unexpected(&self.service, operation, format!("invalid JSON body: {}", e))
            })?
        };

        Ok(ApiResponse {
            metadata: ResponseMetadata {
                status: status.as_u16(),
                request_id,
            },
            body,
        })
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    fn service_name(&self) -> &str {
        &self.service
    }

    async fn call(&self, operation: &str, payload: Value) -> DeployResult<ApiResponse> {
        let req = self.request(operation).await?.json(&payload);
        self.send(operation, req).await
    }

    async fn upload_asset(&self, upload: &AssetUpload) -> DeployResult<ApiResponse> {
        let operation = operations::UPLOAD_ASSET;
        let file = tokio::fs::File::open(&upload.file_path)
            .await
            .map_err(|e| DeployError::io(&upload.file_path, e))?;
        let file_name = upload
            .file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let req = self
            .request(operation)
            .await?
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, upload.size)
            .header("X-Deployment-Name", encode(&upload.deployment_name))
            .header("X-Deployment-Request-Crn", encode(&upload.deployment_request_crn))
            .header("X-Parameter-Group", encode(&upload.parameter_group))
            .header("X-Parameter-Name", encode(&upload.parameter_name))
            .header("X-File-Name", encode(&file_name))
            .body(Body::from(file));

        self.send(operation, req).await
    }
}

fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Pulls a human readable message out of an error body.
fn error_message(text: &str, reason: Option<&str>) -> String {
    let parsed: Option<Value> = serde_json::from_str(text).ok();
    let from_json = parsed.as_ref().and_then(|v| {
        v.get("message")
            .or_else(|| v.pointer("/error/message"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    match from_json {
        Some(msg) => msg,
        None if !text.trim().is_empty() => text.trim().to_string(),
        None => reason.unwrap_or("unknown error").to_string(),
    }
}
