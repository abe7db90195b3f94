use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::core::client::api_client::{operations, ApiClient, ApiResponse, AssetUpload};
use crate::core::client::workload_token::TokenProvisioner;
use crate::domain::deployment::dto::identifiers::EnvironmentCrn;
use crate::errors::{DeployError, DeployResult};

#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Reply(Value),
    Fail(Option<u16>, String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedCall {
    pub operation: String,
    pub payload: Value,
}

/// In-memory [`ApiClient`] that records every call.
///
/// Each operation answers from a script queue; the last scripted entry sticks.
/// Unscripted operations answer with `{}`.
pub(crate) struct MockApiClient {
    service: String,
    scripts: StdMutex<HashMap<String, VecDeque<Scripted>>>,
    calls: StdMutex<Vec<RecordedCall>>,
    uploads: StdMutex<Vec<AssetUpload>>,
    fail_upload_at: StdMutex<Option<(usize, u16)>>,
}

impl MockApiClient {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
            scripts: StdMutex::new(HashMap::new()),
            calls: StdMutex::new(Vec::new()),
            uploads: StdMutex::new(Vec::new()),
            fail_upload_at: StdMutex::new(None),
        }
    }

    pub fn respond(&self, operation: &str, body: Value) {
        self.push(operation, Scripted::Reply(body));
    }

    pub fn fail(&self, operation: &str, status: u16, message: &str) {
        self.push(operation, Scripted::Fail(Some(status), message.to_string()));
    }

    /// Fails the `index`-th upload (zero based) with `status`.
    pub fn fail_upload_at(&self, index: usize, status: u16) {
        *self.fail_upload_at.lock().unwrap() = Some((index, status));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn operations(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.operation).collect()
    }

    pub fn calls_to(&self, operation: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.operation == operation)
            .collect()
    }

    pub fn uploads(&self) -> Vec<AssetUpload> {
        self.uploads.lock().unwrap().clone()
    }

    fn push(&self, operation: &str, scripted: Scripted) {
        self.scripts
            .lock()
            .unwrap()
            .entry(operation.to_string())
            .or_default()
            .push_back(scripted);
    }

    fn next(&self, operation: &str) -> Scripted {
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(operation) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Scripted::Reply(json!({})),
        }
    }
}

#[async_trait]
impl ApiClient for MockApiClient {
    fn service_name(&self) -> &str {
        &self.service
    }

    async fn call(&self, operation: &str, payload: Value) -> DeployResult<ApiResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            operation: operation.to_string(),
            payload,
        });

        match self.next(operation) {
            Scripted::Reply(body) => Ok(ApiResponse::ok(body)),
            Scripted::Fail(status, message) => {
                Err(DeployError::remote(&self.service, operation, status, message))
            }
        }
    }

    async fn upload_asset(&self, upload: &AssetUpload) -> DeployResult<ApiResponse> {
        let index = {
            let mut uploads = self.uploads.lock().unwrap();
            uploads.push(upload.clone());
            uploads.len() - 1
        };

        if let Some((fail_index, status)) = *self.fail_upload_at.lock().unwrap() {
            if fail_index == index {
                return Err(DeployError::remote(
                    &self.service,
                    operations::UPLOAD_ASSET,
                    Some(status),
                    "upload rejected",
                ));
            }
        }
        Ok(ApiResponse::ok(json!({})))
    }
}

/// Token provisioner that records the environments it was asked for.
#[derive(Default)]
pub(crate) struct MockTokenProvisioner {
    pub fail: bool,
    pub requested: StdMutex<Vec<(String, EnvironmentCrn)>>,
}

impl MockTokenProvisioner {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl TokenProvisioner for MockTokenProvisioner {
    async fn acquire_and_install(
        &self,
        target_service: &str,
        environment: &EnvironmentCrn,
    ) -> DeployResult<()> {
        self.requested
            .lock()
            .unwrap()
            .push((target_service.to_string(), environment.clone()));
        if self.fail {
            return Err(DeployError::Token("iam unavailable".into()));
        }
        Ok(())
    }
}

/// Sparse file of the given size inside its own temp directory.
pub(crate) struct TempAsset {
    dir: TempDir,
    path: PathBuf,
}

impl TempAsset {
    pub fn with_size(name: &str, size: u64) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        File::create(&path).unwrap().set_len(size).unwrap();
        Self { dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}
