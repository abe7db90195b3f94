use std::path::PathBuf;

use tracing::{debug, info};

use crate::core::client::api_client::{ApiClient, AssetUpload};
use crate::core::util::path_util::PathUtil;
use crate::domain::deployment::dto::identifiers::DeploymentRequestCrn;
use crate::domain::deployment::dto::parameter_group::{
    AssetReference, Parameter, ParameterGroup, UploadedAsset, INITIAL_ASSET_VERSION,
};
use crate::errors::{DeployError, DeployResult};

/// Largest asset the workload accepts.
pub const MAX_ASSET_SIZE: u64 = 150 * 1024 * 1024;

/// Local asset after `~`/`$VAR` expansion, with its size on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedAsset {
    pub path: PathBuf,
    pub size: u64,
}

/// Expands and stats every local asset in traversal order, failing on the
/// first one above [`MAX_ASSET_SIZE`]. Nothing is uploaded here.
pub async fn validate_asset_sizes(groups: &[ParameterGroup]) -> DeployResult<Vec<StagedAsset>> {
    let mut staged = Vec::new();

    for raw in groups
        .iter()
        .flat_map(|g| g.parameters.iter())
        .flat_map(Parameter::local_assets)
    {
        let path = PathUtil::expand_file_path(raw)?;
        let size = tokio::fs::metadata(&path)
            .await
            .map_err(|e| DeployError::io(&path, e))?
            .len();
        if size > MAX_ASSET_SIZE {
            return Err(DeployError::AssetTooLarge {
                path,
                size,
                limit: MAX_ASSET_SIZE,
            });
        }
        staged.push(StagedAsset { path, size });
    }

    Ok(staged)
}

/// Uploads every local asset and returns groups whose references point at
/// the uploaded copies. The size check covers all assets before the first upload.
pub async fn upload_assets(
    workload: &dyn ApiClient,
    deployment_name: &str,
    request_crn: &DeploymentRequestCrn,
    groups: &[ParameterGroup],
) -> DeployResult<Vec<ParameterGroup>> {
    let mut staged = validate_asset_sizes(groups).await?.into_iter();

    let mut uploaded_groups = Vec::with_capacity(groups.len());
    let mut uploaded = 0usize;

    for group in groups {
        let mut parameters = Vec::with_capacity(group.parameters.len());
        for parameter in &group.parameters {
            let asset_references = match &parameter.asset_references {
                Some(refs) if !refs.is_empty() => {
                    let mut updated = Vec::with_capacity(refs.len());
                    for reference in refs {
                        let next = match reference {
                            AssetReference::Local(raw) => {
                                let asset = staged.next().ok_or_else(|| {
                                    DeployError::Validation(format!(
                                        "asset {} was not staged for upload",
                                        raw.display()
                                    ))
                                })?;
                                let upload = AssetUpload {
                                    deployment_name: deployment_name.to_string(),
                                    deployment_request_crn: request_crn.to_string(),
                                    parameter_group: group.name.clone(),
                                    parameter_name: parameter.name.clone(),
                                    file_path: asset.path,
                                    size: asset.size,
                                };
                                let asset = upload_one(workload, &upload).await?;
                                uploaded += 1;
                                AssetReference::Uploaded(asset)
                            }
                            already @ AssetReference::Uploaded(_) => already.clone(),
                        };
                        updated.push(next);
                    }
                    Some(updated)
                }
                other => other.clone(),
            };

            parameters.push(Parameter {
                asset_references,
                ..parameter.clone()
            });
        }

        uploaded_groups.push(ParameterGroup {
            name: group.name.clone(),
            parameters,
        });
    }

    if uploaded > 0 {
        info!(count = uploaded, request_crn = %request_crn, "Uploaded deployment assets");
    }
    Ok(uploaded_groups)
}

async fn upload_one(workload: &dyn ApiClient, upload: &AssetUpload) -> DeployResult<UploadedAsset> {
    workload.upload_asset(upload).await?;

    let (path, name) = PathUtil::split_file_path(&upload.file_path);
    debug!(
        parameter_group = %upload.parameter_group,
        parameter = %upload.parameter_name,
        file = %upload.file_path.display(),
        size = upload.size,
        "Uploaded asset"
    );

    Ok(UploadedAsset {
        name,
        path,
        version: INITIAL_ASSET_VERSION.to_string(),
    })
}
