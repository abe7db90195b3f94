use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use validator::Validate;

/// Version assigned by the workload to an asset uploaded for the first time.
pub const INITIAL_ASSET_VERSION: &str = "0";

/// Named group of flow parameters sent with the deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ParameterGroup {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(nested)]
    pub parameters: Vec<Parameter>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    #[validate(length(min = 1))]
    pub name: String,
    pub value: Option<String>,
    pub asset_references: Option<Vec<AssetReference>>,
}

impl Parameter {
    /// Local files this parameter still points at.
    pub fn local_assets(&self) -> impl Iterator<Item = &PathBuf> {
        self.asset_references
            .iter()
            .flatten()
            .filter_map(AssetReference::local_path)
    }
}

/// A parameter asset: a local path before upload, a workload location after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetReference {
    Local(PathBuf),
    Uploaded(UploadedAsset),
}

impl AssetReference {
    pub fn local_path(&self) -> Option<&PathBuf> {
        match self {
            AssetReference::Local(path) => Some(path),
            AssetReference::Uploaded(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedAsset {
    pub name: String,
    pub path: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn asset_references_deserialize_from_plain_paths() {
        let parameter: Parameter = serde_json::from_value(json!({
            "name": "keystore",
            "assetReferences": ["/tmp/keystore.jks"]
        }))
        .unwrap();

        let locals: Vec<_> = parameter.local_assets().collect();
        assert_eq!(locals, vec![&PathBuf::from("/tmp/keystore.jks")]);
    }

    #[test]
    fn uploaded_reference_serializes_as_object() {
        let parameter = Parameter {
            name: "keystore".into(),
            value: None,
            asset_references: Some(vec![AssetReference::Uploaded(UploadedAsset {
                name: "keystore.jks".into(),
                path: "/tmp".into(),
                version: INITIAL_ASSET_VERSION.into(),
            })]),
        };

        assert_eq!(
            serde_json::to_value(&parameter).unwrap(),
            json!({
                "name": "keystore",
                "assetReferences": [{"name": "keystore.jks", "path": "/tmp", "version": "0"}]
            })
        );
    }
}
