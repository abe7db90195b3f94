use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use validator::Validate;

/// Credentials and storage location for the environment's custom NAR bundle.
#[derive(Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomNarConfigurationRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[validate(length(min = 1))]
    pub storage_location: String,
    #[serde(default)]
    pub configuration_version: i64,
}

impl fmt::Debug for CustomNarConfigurationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomNarConfigurationRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("storage_location", &self.storage_location)
            .field("configuration_version", &self.configuration_version)
            .finish()
    }
}

/// Body for create/update calls. `crn` is only sent on update.
#[skip_serializing_none]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarConfigurationPayload<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub storage_location: &'a str,
    pub configuration_version: i64,
    pub environment_crn: &'a str,
    pub crn: Option<&'a str>,
}

impl<'a> NarConfigurationPayload<'a> {
    pub fn for_create(requested: &'a CustomNarConfigurationRequest, environment_crn: &'a str) -> Self {
        Self {
            username: &requested.username,
            password: &requested.password,
            storage_location: &requested.storage_location,
            configuration_version: requested.configuration_version,
            environment_crn,
            crn: None,
        }
    }

    pub fn for_update(
        requested: &'a CustomNarConfigurationRequest,
        environment_crn: &'a str,
        crn: &'a str,
        configuration_version: i64,
    ) -> Self {
        Self {
            crn: Some(crn),
            configuration_version,
            ..Self::for_create(requested, environment_crn)
        }
    }
}

/// Subset of the workload's NAR configuration resource the saga relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarConfigurationResource {
    pub crn: Option<String>,
    pub configuration_version: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarOrigin {
    Created,
    AdoptedDefault,
}

/// NAR configuration written by this run, eligible for deletion on rollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedNarConfiguration {
    pub crn: String,
    pub configuration_version: i64,
    pub origin: NarOrigin,
}
