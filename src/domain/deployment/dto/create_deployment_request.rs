use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};
use validator::Validate;

use super::kpi::Kpi;
use super::nar_configuration::CustomNarConfigurationRequest;
use super::parameter_group::ParameterGroup;

/// User request for the create-deployment workflow.
///
/// `parameterGroups` and `kpis` may be missing or `null`; both read as empty.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeploymentRequest {
    #[validate(length(min = 1))]
    pub service_crn: String,
    #[validate(length(min = 1))]
    pub flow_version_crn: String,
    #[validate(length(min = 1))]
    pub deployment_name: String,
    pub cluster_size_name: Option<ClusterSize>,
    pub static_node_count: Option<u32>,
    pub auto_scaling_enabled: Option<bool>,
    pub auto_scale_min_nodes: Option<u32>,
    pub auto_scale_max_nodes: Option<u32>,
    pub cfm_nifi_version: Option<String>,
    pub auto_start_flow: Option<bool>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[validate(nested)]
    pub parameter_groups: Vec<ParameterGroup>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[validate(nested)]
    pub kpis: Vec<Kpi>,
    #[validate(nested)]
    pub custom_nar_configuration: Option<CustomNarConfigurationRequest>,
    pub inbound_hostname: Option<String>,
    pub listen_components: Option<Vec<ListenComponent>>,
    pub node_storage_profile_name: Option<NodeStorageProfile>,
    pub project_crn: Option<String>,
}

impl CreateDeploymentRequest {
    /// Minimal request; every optional field absent.
    pub fn new(
        service_crn: impl Into<String>,
        flow_version_crn: impl Into<String>,
        deployment_name: impl Into<String>,
    ) -> Self {
        Self {
            service_crn: service_crn.into(),
            flow_version_crn: flow_version_crn.into(),
            deployment_name: deployment_name.into(),
            cluster_size_name: None,
            static_node_count: None,
            auto_scaling_enabled: None,
            auto_scale_min_nodes: None,
            auto_scale_max_nodes: None,
            cfm_nifi_version: None,
            auto_start_flow: None,
            parameter_groups: Vec::new(),
            kpis: Vec::new(),
            custom_nar_configuration: None,
            inbound_hostname: None,
            listen_components: None,
            node_storage_profile_name: None,
            project_crn: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClusterSize {
    #[default]
    ExtraSmall,
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeStorageProfile {
    StandardAws,
    StandardAzure,
    PerformanceAws,
    PerformanceAzure,
}

/// Subset of metadata of a Listen* processor exposed through the inbound host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenComponent {
    pub protocol: ListenProtocol,
    pub port: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ListenProtocol {
    Tcp,
    Udp,
}
