use std::num::NonZeroU32;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_with::skip_serializing_none;

use super::create_deployment_request::{ClusterSize, ListenComponent, NodeStorageProfile};
use super::kpi::Kpi;
use super::parameter_group::ParameterGroup;

/// Configuration version of a deployment that has never been updated.
pub const INITIAL_CONFIGURATION_VERSION: i64 = 0;

/// Static node count used when the request does not pick one.
pub const DEFAULT_STATIC_NODE_COUNT: u32 = 1;

/// Body of the workload `createDeployment` call.
///
/// Absent options are omitted from the payload; the workload reads an
/// omitted field as "use the platform default", never as an empty value.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfiguration {
    pub name: String,
    pub deployment_request_crn: String,
    pub configuration_version: i64,
    pub cluster_size_name: ClusterSize,
    #[serde(flatten)]
    pub node_scaling: NodeScaling,
    pub node_storage_profile_name: Option<NodeStorageProfile>,
    pub project_crn: Option<String>,
    #[serialize_always]
    #[serde(flatten)]
    pub inbound_routing: Option<InboundRouting>,
    pub auto_start_flow: Option<bool>,
    pub cfm_nifi_version: Option<String>,
    pub parameter_groups: Option<Vec<ParameterGroup>>,
    pub kpis: Option<Vec<Kpi>>,
    pub custom_nar_configuration_crn: Option<String>,
    pub environment_crn: String,
}

impl DeploymentConfiguration {
    pub fn with_nar_configuration(mut self, crn: impl Into<String>) -> Self {
        self.custom_nar_configuration_crn = Some(crn.into());
        self
    }
}

/// Node count policy. A static count and autoscaling bounds never coexist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeScaling {
    Static {
        node_count: u32,
        /// Autoscaling was explicitly turned off by the caller.
        autoscaling_disabled: bool,
    },
    Autoscaling {
        min_nodes: Option<NonZeroU32>,
        max_nodes: Option<NonZeroU32>,
    },
}

impl Default for NodeScaling {
    fn default() -> Self {
        NodeScaling::Static {
            node_count: DEFAULT_STATIC_NODE_COUNT,
            autoscaling_disabled: false,
        }
    }
}

impl Serialize for NodeScaling {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            NodeScaling::Static {
                node_count,
                autoscaling_disabled,
            } => {
                map.serialize_entry("staticNodeCount", node_count)?;
                if *autoscaling_disabled {
                    map.serialize_entry("autoScalingEnabled", &false)?;
                }
            }
            NodeScaling::Autoscaling {
                min_nodes,
                max_nodes,
            } => {
                map.serialize_entry("autoScalingEnabled", &true)?;
                if let Some(min) = min_nodes {
                    map.serialize_entry("autoScaleMinNodes", min)?;
                }
                if let Some(max) = max_nodes {
                    map.serialize_entry("autoScaleMaxNodes", max)?;
                }
            }
        }
        map.end()
    }
}

/// Hostname routing. Listen components are passed through as given, `null` included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundRouting {
    pub inbound_hostname: String,
    pub listen_components: Option<Vec<ListenComponent>>,
}
