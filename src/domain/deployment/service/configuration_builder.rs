use std::num::NonZeroU32;

use crate::domain::deployment::dto::create_deployment_request::CreateDeploymentRequest;
use crate::domain::deployment::dto::deployment_configuration::{
    DeploymentConfiguration, InboundRouting, NodeScaling, DEFAULT_STATIC_NODE_COUNT,
    INITIAL_CONFIGURATION_VERSION,
};
use crate::domain::deployment::dto::identifiers::{DeploymentRequestCrn, EnvironmentCrn};
use crate::domain::deployment::dto::parameter_group::ParameterGroup;
use crate::domain::deployment::service::kpi_normalizer::normalize_kpis;

/// Assembles the `createDeployment` body.
///
/// `parameter_groups` are the groups after asset upload; the request's own
/// groups are ignored so local paths never reach the workload.
pub fn build_deployment_configuration(
    request_crn: &DeploymentRequestCrn,
    environment: &EnvironmentCrn,
    request: &CreateDeploymentRequest,
    parameter_groups: Vec<ParameterGroup>,
) -> DeploymentConfiguration {
    DeploymentConfiguration {
        name: request.deployment_name.clone(),
        deployment_request_crn: request_crn.to_string(),
        configuration_version: INITIAL_CONFIGURATION_VERSION,
        cluster_size_name: request.cluster_size_name.unwrap_or_default(),
        node_scaling: node_scaling(request),
        node_storage_profile_name: request.node_storage_profile_name,
        project_crn: request.project_crn.clone(),
        inbound_routing: request
            .inbound_hostname
            .as_ref()
            .map(|hostname| InboundRouting {
                inbound_hostname: hostname.clone(),
                listen_components: request.listen_components.clone(),
            }),
        auto_start_flow: request.auto_start_flow,
        cfm_nifi_version: request
            .cfm_nifi_version
            .clone()
            .filter(|v| !v.is_empty()),
        parameter_groups: Some(parameter_groups).filter(|g| !g.is_empty()),
        kpis: Some(&request.kpis)
            .filter(|k| !k.is_empty())
            .map(|k| normalize_kpis(k)),
        custom_nar_configuration_crn: None,
        environment_crn: environment.to_string(),
    }
}

fn node_scaling(request: &CreateDeploymentRequest) -> NodeScaling {
    let node_count = request.static_node_count.unwrap_or(DEFAULT_STATIC_NODE_COUNT);

    match request.auto_scaling_enabled {
        Some(true) => NodeScaling::Autoscaling {
            min_nodes: request.auto_scale_min_nodes.and_then(NonZeroU32::new),
            max_nodes: request.auto_scale_max_nodes.and_then(NonZeroU32::new),
        },
        Some(false) => NodeScaling::Static {
            node_count,
            autoscaling_disabled: true,
        },
        None => NodeScaling::Static {
            node_count,
            autoscaling_disabled: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::deployment::dto::create_deployment_request::{
        ClusterSize, ListenComponent, ListenProtocol, NodeStorageProfile,
    };
    use crate::domain::deployment::dto::kpi::{FrequencyTolerance, Kpi, KpiAlert, TimeUnit, TimeUnitId};
    use crate::domain::deployment::dto::parameter_group::Parameter;
    use serde_json::{json, Value};

    fn request() -> CreateDeploymentRequest {
        CreateDeploymentRequest::new("crn:svc", "crn:flow", "orders")
    }

    fn build(req: &CreateDeploymentRequest, groups: Vec<ParameterGroup>) -> Value {
        let config = build_deployment_configuration(
            &DeploymentRequestCrn::new("crn:req"),
            &EnvironmentCrn::new("crn:env"),
            req,
            groups,
        );
        serde_json::to_value(config).unwrap()
    }

    #[test]
    fn minimal_request_builds_only_required_fields() {
        assert_eq!(
            build(&request(), Vec::new()),
            json!({
                "name": "orders",
                "deploymentRequestCrn": "crn:req",
                "configurationVersion": 0,
                "clusterSizeName": "EXTRA_SMALL",
                "staticNodeCount": 1,
                "environmentCrn": "crn:env"
            })
        );
    }

    #[test]
    fn autoscaling_drops_static_count_and_zero_bounds() {
        let mut req = request();
        req.auto_scaling_enabled = Some(true);
        req.auto_scale_min_nodes = Some(2);
        req.auto_scale_max_nodes = Some(0);
        req.static_node_count = Some(4);

        let value = build(&req, Vec::new());
        assert_eq!(value["autoScalingEnabled"], json!(true));
        assert_eq!(value["autoScaleMinNodes"], json!(2));
        assert!(value.get("staticNodeCount").is_none());
        assert!(value.get("autoScaleMaxNodes").is_none());
    }

    #[test]
    fn static_count_present_unless_autoscaling_enabled() {
        for flag in [None, Some(false), Some(true)] {
            let mut req = request();
            req.auto_scaling_enabled = flag;
            req.static_node_count = Some(3);

            let value = build(&req, Vec::new());
            match flag {
                Some(true) => assert!(value.get("staticNodeCount").is_none()),
                _ => assert_eq!(value["staticNodeCount"], json!(3)),
            }
        }
    }

    #[test]
    fn disabled_autoscaling_sends_flag_without_bounds() {
        let mut req = request();
        req.auto_scaling_enabled = Some(false);
        req.auto_scale_min_nodes = Some(2);
        req.auto_scale_max_nodes = Some(5);

        let value = build(&req, Vec::new());
        assert_eq!(value["autoScalingEnabled"], json!(false));
        assert_eq!(value["staticNodeCount"], json!(1));
        assert!(value.get("autoScaleMinNodes").is_none());
        assert!(value.get("autoScaleMaxNodes").is_none());
    }

    #[test]
    fn optional_fields_are_included_verbatim_when_present() {
        let mut req = request();
        req.cluster_size_name = Some(ClusterSize::Large);
        req.node_storage_profile_name = Some(NodeStorageProfile::StandardAzure);
        req.project_crn = Some("crn:project".into());
        req.auto_start_flow = Some(false);
        req.cfm_nifi_version = Some("1.18.0".into());

        let value = build(&req, Vec::new());
        assert_eq!(value["clusterSizeName"], json!("LARGE"));
        assert_eq!(value["nodeStorageProfileName"], json!("STANDARD_AZURE"));
        assert_eq!(value["projectCrn"], json!("crn:project"));
        assert_eq!(value["autoStartFlow"], json!(false));
        assert_eq!(value["cfmNifiVersion"], json!("1.18.0"));
    }

    #[test]
    fn empty_nifi_version_is_omitted() {
        let mut req = request();
        req.cfm_nifi_version = Some(String::new());
        assert!(build(&req, Vec::new()).get("cfmNifiVersion").is_none());
    }

    #[test]
    fn inbound_hostname_copies_listen_components() {
        let mut req = request();
        req.inbound_hostname = Some("orders.example.com".into());
        assert_eq!(build(&req, Vec::new())["listenComponents"], Value::Null);
        assert!(build(&req, Vec::new())
            .as_object()
            .unwrap()
            .contains_key("listenComponents"));

        req.listen_components = Some(vec![ListenComponent {
            protocol: ListenProtocol::Udp,
            port: "514".into(),
        }]);
        assert_eq!(
            build(&req, Vec::new())["listenComponents"],
            json!([{ "protocol": "UDP", "port": "514" }])
        );
    }

    #[test]
    fn listen_components_without_hostname_are_dropped() {
        let mut req = request();
        req.listen_components = Some(Vec::new());
        assert!(build(&req, Vec::new()).get("listenComponents").is_none());
    }

    #[test]
    fn groups_and_kpis_are_included_when_non_empty() {
        let mut req = request();
        req.kpis = vec![Kpi {
            metric_id: "cpu".into(),
            component_id: None,
            alert: Some(KpiAlert {
                frequency_tolerance: Some(FrequencyTolerance {
                    value: Some(1.0),
                    unit: Some(TimeUnit::new(TimeUnitId::Seconds)),
                }),
                ..KpiAlert::default()
            }),
        }];
        let groups = vec![ParameterGroup {
            name: "main".into(),
            parameters: vec![Parameter {
                name: "url".into(),
                value: Some("https://example.com".into()),
                asset_references: None,
            }],
        }];

        let value = build(&req, groups);
        assert_eq!(value["parameterGroups"][0]["name"], json!("main"));
        assert_eq!(
            value["kpis"][0]["alert"]["frequencyTolerance"]["unit"],
            json!({ "id": "SECONDS", "label": "Seconds", "abbreviation": "s" })
        );
    }
}
