pub mod create_deployment_request;
pub mod create_deployment_response;
pub mod deployment_configuration;
pub mod identifiers;
pub mod kpi;
pub mod nar_configuration;
pub mod parameter_group;
