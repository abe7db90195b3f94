pub mod asset_uploader;
pub mod configuration_builder;
pub mod environment_resolver;
pub mod kpi_normalizer;
pub mod nar_configuration_service;
