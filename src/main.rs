use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use df_deploy_core::app_state::build_app_state;
use df_deploy_core::config::AppConfig;
use df_deploy_core::domain::deployment::dto::create_deployment_request::CreateDeploymentRequest;
use df_deploy_core::logging::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let _guard = init_tracing(&config.log_filter, config.log_dir.as_deref())?;

    // First argument wins over DFDEPLOY_REQUEST_FILE.
    let request_file = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.request_file.clone())
        .context("No request file given; pass a path or set DFDEPLOY_REQUEST_FILE")?;

    let raw = tokio::fs::read_to_string(&request_file)
        .await
        .with_context(|| format!("Failed to read {}", request_file.display()))?;
    let request: CreateDeploymentRequest = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid deployment request in {}", request_file.display()))?;

    let state = build_app_state(&config)?;
    info!(deployment = %request.deployment_name, "Creating deployment");

    let response = state
        .deployment_saga()
        .create_deployment(&request)
        .await
        .with_context(|| format!("Deployment '{}' was not created", request.deployment_name))?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
