use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::client::api_client::{ApiClient, DF_SERVICE, DF_WORKLOAD_SERVICE, IAM_SERVICE};
use crate::core::client::http_api_client::{shared_credentials, HttpApiClient};
use crate::core::client::workload_token::{TokenProvisioner, WorkloadTokenProvisioner};
use crate::domain::deployment::saga::deployment_saga::DeploymentSaga;
use crate::errors::DeployResult;

/// Wired clients for one process. The workload client starts without a token;
/// the provisioner installs one during each run.
#[derive(Clone)]
pub struct AppState {
    pub df_client: Arc<dyn ApiClient>,
    pub workload_client: Arc<dyn ApiClient>,
    pub token_provisioner: Arc<dyn TokenProvisioner>,
}

impl AppState {
    pub fn deployment_saga(&self) -> DeploymentSaga {
        DeploymentSaga::new(
            self.df_client.clone(),
            self.workload_client.clone(),
            self.token_provisioner.clone(),
        )
    }
}

pub fn build_app_state(config: &AppConfig) -> DeployResult<AppState> {
    let http = HttpApiClient::build_http_client(config.timeout)?;

    let df_client: Arc<dyn ApiClient> = Arc::new(HttpApiClient::new(
        http.clone(),
        DF_SERVICE,
        shared_credentials(Some(config.df_endpoint.clone()), config.access_token.clone()),
    ));
    let iam: Arc<dyn ApiClient> = Arc::new(HttpApiClient::new(
        http.clone(),
        IAM_SERVICE,
        shared_credentials(Some(config.iam_endpoint.clone()), config.access_token.clone()),
    ));

    let workload = HttpApiClient::new(
        http,
        DF_WORKLOAD_SERVICE,
        shared_credentials(config.dfworkload_endpoint.clone(), None),
    );
    let token_provisioner: Arc<dyn TokenProvisioner> = Arc::new(WorkloadTokenProvisioner::new(
        iam,
        workload.credentials(),
    ));

    Ok(AppState {
        df_client,
        workload_client: Arc::new(workload),
        token_provisioner,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> AppConfig {
        AppConfig {
            df_endpoint: "https://df.example.com".into(),
            iam_endpoint: "https://iam.example.com".into(),
            dfworkload_endpoint: None,
            access_token: Some("token".into()),
            timeout: Duration::from_secs(5),
            request_file: None,
            log_filter: "info".into(),
            log_dir: None,
        }
    }

    #[test]
    fn clients_are_bound_to_their_services() {
        let state = build_app_state(&config()).unwrap();
        assert_eq!(state.df_client.service_name(), "df");
        assert_eq!(state.workload_client.service_name(), "dfworkload");
    }
}
