use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;
use validator::Validate;

use crate::core::client::api_client::{operations, to_payload, ApiClient, DF_SERVICE};
use crate::core::client::workload_token::TokenProvisioner;
use crate::domain::deployment::dto::create_deployment_request::CreateDeploymentRequest;
use crate::domain::deployment::dto::create_deployment_response::CreateDeploymentResponse;
use crate::domain::deployment::dto::identifiers::{DeploymentRequestCrn, EnvironmentCrn};
use crate::domain::deployment::saga::compensation::{
    compensate, CommittedEffect, CompensationLedger, CompensationReport,
};
use crate::domain::deployment::saga::saga_state::SagaState;
use crate::domain::deployment::service::asset_uploader::upload_assets;
use crate::domain::deployment::service::configuration_builder::build_deployment_configuration;
use crate::domain::deployment::service::environment_resolver::resolve_environment;
use crate::domain::deployment::service::nar_configuration_service::ensure_nar_configuration;
use crate::errors::{DeployError, DeployResult};

/// Record of one saga run: the states it went through, what it committed and
/// how the rollback went.
#[derive(Debug)]
pub struct SagaRun {
    pub run_id: Uuid,
    pub history: Vec<SagaState>,
    pub environment: Option<EnvironmentCrn>,
    pub ledger: CompensationLedger,
    pub compensation: Option<CompensationReport>,
}

impl SagaRun {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            history: vec![SagaState::NotStarted],
            environment: None,
            ledger: CompensationLedger::default(),
            compensation: None,
        }
    }

    pub fn state(&self) -> SagaState {
        self.history.last().copied().unwrap_or(SagaState::NotStarted)
    }

    fn advance(&mut self, next: SagaState) {
        let current = self.state();
        debug_assert!(
            current.can_transition_to(next),
            "illegal saga transition {} -> {}",
            current,
            next
        );
        debug!(from = %current, to = %next, "Saga transition");
        self.history.push(next);
    }
}

#[derive(Debug)]
pub struct SagaOutcome {
    pub run: SagaRun,
    pub result: DeployResult<CreateDeploymentResponse>,
}

/// Turns one create-deployment request into the chain of remote calls that
/// produce a running deployment, rolling back what it can when a step fails.
pub struct DeploymentSaga {
    df: Arc<dyn ApiClient>,
    workload: Arc<dyn ApiClient>,
    tokens: Arc<dyn TokenProvisioner>,
}

impl DeploymentSaga {
    pub fn new(
        df: Arc<dyn ApiClient>,
        workload: Arc<dyn ApiClient>,
        tokens: Arc<dyn TokenProvisioner>,
    ) -> Self {
        Self {
            df,
            workload,
            tokens,
        }
    }

    pub async fn create_deployment(
        &self,
        request: &CreateDeploymentRequest,
    ) -> DeployResult<CreateDeploymentResponse> {
        self.run(request).await.result
    }

    /// Runs the saga and keeps the run record alongside the result.
    pub async fn run(&self, request: &CreateDeploymentRequest) -> SagaOutcome {
        let mut run = SagaRun::new();
        let span = info_span!(
            "create_deployment",
            run_id = %run.run_id,
            deployment = %request.deployment_name
        );

        async {
            let result = match self.execute(request, &mut run).await {
                Ok(resp) => {
                    info!(deployment_crn = %resp.deployment_crn, "Deployment created");
                    Ok(resp)
                }
                Err(err) => {
                    self.roll_back(&mut run, &err).await;
                    Err(err)
                }
            };
            SagaOutcome { run, result }
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        request: &CreateDeploymentRequest,
        run: &mut SagaRun,
    ) -> DeployResult<CreateDeploymentResponse> {
        request.validate()?;

        let environment = resolve_environment(self.df.as_ref(), &request.service_crn).await?;
        run.environment = Some(environment.clone());
        run.advance(SagaState::EnvironmentResolved);

        self.tokens
            .acquire_and_install(DF_SERVICE, &environment)
            .await?;
        run.advance(SagaState::TokenAcquired);

        let request_crn = self.initiate(request).await?;
        run.ledger.record(CommittedEffect::DeploymentRequest {
            request_crn: request_crn.clone(),
        });
        run.advance(SagaState::RequestInitiated);

        // The initiated request expires quickly; register it right away.
        self.register_details(&request_crn, &environment).await?;
        run.advance(SagaState::DetailsRegistered);

        let parameter_groups = upload_assets(
            self.workload.as_ref(),
            &request.deployment_name,
            &request_crn,
            &request.parameter_groups,
        )
        .await?;
        run.advance(SagaState::AssetsUploaded);

        let mut configuration =
            build_deployment_configuration(&request_crn, &environment, request, parameter_groups);
        run.advance(SagaState::ConfigurationBuilt);

        let nar = ensure_nar_configuration(
            self.workload.as_ref(),
            &environment,
            request.custom_nar_configuration.as_ref(),
        )
        .await?;
        if let Some(nar) = nar {
            run.ledger.record(CommittedEffect::NarConfiguration {
                crn: nar.crn.clone(),
                configuration_version: nar.configuration_version,
            });
            configuration = configuration.with_nar_configuration(nar.crn);
        }
        run.advance(SagaState::NarResolved);

        let operation = operations::CREATE_DEPLOYMENT;
        debug!(?configuration, "Create Deployment Parameters");
        let resp = self
            .workload
            .call(
                operation,
                to_payload(self.workload.service_name(), operation, &configuration)?,
            )
            .await?;

        // The request handle is consumed once the workload accepted the deployment.
        run.ledger = CompensationLedger::default();

        let deployment_crn = resp.str_at("/deployment/crn").ok_or_else(|| {
            DeployError::unexpected(self.workload.service_name(), operation, "response has no deployment crn")
        })?;
        run.advance(SagaState::DeploymentCreated);

        Ok(CreateDeploymentResponse {
            deployment_crn: deployment_crn.to_string(),
        })
    }

    async fn initiate(&self, request: &CreateDeploymentRequest) -> DeployResult<DeploymentRequestCrn> {
        let operation = operations::INITIATE_DEPLOYMENT;
        let resp = self
            .df
            .call(
                operation,
                json!({
                    "serviceCrn": request.service_crn,
                    "flowVersionCrn": request.flow_version_crn,
                }),
            )
            .await?;

        let request_crn = resp.str_at("/deploymentRequestCrn").ok_or_else(|| {
            DeployError::unexpected(self.df.service_name(), operation, "response has no deploymentRequestCrn")
        })?;
        debug!(
            request_crn,
            url = resp.str_at("/dfxLocalUrl").unwrap_or("-"),
            "Initiated Deployment Request"
        );
        Ok(DeploymentRequestCrn::new(request_crn))
    }

    async fn register_details(
        &self,
        request_crn: &DeploymentRequestCrn,
        environment: &EnvironmentCrn,
    ) -> DeployResult<()> {
        self.workload
            .call(
                operations::GET_DEPLOYMENT_REQUEST_DETAILS,
                json!({
                    "deploymentRequestCrn": request_crn.as_str(),
                    "environmentCrn": environment.as_str(),
                }),
            )
            .await?;
        debug!(request_crn = %request_crn, "Obtained Deployment Request Details");
        Ok(())
    }

    async fn roll_back(&self, run: &mut SagaRun, err: &DeployError) {
        let failed_at = run.state();

        if let (Some(environment), false) = (run.environment.clone(), run.ledger.is_empty()) {
            run.advance(SagaState::Compensating);
            warn!(
                state = %failed_at,
                effects = run.ledger.effects().len(),
                error = %err,
                "Deployment creation failed, compensating"
            );
            let report = compensate(self.workload.as_ref(), &environment, &run.ledger).await;
            if !report.fully_compensated() {
                warn!(
                    failures = report.failures().count(),
                    "Compensation left resources behind"
                );
            }
            run.compensation = Some(report);
        }

        run.advance(SagaState::Failed);
        error!(state = %failed_at, error = %err, "Deployment creation failed");
    }
}
