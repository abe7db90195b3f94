use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, error};

use crate::core::client::api_client::{operations, ApiClient};
use crate::domain::deployment::dto::identifiers::{DeploymentRequestCrn, EnvironmentCrn};
use crate::errors::DeployError;

/// A remote side effect this run committed and knows how to undo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommittedEffect {
    DeploymentRequest {
        request_crn: DeploymentRequestCrn,
    },
    NarConfiguration {
        crn: String,
        configuration_version: i64,
    },
}

impl CommittedEffect {
    fn operation(&self) -> &'static str {
        match self {
            CommittedEffect::DeploymentRequest { .. } => operations::ABORT_DEPLOYMENT_REQUEST,
            CommittedEffect::NarConfiguration { .. } => operations::DELETE_CUSTOM_NAR_CONFIGURATION,
        }
    }
}

/// Side effects in commit order. Compensation walks it backwards.
#[derive(Debug, Clone, Default)]
pub struct CompensationLedger {
    effects: Vec<CommittedEffect>,
}

impl CompensationLedger {
    pub fn record(&mut self, effect: CommittedEffect) {
        self.effects.push(effect);
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn effects(&self) -> &[CommittedEffect] {
        &self.effects
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompensationOutcome {
    Undone,
    Failed { status: Option<u16>, message: String },
}

#[derive(Debug, Clone)]
pub struct CompensationEntry {
    pub effect: CommittedEffect,
    pub outcome: CompensationOutcome,
    pub finished_at: DateTime<Utc>,
}

/// Diagnostic record of a rollback. Recorded and logged, never raised.
#[derive(Debug, Clone, Default)]
pub struct CompensationReport {
    pub entries: Vec<CompensationEntry>,
}

impl CompensationReport {
    pub fn fully_compensated(&self) -> bool {
        self.entries
            .iter()
            .all(|e| e.outcome == CompensationOutcome::Undone)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CompensationEntry> {
        self.entries
            .iter()
            .filter(|e| e.outcome != CompensationOutcome::Undone)
    }
}

/// Best-effort undo of every effect in `ledger`, newest first.
pub async fn compensate(
    workload: &dyn ApiClient,
    environment: &EnvironmentCrn,
    ledger: &CompensationLedger,
) -> CompensationReport {
    let mut report = CompensationReport::default();

    for effect in ledger.effects().iter().rev() {
        let outcome = match undo(workload, environment, effect).await {
            Ok(()) => {
                debug!(operation = effect.operation(), ?effect, "Compensated side effect");
                CompensationOutcome::Undone
            }
            Err(err) => {
                log_failure(effect, &err);
                CompensationOutcome::Failed {
                    status: err.status(),
                    message: err.to_string(),
                }
            }
        };

        report.entries.push(CompensationEntry {
            effect: effect.clone(),
            outcome,
            finished_at: Utc::now(),
        });
    }

    report
}

async fn undo(
    workload: &dyn ApiClient,
    environment: &EnvironmentCrn,
    effect: &CommittedEffect,
) -> Result<(), DeployError> {
    let payload = match effect {
        CommittedEffect::DeploymentRequest { request_crn } => json!({
            "deploymentRequestCrn": request_crn.as_str(),
            "environmentCrn": environment.as_str(),
        }),
        CommittedEffect::NarConfiguration {
            crn,
            configuration_version,
        } => json!({
            "customNarConfigurationCrn": crn,
            "configurationVersion": configuration_version,
            "environmentCrn": environment.as_str(),
        }),
    };

    workload.call(effect.operation(), payload).await.map(|_| ())
}

fn log_failure(effect: &CommittedEffect, err: &DeployError) {
    let rejected = err.status().is_some_and(|s| s >= 400);
    match effect {
        CommittedEffect::DeploymentRequest { request_crn } if rejected => {
            error!(request_crn = %request_crn, error = %err, "Failed to clean up deployment request");
        }
        CommittedEffect::DeploymentRequest { request_crn } => {
            error!(request_crn = %request_crn, error = %err, "Encountered an error while attempting to abort deployment request");
        }
        CommittedEffect::NarConfiguration { crn, .. } if rejected => {
            error!(crn = %crn, error = %err, "Failed to clean up Custom NAR Configuration");
        }
        CommittedEffect::NarConfiguration { crn, .. } => {
            error!(crn = %crn, error = %err, "Encountered an error while attempting to clean up Custom NAR Configuration");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::api_client::DF_WORKLOAD_SERVICE;
    use crate::test_support::MockApiClient;

    fn ledger() -> CompensationLedger {
        let mut ledger = CompensationLedger::default();
        ledger.record(CommittedEffect::DeploymentRequest {
            request_crn: DeploymentRequestCrn::new("crn:req"),
        });
        ledger.record(CommittedEffect::NarConfiguration {
            crn: "crn:nar".into(),
            configuration_version: 3,
        });
        ledger
    }

    #[tokio::test]
    async fn undoes_effects_newest_first() {
        let workload = MockApiClient::new(DF_WORKLOAD_SERVICE);

        let report = compensate(&workload, &EnvironmentCrn::new("crn:env"), &ledger()).await;

        assert!(report.fully_compensated());
        assert_eq!(
            workload.operations(),
            vec![
                operations::DELETE_CUSTOM_NAR_CONFIGURATION,
                operations::ABORT_DEPLOYMENT_REQUEST,
            ]
        );
        let calls = workload.calls();
        assert_eq!(
            calls[0].payload,
            json!({
                "customNarConfigurationCrn": "crn:nar",
                "configurationVersion": 3,
                "environmentCrn": "crn:env"
            })
        );
        assert_eq!(
            calls[1].payload,
            json!({ "deploymentRequestCrn": "crn:req", "environmentCrn": "crn:env" })
        );
    }

    #[tokio::test]
    async fn failed_undo_is_recorded_and_the_rest_still_run() {
        let workload = MockApiClient::new(DF_WORKLOAD_SERVICE);
        workload.fail(operations::DELETE_CUSTOM_NAR_CONFIGURATION, 500, "delete failed");

        let report = compensate(&workload, &EnvironmentCrn::new("crn:env"), &ledger()).await;

        assert!(!report.fully_compensated());
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert!(matches!(
            failures[0].outcome,
            CompensationOutcome::Failed { status: Some(500), .. }
        ));
        assert_eq!(workload.calls_to(operations::ABORT_DEPLOYMENT_REQUEST).len(), 1);
    }

    #[tokio::test]
    async fn empty_ledger_makes_no_calls() {
        let workload = MockApiClient::new(DF_WORKLOAD_SERVICE);
        let report = compensate(
            &workload,
            &EnvironmentCrn::new("crn:env"),
            &CompensationLedger::default(),
        )
        .await;

        assert!(report.entries.is_empty());
        assert!(workload.calls().is_empty());
    }
}
