use std::fmt;

/// Progress of one create-deployment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SagaState {
    NotStarted,
    EnvironmentResolved,
    TokenAcquired,
    RequestInitiated,
    DetailsRegistered,
    AssetsUploaded,
    ConfigurationBuilt,
    NarResolved,
    DeploymentCreated,
    Compensating,
    Failed,
}

impl SagaState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SagaState::DeploymentCreated | SagaState::Failed)
    }

    /// Forward step that follows `self` on the success path.
    pub fn next(&self) -> Option<SagaState> {
        use SagaState::*;
        match self {
            NotStarted => Some(EnvironmentResolved),
            EnvironmentResolved => Some(TokenAcquired),
            TokenAcquired => Some(RequestInitiated),
            RequestInitiated => Some(DetailsRegistered),
            DetailsRegistered => Some(AssetsUploaded),
            AssetsUploaded => Some(ConfigurationBuilt),
            ConfigurationBuilt => Some(NarResolved),
            NarResolved => Some(DeploymentCreated),
            DeploymentCreated | Compensating | Failed => None,
        }
    }

    /// Whether moving from `self` to `to` is a legal transition.
    pub fn can_transition_to(&self, to: SagaState) -> bool {
        use SagaState::*;
        match (self, to) {
            (from, to) if from.next() == Some(to) => true,
            (from, Compensating) => !from.is_terminal() && *from != Compensating,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        use SagaState::*;
        match self {
            NotStarted => "NOT_STARTED",
            EnvironmentResolved => "ENVIRONMENT_RESOLVED",
            TokenAcquired => "TOKEN_ACQUIRED",
            RequestInitiated => "REQUEST_INITIATED",
            DetailsRegistered => "DETAILS_REGISTERED",
            AssetsUploaded => "ASSETS_UPLOADED",
            ConfigurationBuilt => "CONFIGURATION_BUILT",
            NarResolved => "NAR_RESOLVED",
            DeploymentCreated => "DEPLOYMENT_CREATED",
            Compensating => "COMPENSATING",
            Failed => "FAILED",
        }
    }
}

impl fmt::Display for SagaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
