use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! crn_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

crn_newtype!(
    /// Environment that hosts the target service. Resolved once per run.
    EnvironmentCrn
);

crn_newtype!(
    /// Short-lived handle of an initiated, not yet created deployment.
    DeploymentRequestCrn
);
