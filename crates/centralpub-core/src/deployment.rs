//! Deployment lifecycle values exchanged with the publishing service.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// State of a deployment in the publishing service's state machine.
///
/// The service moves a deployment through
/// `PENDING -> VALIDATING -> (VALIDATED ->) PUBLISHING -> PUBLISHED | FAILED`,
/// but a client may observe any subset of those states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentState {
    Pending,
    Validating,
    /// Validation passed; a `USER_MANAGED` deployment waits here for release.
    Validated,
    Publishing,
    Published,
    Failed,
}

impl DeploymentState {
    /// Whether no further transition can be observed without outside action.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Published | Self::Failed | Self::Validated)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Validating => "VALIDATING",
            Self::Validated => "VALIDATED",
            Self::Publishing => "PUBLISHING",
            Self::Published => "PUBLISHED",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time snapshot returned by the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStatus {
    pub deployment_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_name: Option<String>,
    pub deployment_state: DeploymentState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl DeploymentStatus {
    /// A bare status with only an id and a state.
    pub fn new(deployment_id: impl Into<String>, state: DeploymentState) -> Self {
        Self {
            deployment_id: deployment_id.into(),
            deployment_name: None,
            deployment_state: state,
            purls: None,
            errors: None,
        }
    }

    /// Whether the service attached at least one per-artifact error message.
    pub fn has_errors(&self) -> bool {
        self.errors
            .as_ref()
            .is_some_and(|errors| errors.values().any(|messages| !messages.is_empty()))
    }

    /// Render the error mapping as indented `artifact: message` lines.
    pub fn error_summary(&self) -> String {
        let mut lines = Vec::new();
        if let Some(errors) = &self.errors {
            for (artifact, messages) in errors {
                for message in messages {
                    lines.push(format!("  {artifact}: {message}"));
                }
            }
        }
        lines.join("\n")
    }
}

/// How the service should proceed once a deployment validates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublishingType {
    /// Publish to Maven Central as soon as validation passes.
    Automatic,
    /// Stop at `VALIDATED` and wait for a manual release.
    #[default]
    UserManaged,
}

impl PublishingType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Automatic => "AUTOMATIC",
            Self::UserManaged => "USER_MANAGED",
        }
    }
}

impl fmt::Display for PublishingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a publishing type string is not recognised.
#[derive(Debug, Error)]
#[error("unknown publishing type `{0}` (expected AUTOMATIC or USER_MANAGED)")]
pub struct UnknownPublishingType(pub String);

impl FromStr for PublishingType {
    type Err = UnknownPublishingType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "AUTOMATIC" => Ok(Self::Automatic),
            "USER_MANAGED" => Ok(Self::UserManaged),
            _ => Err(UnknownPublishingType(s.to_string())),
        }
    }
}
