//! Turning final deployment states into results.

use std::path::PathBuf;

use centralpub_client::poll::PollError;
use centralpub_client::ClientError;
use centralpub_core::deployment::{DeploymentState, DeploymentStatus};
use centralpub_util::errors::PublishError;

/// What a publish (or release) run achieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Every module was skipped or no artifacts were found.
    NothingToPublish,
    /// Only snapshot versions were found; they were deployed to `repository`.
    SnapshotsDeployed { repository: String, files: usize },
    /// The bundle was assembled but not uploaded (`--dry-run`).
    BundleOnly { bundle: PathBuf, artifacts: usize },
    /// Uploaded without waiting for the outcome.
    Uploaded { deployment_id: String },
    /// Validated and waiting for a manual release.
    Validated { deployment_id: String },
    /// A release was requested without waiting for the outcome.
    Released { deployment_id: String },
    Published {
        deployment_id: String,
        purls: Vec<String>,
    },
}

/// Fail when the service reported the deployment as failed or attached errors.
pub fn ensure_succeeded(status: &DeploymentStatus) -> miette::Result<()> {
    if status.deployment_state != DeploymentState::Failed && !status.has_errors() {
        return Ok(());
    }
    let summary = status.error_summary();
    Err(PublishError::Deployment {
        deployment_id: status.deployment_id.clone(),
        summary: if summary.is_empty() {
            format!("  deployment is {}", status.deployment_state)
        } else {
            summary
        },
    }
    .into())
}

/// Outcome of a deployment that reached a terminal state.
pub fn settle(status: DeploymentStatus) -> miette::Result<PublishOutcome> {
    ensure_succeeded(&status)?;
    match status.deployment_state {
        DeploymentState::Published => {
            tracing::info!("Published successfully, deployment id: {}", status.deployment_id);
            Ok(PublishOutcome::Published {
                deployment_id: status.deployment_id,
                purls: status.purls.unwrap_or_default(),
            })
        }
        DeploymentState::Validated => Ok(PublishOutcome::Validated {
            deployment_id: status.deployment_id,
        }),
        other => Err(PublishError::Generic {
            message: format!(
                "Deployment {} stopped in non-terminal state {other}",
                status.deployment_id
            ),
        }
        .into()),
    }
}

/// Map a poll failure onto the workspace error types.
pub fn poll_error(error: PollError<ClientError>) -> miette::Report {
    match error {
        PollError::Fatal(cause) => cause.into(),
        PollError::Cancelled => PublishError::Cancelled.into(),
    }
}
