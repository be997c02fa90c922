//! Operation: release a validated `USER_MANAGED` deployment.

use centralpub_client::poll::{self, poll_until};
use centralpub_client::{CentralPublisher, ClientError, Publisher, StatusSource};
use centralpub_core::deployment::{DeploymentState, DeploymentStatus};
use centralpub_util::errors::PublishError;
use centralpub_util::progress::{spinner, status};
use tokio_util::sync::CancellationToken;

use crate::context::ProjectContext;
use crate::outcome::{poll_error, settle, PublishOutcome};

/// Release `deployment_id`, optionally waiting until it is published.
///
/// Only a deployment in the VALIDATED state can be released.
pub async fn release(
    ctx: &ProjectContext,
    deployment_id: &str,
    wait: bool,
    cancel: &CancellationToken,
) -> miette::Result<PublishOutcome> {
    let publisher = ctx.connect(None)?;
    let result = release_with(ctx, &publisher, deployment_id, wait, cancel).await;
    if let Err(e) = publisher.close().await {
        tracing::debug!("Closing publisher: {e}");
    }
    result
}

async fn release_with(
    ctx: &ProjectContext,
    publisher: &CentralPublisher,
    deployment_id: &str,
    wait: bool,
    cancel: &CancellationToken,
) -> miette::Result<PublishOutcome> {
    let current = publisher.status(deployment_id).await?;
    if current.deployment_state != DeploymentState::Validated {
        return Err(PublishError::Generic {
            message: format!(
                "Deployment {deployment_id} is {}; only VALIDATED deployments can be released",
                current.deployment_state
            ),
        }
        .into());
    }

    publisher.publish(deployment_id).await?;
    tracing::info!("Release requested for deployment {deployment_id}");
    status("Released", &format!("deployment {deployment_id}"));

    if !wait {
        return Ok(PublishOutcome::Released {
            deployment_id: deployment_id.to_string(),
        });
    }

    // VALIDATED is terminal for a fresh upload but not once a release is requested.
    let sp = spinner(&format!("Waiting for deployment {deployment_id}..."));
    let polled = poll_until(
        || publisher.status(deployment_id),
        is_released_or_failed,
        |error: &ClientError| poll::classify(error),
        ctx.poll_options().delay,
        cancel,
    )
    .await;
    sp.finish_and_clear();
    settle(polled.map_err(poll_error)?)
}

fn is_released_or_failed(status: &DeploymentStatus) -> bool {
    matches!(
        status.deployment_state,
        DeploymentState::Published | DeploymentState::Failed
    )
}
