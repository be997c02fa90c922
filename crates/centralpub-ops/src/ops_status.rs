//! Operation: report the status of a deployment.

use centralpub_client::poll::poll_until_terminal;
use centralpub_client::{Publisher, StatusSource};
use centralpub_core::deployment::DeploymentStatus;
use tokio_util::sync::CancellationToken;

use crate::context::ProjectContext;
use crate::outcome::poll_error;

/// Fetch the current status, or poll until it is terminal when `wait` is set.
///
/// A FAILED status is returned as-is; see [`crate::outcome::ensure_succeeded`].
pub async fn status(
    ctx: &ProjectContext,
    deployment_id: &str,
    wait: bool,
    cancel: &CancellationToken,
) -> miette::Result<DeploymentStatus> {
    let publisher = ctx.connect(None)?;
    let result = if wait {
        poll_until_terminal(&publisher, deployment_id, &ctx.poll_options(), cancel)
            .await
            .map_err(poll_error)
    } else {
        publisher.status(deployment_id).await.map_err(Into::into)
    };
    if let Err(e) = publisher.close().await {
        tracing::debug!("Closing publisher: {e}");
    }
    result
}
