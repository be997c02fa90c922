//! Operation: deploy snapshot versions to the snapshot repository.

use centralpub_bundle::snapshot::SnapshotSet;
use centralpub_client::snapshot::{self, SnapshotRepository};
use centralpub_client::{CentralPublisher, ClientError};
use centralpub_util::errors::PublishError;
use centralpub_util::progress::{spinner, status};
use tokio_util::sync::CancellationToken;

/// Send every file of `snapshots` to `repository`, in path order.
///
/// Each file gets the repository's bounded retry; a file that still fails
/// aborts the run with a network error. Returns the number of files sent.
pub async fn deploy_snapshots(
    publisher: &CentralPublisher,
    repository: &SnapshotRepository,
    snapshots: &SnapshotSet,
    cancel: &CancellationToken,
) -> miette::Result<usize> {
    tracing::info!(
        "Deploying {} snapshot files to {}",
        snapshots.files.len(),
        repository.uri()
    );
    let sp = spinner("Deploying snapshots...");
    let result = deploy_all(publisher, repository, snapshots, cancel).await;
    sp.finish_and_clear();
    let deployed = result?;

    tracing::info!("Deployed snapshot artifacts to {}", repository.uri());
    status(
        "Deployed",
        &format!("{} snapshot artifacts to {}", snapshots.artifacts.len(), repository.uri()),
    );
    Ok(deployed)
}

async fn deploy_all(
    publisher: &CentralPublisher,
    repository: &SnapshotRepository,
    snapshots: &SnapshotSet,
    cancel: &CancellationToken,
) -> miette::Result<usize> {
    for relative in &snapshots.files {
        if cancel.is_cancelled() {
            return Err(PublishError::Cancelled.into());
        }
        let path = snapshots.path_of(relative);
        snapshot::deploy_file(publisher, repository, relative, &path)
            .await
            .map_err(|e| PublishError::Network {
                message: format!(
                    "Failed to deploy {relative} to {} after at most {} attempts: {}",
                    repository.uri(),
                    repository.attempts(),
                    describe(&e)
                ),
            })?;
        tracing::debug!("Deployed {relative}");
    }
    Ok(snapshots.files.len())
}

fn describe(error: &ClientError) -> String {
    match error {
        ClientError::Transport(rejected) => rejected.to_string(),
        other => other.to_string(),
    }
}
