//! Operation: stage, bundle, upload and wait for a deployment.

use std::path::{Path, PathBuf};

use centralpub_bundle::bundle;
use centralpub_bundle::snapshot::{self, SnapshotSet};
use centralpub_bundle::staging;
use centralpub_client::poll::poll_until_terminal;
use centralpub_client::{CentralPublisher, Publisher, SnapshotRepository};
use centralpub_core::deployment::PublishingType;
use centralpub_core::manifest::Manifest;
use centralpub_util::errors::PublishError;
use centralpub_util::progress::{display_size, spinner, status, status_info};
use tokio_util::sync::CancellationToken;

use crate::context::{default_deployment_name, ProjectContext};
use crate::ops_snapshot::deploy_snapshots;
use crate::outcome::{poll_error, settle, PublishOutcome};
use crate::session::{ModuleState, PublishSession};

/// File name of the archive uploaded to the service.
pub const BUNDLE_FILE: &str = "bundle.zip";

/// Command-line overrides for a publish run.
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    /// Assemble the bundle but do not upload it.
    pub dry_run: bool,
    pub publishing_type: Option<PublishingType>,
    pub deployment_name: Option<String>,
    /// Return right after the upload instead of polling.
    pub no_wait: bool,
    pub url: Option<String>,
    pub snapshot_url: Option<String>,
}

/// Publish every pending module of the project.
///
/// Snapshot versions go to the snapshot repository first; release artifacts
/// are bundled and uploaded as one deployment.
pub async fn publish(
    ctx: &ProjectContext,
    options: &PublishOptions,
    cancel: &CancellationToken,
) -> miette::Result<PublishOutcome> {
    let settings = &ctx.manifest.publish;
    let modules = ctx.manifest.effective_modules();

    let mut session = PublishSession::new(modules.iter().map(|m| m.name.clone()));
    for module in &modules {
        let state = if settings.skip || module.skip {
            ModuleState::Skipped
        } else {
            ModuleState::Pending
        };
        session.mark(&module.name, state)?;
    }

    let pending = session.pending()?;
    if pending.is_empty() {
        tracing::info!("All modules are skipped");
        return Ok(PublishOutcome::NothingToPublish);
    }
    let repositories: Vec<PathBuf> = modules
        .iter()
        .filter(|m| pending.contains(&m.name.as_str()))
        .map(|m| ctx.root.join(&m.repository))
        .collect();

    let output_dir = create_output_dir(&ctx.build_dir())?;
    tracing::info!("Output directory: {}", output_dir.display());

    let staging_dir = output_dir.join("staging");
    staging::stage_modules(&repositories, &staging_dir)?;

    let bundle_options = ctx.bundle_options()?;
    let snapshots =
        snapshot::split_snapshots(&staging_dir, &output_dir.join("snapshots"), &bundle_options)?;

    let archive = output_dir.join(BUNDLE_FILE);
    let sp = spinner("Assembling bundle...");
    let assembled = bundle::assemble(&staging_dir, &archive, &bundle_options);
    sp.finish_and_clear();
    let assembled = assembled?;

    if assembled.is_empty() && snapshots.is_empty() {
        tracing::info!("No artifacts to publish");
        return Ok(PublishOutcome::NothingToPublish);
    }
    if !assembled.is_empty() {
        let size = assembled.archive_size().map_err(PublishError::Io)?;
        tracing::info!(
            "Bundle {} created successfully, size: {}",
            archive.display(),
            display_size(size)
        );
        status(
            "Bundled",
            &format!("{} artifacts ({})", assembled.artifacts.len(), display_size(size)),
        );
    }

    if options.dry_run {
        if !snapshots.is_empty() {
            status_info(
                "Skipping",
                &format!("{} snapshot artifacts (dry run)", snapshots.artifacts.len()),
            );
        }
        return Ok(PublishOutcome::BundleOnly {
            bundle: archive,
            artifacts: assembled.artifacts.len(),
        });
    }

    let repository = if snapshots.is_empty() {
        None
    } else {
        Some(ctx.snapshot_repository(options.snapshot_url.as_deref())?)
    };
    let publisher = ctx.connect(options.url.as_deref())?;
    let result = deploy(
        ctx,
        &publisher,
        repository.as_ref(),
        &snapshots,
        (!assembled.is_empty()).then_some(archive.as_path()),
        options,
        cancel,
    )
    .await;
    if let Err(e) = publisher.close().await {
        tracing::debug!("Closing publisher: {e}");
    }
    result
}

async fn deploy(
    ctx: &ProjectContext,
    publisher: &CentralPublisher,
    repository: Option<&SnapshotRepository>,
    snapshots: &SnapshotSet,
    archive: Option<&Path>,
    options: &PublishOptions,
    cancel: &CancellationToken,
) -> miette::Result<PublishOutcome> {
    let mut deployed = 0;
    if let Some(repository) = repository {
        deployed = deploy_snapshots(publisher, repository, snapshots, cancel).await?;
    }

    let Some(archive) = archive else {
        return Ok(PublishOutcome::SnapshotsDeployed {
            repository: repository.map(|r| r.uri().to_string()).unwrap_or_default(),
            files: deployed,
        });
    };

    let settings = &ctx.manifest.publish;
    let name = options
        .deployment_name
        .clone()
        .or_else(|| Manifest::credential(&settings.deployment_name).map(str::to_string))
        .unwrap_or_else(default_deployment_name);
    let publishing_type = options.publishing_type.unwrap_or(settings.publishing_type);
    upload_and_wait(ctx, publisher, archive, &name, publishing_type, options, cancel).await
}

async fn upload_and_wait(
    ctx: &ProjectContext,
    publisher: &CentralPublisher,
    archive: &Path,
    name: &str,
    publishing_type: PublishingType,
    options: &PublishOptions,
    cancel: &CancellationToken,
) -> miette::Result<PublishOutcome> {
    tracing::info!(
        "Uploading {} with deployment name: {name}, publishing type: {publishing_type}",
        archive.display()
    );
    let file = tokio::fs::File::open(archive)
        .await
        .map_err(PublishError::Io)?;

    let sp = spinner("Uploading bundle...");
    let uploaded = publisher
        .upload(Some(name), publishing_type, BUNDLE_FILE, file)
        .await;
    sp.finish_and_clear();
    let deployment_id = uploaded?;
    tracing::info!("Upload completed with deployment id: {deployment_id}");
    status("Uploaded", &format!("deployment {deployment_id}"));

    if options.no_wait {
        return Ok(PublishOutcome::Uploaded { deployment_id });
    }

    let sp = spinner(&format!("Waiting for deployment {deployment_id}..."));
    let polled = poll_until_terminal(publisher, &deployment_id, &ctx.poll_options(), cancel).await;
    sp.finish_and_clear();
    settle(polled.map_err(poll_error)?)
}

/// `<build-dir>/centralpub-XXXXXX`, kept after the run for inspection.
fn create_output_dir(build_dir: &Path) -> miette::Result<PathBuf> {
    centralpub_util::fs::ensure_dir(build_dir).map_err(PublishError::Io)?;
    let dir = tempfile::Builder::new()
        .prefix("centralpub-")
        .tempdir_in(build_dir)
        .map_err(PublishError::Io)?;
    Ok(dir.keep())
}
