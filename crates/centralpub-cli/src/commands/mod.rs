//! Command dispatch and handler modules.

mod bundle;
mod publish;
mod release;
mod status;

use miette::Result;
use tokio_util::sync::CancellationToken;

use centralpub_ops::PublishOutcome;
use centralpub_util::errors::PublishError;
use centralpub_util::progress::{status, status_info};

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<()> {
    match cli.command {
        Command::Bundle { repository, output } => bundle::exec(&repository, &output),
        Command::Publish {
            dry_run,
            publishing_type,
            name,
            no_wait,
            url,
            snapshot_url,
        } => {
            let options = centralpub_ops::ops_publish::PublishOptions {
                dry_run,
                publishing_type,
                deployment_name: name,
                no_wait,
                url,
                snapshot_url,
            };
            publish::exec(&options, &cancel).await
        }
        Command::Status { id, wait } => status::exec(&id, wait, &cancel).await,
        Command::Release { id, wait } => release::exec(&id, wait, &cancel).await,
    }
}

fn current_dir() -> Result<std::path::PathBuf> {
    Ok(std::env::current_dir().map_err(PublishError::Io)?)
}

/// Print the user-facing summary of a publish or release run.
fn report(outcome: &PublishOutcome) {
    match outcome {
        PublishOutcome::NothingToPublish => status_info("Skipped", "nothing to publish"),
        PublishOutcome::SnapshotsDeployed { repository, files } => {
            status("Finished", &format!("{files} snapshot files in {repository}"));
        }
        PublishOutcome::BundleOnly { bundle, artifacts } => status(
            "Finished",
            &format!("dry run, {artifacts} artifacts in {}", bundle.display()),
        ),
        PublishOutcome::Uploaded { deployment_id } => {
            println!("{deployment_id}");
        }
        PublishOutcome::Validated { deployment_id } => {
            status_info(
                "Validated",
                &format!("deployment {deployment_id} is waiting for release"),
            );
            println!("{deployment_id}");
        }
        PublishOutcome::Released { deployment_id } => {
            status("Released", &format!("deployment {deployment_id}"));
        }
        PublishOutcome::Published {
            deployment_id,
            purls,
        } => {
            status("Published", &format!("deployment {deployment_id}"));
            for purl in purls {
                println!("{purl}");
            }
        }
    }
}
