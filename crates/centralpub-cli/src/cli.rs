//! CLI argument definitions for centralpub.

use std::path::PathBuf;

use centralpub_core::deployment::PublishingType;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "centralpub",
    version,
    about = "Bundle Maven artifacts and publish them to the Central Portal",
    long_about = "centralpub checksums a Maven-layout staging repository, zips it into a \
                  deployment bundle, uploads it to the Central Portal publisher API and waits \
                  for the deployment to be validated or published."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Assemble a bundle from a local repository without uploading it
    Bundle {
        /// Maven-layout repository to bundle
        repository: PathBuf,
        /// Archive to write
        #[arg(short, long, default_value = "bundle.zip")]
        output: PathBuf,
    },

    /// Bundle the project's staging repositories and publish them
    Publish {
        /// Build the bundle but do not upload it
        #[arg(long)]
        dry_run: bool,
        /// AUTOMATIC or USER_MANAGED (overrides Central.toml)
        #[arg(long)]
        publishing_type: Option<PublishingType>,
        /// Deployment name (defaults to Deployment-<timestamp>)
        #[arg(long)]
        name: Option<String>,
        /// Return after the upload instead of waiting for the outcome
        #[arg(long)]
        no_wait: bool,
        /// Publisher API base URL (overrides Central.toml)
        #[arg(long, env = "CENTRALPUB_URL")]
        url: Option<String>,
        /// Snapshot repository URL (overrides Central.toml)
        #[arg(long, env = "CENTRALPUB_SNAPSHOT_URL")]
        snapshot_url: Option<String>,
    },

    /// Show the status of a deployment
    Status {
        /// Deployment id returned by the upload
        id: String,
        /// Poll until the deployment reaches a terminal state
        #[arg(long)]
        wait: bool,
    },

    /// Release a validated USER_MANAGED deployment
    Release {
        /// Deployment id returned by the upload
        id: String,
        /// Wait until the deployment is published
        #[arg(long)]
        wait: bool,
    },
}

/// Parse command-line arguments into a [`Cli`] struct.
pub fn parse() -> Cli {
    Cli::parse()
}
