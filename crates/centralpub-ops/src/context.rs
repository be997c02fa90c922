//! Project discovery and the client settings derived from it.

use std::path::{Path, PathBuf};

use centralpub_bundle::bundle::BundleOptions;
use centralpub_bundle::checksum::ChecksumAlgorithm;
use centralpub_client::poll::PollOptions;
use centralpub_client::{Authentication, CentralPublisher, PublisherConfig, SnapshotRepository};
use centralpub_core::config::GlobalConfig;
use centralpub_core::manifest::Manifest;
use centralpub_util::errors::PublishError;

/// Everything an operation needs to know about the project being published.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    /// Directory holding `Central.toml`.
    pub root: PathBuf,
    pub manifest: Manifest,
    pub global: GlobalConfig,
}

impl ProjectContext {
    pub fn new(root: impl Into<PathBuf>, manifest: Manifest, global: GlobalConfig) -> Self {
        Self {
            root: root.into(),
            manifest,
            global,
        }
    }

    /// Find the nearest `Central.toml` at or above `start` and load the global config.
    pub fn discover(start: &Path) -> miette::Result<Self> {
        let Some((root, manifest)) = Manifest::discover(start)? else {
            return Err(PublishError::Config {
                message: format!(
                    "No {} found in {} or any parent directory",
                    centralpub_core::MANIFEST_FILE,
                    start.display()
                ),
            }
            .into());
        };
        tracing::debug!("Using project root {}", root.display());
        Ok(Self::new(root, manifest, GlobalConfig::load()?))
    }

    /// Request headers for the configured credentials.
    pub fn authentication(&self) -> Authentication {
        let settings = &self.manifest.publish;
        Authentication::build(
            self.global.server(&settings.server_id),
            Manifest::credential(&settings.username),
            Manifest::credential(&settings.password),
            Manifest::credential(&settings.token),
        )
    }

    /// Publisher settings, with `url_override` taking precedence over the manifest.
    pub fn publisher_config(&self, url_override: Option<&str>) -> miette::Result<PublisherConfig> {
        let url = url_override.or(Manifest::credential(&self.manifest.publish.url));
        let config = PublisherConfig::new(url, self.authentication())?;
        tracing::debug!("Publisher config: {config:?}");
        Ok(config)
    }

    /// An initialized client for this project.
    pub fn connect(&self, url_override: Option<&str>) -> miette::Result<CentralPublisher> {
        let config = self.publisher_config(url_override)?;
        tracing::info!("Initializing publisher with url: {}", config.uri());
        Ok(CentralPublisher::connect(config)?)
    }

    /// Snapshot repository, with `url_override` taking precedence over the manifest.
    pub fn snapshot_repository(
        &self,
        url_override: Option<&str>,
    ) -> miette::Result<SnapshotRepository> {
        let url = url_override.or(Manifest::credential(&self.manifest.publish.snapshot_url));
        Ok(SnapshotRepository::new(url)?)
    }

    pub fn poll_options(&self) -> PollOptions {
        PollOptions::from_secs(self.manifest.publish.poll_interval_secs)
    }

    /// Checksum algorithms and exclusions from the manifest.
    pub fn bundle_options(&self) -> miette::Result<BundleOptions> {
        let settings = &self.manifest.publish;
        let algorithms = ChecksumAlgorithm::parse_list(&settings.checksums)?;
        Ok(BundleOptions::with_excludes(algorithms, &settings.exclude))
    }

    /// Absolute build directory for staging and bundles.
    pub fn build_dir(&self) -> PathBuf {
        self.root.join(&self.manifest.publish.build_dir)
    }
}

/// `Deployment-<yyyyMMddHHmmss>` in local time.
pub fn default_deployment_name() -> String {
    chrono::Local::now()
        .format("Deployment-%Y%m%d%H%M%S")
        .to_string()
}
