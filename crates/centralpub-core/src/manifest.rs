use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use centralpub_util::errors::PublishError;

use crate::deployment::PublishingType;

/// The parsed representation of a `Central.toml` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub publish: PublishSettings,

    /// Modules whose staging repositories are merged into one bundle.
    ///
    /// When empty, `publish.repository` is the single implicit module.
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,
}

/// Settings from the `[publish]` section.
#[derive(Clone, Serialize, Deserialize)]
pub struct PublishSettings {
    /// Base endpoint of the publisher API. Defaults to the Central Portal.
    #[serde(default)]
    pub url: Option<String>,

    /// Maven repository receiving SNAPSHOT versions. Defaults to the Central
    /// snapshot repository.
    #[serde(default, rename = "snapshot-url")]
    pub snapshot_url: Option<String>,

    /// Key into `[servers]` of the global config for the host credential.
    #[serde(default = "default_server_id", rename = "server-id")]
    pub server_id: String,

    #[serde(default, rename = "publishing-type")]
    pub publishing_type: PublishingType,

    #[serde(default, rename = "deployment-name")]
    pub deployment_name: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub token: Option<String>,

    /// Sidecar digest algorithms generated for each artifact.
    #[serde(default = "default_checksums")]
    pub checksums: Vec<String>,

    /// Extra file-name globs excluded from the bundle.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Seconds between status requests. Must be at least 1.
    #[serde(default = "default_poll_interval", rename = "poll-interval-secs")]
    pub poll_interval_secs: u64,

    /// Directory (relative to the project root) for staging and the bundle.
    #[serde(default = "default_build_dir", rename = "build-dir")]
    pub build_dir: String,

    /// Staging repository used when no `[[modules]]` are declared.
    #[serde(default = "default_repository")]
    pub repository: String,

    #[serde(default)]
    pub skip: bool,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            url: None,
            snapshot_url: None,
            server_id: default_server_id(),
            publishing_type: PublishingType::default(),
            deployment_name: None,
            username: None,
            password: None,
            token: None,
            checksums: default_checksums(),
            exclude: Vec::new(),
            poll_interval_secs: default_poll_interval(),
            build_dir: default_build_dir(),
            repository: default_repository(),
            skip: false,
        }
    }
}

impl std::fmt::Debug for PublishSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "***");
        f.debug_struct("PublishSettings")
            .field("url", &self.url)
            .field("snapshot_url", &self.snapshot_url)
            .field("server_id", &self.server_id)
            .field("publishing_type", &self.publishing_type)
            .field("deployment_name", &self.deployment_name)
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("token", &redact(&self.token))
            .field("checksums", &self.checksums)
            .field("exclude", &self.exclude)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("build_dir", &self.build_dir)
            .field("repository", &self.repository)
            .field("skip", &self.skip)
            .finish()
    }
}

fn default_server_id() -> String {
    "central".to_string()
}

fn default_checksums() -> Vec<String> {
    vec!["md5".to_string(), "sha1".to_string()]
}

fn default_poll_interval() -> u64 {
    3
}

fn default_build_dir() -> String {
    "target".to_string()
}

fn default_repository() -> String {
    "target/staging".to_string()
}

/// A module entry from `[[modules]]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub name: String,
    /// Staging repository in Maven layout, relative to the project root.
    pub repository: String,
    #[serde(default)]
    pub skip: bool,
}

impl Manifest {
    /// Load and parse a `Central.toml` file from the given path.
    ///
    /// Before parsing, `${env:VAR}` references in the manifest content are
    /// resolved using `.central.env` (if present alongside `Central.toml`) and
    /// process environment variables.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PublishError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;

        let dir = path.parent().unwrap_or(Path::new("."));
        let env_vars =
            crate::properties::load_env_file(&dir.join(crate::ENV_FILE)).unwrap_or_default();
        let resolved = crate::properties::interpolate(&content, &env_vars);
        tracing::debug!(
            "Loaded {} ({} values from {})",
            path.display(),
            env_vars.len(),
            crate::ENV_FILE
        );

        Self::from_str(&resolved)
    }

    /// Parse a `Central.toml` from a string (no interpolation).
    pub fn from_str(content: &str) -> miette::Result<Self> {
        let manifest: Self = toml::from_str(content).map_err(|e| PublishError::Config {
            message: format!("Failed to parse Central.toml: {e}"),
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> miette::Result<()> {
        if self.publish.poll_interval_secs == 0 {
            return Err(PublishError::Config {
                message: "`poll-interval-secs` in Central.toml must be at least 1".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Find the nearest `Central.toml` at or above `start` and load it.
    ///
    /// Returns the project root alongside the manifest, or `None` when no
    /// manifest exists in any ancestor.
    pub fn discover(start: &Path) -> miette::Result<Option<(PathBuf, Self)>> {
        match centralpub_util::fs::find_ancestor_with(start, crate::MANIFEST_FILE) {
            Some(root) => {
                let manifest = Self::from_path(&root.join(crate::MANIFEST_FILE))?;
                Ok(Some((root, manifest)))
            }
            None => Ok(None),
        }
    }

    /// The modules taking part in a publish run.
    ///
    /// Falls back to a single module named after the `[publish]` repository.
    pub fn effective_modules(&self) -> Vec<ModuleEntry> {
        if !self.modules.is_empty() {
            return self.modules.clone();
        }
        vec![ModuleEntry {
            name: "default".to_string(),
            repository: self.publish.repository.clone(),
            skip: false,
        }]
    }

    /// Empty strings left behind by unset `${env:...}` references count as absent.
    pub fn credential(value: &Option<String>) -> Option<&str> {
        value.as_deref().filter(|v| !v.is_empty())
    }
}
