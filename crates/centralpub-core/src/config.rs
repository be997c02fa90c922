use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Global user configuration loaded from `~/.centralpub/config.toml`.
///
/// Holds credentials shared by every project on the machine, keyed by
/// server id (the `server-id` in a project's `[publish]` section):
///
/// ```toml
/// [servers.central]
/// username = "portal-user-token-name"
/// password = "portal-user-token-secret"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub servers: BTreeMap<String, ServerCredential>,
}

/// Credential pair registered for a server id.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCredential {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for ServerCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerCredential")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl GlobalConfig {
    /// Load the global configuration from `~/.centralpub/config.toml`, or return defaults if the file doesn't exist.
    pub fn load() -> miette::Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load the global configuration from an explicit path, or return defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> miette::Result<Self> {
        if !path.is_file() {
            tracing::debug!("No global config at {}", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            centralpub_util::errors::PublishError::Config {
                message: format!("Failed to read global config {}: {e}", path.display()),
            }
        })?;
        toml::from_str(&content).map_err(|e| {
            centralpub_util::errors::PublishError::Config {
                message: format!("Failed to parse global config: {e}"),
            }
            .into()
        })
    }

    /// Credential registered for `server_id`, if any.
    pub fn server(&self, server_id: &str) -> Option<&ServerCredential> {
        self.servers.get(server_id)
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the centralpub data directory (`~/.centralpub/`).
pub fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".centralpub")
}
