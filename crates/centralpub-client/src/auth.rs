//! Authentication headers for the publisher API.
//!
//! Credentials come from three places, first match wins:
//!
//! 1. a user token (`token` in `Central.toml`), sent as-is;
//! 2. `username` + `password` in `Central.toml`;
//! 3. the `[servers.<id>]` entry of `~/.centralpub/config.toml`.
//!
//! A username/password pair is sent as `Bearer base64(username:password)`,
//! the encoding the Central Portal expects for user tokens.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use centralpub_core::config::ServerCredential;
use reqwest::header::AUTHORIZATION;
use reqwest::RequestBuilder;

/// Immutable header set attached to every request.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Authentication {
    headers: BTreeMap<String, String>,
}

impl Authentication {
    /// No credentials.
    pub fn none() -> Self {
        Self::default()
    }

    /// `Authorization: Bearer <token>`.
    pub fn bearer(token: &str) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(AUTHORIZATION.as_str().to_string(), format!("Bearer {token}"));
        Self { headers }
    }

    /// Bearer token derived from a username/password pair.
    pub fn user_token(username: &str, password: &str) -> Self {
        Self::bearer(&STANDARD.encode(format!("{username}:{password}")))
    }

    /// Pick the first usable credential source. Empty strings count as absent.
    pub fn build(
        host: Option<&ServerCredential>,
        username: Option<&str>,
        password: Option<&str>,
        token: Option<&str>,
    ) -> Self {
        if let Some(token) = present(token) {
            tracing::debug!("Authenticating with user token");
            return Self::bearer(token);
        }
        if let (Some(user), Some(pass)) = (present(username), present(password)) {
            tracing::debug!("Authenticating as {user} from project settings");
            return Self::user_token(user, pass);
        }
        if let Some(host) = host {
            if let (Some(user), Some(pass)) = (
                present(host.username.as_deref()),
                present(host.password.as_deref()),
            ) {
                tracing::debug!("Authenticating as {user} from server credentials");
                return Self::user_token(user, pass);
            }
        }
        tracing::debug!("No credentials configured");
        Self::none()
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Attach every header to `request`.
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        self.headers
            .iter()
            .fold(request, |request, (name, value)| request.header(name, value))
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl std::fmt::Debug for Authentication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.headers.keys().map(|name| (name, "***")))
            .finish()
    }
}
