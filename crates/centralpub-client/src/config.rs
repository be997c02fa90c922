use url::Url;

use crate::auth::Authentication;
use crate::error::ClientError;

/// Publisher API endpoint of the Central Portal.
pub const DEFAULT_URI: &str = "https://central.sonatype.com/api/v1/";

/// Where to send requests and how to authenticate them.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    uri: Url,
    authentication: Authentication,
}

impl PublisherConfig {
    /// Validate `uri` (or use [`DEFAULT_URI`]) and pair it with `authentication`.
    ///
    /// Only `http` and `https` are accepted. A trailing `/` is appended to the
    /// path so that request paths resolve beneath it.
    pub fn new(uri: Option<&str>, authentication: Authentication) -> Result<Self, ClientError> {
        Ok(Self {
            uri: parse_base(uri, DEFAULT_URI)?,
            authentication,
        })
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn authentication(&self) -> &Authentication {
        &self.authentication
    }
}

/// Parse a base URI for requests, falling back to `default` when blank.
pub(crate) fn parse_base(uri: Option<&str>, default: &str) -> Result<Url, ClientError> {
    let raw = uri.map(str::trim).filter(|u| !u.is_empty()).unwrap_or(default);
    let mut uri = Url::parse(raw).map_err(|e| ClientError::InvalidUri {
        message: format!("`{raw}`: {e}"),
    })?;
    if !matches!(uri.scheme(), "http" | "https") {
        return Err(ClientError::InvalidUri {
            message: format!("`{raw}`: unsupported scheme `{}`", uri.scheme()),
        });
    }
    if !uri.path().ends_with('/') {
        let path = format!("{}/", uri.path());
        uri.set_path(&path);
    }
    Ok(uri)
}
