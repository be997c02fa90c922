//! The publisher API client.
//!
//! All requests of one [`CentralPublisher`] go through a single connection
//! slot, so an upload and a status call never overlap.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use centralpub_core::deployment::{DeploymentStatus, PublishingType};
use reqwest::header::CONTENT_LENGTH;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder};
use tokio::sync::Semaphore;
use url::Url;

use crate::config::PublisherConfig;
use crate::error::{ClientError, TransportError};
use crate::uri;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(60);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Anything that can report the status of a deployment.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn status(&self, deployment_id: &str) -> Result<DeploymentStatus, ClientError>;
}

/// Operations of the publisher API.
#[async_trait]
pub trait Publisher: StatusSource {
    /// Upload a bundle and return the deployment id assigned to it.
    async fn upload(
        &self,
        name: Option<&str>,
        publishing_type: PublishingType,
        filename: &str,
        file: tokio::fs::File,
    ) -> Result<String, ClientError>;

    /// Release a validated deployment.
    async fn publish(&self, deployment_id: &str) -> Result<(), ClientError>;

    /// Release the transport. Later calls fail with a usage error.
    async fn close(&self) -> Result<(), ClientError>;
}

#[derive(Clone)]
struct Transport {
    client: reqwest::Client,
    config: PublisherConfig,
    slot: Arc<Semaphore>,
}

enum ClientState {
    Uninitialized,
    Open(Transport),
    Closed,
}

/// [`Publisher`] backed by `reqwest`.
pub struct CentralPublisher {
    state: Mutex<ClientState>,
}

impl Default for CentralPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CentralPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &*self.lock() {
            ClientState::Uninitialized => "uninitialized",
            ClientState::Open(_) => "open",
            ClientState::Closed => "closed",
        };
        f.debug_struct("CentralPublisher")
            .field("state", &state)
            .finish()
    }
}

impl CentralPublisher {
    /// A client that must be [initialized](Self::initialize) before use.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ClientState::Uninitialized),
        }
    }

    /// Create and initialize a client in one step.
    pub fn connect(config: PublisherConfig) -> Result<Self, ClientError> {
        let publisher = Self::new();
        publisher.initialize(config)?;
        Ok(publisher)
    }

    /// Record `config` and open the HTTP transport. Allowed exactly once.
    pub fn initialize(&self, config: PublisherConfig) -> Result<(), ClientError> {
        let mut state = self.lock();
        match &*state {
            ClientState::Uninitialized => {}
            ClientState::Open(_) => {
                return Err(ClientError::usage("Publisher is already initialized"))
            }
            ClientState::Closed => return Err(ClientError::usage("Publisher has been closed")),
        }

        let client = reqwest::Client::builder()
            .user_agent(crate::USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(1)
            .build()
            .map_err(ClientError::Connectivity)?;

        tracing::debug!("Publisher initialized for {}", config.uri());
        *state = ClientState::Open(Transport {
            client,
            config,
            slot: Arc::new(Semaphore::new(1)),
        });
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, ClientState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn transport(&self) -> Result<Transport, ClientError> {
        match &*self.lock() {
            ClientState::Open(transport) => Ok(transport.clone()),
            ClientState::Uninitialized => Err(ClientError::usage("Publisher is not initialized")),
            ClientState::Closed => Err(ClientError::usage("Publisher has been closed")),
        }
    }
}

impl Transport {
    /// Send one request beneath the publisher URI and return the body of a
    /// 2xx response.
    async fn execute(
        &self,
        method: Method,
        segment: &str,
        query: Option<&str>,
        form: Option<Form>,
    ) -> Result<String, ClientError> {
        let uri = uri::join(self.config.uri(), segment, query)?;
        let mut request = self.client.request(method.clone(), uri.clone());
        if let Some(form) = form {
            request = request.multipart(form);
        }
        self.send(&method, &uri, request).await
    }

    /// Authenticate and send `request` once the connection slot is free.
    ///
    /// A non-2xx response is a [`TransportError`] even when its body cannot be
    /// read, so rejected requests keep their status code.
    async fn send(
        &self,
        method: &Method,
        uri: &Url,
        request: RequestBuilder,
    ) -> Result<String, ClientError> {
        let _permit = self
            .slot
            .acquire()
            .await
            .map_err(|_| ClientError::usage("Publisher has been closed"))?;

        tracing::debug!("{method} {uri}");
        let response = self
            .config
            .authentication()
            .apply(request)
            .send()
            .await
            .map_err(ClientError::Connectivity)?;
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if status.is_success() => return Err(ClientError::Connectivity(e)),
            Err(e) => {
                tracing::debug!("Could not read the body of a {status} response: {e}");
                String::new()
            }
        };
        tracing::debug!("{status} from {uri}");

        if !status.is_success() {
            return Err(ClientError::Transport(TransportError { status, body }));
        }
        Ok(body)
    }
}

impl CentralPublisher {
    /// Stream the file at `path` to `target` with an authenticated `PUT`.
    ///
    /// Used for Maven repositories outside the publisher API, sharing its
    /// client and connection slot.
    pub async fn put_file(&self, target: &Url, path: &Path) -> Result<(), ClientError> {
        let transport = self.transport()?;
        let file = tokio::fs::File::open(path).await?;
        let length = file.metadata().await?.len();
        let request = transport
            .client
            .put(target.clone())
            .header(CONTENT_LENGTH, length)
            .body(reqwest::Body::from(file));
        transport.send(&Method::PUT, target, request).await?;
        Ok(())
    }
}

#[async_trait]
impl StatusSource for CentralPublisher {
    async fn status(&self, deployment_id: &str) -> Result<DeploymentStatus, ClientError> {
        let transport = self.transport()?;
        let query = uri::to_query_string(&[("id", deployment_id)]);
        let body = transport
            .execute(Method::GET, "publisher/status", Some(&query), None)
            .await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Decode {
            message: format!("invalid deployment status: {e}"),
        })
    }
}

#[async_trait]
impl Publisher for CentralPublisher {
    async fn upload(
        &self,
        name: Option<&str>,
        publishing_type: PublishingType,
        filename: &str,
        file: tokio::fs::File,
    ) -> Result<String, ClientError> {
        let transport = self.transport()?;

        let mut params = Vec::with_capacity(2);
        if let Some(name) = name {
            params.push(("name", name));
        }
        params.push(("publishingType", publishing_type.as_str()));
        let query = uri::to_query_string(&params);

        let length = file.metadata().await?.len();
        let part = Part::stream_with_length(reqwest::Body::from(file), length)
            .file_name(filename.to_string())
            .mime_str("application/octet-stream")
            .map_err(ClientError::Connectivity)?;
        let form = Form::new().part("bundle", part);

        tracing::info!("Uploading {filename} ({length} bytes)");
        let body = transport
            .execute(Method::POST, "publisher/upload", Some(&query), Some(form))
            .await?;
        Ok(body.trim().to_string())
    }

    async fn publish(&self, deployment_id: &str) -> Result<(), ClientError> {
        let transport = self.transport()?;
        let segment = format!("publisher/deployment/{deployment_id}");
        transport.execute(Method::POST, &segment, None, None).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), ClientError> {
        let mut state = self.lock();
        match std::mem::replace(&mut *state, ClientState::Closed) {
            ClientState::Open(transport) => {
                transport.slot.close();
                tracing::debug!("Publisher closed");
                Ok(())
            }
            ClientState::Uninitialized => {
                *state = ClientState::Uninitialized;
                Err(ClientError::usage("Publisher is not initialized"))
            }
            ClientState::Closed => Err(ClientError::usage("Publisher is already closed")),
        }
    }
}
