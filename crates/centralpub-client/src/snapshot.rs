//! Deploying SNAPSHOT files to a Maven snapshot repository.
//!
//! The publisher API only accepts releases. Snapshot versions are sent file by
//! file with `PUT` requests, each retried a bounded number of times.

use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::config::parse_base;
use crate::error::ClientError;
use crate::poll::{classify, Classification};
use crate::publisher::CentralPublisher;
use crate::uri;

/// Snapshot repository of the Central Portal.
pub const DEFAULT_SNAPSHOT_URI: &str = "https://central.sonatype.com/repository/maven-snapshots/";

/// Attempts per file before giving up.
pub const DEFAULT_ATTEMPTS: u32 = 5;

/// Base delay between attempts; attempt `n` waits `n` times this.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Where snapshot files go and how hard to try.
#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    uri: Url,
    attempts: u32,
    retry_delay: Duration,
}

impl SnapshotRepository {
    /// Validate `uri` (or use [`DEFAULT_SNAPSHOT_URI`]) with the default retry policy.
    pub fn new(uri: Option<&str>) -> Result<Self, ClientError> {
        Ok(Self {
            uri: parse_base(uri, DEFAULT_SNAPSHOT_URI)?,
            attempts: DEFAULT_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    /// Override the retry policy. At least one attempt is always made.
    pub fn with_retry(mut self, attempts: u32, retry_delay: Duration) -> Self {
        self.attempts = attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Target URL of a file at `relative` (a `/`-separated repository path).
    pub fn target(&self, relative: &str) -> Result<Url, ClientError> {
        uri::join(&self.uri, relative, None)
    }
}

/// Upload one file to `repository` at `relative`.
///
/// Rejected credentials and missing repositories (401/403/404) fail at once;
/// other HTTP and connectivity failures are retried up to the repository's
/// attempt limit.
pub async fn deploy_file(
    publisher: &CentralPublisher,
    repository: &SnapshotRepository,
    relative: &str,
    path: &Path,
) -> Result<(), ClientError> {
    let target = repository.target(relative)?;
    let mut attempt = 0;
    loop {
        attempt += 1;
        match publisher.put_file(&target, path).await {
            Ok(()) => return Ok(()),
            Err(error) if attempt < repository.attempts && worth_retrying(&error) => {
                tracing::warn!(attempt, error = %error, "Deploying {relative} failed, retrying");
                tokio::time::sleep(repository.retry_delay * attempt).await;
            }
            Err(error) => return Err(error),
        }
    }
}

fn worth_retrying(error: &ClientError) -> bool {
    matches!(
        error,
        ClientError::Transport(_) | ClientError::Connectivity(_)
    ) && classify(error) == Classification::Retryable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use reqwest::StatusCode;

    #[test]
    fn defaults_to_central_snapshots() {
        let repository = SnapshotRepository::new(None).unwrap();
        assert_eq!(repository.uri().as_str(), DEFAULT_SNAPSHOT_URI);
        assert_eq!(repository.attempts(), DEFAULT_ATTEMPTS);
    }

    #[test]
    fn target_resolves_beneath_repository() {
        let repository = SnapshotRepository::new(Some("http://localhost:8081/snapshots")).unwrap();
        let target = repository
            .target("com/example/demo/1.1-SNAPSHOT/demo-1.1-SNAPSHOT.jar")
            .unwrap();
        assert_eq!(
            target.as_str(),
            "http://localhost:8081/snapshots/com/example/demo/1.1-SNAPSHOT/demo-1.1-SNAPSHOT.jar"
        );
    }

    #[test]
    fn at_least_one_attempt() {
        let repository = SnapshotRepository::new(None)
            .unwrap()
            .with_retry(0, Duration::ZERO);
        assert_eq!(repository.attempts(), 1);
    }

    #[test]
    fn only_server_side_failures_are_retried() {
        let rejected = |code| {
            ClientError::Transport(TransportError {
                status: StatusCode::from_u16(code).unwrap(),
                body: String::new(),
            })
        };
        assert!(worth_retrying(&rejected(500)));
        assert!(worth_retrying(&rejected(429)));
        assert!(!worth_retrying(&rejected(401)));
        assert!(!worth_retrying(&rejected(404)));
        assert!(!worth_retrying(&ClientError::Usage {
            message: "closed".to_string()
        }));
    }
}
