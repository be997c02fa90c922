//! Polling a deployment until it reaches a terminal state.
//!
//! Retryable failures are logged and retried after the same delay as a
//! non-terminal status. There is no attempt cap: the loop ends on a terminal
//! status, a fatal error, or cancellation.

use std::error::Error;
use std::future::Future;
use std::time::Duration;

use centralpub_core::deployment::DeploymentStatus;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, TransportError};
use crate::publisher::StatusSource;

/// Delay between two status requests.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(3);

/// Shortest delay [`PollOptions::from_secs`] produces.
pub const MIN_DELAY: Duration = Duration::from_secs(1);

/// How a failed attempt is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Stop polling and surface the error.
    Fatal,
    /// Log, wait, and try again.
    Retryable,
}

#[derive(Debug, Clone)]
pub struct PollOptions {
    pub delay: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
        }
    }
}

impl PollOptions {
    /// A delay of `secs` seconds, never shorter than [`MIN_DELAY`].
    pub fn from_secs(secs: u64) -> Self {
        Self {
            delay: Duration::from_secs(secs).max(MIN_DELAY),
        }
    }
}

/// Why polling stopped without a terminal status.
#[derive(Debug, Error)]
pub enum PollError<E> {
    #[error("Status polling stopped: {0}")]
    Fatal(#[source] E),

    #[error("Status polling was cancelled")]
    Cancelled,
}

/// Whether `status` can no longer change.
pub fn is_terminal(status: &DeploymentStatus) -> bool {
    status.deployment_state.is_terminal()
}

/// Find the first [`TransportError`] in `error` or its chain of sources.
pub fn unwrap_cause_chain<'a>(error: &'a (dyn Error + 'static)) -> Option<&'a TransportError> {
    if let Some(transport) = error.downcast_ref::<TransportError>() {
        return Some(transport);
    }
    error.source().and_then(unwrap_cause_chain)
}

/// Rejected credentials and unknown deployments are fatal; anything else
/// (5xx, rate limiting, connectivity, undecodable bodies) is retried.
pub fn classify(error: &(dyn Error + 'static)) -> Classification {
    match unwrap_cause_chain(error).map(TransportError::status_code) {
        Some(401 | 403 | 404) => Classification::Fatal,
        _ => Classification::Retryable,
    }
}

/// Call `op` until it yields a terminal value, a fatal error, or `cancel` fires.
///
/// The sleep between attempts and any in-flight attempt both race the
/// cancellation token.
pub async fn poll_until<T, E, F, Fut>(
    mut op: F,
    is_terminal: impl Fn(&T) -> bool,
    classify: impl Fn(&E) -> Classification,
    delay: Duration,
    cancel: &CancellationToken,
) -> Result<T, PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt: u64 = 0;
    loop {
        attempt += 1;
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PollError::Cancelled),
            outcome = op() => outcome,
        };

        match outcome {
            Ok(value) if is_terminal(&value) => return Ok(value),
            Ok(_) => tracing::debug!(attempt, "not in a terminal state yet"),
            Err(error) => match classify(&error) {
                Classification::Fatal => return Err(PollError::Fatal(error)),
                Classification::Retryable => {
                    tracing::warn!(attempt, error = %error, "status request failed, retrying");
                }
            },
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PollError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

/// Poll the status of `deployment_id` until it is terminal.
///
/// A terminal FAILED status is returned as `Ok`; callers decide how to
/// report it.
pub async fn poll_until_terminal<P>(
    source: &P,
    deployment_id: &str,
    options: &PollOptions,
    cancel: &CancellationToken,
) -> Result<DeploymentStatus, PollError<ClientError>>
where
    P: StatusSource + ?Sized,
{
    let op = || async move {
        let status = source.status(deployment_id).await;
        if let Ok(status) = &status {
            tracing::info!(
                "Deployment {deployment_id} is {}",
                status.deployment_state
            );
        }
        status
    };
    poll_until(
        op,
        is_terminal,
        |error: &ClientError| classify(error),
        options.delay,
        cancel,
    )
    .await
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use centralpub_core::deployment::DeploymentState;
    use mockall::Sequence;
    use reqwest::StatusCode;
    use tokio::time::Instant;

    use super::*;
    use crate::publisher::MockStatusSource;

    const DELAY: Duration = Duration::from_secs(3);

    fn status(state: DeploymentState) -> DeploymentStatus {
        DeploymentStatus::new("dep-1", state)
    }

    fn rejected(code: u16) -> ClientError {
        ClientError::Transport(TransportError {
            status: StatusCode::from_u16(code).unwrap(),
            body: format!("status {code}"),
        })
    }

    fn options() -> PollOptions {
        PollOptions { delay: DELAY }
    }

    fn expect_states(mock: &mut MockStatusSource, seq: &mut Sequence, states: &[DeploymentState]) {
        for &state in states {
            mock.expect_status()
                .times(1)
                .in_sequence(seq)
                .returning(move |_| Ok(status(state)));
        }
    }

    #[test]
    fn terminal_states() {
        assert!(is_terminal(&status(DeploymentState::Published)));
        assert!(is_terminal(&status(DeploymentState::Failed)));
        assert!(is_terminal(&status(DeploymentState::Validated)));
        assert!(!is_terminal(&status(DeploymentState::Pending)));
        assert!(!is_terminal(&status(DeploymentState::Validating)));
        assert!(!is_terminal(&status(DeploymentState::Publishing)));
    }

    #[test]
    fn classify_by_status_code() {
        for code in [401, 403, 404] {
            assert_eq!(classify(&rejected(code)), Classification::Fatal, "{code}");
        }
        for code in [400, 429, 500, 502, 503] {
            assert_eq!(classify(&rejected(code)), Classification::Retryable, "{code}");
        }
        let decode = ClientError::Decode {
            message: "bad json".to_string(),
        };
        assert_eq!(classify(&decode), Classification::Retryable);
    }

    #[test]
    fn classify_looks_through_wrappers() {
        let wrapped: PollError<ClientError> = PollError::Fatal(rejected(403));
        assert_eq!(classify(&wrapped), Classification::Fatal);
        assert_eq!(unwrap_cause_chain(&wrapped).map(TransportError::status_code), Some(403));

        let bare = TransportError {
            status: StatusCode::NOT_FOUND,
            body: String::new(),
        };
        assert_eq!(classify(&bare), Classification::Fatal);
    }

    #[tokio::test(start_paused = true)]
    async fn returns_published_status_with_purls() {
        let mut mock = MockStatusSource::new();
        mock.expect_status().times(1).returning(|_| {
            let mut published = status(DeploymentState::Published);
            published.purls = Some(vec!["pkg:maven/com.example/demo@1.0.0".to_string()]);
            Ok(published)
        });

        let start = Instant::now();
        let result = poll_until_terminal(&mock, "dep-1", &options(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.deployment_state, DeploymentState::Published);
        assert_eq!(result.purls.unwrap().len(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn returns_failed_status_with_errors() {
        let mut mock = MockStatusSource::new();
        let mut seq = Sequence::new();
        expect_states(&mut mock, &mut seq, &[DeploymentState::Pending]);
        let mut errors = BTreeMap::new();
        errors.insert(
            "pkg:maven/com.example/demo@1.0.0".to_string(),
            vec!["Missing signature".to_string(), "Invalid POM".to_string()],
        );
        errors.insert(
            "pkg:maven/com.example/demo-extra@1.0.0".to_string(),
            vec!["Missing javadoc".to_string()],
        );
        let reported = errors.clone();
        mock.expect_status()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| {
                let mut failed = status(DeploymentState::Failed);
                failed.errors = Some(reported.clone());
                Ok(failed)
            });

        let result = poll_until_terminal(&mock, "dep-1", &options(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.deployment_state, DeploymentState::Failed);
        assert_eq!(result.errors, Some(errors));
    }

    #[tokio::test(start_paused = true)]
    async fn waits_between_non_terminal_observations() {
        let mut mock = MockStatusSource::new();
        let mut seq = Sequence::new();
        expect_states(
            &mut mock,
            &mut seq,
            &[DeploymentState::Publishing, DeploymentState::Published],
        );

        let start = Instant::now();
        let result = poll_until_terminal(&mock, "dep-1", &options(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.deployment_state, DeploymentState::Published);
        let elapsed = start.elapsed();
        assert!(elapsed >= DELAY, "{elapsed:?}");
        assert!(elapsed < DELAY * 2, "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn stops_at_validated() {
        let mut mock = MockStatusSource::new();
        let mut seq = Sequence::new();
        expect_states(
            &mut mock,
            &mut seq,
            &[DeploymentState::Pending, DeploymentState::Validating, DeploymentState::Validated],
        );

        let result = poll_until_terminal(&mock, "dep-1", &options(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.deployment_state, DeploymentState::Validated);
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_status_codes_stop_immediately() {
        for code in [401u16, 403, 404] {
            let mut mock = MockStatusSource::new();
            mock.expect_status()
                .times(1)
                .returning(move |_| Err(rejected(code)));

            let start = Instant::now();
            let err = poll_until_terminal(&mock, "dep-1", &options(), &CancellationToken::new())
                .await
                .unwrap_err();
            assert_eq!(start.elapsed(), Duration::ZERO, "{code}");

            let PollError::Fatal(cause) = &err else {
                panic!("expected fatal error, got {err:?}");
            };
            assert_eq!(cause.status().map(|s| s.as_u16()), Some(code));
            let transport = err
                .source()
                .and_then(|e| e.source())
                .and_then(|e| e.downcast_ref::<TransportError>());
            assert_eq!(transport.map(TransportError::status_code), Some(code));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_fourth_attempt() {
        let mut mock = MockStatusSource::new();
        let mut seq = Sequence::new();
        mock.expect_status()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(rejected(500)));
        mock.expect_status()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(rejected(503)));
        mock.expect_status()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Err(ClientError::Decode {
                    message: "truncated body".to_string(),
                })
            });
        expect_states(&mut mock, &mut seq, &[DeploymentState::Published]);

        let start = Instant::now();
        let result = poll_until_terminal(&mock, "dep-1", &options(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.deployment_state, DeploymentState::Published);
        assert!(start.elapsed() >= DELAY * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn three_non_terminal_states_then_published() {
        let mut mock = MockStatusSource::new();
        let mut seq = Sequence::new();
        expect_states(
            &mut mock,
            &mut seq,
            &[
                DeploymentState::Pending,
                DeploymentState::Validating,
                DeploymentState::Publishing,
                DeploymentState::Published,
            ],
        );

        let start = Instant::now();
        let result = poll_until_terminal(&mock, "dep-1", &options(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.deployment_state, DeploymentState::Published);
        let elapsed = start.elapsed();
        assert!(elapsed >= DELAY * 3, "{elapsed:?}");
        assert!(elapsed < DELAY * 4, "{elapsed:?}");
    }

    #[test]
    fn zero_interval_is_raised_to_minimum() {
        assert_eq!(PollOptions::from_secs(0).delay, MIN_DELAY);
        assert_eq!(PollOptions::from_secs(5).delay, Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_does_not_busy_loop() {
        let mut mock = MockStatusSource::new();
        let mut seq = Sequence::new();
        expect_states(
            &mut mock,
            &mut seq,
            &[DeploymentState::Pending, DeploymentState::Pending, DeploymentState::Published],
        );

        let start = Instant::now();
        let result = poll_until_terminal(
            &mock,
            "dep-1",
            &PollOptions::from_secs(0),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(result.deployment_state, DeploymentState::Published);
        assert!(start.elapsed() >= MIN_DELAY * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_first_attempt() {
        let mut mock = MockStatusSource::new();
        mock.expect_status().never();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = poll_until_terminal(&mock, "dep-1", &options(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_the_delay() {
        let mut mock = MockStatusSource::new();
        mock.expect_status()
            .returning(|_| Ok(status(DeploymentState::Pending)));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(7)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let err = poll_until_terminal(&mock, "dep-1", &options(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(9));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_abandons_in_flight_attempt() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let result: Result<DeploymentStatus, PollError<ClientError>> = poll_until(
            || std::future::pending::<Result<DeploymentStatus, ClientError>>(),
            is_terminal,
            |error: &ClientError| classify(error),
            DELAY,
            &cancel,
        )
        .await;

        assert!(matches!(result, Err(PollError::Cancelled)));
    }
}
