use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::auth::Token;
use crate::client::{CircleCiClient, RequestSpec};
use crate::error::Result;
use crate::types::Pipeline;

pub const DEFAULT_TIMEOUT_SECS: u64 = 1800;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Polling,
    Success,
    Failed,
    Error,
    Canceled,
    Timeout,
}

impl PollState {
    /// Map a pipeline state reported by the API. Anything not terminal keeps
    /// the poller polling.
    pub fn from_pipeline_state(state: &str) -> Self {
        match state {
            "success" => PollState::Success,
            "failed" => PollState::Failed,
            "error" | "errored" => PollState::Error,
            "canceled" | "cancelled" => PollState::Canceled,
            _ => PollState::Polling,
        }
    }

    pub fn is_terminal(self) -> bool {
        self != PollState::Polling
    }
}

impl fmt::Display for PollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PollState::Polling => "polling",
            PollState::Success => "success",
            PollState::Failed => "failed",
            PollState::Error => "error",
            PollState::Canceled => "canceled",
            PollState::Timeout => "timeout",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitResult {
    pub success: bool,
    /// Terminal state as reported by the API, or `timeout`
    pub status: String,
    pub pipeline_id: String,
    /// Seconds since polling started
    pub elapsed: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}

/// Where the poller reads the current pipeline state from.
#[async_trait]
pub trait PipelineStateSource: Send + Sync {
    async fn pipeline_state(&self, pipeline_id: &str) -> Result<String>;
}

#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by the tokio timer.
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Reads `GET pipeline/{id}` through the API client.
pub struct ClientStateSource<'a> {
    client: &'a CircleCiClient,
    token: Token,
}

impl<'a> ClientStateSource<'a> {
    pub fn new(client: &'a CircleCiClient, token: Token) -> Self {
        Self { client, token }
    }
}

#[async_trait]
impl PipelineStateSource for ClientStateSource<'_> {
    async fn pipeline_state(&self, pipeline_id: &str) -> Result<String> {
        let pipeline: Pipeline = self
            .client
            .fetch(&RequestSpec::get(
                format!("pipeline/{pipeline_id}"),
                self.token.clone(),
            ))
            .await?;
        Ok(pipeline.state)
    }
}

/// Poll a pipeline until it reaches a terminal state or the timeout passes.
///
/// The deadline is checked before every fetch, so no request is made once
/// it has passed. Fetch errors end the loop and are returned as-is.
pub async fn wait_for_pipeline<S, C>(
    source: &S,
    clock: &C,
    pipeline_id: &str,
    options: WaitOptions,
) -> Result<WaitResult>
where
    S: PipelineStateSource + ?Sized,
    C: Clock + ?Sized,
{
    let started = clock.now();
    // A timeout too large to represent as an instant means no deadline.
    let deadline = started.checked_add(options.timeout);
    let elapsed = |now: Instant| now.duration_since(started).as_secs_f64();

    info!(
        "Waiting for pipeline {pipeline_id} (timeout {}s, interval {}s)",
        options.timeout.as_secs(),
        options.poll_interval.as_secs()
    );

    loop {
        let now = clock.now();
        if deadline.is_some_and(|deadline| now > deadline) {
            warn!(
                "Timed out after {}s waiting for pipeline {pipeline_id}",
                options.timeout.as_secs()
            );
            return Ok(WaitResult {
                success: false,
                status: PollState::Timeout.to_string(),
                pipeline_id: pipeline_id.to_string(),
                elapsed: elapsed(now),
            });
        }

        let state = source.pipeline_state(pipeline_id).await?;
        let poll_state = PollState::from_pipeline_state(&state);

        if poll_state.is_terminal() {
            let elapsed = elapsed(clock.now());
            info!("Pipeline {pipeline_id} finished with state '{state}' after {elapsed:.1}s");
            return Ok(WaitResult {
                success: poll_state == PollState::Success,
                status: state,
                pipeline_id: pipeline_id.to_string(),
                elapsed,
            });
        }

        debug!(
            "Pipeline {pipeline_id} is '{state}', next check in {}s",
            options.poll_interval.as_secs()
        );
        clock.sleep(options.poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CircleCiError;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct FakeClock {
        start: Instant,
        offset: Mutex<Duration>,
        sleeps: Mutex<Vec<Duration>>,
    }

    impl FakeClock {
        fn new() -> Self {
            Self {
                start: Instant::now(),
                offset: Mutex::new(Duration::ZERO),
                sleeps: Mutex::new(Vec::new()),
            }
        }

        fn elapsed(&self) -> Duration {
            *self.offset.lock().unwrap()
        }

        fn sleep_count(&self) -> usize {
            self.sleeps.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Clock for FakeClock {
        fn now(&self) -> Instant {
            self.start + self.elapsed()
        }

        async fn sleep(&self, duration: Duration) {
            *self.offset.lock().unwrap() += duration;
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    struct FakeSource<'a> {
        clock: &'a FakeClock,
        states: Mutex<VecDeque<Result<String>>>,
        fetched_at: Mutex<Vec<Duration>>,
    }

    impl<'a> FakeSource<'a> {
        fn new(clock: &'a FakeClock, states: Vec<Result<String>>) -> Self {
            Self {
                clock,
                states: Mutex::new(states.into()),
                fetched_at: Mutex::new(Vec::new()),
            }
        }

        fn fetches(&self) -> Vec<Duration> {
            self.fetched_at.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PipelineStateSource for FakeSource<'_> {
        async fn pipeline_state(&self, _pipeline_id: &str) -> Result<String> {
            self.fetched_at.lock().unwrap().push(self.clock.elapsed());
            self.states
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("pending".to_string()))
        }
    }

    fn options(timeout: u64, interval: u64) -> WaitOptions {
        WaitOptions {
            timeout: Duration::from_secs(timeout),
            poll_interval: Duration::from_secs(interval),
        }
    }

    #[tokio::test]
    async fn test_sleeps_between_fetches_until_success() {
        let clock = FakeClock::new();
        let source = FakeSource::new(
            &clock,
            vec![
                Ok("pending".to_string()),
                Ok("pending".to_string()),
                Ok("success".to_string()),
            ],
        );

        let result = wait_for_pipeline(&source, &clock, "pipe-1", options(1800, 30))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.status, "success");
        assert_eq!(result.pipeline_id, "pipe-1");
        assert_eq!(result.elapsed, 60.0);
        assert_eq!(clock.sleep_count(), 2);
        assert_eq!(source.fetches().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_state_is_terminal() {
        let clock = FakeClock::new();
        let source = FakeSource::new(&clock, vec![Ok("failed".to_string())]);

        let result = wait_for_pipeline(&source, &clock, "pipe-1", options(1800, 30))
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.status, "failed");
        assert_eq!(clock.sleep_count(), 0);
    }

    #[tokio::test]
    async fn test_timeout_without_fetch_after_deadline() {
        let clock = FakeClock::new();
        let source = FakeSource::new(&clock, vec![]);

        let result = wait_for_pipeline(&source, &clock, "pipe-1", options(100, 30))
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.status, "timeout");
        assert_eq!(result.elapsed, 120.0);

        let fetches = source.fetches();
        assert_eq!(fetches.len(), 4);
        assert!(fetches.iter().all(|at| *at <= Duration::from_secs(100)));
    }

    #[tokio::test]
    async fn test_unbounded_timeout_keeps_polling() {
        let clock = FakeClock::new();
        let source = FakeSource::new(
            &clock,
            vec![Ok("running".to_string()), Ok("success".to_string())],
        );
        let options = WaitOptions {
            timeout: Duration::MAX,
            poll_interval: Duration::from_secs(30),
        };

        let result = wait_for_pipeline(&source, &clock, "pipe-1", options)
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.elapsed, 30.0);
        assert_eq!(source.fetches().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_error_aborts() {
        let clock = FakeClock::new();
        let source = FakeSource::new(
            &clock,
            vec![
                Ok("running".to_string()),
                Err(CircleCiError::Api {
                    status: 404,
                    body: "Pipeline not found".to_string(),
                }),
            ],
        );

        let err = wait_for_pipeline(&source, &clock, "pipe-1", options(1800, 30))
            .await
            .unwrap_err();

        assert!(matches!(err, CircleCiError::Api { status: 404, .. }));
        assert_eq!(source.fetches().len(), 2);
    }

    #[test]
    fn test_state_mapping() {
        assert_eq!(PollState::from_pipeline_state("created"), PollState::Polling);
        assert_eq!(PollState::from_pipeline_state("errored"), PollState::Error);
        assert_eq!(PollState::from_pipeline_state("canceled"), PollState::Canceled);
        assert!(PollState::Timeout.is_terminal());
        assert!(!PollState::Polling.is_terminal());
        assert_eq!(PollState::Timeout.to_string(), "timeout");
    }

    #[tokio::test]
    async fn test_client_source_reads_pipeline_state() {
        let mut server = mockito::Server::new_async().await;
        let config = crate::config::ApiConfig {
            base_url: server.url(),
            ..crate::config::ApiConfig::default()
        };
        let client = CircleCiClient::new(&config).unwrap();

        let mock = server
            .mock("GET", "/pipeline/pipe-9")
            .match_header("Circle-Token", "tok")
            .with_status(200)
            .with_body(r#"{"id":"pipe-9","number":9,"state":"success"}"#)
            .create_async()
            .await;

        let source = ClientStateSource::new(&client, Token::from("tok"));
        assert_eq!(source.pipeline_state("pipe-9").await.unwrap(), "success");
        mock.assert_async().await;
    }
}
