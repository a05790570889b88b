// Task execution with retry and backoff

use crate::error::{AuditError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How often and how patiently a task is retried.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub wait: Duration,
    pub backoff_scaling: f64,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, wait: Duration, backoff_scaling: f64) -> Self {
        Self {
            max_retries,
            wait,
            backoff_scaling,
        }
    }

    /// Coarse retry of a whole audit.
    pub fn audit() -> Self {
        Self::new(2, Duration::from_millis(1000), 1.5)
    }

    /// Retry of one page analysis; page failures are more often transient.
    pub fn page() -> Self {
        Self::new(3, Duration::from_millis(500), 2.0)
    }

    pub fn none() -> Self {
        Self::new(0, Duration::ZERO, 1.0)
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        self.wait.mul_f64(self.backoff_scaling.max(0.0).powi(exponent))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::audit()
    }
}

/// Handle to a task started by a [`TaskRunner`].
#[derive(Debug)]
pub struct RunHandle<T> {
    task: &'static str,
    handle: JoinHandle<Result<T>>,
}

impl<T> RunHandle<T> {
    pub fn new(task: &'static str, handle: JoinHandle<Result<T>>) -> Self {
        Self { task, handle }
    }

    pub fn task(&self) -> &'static str {
        self.task
    }

    /// Waits for the task to settle. Panics and cancellations become
    /// [`AuditError::Task`].
    pub async fn wait(self) -> Result<T> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => {
                let message = if e.is_panic() {
                    "task panicked".to_string()
                } else {
                    e.to_string()
                };
                Err(AuditError::Task {
                    task: self.task,
                    message,
                })
            }
        }
    }
}

/// Executes named units of work under a retry policy.
///
/// The audit pipeline only talks to this trait, so where the work runs
/// (local tasks, a worker pool, a remote queue) is up to the implementation.
pub trait TaskRunner: Clone + Send + Sync + 'static {
    fn run<T, F, Fut>(&self, task: &'static str, retry: RetryPolicy, job: F) -> RunHandle<T>
    where
        T: Send + 'static,
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static;
}

/// Runs every task on the current tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRunner;

impl TaskRunner for LocalRunner {
    fn run<T, F, Fut>(&self, task: &'static str, retry: RetryPolicy, job: F) -> RunHandle<T>
    where
        T: Send + 'static,
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        RunHandle::new(task, tokio::spawn(run_with_retry(task, retry, job)))
    }
}

/// Calls `job` until it succeeds, fails permanently or runs out of retries.
pub async fn run_with_retry<T, F, Fut>(task: &'static str, retry: RetryPolicy, job: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match job().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < retry.max_retries => {
                attempt += 1;
                let delay = retry.delay_for(attempt);
                warn!(
                    "{} failed ({}), retry {}/{} in {:?}",
                    task, e, attempt, retry.max_retries, delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                debug!("{} failed permanently: {}", task, e);
                return Err(e);
            }
        }
    }
}
