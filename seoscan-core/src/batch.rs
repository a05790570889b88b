// Bounded-concurrency page analysis

use crate::error::Result;
use crate::model::{PageFailure, PageOutcome, PageResult};
use crate::runner::{LocalRunner, RetryPolicy, TaskRunner};
use futures::future::join_all;
use std::future::Future;
use tracing::{debug, warn};

/// Pages that were analyzed and pages that failed, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub successes: Vec<PageResult>,
    pub failures: Vec<PageFailure>,
}

impl BatchOutcome {
    pub fn push(&mut self, outcome: PageOutcome) {
        match outcome {
            PageOutcome::Analyzed(result) => self.successes.push(result),
            PageOutcome::Failed(failure) => self.failures.push(failure),
        }
    }

    pub fn len(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Runs page analyses in sequential batches of at most `concurrency`.
#[derive(Debug, Clone)]
pub struct BatchOrchestrator<R: TaskRunner = LocalRunner> {
    runner: R,
    retry: RetryPolicy,
}

impl<R: TaskRunner> BatchOrchestrator<R> {
    pub fn new(runner: R, retry: RetryPolicy) -> Self {
        Self { runner, retry }
    }

    /// Analyzes every URL as an `analyze_page` task.
    ///
    /// A batch starts only once every task of the previous batch has
    /// settled. A failing URL becomes a [`PageFailure`] and never affects
    /// its siblings.
    pub async fn analyze<F, Fut>(
        &self,
        urls: &[String],
        concurrency: usize,
        analyze_one: F,
    ) -> BatchOutcome
    where
        F: Fn(String) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<PageResult>> + Send + 'static,
    {
        let concurrency = concurrency.max(1);
        let mut outcome = BatchOutcome::default();

        for (index, batch) in urls.chunks(concurrency).enumerate() {
            debug!("Starting batch {} ({} pages)", index + 1, batch.len());

            let handles = batch.iter().map(|url| {
                let analyze = analyze_one.clone();
                let page_url = url.clone();
                let handle = self
                    .runner
                    .run("analyze_page", self.retry, move || analyze(page_url.clone()));
                (url.clone(), handle)
            });

            let settled = join_all(
                handles.map(|(url, handle)| async move { (url, handle.wait().await) }),
            )
            .await;

            for (url, result) in settled {
                match result {
                    Ok(page) => outcome.push(PageOutcome::Analyzed(page)),
                    Err(e) => {
                        warn!("Failed to analyze {}: {}", url, e);
                        outcome.push(PageOutcome::Failed(PageFailure {
                            url,
                            error: e.to_string(),
                        }));
                    }
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuditError;
    use crate::model::PageIssues;

    fn page(url: String) -> PageResult {
        PageResult {
            url,
            issues: PageIssues::default(),
            load_time_ms: 0,
            content_length: 0,
            status_code: 200,
        }
    }

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://example.com/{}", i)).collect()
    }

    #[tokio::test]
    async fn test_order_follows_input_not_completion() {
        let orchestrator = BatchOrchestrator::new(LocalRunner, RetryPolicy::none());

        let outcome = orchestrator
            .analyze(&urls(4), 4, |url: String| async move {
                // Later URLs finish first
                let n: u64 = url.rsplit('/').next().unwrap().parse().unwrap();
                tokio::time::sleep(std::time::Duration::from_millis((4 - n) * 15)).await;
                Ok(page(url))
            })
            .await;

        let order: Vec<&str> = outcome.successes.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(order, urls(4).iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let orchestrator = BatchOrchestrator::new(LocalRunner, RetryPolicy::none());

        let outcome = orchestrator
            .analyze(&urls(5), 2, |url: String| async move {
                if url.ends_with("/1") {
                    Err(AuditError::HttpStatus { url, status: 404 })
                } else {
                    Ok(page(url))
                }
            })
            .await;

        assert_eq!(outcome.len(), 5);
        assert_eq!(outcome.successes.len(), 4);
        assert_eq!(
            outcome.failures,
            vec![PageFailure {
                url: "https://example.com/1".to_string(),
                error: "HTTP 404 fetching https://example.com/1".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_empty_input() {
        let orchestrator = BatchOrchestrator::new(LocalRunner, RetryPolicy::none());
        let outcome = orchestrator
            .analyze(&[], 10, |url: String| async move { Ok(page(url)) })
            .await;
        assert!(outcome.is_empty());
    }
}
