// Tests for the batch orchestrator's concurrency and ordering guarantees

use seoscan_core::error::AuditError;
use seoscan_core::{BatchOrchestrator, LocalRunner, PageIssues, PageResult, RetryPolicy};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

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
    (0..n).map(|i| format!("https://example.com/page{}", i)).collect()
}

#[derive(Default)]
struct Gauge {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl Gauge {
    fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_in_flight_analyses_never_exceed_concurrency() {
    let gauge = Arc::new(Gauge::default());
    let orchestrator = BatchOrchestrator::new(LocalRunner, RetryPolicy::none());

    let probe = gauge.clone();
    let outcome = orchestrator
        .analyze(&urls(12), 3, move |url: String| {
            let gauge = probe.clone();
            async move {
                gauge.enter();
                tokio::time::sleep(Duration::from_millis(20)).await;
                gauge.leave();
                Ok(page(url))
            }
        })
        .await;

    assert_eq!(outcome.successes.len(), 12);
    assert_eq!(gauge.peak.load(Ordering::SeqCst), 3);
    assert_eq!(gauge.in_flight.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_next_batch_waits_for_slowest_sibling() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let orchestrator = BatchOrchestrator::new(LocalRunner, RetryPolicy::none());

    let log = events.clone();
    orchestrator
        .analyze(&urls(4), 2, move |url: String| {
            let log = log.clone();
            async move {
                log.lock().unwrap().push(format!("start {}", url));
                // page0 is slow, page1 fast; page2 must still wait for page0
                let delay = if url.ends_with("page0") { 60 } else { 5 };
                tokio::time::sleep(Duration::from_millis(delay)).await;
                log.lock().unwrap().push(format!("end {}", url));
                Ok(page(url))
            }
        })
        .await;

    let events = events.lock().unwrap();
    let position = |event: &str| events.iter().position(|e| e == event).unwrap();

    assert!(position("end https://example.com/page0") < position("start https://example.com/page2"));
    assert!(position("end https://example.com/page1") < position("start https://example.com/page3"));
}

#[tokio::test]
async fn test_failing_page_does_not_affect_other_batches() {
    let orchestrator = BatchOrchestrator::new(LocalRunner, RetryPolicy::none());

    let outcome = orchestrator
        .analyze(&urls(6), 2, |url: String| async move {
            if url.ends_with("page2") {
                Err(AuditError::Task {
                    task: "analyze_page",
                    message: "checks crashed".to_string(),
                })
            } else {
                Ok(page(url))
            }
        })
        .await;

    assert_eq!(outcome.successes.len(), 5);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].url, "https://example.com/page2");
    assert!(outcome.successes.iter().any(|p| p.url.ends_with("page3")));
    assert!(outcome.successes.iter().any(|p| p.url.ends_with("page5")));
}

#[tokio::test]
async fn test_panicking_page_is_captured() {
    let orchestrator = BatchOrchestrator::new(LocalRunner, RetryPolicy::none());

    let outcome = orchestrator
        .analyze(&urls(3), 3, |url: String| async move {
            if url.ends_with("page1") {
                panic!("malformed document");
            }
            Ok(page(url))
        })
        .await;

    assert_eq!(outcome.successes.len(), 2);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(
        outcome.failures[0].error,
        "Task analyze_page failed: task panicked"
    );
}

#[tokio::test]
async fn test_zero_concurrency_is_treated_as_one() {
    let gauge = Arc::new(Gauge::default());
    let orchestrator = BatchOrchestrator::new(LocalRunner, RetryPolicy::none());

    let probe = gauge.clone();
    let outcome = orchestrator
        .analyze(&urls(3), 0, move |url: String| {
            let gauge = probe.clone();
            async move {
                gauge.enter();
                tokio::time::sleep(Duration::from_millis(5)).await;
                gauge.leave();
                Ok(page(url))
            }
        })
        .await;

    assert_eq!(outcome.successes.len(), 3);
    assert_eq!(gauge.peak.load(Ordering::SeqCst), 1);
}
