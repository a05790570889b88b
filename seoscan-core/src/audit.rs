// Audit coordination: discovery, batched analysis, aggregation

use crate::batch::BatchOrchestrator;
use crate::checks::{check_headings, check_images, check_links, check_meta_tags, check_performance};
use crate::error::{AuditError, Result};
use crate::model::{AuditResult, PageFailure, PageIssues, PageOutcome, PageResult};
use crate::runner::{LocalRunner, RetryPolicy, RunHandle, TaskRunner};
use crate::validate::{AuditRequest, MAX_CONCURRENCY_LIMIT, MAX_PAGES_LIMIT};
use seoscan_scanner::{Discovery, DiscoveryConfig, FetchConfig, Fetcher, ScanError};
use tracing::{debug, info};

/// Runs whole-site audits.
#[derive(Debug, Clone)]
pub struct Auditor<R: TaskRunner = LocalRunner> {
    fetcher: Fetcher,
    discovery: Discovery,
    runner: R,
    audit_retry: RetryPolicy,
    page_retry: RetryPolicy,
}

impl Auditor<LocalRunner> {
    pub fn new(fetch_config: FetchConfig, discovery_config: DiscoveryConfig) -> Result<Self> {
        let fetcher = Fetcher::new(fetch_config)?;
        Ok(Self::from_fetcher(fetcher, discovery_config))
    }

    pub fn from_fetcher(fetcher: Fetcher, discovery_config: DiscoveryConfig) -> Self {
        Self {
            discovery: Discovery::new(fetcher.clone(), discovery_config),
            fetcher,
            runner: LocalRunner,
            audit_retry: RetryPolicy::audit(),
            page_retry: RetryPolicy::page(),
        }
    }
}

impl<R: TaskRunner> Auditor<R> {
    pub fn with_runner<T: TaskRunner>(self, runner: T) -> Auditor<T> {
        Auditor {
            fetcher: self.fetcher,
            discovery: self.discovery,
            runner,
            audit_retry: self.audit_retry,
            page_retry: self.page_retry,
        }
    }

    pub fn with_audit_retry(mut self, retry: RetryPolicy) -> Self {
        self.audit_retry = retry;
        self
    }

    pub fn with_page_retry(mut self, retry: RetryPolicy) -> Self {
        self.page_retry = retry;
        self
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Discovers up to `max_pages` URLs of the site at `url`.
    pub async fn discover(&self, url: &str, max_pages: usize) -> Vec<String> {
        self.discovery.discover(url, max_pages).await
    }

    /// Fetches one page and runs all five checks on it.
    ///
    /// Fetch errors and non-2xx statuses are returned as errors so the
    /// per-page retry policy can act on them.
    pub async fn analyze_page(&self, url: &str) -> Result<PageResult> {
        info!("Analyzing page: {}", url);
        let page = self.fetcher.fetch(url).await?;

        if !page.is_success() {
            return Err(AuditError::HttpStatus {
                url: url.to_string(),
                status: page.status_code,
            });
        }

        let links = check_links(&self.fetcher, &page.html, url).await;
        let issues = PageIssues {
            meta_tags: check_meta_tags(&page.html, url),
            links,
            headings: check_headings(&page.html, url),
            images: check_images(&page.html, url),
            performance: check_performance(
                &page.html,
                url,
                page.load_time_ms,
                page.content_length,
                &page.headers,
            ),
        };
        debug!("{}: {} issues", url, issues.total());

        Ok(PageResult {
            url: url.to_string(),
            issues,
            load_time_ms: page.load_time_ms,
            content_length: page.content_length,
            status_code: page.status_code,
        })
    }

    /// Single attempt at one page, with failure captured as data.
    pub async fn analyze_one(&self, url: &str) -> PageOutcome {
        match self.analyze_page(url).await {
            Ok(result) => PageOutcome::Analyzed(result),
            Err(e) => PageOutcome::Failed(PageFailure {
                url: url.to_string(),
                error: e.to_string(),
            }),
        }
    }

    /// Audits the site at `url`.
    ///
    /// `max_pages` is clamped to 1..=100 and `max_concurrency` to 1..=50.
    /// Only a root that cannot be checked is an error; page failures end up
    /// in `failed_pages`.
    pub async fn audit(
        &self,
        url: &str,
        max_pages: usize,
        max_concurrency: usize,
    ) -> Result<AuditResult> {
        info!(
            "Starting audit for {} (max_pages={}, max_concurrency={})",
            url, max_pages, max_concurrency
        );

        let max_pages = max_pages.clamp(1, MAX_PAGES_LIMIT);
        let max_concurrency = max_concurrency.clamp(1, MAX_CONCURRENCY_LIMIT);

        let root = self
            .fetcher
            .check_url(url)
            .await
            .map_err(root_error)?;

        let discovery = self.discovery.clone();
        let root_url = root.to_string();
        let pages = self
            .runner
            .run("crawl_pages", RetryPolicy::none(), move || {
                let discovery = discovery.clone();
                let root_url = root_url.clone();
                async move { Ok(discovery.discover(&root_url, max_pages).await) }
            })
            .wait()
            .await?;
        info!("Discovered {} pages to analyze", pages.len());

        if pages.is_empty() {
            return Ok(AuditResult::empty(url));
        }

        let auditor = self.clone();
        let outcome = BatchOrchestrator::new(self.runner.clone(), self.page_retry)
            .analyze(&pages, max_concurrency, move |page_url: String| {
                let auditor = auditor.clone();
                async move { auditor.analyze_page(&page_url).await }
            })
            .await;

        let result = AuditResult::from_pages(url, outcome.successes, outcome.failures);
        info!(
            "Audit complete: {} pages, {} issues, {} failed",
            result.pages_analyzed,
            result.total_issues,
            result.failed_pages.len()
        );
        Ok(result)
    }

    /// Starts the audit as an `audit_site` task under the audit retry policy.
    pub fn submit(&self, request: AuditRequest) -> RunHandle<AuditResult> {
        let auditor = self.clone();
        self.runner.run("audit_site", self.audit_retry, move || {
            let auditor = auditor.clone();
            let request = request.clone();
            async move {
                auditor
                    .audit(&request.url, request.max_pages, request.max_concurrency)
                    .await
            }
        })
    }
}

/// Blocked and malformed roots are permanent; DNS and transport failures
/// stay retryable under the audit retry policy.
fn root_error(err: ScanError) -> AuditError {
    match err {
        ScanError::Blocked(_) | ScanError::InvalidUrl(_) => AuditError::InvalidRoot(err.to_string()),
        other => AuditError::Scan(other),
    }
}
