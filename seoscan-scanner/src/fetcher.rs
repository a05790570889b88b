use crate::config::{DEFAULT_ACCEPT, FetchConfig};
use crate::error::{Result, ScanError};
use crate::guard::{GuardedResolver, SsrfGuard, blocked_without_dns};
use crate::result::PageContent;
use flate2::read::GzDecoder;
use reqwest::header::{ACCEPT, ACCEPT_ENCODING, HeaderMap, HeaderValue};
use reqwest::{Client, redirect};
use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

/// SSRF-guarded HTTP client shared by discovery, analysis and link probes.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    guard: SsrfGuard,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
        // Decompression is done here so content-encoding survives for the checks
        default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        let mut builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .no_gzip()
            .default_headers(default_headers)
            .redirect(redirect_policy(
                config.max_redirects,
                config.allow_private_networks,
            ));

        if !config.allow_private_networks {
            builder = builder.dns_resolver(Arc::new(GuardedResolver));
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            guard: SsrfGuard::new(config.allow_private_networks),
        })
    }

    /// Parses `url` and runs the SSRF guard against it.
    pub async fn check_url(&self, url: &str) -> Result<Url> {
        let parsed =
            Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;
        self.guard.check(&parsed).await?;
        Ok(parsed)
    }

    /// Fetch a page with timing, size and headers captured.
    pub async fn fetch(&self, url: &str) -> Result<PageContent> {
        let parsed = self.check_url(url).await?;
        debug!("Fetching {}", url);

        let start = Instant::now();
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = collect_headers(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(url, e))?;
        let load_time_ms = start.elapsed().as_millis() as u64;

        let body = decode_body(&headers, &body);

        let mut page = PageContent::new(url.to_string());
        page.final_url = final_url;
        page.content_length = body.len() as u64;
        page.html = String::from_utf8_lossy(&body).into_owned();
        page.headers = headers;
        page.load_time_ms = load_time_ms;
        page.status_code = status_code;

        debug!(
            "Fetched {} ({} bytes, status {}, {}ms)",
            url, page.content_length, status_code, load_time_ms
        );
        Ok(page)
    }

    /// Existence probe: HEAD, falling back to GET only when HEAD errors.
    pub async fn probe(&self, url: &str) -> Result<u16> {
        let parsed = self.check_url(url).await?;

        match self.client.head(parsed.clone()).send().await {
            Ok(response) => Ok(response.status().as_u16()),
            Err(head_err) => {
                debug!("HEAD {} failed ({}), retrying with GET", url, head_err);
                let response = self
                    .client
                    .get(parsed)
                    .send()
                    .await
                    .map_err(|e| classify_error(url, e))?;
                Ok(response.status().as_u16())
            }
        }
    }
}

fn redirect_policy(max_redirects: usize, allow_private: bool) -> redirect::Policy {
    redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() > max_redirects {
            return attempt.error(ScanError::Other(format!(
                "too many redirects (max {})",
                max_redirects
            )));
        }

        let blocked = if allow_private {
            None
        } else {
            blocked_without_dns(attempt.url())
        };

        match blocked {
            Some(reason) => attempt.error(ScanError::Blocked(format!("redirect to {}", reason))),
            None => attempt.follow(),
        }
    })
}

fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut collected: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        collected
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    collected
}

fn decode_body(headers: &BTreeMap<String, String>, body: &[u8]) -> Vec<u8> {
    let gzipped = headers
        .get("content-encoding")
        .map(|enc| enc.to_ascii_lowercase().contains("gzip"))
        .unwrap_or(false);

    if !gzipped {
        return body.to_vec();
    }

    let mut decoded = Vec::new();
    match GzDecoder::new(body).read_to_end(&mut decoded) {
        Ok(_) => decoded,
        Err(e) => {
            // Mislabelled bodies are analyzed as-is
            debug!("Body claims gzip but failed to decode: {}", e);
            body.to_vec()
        }
    }
}

/// Maps a transport error onto the scanner taxonomy, surfacing guard
/// rejections raised inside the resolver or redirect policy.
fn classify_error(url: &str, err: reqwest::Error) -> ScanError {
    if err.is_timeout() {
        return ScanError::Timeout(url.to_string());
    }

    let mut source = std::error::Error::source(&err);
    while let Some(inner) = source {
        if let Some(ScanError::Blocked(reason)) = inner.downcast_ref::<ScanError>() {
            return ScanError::Blocked(reason.clone());
        }
        source = inner.source();
    }

    ScanError::HttpError(err)
}
