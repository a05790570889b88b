use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "SEO-Auditor/1.0 (seoscan; +https://github.com/seoscan/seoscan)";
pub const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// HTTP client settings handed to [`crate::Fetcher::new`].
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    pub max_redirects: usize,
    /// Skip the SSRF guard. Only meant for fixtures served from localhost.
    pub allow_private_networks: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: 5,
            allow_private_networks: false,
        }
    }
}

impl FetchConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        // connect phase never gets more than half the budget
        self.connect_timeout = self.connect_timeout.min(timeout / 2);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn with_allow_private_networks(mut self, allow: bool) -> Self {
        self.allow_private_networks = allow;
        self
    }
}

/// Politeness and depth settings for page discovery.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub crawl_delay: Duration,
    pub sitemap_depth: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            crawl_delay: Duration::from_millis(500),
            sitemap_depth: 1,
        }
    }
}

impl DiscoveryConfig {
    pub fn with_crawl_delay(mut self, delay: Duration) -> Self {
        self.crawl_delay = delay;
        self
    }

    pub fn with_sitemap_depth(mut self, depth: usize) -> Self {
        self.sitemap_depth = depth;
        self
    }
}
