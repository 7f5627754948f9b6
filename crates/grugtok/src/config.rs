//! Configuration for the GrugTok server.

use std::time::Duration;

/// Upstream endpoints and tuning constants.
pub mod api {
    use std::time::Duration;

    /// arXiv Atom query API.
    pub const ARXIV_API: &str = "https://export.arxiv.org/api";

    /// arXiv web host (abs, pdf, html, src and e-print documents).
    pub const ARXIV_WEB: &str = "https://arxiv.org";

    /// OpenAI-compatible completion service.
    pub const LLM_BASE_URL: &str = "https://api.openai.com";

    /// Default completion model.
    pub const LLM_MODEL: &str = "gpt-4o-mini";

    /// Timeout for arXiv requests.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Timeout for a single completion call.
    pub const LLM_TIMEOUT: Duration = Duration::from_secs(45);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Maximum simultaneous completion calls per page.
    pub const ENRICH_CONCURRENCY: usize = 8;

    /// Content cache TTL (1 hour).
    pub const CONTENT_CACHE_TTL: Duration = Duration::from_secs(3600);

    /// Maximum number of cached full texts.
    pub const CONTENT_CACHE_MAX_SIZE: u64 = 200;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);

    /// User agent sent upstream.
    pub const USER_AGENT: &str = concat!("grugtok/", env!("CARGO_PKG_VERSION"));
}

/// Page size limits for `GET /papers`.
pub mod paging {
    /// Limit used when the caller sends none.
    pub const DEFAULT_LIMIT: usize = 30;

    /// Largest accepted limit.
    pub const MAX_LIMIT: usize = 100;
}

/// Server configuration.
#[derive(Clone)]
pub struct Config {
    /// Completion service API key (optional; enrichment falls back without it).
    pub llm_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible completion service.
    pub llm_base_url: String,

    /// Completion model name.
    pub llm_model: String,

    /// Base URL of the arXiv query API (for testing with mock servers).
    pub arxiv_api_url: String,

    /// Base URL of the arXiv document host (for testing with mock servers).
    pub arxiv_web_url: String,

    /// arXiv request timeout.
    pub request_timeout: Duration,

    /// Completion call timeout.
    pub llm_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Maximum in-flight completion calls while enriching one page.
    pub enrich_concurrency: usize,

    /// Content cache TTL.
    pub content_cache_ttl: Duration,

    /// Content cache capacity; 0 disables caching.
    pub content_cache_max_size: u64,
}

impl Config {
    /// Create a new configuration with an optional completion API key.
    #[must_use]
    pub fn new(llm_api_key: Option<String>) -> Self {
        Self {
            llm_api_key,
            llm_base_url: api::LLM_BASE_URL.to_string(),
            llm_model: api::LLM_MODEL.to_string(),
            arxiv_api_url: api::ARXIV_API.to_string(),
            arxiv_web_url: api::ARXIV_WEB.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            llm_timeout: api::LLM_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            enrich_concurrency: api::ENRICH_CONCURRENCY,
            content_cache_ttl: api::CONTENT_CACHE_TTL,
            content_cache_max_size: api::CONTENT_CACHE_MAX_SIZE,
        }
    }

    /// Create a test configuration with every upstream pointing at one mock server.
    ///
    /// arXiv API lives under `/api`, documents at the root, completions under `/v1`.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            llm_api_key: Some("test-key".to_string()),
            llm_base_url: base_url.to_string(),
            llm_model: "test-model".to_string(),
            arxiv_api_url: format!("{}/api", base_url),
            arxiv_web_url: base_url.to_string(),
            request_timeout: Duration::from_secs(5),
            llm_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            enrich_concurrency: 4,
            content_cache_ttl: Duration::from_secs(0),
            content_cache_max_size: 0, // No caching in tests
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        let key = env("LLM_API_KEY").or_else(|| env("OPENAI_API_KEY"));
        let mut config = Self::new(key);

        if let Some(url) = env("LLM_BASE_URL") {
            config.llm_base_url = url;
        }
        if let Some(model) = env("LLM_MODEL") {
            config.llm_model = model;
        }
        if let Some(url) = env("ARXIV_API_URL") {
            config.arxiv_api_url = url;
        }
        if let Some(url) = env("ARXIV_WEB_URL") {
            config.arxiv_web_url = url;
        }
        if let Some(n) = env("ENRICH_CONCURRENCY") {
            config.enrich_concurrency = n
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid ENRICH_CONCURRENCY {n:?}: {e}"))?;
        }
        anyhow::ensure!(config.enrich_concurrency > 0, "ENRICH_CONCURRENCY must be at least 1");

        Ok(config)
    }

    /// Check if a completion API key is configured.
    #[must_use]
    pub const fn has_llm_key(&self) -> bool {
        self.llm_api_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("has_llm_key", &self.has_llm_key())
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field("arxiv_api_url", &self.arxiv_api_url)
            .field("arxiv_web_url", &self.arxiv_web_url)
            .field("enrich_concurrency", &self.enrich_concurrency)
            .finish_non_exhaustive()
    }
}

fn env(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(!config.has_llm_key());
        assert_eq!(config.arxiv_api_url, api::ARXIV_API);
        assert_eq!(config.enrich_concurrency, api::ENRICH_CONCURRENCY);
    }

    #[test]
    fn test_config_for_testing_points_at_mock() {
        let config = Config::for_testing("http://127.0.0.1:9999");
        assert_eq!(config.arxiv_api_url, "http://127.0.0.1:9999/api");
        assert_eq!(config.arxiv_web_url, "http://127.0.0.1:9999");
        assert_eq!(config.content_cache_max_size, 0);
    }

    #[test]
    fn test_debug_hides_key() {
        let config = Config::new(Some("sk-super-secret".to_string()));
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-super-secret"));
        assert!(debug.contains("has_llm_key"));
    }
}
