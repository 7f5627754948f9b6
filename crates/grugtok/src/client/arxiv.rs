//! arXiv client.
//!
//! The query API answers with an Atom feed; document endpoints answer with whatever
//! the paper was submitted as (often a gzipped tarball), so those come back as raw bytes.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use super::{build_http, handle_response};
use crate::config::Config;
use crate::error::{ClientError, ClientResult};

/// arXiv API and document client.
#[derive(Clone)]
pub struct ArxivClient {
    /// HTTP client.
    http: Client,

    /// Query API base URL.
    api_url: String,

    /// Document host base URL.
    web_url: Url,

    /// Per-request timeout.
    timeout: Duration,
}

impl ArxivClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the document host URL is invalid or HTTP client
    /// initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let web_url = Url::parse(&config.arxiv_web_url)?;
        if web_url.cannot_be_a_base() {
            anyhow::bail!("arXiv web URL cannot hold paths: {web_url}");
        }
        Ok(Self {
            http: build_http(config, config.request_timeout)?,
            api_url: config.arxiv_api_url.trim_end_matches('/').to_string(),
            web_url,
            timeout: config.request_timeout,
        })
    }

    /// Run one search query, newest submissions first. Returns the raw Atom feed.
    pub async fn query(
        &self,
        search_query: &str,
        start: usize,
        max_results: usize,
    ) -> ClientResult<String> {
        let url = Url::parse_with_params(
            &format!("{}/query", self.api_url),
            &[
                ("search_query", search_query.to_string()),
                ("start", start.to_string()),
                ("max_results", max_results.to_string()),
                ("sortBy", "submittedDate".to_string()),
                ("sortOrder", "descending".to_string()),
            ],
        )
        .map_err(|e| ClientError::not_configured(format!("arXiv API URL: {e}")))?;

        tracing::debug!(%url, "Querying arXiv");
        let response = self.send(url.as_str()).await?;
        response.text().await.map_err(|e| ClientError::from_reqwest(e, self.timeout))
    }

    /// Raw source bundle (`/src/{id}`).
    pub async fn fetch_source(&self, id: &str) -> ClientResult<Vec<u8>> {
        self.fetch_bytes(self.document_url("src", id)).await
    }

    /// Rendered HTML version (`/html/{id}`).
    pub async fn fetch_html(&self, id: &str) -> ClientResult<String> {
        let response = self.send(self.document_url("html", id).as_str()).await?;
        response.text().await.map_err(|e| ClientError::from_reqwest(e, self.timeout))
    }

    /// LaTeX e-print (`/e-print/{id}`).
    pub async fn fetch_eprint(&self, id: &str) -> ClientResult<Vec<u8>> {
        self.fetch_bytes(self.document_url("e-print", id)).await
    }

    /// Direct PDF link for a paper.
    #[must_use]
    pub fn pdf_url(&self, id: &str) -> String {
        self.document_url("pdf", id).into()
    }

    /// `{web}/{route}/{id}` with `id` escaped as a single path segment.
    fn document_url(&self, route: &str, id: &str) -> Url {
        let mut url = self.web_url.clone();
        // Checked in `new`: the base always accepts path segments.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(route).push(id);
        }
        url
    }

    async fn fetch_bytes(&self, url: Url) -> ClientResult<Vec<u8>> {
        let response = self.send(url.as_str()).await?;
        let bytes =
            response.bytes().await.map_err(|e| ClientError::from_reqwest(e, self.timeout))?;
        Ok(bytes.to_vec())
    }

    async fn send(&self, url: &str) -> ClientResult<reqwest::Response> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(e, self.timeout))?;
        handle_response(response).await
    }
}

impl std::fmt::Debug for ArxivClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArxivClient")
            .field("api_url", &self.api_url)
            .field("web_url", &self.web_url.as_str())
            .finish_non_exhaustive()
    }
}
