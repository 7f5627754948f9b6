//! Page aggregation: fetch, enrich, wrap.

use std::sync::Arc;

use crate::client::{ArxivClient, CompletionClient, CompletionService};
use crate::config::Config;
use crate::content::ContentFetcher;
use crate::enrich::Enricher;
use crate::error::{ApiError, ApiResult};
use crate::fetcher;
use crate::models::{PaperContent, PapersPage};

/// Everything needed to serve a page or a paper's content.
#[derive(Clone, Debug)]
pub struct PaperPipeline {
    arxiv: ArxivClient,
    enricher: Enricher,
    content: ContentFetcher,
}

impl PaperPipeline {
    /// Wire the pipeline against the real upstreams described by `config`.
    ///
    /// # Errors
    ///
    /// Returns error if an HTTP client cannot be built.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let completions = Arc::new(CompletionClient::new(config)?);
        Self::with_completions(config, completions)
    }

    /// Wire the pipeline with a custom completion service.
    ///
    /// # Errors
    ///
    /// Returns error if the arXiv client cannot be built.
    pub fn with_completions(
        config: &Config,
        completions: Arc<dyn CompletionService>,
    ) -> anyhow::Result<Self> {
        let arxiv = ArxivClient::new(config)?;
        Ok(Self {
            content: ContentFetcher::new(arxiv.clone(), config),
            enricher: Enricher::new(completions, config.enrich_concurrency),
            arxiv,
        })
    }

    /// Build one page of enriched papers.
    ///
    /// `has_more` is true when the page came back full (`papers.len() >= limit`).
    pub async fn page(&self, limit: usize, offset: usize) -> ApiResult<PapersPage> {
        // Fetch and enrich run in their own task so a panic deep in the
        // pipeline becomes a 500 instead of a dropped connection.
        let this = self.clone();
        let papers = tokio::spawn(async move {
            let papers = fetcher::fetch_papers(&this.arxiv, limit, offset).await;
            this.enricher.enrich_papers(papers).await
        })
        .await
        .map_err(|e| ApiError::internal(format!("paper pipeline task failed: {e}")))?;

        Ok(PapersPage {
            total: papers.len(),
            has_more: has_more(papers.len(), limit),
            papers,
            offset,
            categories: fetcher::categories(),
        })
    }

    /// Full text for one paper.
    pub async fn content(&self, id: &str) -> ApiResult<PaperContent> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ApiError::bad_request("Paper ID is required"));
        }
        Ok(self.content.fetch(id).await)
    }
}

/// Whether another page is worth requesting.
#[must_use]
pub const fn has_more(returned: usize, limit: usize) -> bool {
    returned >= limit
}
