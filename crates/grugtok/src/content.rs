//! On-demand full-text recovery.
//!
//! Tries the raw source bundle, then the rendered HTML page, then the LaTeX e-print,
//! stopping at the first strategy that yields enough plausible text. No failure in
//! here ever reaches the caller; the worst case is a placeholder pointing at the PDF.

use moka::future::Cache;

use crate::client::ArxivClient;
use crate::config::Config;
use crate::error::ClientError;
use crate::models::{Paper, PaperContent};
use crate::text::{html_to_text, is_gzip, latex_to_text, printable_ratio};

/// Extracted text must be longer than this to count.
pub const MIN_CONTENT_CHARS: usize = 1000;

/// Below this share of printable characters a payload is treated as binary.
pub const MIN_PRINTABLE_RATIO: f64 = 0.7;

/// Where a piece of text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `/src/{id}`
    Source,
    /// `/html/{id}`
    Html,
    /// `/e-print/{id}`
    Latex,
}

impl Strategy {
    /// Order strategies are tried in.
    pub const ALL: [Self; 3] = [Self::Source, Self::Html, Self::Latex];

    /// Name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Html => "html",
            Self::Latex => "latex",
        }
    }
}

/// Why a strategy produced nothing.
#[derive(thiserror::Error, Debug)]
enum StrategyError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("payload is gzip-compressed")]
    Compressed,

    #[error("payload looks binary ({ratio:.2} printable)")]
    Binary { ratio: f64 },

    #[error("only {chars} characters extracted")]
    TooShort { chars: usize },
}

/// Full-text fetcher with an optional per-id cache.
#[derive(Clone)]
pub struct ContentFetcher {
    arxiv: ArxivClient,
    cache: Option<Cache<String, String>>,
}

impl ContentFetcher {
    /// Create a fetcher; caching is off when `content_cache_max_size` is 0.
    #[must_use]
    pub fn new(arxiv: ArxivClient, config: &Config) -> Self {
        let cache = (config.content_cache_max_size > 0).then(|| {
            Cache::builder()
                .max_capacity(config.content_cache_max_size)
                .time_to_live(config.content_cache_ttl)
                .build()
        });
        Self { arxiv, cache }
    }

    /// Recover full text for `id`. Always returns something displayable.
    pub async fn fetch(&self, id: &str) -> PaperContent {
        if let Some(cached) = self.cached(id).await {
            tracing::debug!(id, "Content cache hit");
            return PaperContent { id: id.to_string(), content: cached, has_content: true };
        }

        for strategy in Strategy::ALL {
            match self.run(strategy, id).await {
                Ok(text) => {
                    tracing::info!(
                        id,
                        strategy = strategy.as_str(),
                        chars = text.chars().count(),
                        "Extracted paper content"
                    );
                    if let Some(cache) = &self.cache {
                        cache.insert(id.to_string(), text.clone()).await;
                    }
                    return PaperContent { id: id.to_string(), content: text, has_content: true };
                }
                Err(e) => {
                    tracing::debug!(id, strategy = strategy.as_str(), reason = %e, "Strategy failed");
                }
            }
        }

        tracing::info!(id, "No strategy produced content, returning placeholder");
        PaperContent {
            id: id.to_string(),
            content: placeholder(id, &self.arxiv.pdf_url(id)),
            has_content: false,
        }
    }

    /// Attach full text to `paper`, once. Placeholders are never attached.
    ///
    /// Returns whether the paper carries content afterwards; a paper that already
    /// has content is left alone without touching the network.
    pub async fn fill(&self, paper: &mut Paper) -> bool {
        if paper.content.is_none() {
            let fetched = self.fetch(&paper.id).await;
            if fetched.has_content {
                paper.set_content(fetched.content);
            }
        }
        paper.content.is_some()
    }

    async fn cached(&self, id: &str) -> Option<String> {
        match &self.cache {
            Some(cache) => cache.get(id).await,
            None => None,
        }
    }

    async fn run(&self, strategy: Strategy, id: &str) -> Result<String, StrategyError> {
        let text = match strategy {
            Strategy::Source => decode_source(&self.arxiv.fetch_source(id).await?)?,
            Strategy::Html => html_to_text(&self.arxiv.fetch_html(id).await?),
            Strategy::Latex => {
                let bytes = self.arxiv.fetch_eprint(id).await?;
                if is_gzip(&bytes) {
                    return Err(StrategyError::Compressed);
                }
                latex_to_text(&String::from_utf8_lossy(&bytes))
            }
        };
        long_enough(text)
    }
}

impl std::fmt::Debug for ContentFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentFetcher")
            .field("arxiv", &self.arxiv)
            .field("cached", &self.cache.is_some())
            .finish()
    }
}

/// Decode a source payload as text, rejecting compressed and binary data.
fn decode_source(bytes: &[u8]) -> Result<String, StrategyError> {
    if is_gzip(bytes) {
        return Err(StrategyError::Compressed);
    }
    let text = String::from_utf8_lossy(bytes);
    let ratio = printable_ratio(&text);
    if ratio < MIN_PRINTABLE_RATIO {
        return Err(StrategyError::Binary { ratio });
    }
    Ok(text.into_owned())
}

fn long_enough(text: String) -> Result<String, StrategyError> {
    let chars = text.chars().count();
    if chars > MIN_CONTENT_CHARS { Ok(text) } else { Err(StrategyError::TooShort { chars }) }
}

/// Message shown when no strategy worked.
#[must_use]
pub fn placeholder(id: &str, pdf_url: &str) -> String {
    format!(
        "Full text for paper {id} could not be extracted automatically. \
         The source is compressed, binary, or not available as HTML. \
         Read the paper directly at {pdf_url}"
    )
}
