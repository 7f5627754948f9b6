//! Paper data model served to the flashcard UI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An arXiv paper, normalised from one Atom entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    /// arXiv identifier (e.g. "2401.01234v1").
    pub id: String,

    /// Whitespace-normalised title.
    pub title: String,

    /// Author names in feed order.
    #[serde(default)]
    pub authors: Vec<String>,

    /// Whitespace-normalised abstract.
    pub r#abstract: String,

    /// Canonical abstract page.
    pub url: String,

    /// Link to the PDF, when the feed carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,

    /// Publication timestamp, ISO-8601.
    pub published_at: String,

    /// arXiv category terms (e.g. "cs.LG").
    #[serde(default)]
    pub categories: Vec<String>,

    /// Short topic tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Motivating question, in grug-speak.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,

    /// Core idea.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,

    /// Underlying assumption the paper is betting on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bet: Option<String>,

    /// Full text, only after an explicit content fetch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Paper {
    /// Parse `published_at`; `None` when it is not a valid RFC 3339 timestamp.
    #[must_use]
    pub fn published_timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.published_at.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Sort key for recency ordering. Unparsable timestamps rank as least recent.
    #[must_use]
    pub fn recency_key(&self) -> DateTime<Utc> {
        self.published_timestamp().unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Whether the enrichment fields have been populated.
    #[must_use]
    pub const fn is_enriched(&self) -> bool {
        self.tag.is_some()
    }

    /// Set tag, question, answer and bet. A paper is enriched at most once; later
    /// calls are ignored.
    pub fn apply_enrichment(&mut self, enrichment: Enrichment) {
        if self.is_enriched() {
            return;
        }
        let Enrichment { tag, question, answer, bet } = enrichment;
        self.tag = Some(tag);
        self.question = Some(question);
        self.answer = Some(answer);
        self.bet = Some(bet);
    }

    /// Attach full text. Ignored when content is already present.
    pub fn set_content(&mut self, content: impl Into<String>) {
        if self.content.is_none() {
            self.content = Some(content.into());
        }
    }
}

/// The four LLM-derived labels for a paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    /// Short topic tag.
    pub tag: String,
    /// Motivating question.
    pub question: String,
    /// Core idea.
    pub answer: String,
    /// Underlying bet.
    pub bet: String,
}

/// One page of enriched papers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PapersPage {
    /// Enriched papers, newest first.
    pub papers: Vec<Paper>,

    /// Number of papers in this page.
    pub total: usize,

    /// Echo of the requested offset.
    pub offset: usize,

    /// Whether the client should ask for another page.
    pub has_more: bool,

    /// arXiv categories the feed is drawn from.
    pub categories: Vec<String>,
}

/// Full text for one paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperContent {
    /// arXiv identifier.
    pub id: String,

    /// Extracted text, or a human-readable placeholder.
    pub content: String,

    /// False when `content` is the placeholder.
    pub has_content: bool,
}
