//! LLM enrichment: tag, grug question, core idea and bet for each paper.
//!
//! Model output is untrusted text. [`parse_enrichment`] is the single place it gets
//! interpreted, and it always yields something displayable.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde_json::Value;

use crate::client::CompletionService;
use crate::models::{Enrichment, Paper};
use crate::text::strip_code_fence;

/// Fallback strings used when the model gives nothing usable.
pub mod defaults {
    /// Default topic tag.
    pub const TAG: &str = "Research";
    /// Default question.
    pub const QUESTION: &str = "What problem does this paper try to solve?";
    /// Default core idea.
    pub const ANSWER: &str = "Read the abstract for the core idea.";
    /// Default bet.
    pub const BET: &str = "That the proposed approach works better than what came before.";
}

/// System role for every enrichment call.
pub const SYSTEM_PROMPT: &str = "You are an expert research analyst. Respond with JSON only.";

/// Result of interpreting one model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    /// The response was a JSON object; absent fields already hold their defaults.
    Extracted(Enrichment),
    /// Nothing usable came back.
    Defaults,
}

impl EnrichmentOutcome {
    /// The four strings to show, real or default.
    #[must_use]
    pub fn into_enrichment(self) -> Enrichment {
        match self {
            Self::Extracted(enrichment) => enrichment,
            Self::Defaults => default_enrichment(),
        }
    }

    /// Whether the model contributed anything.
    #[must_use]
    pub const fn is_extracted(&self) -> bool {
        matches!(self, Self::Extracted(_))
    }
}

/// The full default quartet.
#[must_use]
pub fn default_enrichment() -> Enrichment {
    Enrichment {
        tag: defaults::TAG.to_string(),
        question: defaults::QUESTION.to_string(),
        answer: defaults::ANSWER.to_string(),
        bet: defaults::BET.to_string(),
    }
}

/// Build the user prompt for one paper.
#[must_use]
pub fn build_prompt(title: &str, summary: &str) -> String {
    format!(
        "Read this research paper and fill in four fields.\n\n\
         Title: {title}\n\n\
         Abstract: {summary}\n\n\
         Return a JSON object with exactly these keys:\n\
         - \"tag\": a short topic tag, 1 to 3 words (e.g. \"Vision\", \"LLM Agents\").\n\
         - \"question\": the research question in one line, spoken like grug: short simple \
         caveman words, no jargon (e.g. \"Why big brain model forget old things?\").\n\
         - \"answer\": the core technical idea in one plain line.\n\
         - \"bet\": the underlying assumption the paper is betting on, in one line.\n\n\
         Respond with the JSON object only.",
        title = title,
        summary = summary,
    )
}

/// Interpret raw model text.
///
/// Strips a markdown code fence, parses JSON (falling back to the outermost `{...}`
/// slice when the model wrapped it in prose), and reads `tag`, `question`, `answer`
/// (or `coreIdea`) and `bet`. Blank or non-string values count as absent.
#[must_use]
pub fn parse_enrichment(raw: &str) -> EnrichmentOutcome {
    let text = strip_code_fence(raw);
    let Some(Value::Object(map)) = parse_json_lenient(text) else {
        return EnrichmentOutcome::Defaults;
    };

    let field = |keys: &[&str], default: &str| -> String {
        keys.iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(default)
            .to_string()
    };

    EnrichmentOutcome::Extracted(Enrichment {
        tag: field(&["tag"], defaults::TAG),
        question: field(&["question"], defaults::QUESTION),
        answer: field(&["answer", "coreIdea"], defaults::ANSWER),
        bet: field(&["bet"], defaults::BET),
    })
}

fn parse_json_lenient(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

/// Enriches papers through a completion service with bounded concurrency.
#[derive(Clone)]
pub struct Enricher {
    completions: Arc<dyn CompletionService>,
    concurrency: usize,
}

impl Enricher {
    /// Create an enricher allowing at most `concurrency` calls in flight.
    #[must_use]
    pub fn new(completions: Arc<dyn CompletionService>, concurrency: usize) -> Self {
        Self { completions, concurrency: concurrency.max(1) }
    }

    /// Ask the model about one paper. Never fails; errors yield [`EnrichmentOutcome::Defaults`].
    pub async fn summarize(&self, paper: &Paper) -> EnrichmentOutcome {
        let prompt = build_prompt(&paper.title, &paper.r#abstract);
        match self.completions.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(raw) => {
                let outcome = parse_enrichment(&raw);
                if !outcome.is_extracted() {
                    tracing::warn!(id = %paper.id, "Unparsable enrichment response, using defaults");
                }
                outcome
            }
            Err(e) => {
                tracing::warn!(id = %paper.id, error = %e, "Enrichment call failed, using defaults");
                EnrichmentOutcome::Defaults
            }
        }
    }

    /// Enrich one paper in place.
    pub async fn enrich_paper(&self, mut paper: Paper) -> Paper {
        let outcome = self.summarize(&paper).await;
        paper.apply_enrichment(outcome.into_enrichment());
        paper
    }

    /// Enrich a whole page, keeping input order.
    pub async fn enrich_papers(&self, papers: Vec<Paper>) -> Vec<Paper> {
        stream::iter(papers)
            .map(|paper| self.enrich_paper(paper))
            .buffered(self.concurrency)
            .collect()
            .await
    }
}

impl std::fmt::Debug for Enricher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enricher").field("concurrency", &self.concurrency).finish_non_exhaustive()
    }
}
