//! Multi-query paper fetching.
//!
//! A page is assembled from a fixed set of topic queries: one per arXiv subject
//! category and a couple of keyword groups that cut across categories. Each query
//! gets an even share of the page; results are merged in query order, deduplicated
//! by id, sorted newest first and truncated.

use std::collections::HashSet;

use futures::future::join_all;

use crate::client::ArxivClient;
use crate::models::Paper;
use crate::parser;

/// One topic-scoped search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicQuery {
    /// Short label used in logs.
    pub label: &'static str,
    /// arXiv `search_query` expression.
    pub search_query: &'static str,
}

/// Subject categories the feed is drawn from.
pub const CATEGORIES: &[&str] = &["cs.AI", "cs.LG", "cs.CL", "cs.CV"];

/// Every query issued for one page, in merge-priority order.
pub const TOPIC_QUERIES: &[TopicQuery] = &[
    TopicQuery { label: "cs.AI", search_query: "cat:cs.AI" },
    TopicQuery { label: "cs.LG", search_query: "cat:cs.LG" },
    TopicQuery { label: "cs.CL", search_query: "cat:cs.CL" },
    TopicQuery { label: "cs.CV", search_query: "cat:cs.CV" },
    TopicQuery {
        label: "language-models",
        search_query: r#"abs:"large language model" OR abs:"language models" OR ti:transformer"#,
    },
    TopicQuery {
        label: "reinforcement-learning",
        search_query: r#"abs:"reinforcement learning" OR abs:"reward model" OR ti:agent"#,
    },
];

/// Category list as owned strings, for the page envelope.
#[must_use]
pub fn categories() -> Vec<String> {
    CATEGORIES.iter().map(|c| (*c).to_string()).collect()
}

/// Results each query asks for so the queries together can fill `limit`.
#[must_use]
pub fn per_query_limit(limit: usize, queries: usize) -> usize {
    if queries == 0 { 0 } else { limit.div_ceil(queries) }
}

/// Fetch up to `limit` unique papers, newest first.
///
/// Failing queries contribute nothing; if every query fails the result is empty.
pub async fn fetch_papers(client: &ArxivClient, limit: usize, offset: usize) -> Vec<Paper> {
    if limit == 0 {
        return Vec::new();
    }
    let per_query = per_query_limit(limit, TOPIC_QUERIES.len());

    let responses = join_all(TOPIC_QUERIES.iter().map(|topic| async move {
        match client.query(topic.search_query, offset, per_query).await {
            Ok(feed) => {
                let papers = parser::parse_feed(&feed);
                tracing::debug!(topic = topic.label, count = papers.len(), "Topic query returned");
                papers
            }
            Err(e) => {
                tracing::warn!(topic = topic.label, error = %e, "Topic query failed");
                Vec::new()
            }
        }
    }))
    .await;

    let papers = merge_papers(responses, limit);
    tracing::info!(limit, offset, count = papers.len(), "Fetched papers");
    papers
}

/// Merge per-query batches: first occurrence of an id wins, then newest first,
/// truncated to `limit`.
#[must_use]
pub fn merge_papers<I>(batches: I, limit: usize) -> Vec<Paper>
where
    I: IntoIterator<Item = Vec<Paper>>,
{
    let mut seen = HashSet::new();
    let mut merged: Vec<Paper> = batches
        .into_iter()
        .flatten()
        .filter(|paper| seen.insert(paper.id.clone()))
        .collect();

    merged.sort_by_key(|paper| std::cmp::Reverse(paper.recency_key()));
    merged.truncate(limit);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(id: &str, title: &str, published_at: &str) -> Paper {
        Paper {
            id: id.to_string(),
            title: title.to_string(),
            authors: vec![],
            r#abstract: "x".repeat(120),
            url: format!("https://arxiv.org/abs/{id}"),
            pdf_url: None,
            published_at: published_at.to_string(),
            categories: vec![],
            tag: None,
            question: None,
            answer: None,
            bet: None,
            content: None,
        }
    }

    #[test]
    fn test_per_query_limit_rounds_up() {
        assert_eq!(per_query_limit(10, 6), 2);
        assert_eq!(per_query_limit(30, 6), 5);
        assert_eq!(per_query_limit(1, 6), 1);
        assert_eq!(per_query_limit(5, 0), 0);
    }

    #[test]
    fn test_merge_first_writer_wins() {
        let a = vec![paper("1", "from-a", "2024-01-01T00:00:00Z")];
        let b = vec![
            paper("1", "from-b", "2024-01-01T00:00:00Z"),
            paper("2", "only-b", "2024-01-02T00:00:00Z"),
        ];
        let merged = merge_papers(vec![a, b], 10);
        assert_eq!(merged.len(), 2);
        let one = merged.iter().find(|p| p.id == "1").unwrap();
        assert_eq!(one.title, "from-a");
    }

    #[test]
    fn test_merge_sorts_newest_first_and_truncates() {
        let batch = vec![
            paper("old", "", "2023-01-01T00:00:00Z"),
            paper("new", "", "2024-06-01T00:00:00Z"),
            paper("mid", "", "2024-01-01T00:00:00Z"),
            paper("bad", "", "not a date"),
        ];
        let merged = merge_papers(vec![batch], 3);
        let ids: Vec<_> = merged.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_unparsable_dates_sort_last() {
        let batch =
            vec![paper("bad", "", "garbage"), paper("good", "", "2020-01-01T00:00:00Z")];
        let merged = merge_papers(vec![batch], 10);
        assert_eq!(merged.last().unwrap().id, "bad");
    }

    #[test]
    fn test_categories_are_queried() {
        for category in CATEGORIES {
            assert!(TOPIC_QUERIES.iter().any(|q| q.search_query == format!("cat:{category}")));
        }
    }
}
