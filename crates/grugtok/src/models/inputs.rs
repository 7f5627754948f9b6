//! Query parameters accepted by the HTTP API.

use serde::{Deserialize, Serialize};

use crate::config::paging;

/// Query string of `GET /papers`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PapersQuery {
    /// Requested page size.
    #[serde(default)]
    pub limit: Option<usize>,

    /// Pagination offset into each topic query.
    #[serde(default)]
    pub offset: Option<usize>,
}

impl PapersQuery {
    /// Page size with the default applied and clamped to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(paging::DEFAULT_LIMIT).clamp(1, paging::MAX_LIMIT)
    }

    /// Offset with the default applied.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let q = PapersQuery::default();
        assert_eq!(q.limit(), 30);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn test_limit_is_clamped() {
        let q = PapersQuery { limit: Some(0), offset: None };
        assert_eq!(q.limit(), 1);
        let q = PapersQuery { limit: Some(10_000), offset: Some(40) };
        assert_eq!(q.limit(), 100);
        assert_eq!(q.offset(), 40);
    }
}
