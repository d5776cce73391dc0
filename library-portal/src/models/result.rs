use serde::{Deserialize, Serialize};

/// One page of results as the view sees it. Replaced wholesale on every
/// fetch, never patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub total_pages: u32,
    pub next_cursor: Option<String>,
    pub prev_cursor: Option<String>,
}

impl<T> ListResult<T> {
    /// The safe state shown after a failure or before the first fetch.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            total_pages: 1,
            next_cursor: None,
            prev_cursor: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for ListResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// `ceil(count / page_size)`, never less than one.
pub fn total_pages_for(count: u64, page_size: u32) -> u32 {
    let page_size = u64::from(page_size.max(1));
    let pages = count.div_ceil(page_size).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// The two shapes list endpoints answer with.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Bare(Vec<T>),
    Paginated {
        results: Vec<T>,
        count: u64,
        #[serde(default)]
        total_pages: Option<u32>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
    },
}

impl<T> ListEnvelope<T> {
    pub fn normalize(self, page_size: u32) -> ListResult<T> {
        match self {
            ListEnvelope::Bare(items) => {
                let total_count = items.len() as u64;
                ListResult {
                    items,
                    total_count,
                    total_pages: total_pages_for(total_count, page_size),
                    next_cursor: None,
                    prev_cursor: None,
                }
            }
            ListEnvelope::Paginated {
                results,
                count,
                total_pages,
                next,
                previous,
            } => ListResult {
                items: results,
                total_count: count,
                total_pages: total_pages
                    .filter(|p| *p >= 1)
                    .unwrap_or_else(|| total_pages_for(count, page_size)),
                next_cursor: next.filter(|n| !n.is_empty()),
                prev_cursor: previous.filter(|p| !p.is_empty()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_bare_array_envelope() {
        let envelope: ListEnvelope<Value> = serde_json::from_value(json!(["x", "y", "z"])).unwrap();
        let result = envelope.normalize(10);
        assert_eq!(result.items, vec![json!("x"), json!("y"), json!("z")]);
        assert_eq!(result.total_count, 3);
        assert_eq!(result.total_pages, 1);
        assert_eq!(result.next_cursor, None);
        assert_eq!(result.prev_cursor, None);
    }

    #[test]
    fn test_paginated_envelope_is_preserved() {
        let envelope: ListEnvelope<Value> = serde_json::from_value(json!({
            "results": [{"id": 1}],
            "count": 50,
            "next": "http://api/items/?limit=10&offset=10",
            "previous": null
        }))
        .unwrap();
        let result = envelope.normalize(10);
        assert_eq!(result.items, vec![json!({"id": 1})]);
        assert_eq!(result.total_count, 50);
        assert_eq!(result.total_pages, 5);
        assert_eq!(
            result.next_cursor.as_deref(),
            Some("http://api/items/?limit=10&offset=10")
        );
        assert_eq!(result.prev_cursor, None);
    }

    #[test]
    fn test_server_total_pages_wins() {
        let envelope: ListEnvelope<Value> = serde_json::from_value(json!({
            "results": [],
            "count": 0,
            "total_pages": 1
        }))
        .unwrap();
        assert_eq!(envelope.normalize(10).total_pages, 1);
    }

    #[test]
    fn test_total_pages_for() {
        assert_eq!(total_pages_for(0, 10), 1);
        assert_eq!(total_pages_for(10, 10), 1);
        assert_eq!(total_pages_for(11, 10), 2);
        assert_eq!(total_pages_for(5, 0), 5);
    }
}
