//! Ordered query-parameter set shared by the gateway and URL mirroring.

use serde::Serialize;

/// Ordered `key=value` pairs. Insertion order is kept so the same query
/// always serialises to the same string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// Push only when `value` is present and non-blank.
    pub fn push_opt(&mut self, key: &str, value: Option<String>) {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            self.push(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn extend(&mut self, other: QueryParams) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn to_query_string(&self) -> String {
        serde_urlencoded::to_string(&self.0).unwrap_or_default()
    }

    /// Parse `a=1&b=2` (a leading `?` is accepted). Malformed input yields an
    /// empty set rather than an error; a bad link should still open the page.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        match serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
            Ok(pairs) => Self(pairs),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed query string");
                Self::default()
            }
        }
    }
}

impl FromIterator<(String, String)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialises_in_insertion_order() {
        let mut params = QueryParams::new();
        params.push("status", "present");
        params.push("limit", "20");
        params.push("offset", "40");
        assert_eq!(params.to_query_string(), "status=present&limit=20&offset=40");
    }

    #[test]
    fn test_push_opt_skips_blank_values() {
        let mut params = QueryParams::new();
        params.push_opt("search", Some("  ".to_string()));
        params.push_opt("search", None);
        assert!(params.is_empty());
    }

    #[test]
    fn test_parse_decodes_values() {
        let params = QueryParams::parse("?search=algebra+2&ordering=-created_at");
        assert_eq!(params.get("search"), Some("algebra 2"));
        assert_eq!(params.get("ordering"), Some("-created_at"));
        assert_eq!(params.get("missing"), None);
    }
}
