//! Ordered query string parameters
//!
//! Qonto filters take arrays as repeated `key[]=value` pairs, so parameters
//! are kept as an ordered list rather than a map.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Push one pair per value, all under the same key
    pub fn push_all<I, S>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            self.push(key, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// All values recorded under `key`, in insertion order
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.iter().filter(move |(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Human-readable rendering for logs (not percent-encoded)
    pub fn to_display_string(&self) -> String {
        if self.pairs.is_empty() {
            return String::new();
        }
        let joined = self
            .pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        format!("?{}", joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let params = QueryParams::new();
        assert!(params.is_empty());
        assert_eq!(params.to_display_string(), "");
    }

    #[test]
    fn test_repeated_keys_keep_order() {
        let mut params = QueryParams::new();
        params.push_all("status[]", ["pending", "settled"]);
        params.push("sort_by", "updated_at:desc");

        assert_eq!(params.len(), 3);
        assert_eq!(
            params.get_all("status[]").collect::<Vec<_>>(),
            vec!["pending", "settled"]
        );
        assert_eq!(params.get("sort_by"), Some("updated_at:desc"));
        assert_eq!(
            params.to_display_string(),
            "?status[]=pending&status[]=settled&sort_by=updated_at:desc"
        );
    }

    #[test]
    fn test_get_outlives_key() {
        let mut params = QueryParams::new();
        params.push("filter[status]", "paid");
        params.push("filter[status]", "unpaid");

        let value = {
            let key = format!("filter[{}]", "status");
            params.get(&key)
        };
        assert_eq!(value, Some("paid"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_serializes_as_pair_list() {
        let mut params = QueryParams::new();
        params.push("page", "2");
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, serde_json::json!([["page", "2"]]));
    }
}
