//! Query parameter encoding
//!
//! Canvas expects array parameters as repeated `key[]=value` pairs, never as
//! comma-joined strings.

use std::fmt::Display;

/// Ordered query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a scalar parameter
    pub fn push(&mut self, key: impl Into<String>, value: impl Display) -> &mut Self {
        self.pairs.push((key.into(), value.to_string()));
        self
    }

    /// Adds an array parameter as one `key[]` pair per value
    pub fn push_many<I, V>(&mut self, key: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Display,
    {
        let key = array_key(key);
        for value in values {
            self.pairs.push((key.clone(), value.to_string()));
        }
        self
    }

    /// Builder form of [`push`](Self::push)
    pub fn with(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.push(key, value);
        self
    }

    /// Builder form of [`push_many`](Self::push_many)
    pub fn with_many<I, V>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Display,
    {
        self.push_many(key, values);
        self
    }

    /// Replaces every pair named `key` with a single scalar
    pub fn set(&mut self, key: &str, value: impl Display) -> &mut Self {
        self.pairs.retain(|(k, _)| k != key);
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value of an array parameter, in insertion order
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        let key = array_key(key);
        self.pairs
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `application/x-www-form-urlencoded` query string
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .finish()
    }
}

fn array_key(key: &str) -> String {
    if key.ends_with("[]") {
        key.to_string()
    } else {
        format!("{key}[]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrays_are_repeated_keys() {
        let params = QueryParams::new()
            .with_many("include", ["total_scores", "email"])
            .with("per_page", 100);

        assert_eq!(
            params.pairs(),
            &[
                ("include[]".to_string(), "total_scores".to_string()),
                ("include[]".to_string(), "email".to_string()),
                ("per_page".to_string(), "100".to_string()),
            ]
        );
        assert_eq!(params.get_all("include"), vec!["total_scores", "email"]);
        assert_eq!(params.get_all("include[]"), vec!["total_scores", "email"]);
    }

    #[test]
    fn test_encode_does_not_comma_join() {
        let params = QueryParams::new().with_many("type", ["StudentEnrollment", "TaEnrollment"]);
        let encoded = params.encode();

        assert_eq!(
            encoded,
            "type%5B%5D=StudentEnrollment&type%5B%5D=TaEnrollment"
        );
        assert!(!encoded.contains(','));
    }

    #[test]
    fn test_set_replaces_existing_value() {
        let mut params = QueryParams::new().with("page", 1).with("per_page", 50);
        params.set("page", 2);

        assert_eq!(params.get("page"), Some("2"));
        assert_eq!(params.pairs().iter().filter(|(k, _)| k == "page").count(), 1);
    }

    #[test]
    fn test_empty() {
        assert!(QueryParams::new().is_empty());
        assert_eq!(QueryParams::new().encode(), "");
    }
}
