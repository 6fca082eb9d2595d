//! Paginated listing aggregation
//!
//! Canvas advertises further pages in an RFC 5988 `Link` header:
//! `<https://canvas.example.edu/api/v1/courses?page=2&per_page=100>; rel="next", <...>; rel="last"`.

use super::gateway::CanvasGateway;
use super::params::QueryParams;
use crate::domain::{CanvasError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Relations parsed from a `Link` header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkHeader {
    pub current: Option<String>,
    pub next: Option<String>,
    pub prev: Option<String>,
    pub first: Option<String>,
    pub last: Option<String>,
}

impl LinkHeader {
    /// Entries are located by their `<...>` target, so commas inside a URL
    /// do not split an entry
    pub fn parse(header: &str) -> Self {
        let mut links = LinkHeader::default();
        let mut rest = header;

        while let Some(open) = rest.find('<') {
            let Some(close) = rest[open..].find('>').map(|i| open + i) else {
                break;
            };
            let url = &rest[open + 1..close];
            rest = &rest[close + 1..];

            let params_end = rest.find('<').unwrap_or(rest.len());
            let rel = rest[..params_end]
                .split([';', ','])
                .filter_map(|param| param.trim().strip_prefix("rel="))
                .map(|value| value.trim_matches('"'))
                .next();

            let url = Some(url.to_string());
            match rel {
                Some("current") => links.current = url,
                Some("next") => links.next = url,
                Some("prev") => links.prev = url,
                Some("first") => links.first = url,
                Some("last") => links.last = url,
                _ => {}
            }
        }

        links
    }

    /// `page` parameter of the next link; may be a number or an opaque bookmark
    pub fn next_page(&self) -> Option<String> {
        self.next.as_deref().and_then(page_param)
    }
}

fn page_param(link: &str) -> Option<String> {
    let url = url::Url::parse(link).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == "page")
        .map(|(_, v)| v.into_owned())
}

impl CanvasGateway {
    /// Collects every record of a paginated listing
    ///
    /// Stops when the response has no `next` link, when a page comes back
    /// empty, or after `max_pages` pages. A `null` body counts as an empty page.
    pub async fn collect_all(&self, endpoint: &str, params: &QueryParams) -> Result<Vec<Value>> {
        let mut query = params.clone();
        query.set("per_page", self.per_page());

        let mut records = Vec::new();
        let mut page = "1".to_string();
        let max_pages = self.max_pages().max(1);

        for page_number in 1..=max_pages {
            query.set("page", &page);
            let response = self.send(endpoint, &query).await?;

            let batch = match response.body {
                Value::Array(ref items) => items.clone(),
                Value::Null => Vec::new(),
                _ => {
                    return Err(CanvasError::InvalidResponse(format!(
                        "{endpoint}: expected a JSON array on page {page}"
                    ))
                    .into())
                }
            };

            if batch.is_empty() {
                break;
            }
            records.extend(batch);

            let links = response.links();
            if links.next.is_none() {
                break;
            }
            if page_number == max_pages {
                tracing::warn!(
                    endpoint = %endpoint,
                    max_pages,
                    records = records.len(),
                    "Stopped paginating at the page limit"
                );
                break;
            }
            page = links
                .next_page()
                .unwrap_or_else(|| (page_number + 1).to_string());
        }

        tracing::debug!(endpoint = %endpoint, records = records.len(), "Collected listing");
        Ok(records)
    }

    /// [`collect_all`](Self::collect_all) decoded into `T`
    ///
    /// Records that cannot be decoded are skipped with a warning rather than
    /// failing the whole listing.
    pub async fn collect_all_as<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &QueryParams,
    ) -> Result<Vec<T>> {
        let values = self.collect_all(endpoint, params).await?;
        let total = values.len();

        let decoded: Vec<T> = values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<T>(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(
                        endpoint = %endpoint,
                        index,
                        error = %e,
                        "Skipping record that could not be decoded"
                    );
                    None
                }
            })
            .collect();

        if decoded.len() < total {
            tracing::warn!(
                endpoint = %endpoint,
                skipped = total - decoded.len(),
                total,
                "Some records were skipped"
            );
        }

        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canvas_link_header() {
        let header = r#"<https://canvas.example.edu/api/v1/courses/1/assignments?page=1&per_page=10>; rel="current",<https://canvas.example.edu/api/v1/courses/1/assignments?page=2&per_page=10>; rel="next",<https://canvas.example.edu/api/v1/courses/1/assignments?page=1&per_page=10>; rel="first",<https://canvas.example.edu/api/v1/courses/1/assignments?page=4&per_page=10>; rel="last""#;
        let links = LinkHeader::parse(header);

        assert!(links.current.is_some());
        assert_eq!(links.next_page().as_deref(), Some("2"));
        assert!(links.last.as_deref().unwrap().contains("page=4"));
        assert!(links.prev.is_none());
    }

    #[test]
    fn test_parse_without_next() {
        let header = r#"<https://canvas.example.edu/api/v1/courses?page=3>; rel="current", <https://canvas.example.edu/api/v1/courses?page=2>; rel="prev""#;
        let links = LinkHeader::parse(header);

        assert!(links.next.is_none());
        assert_eq!(links.next_page(), None);
    }

    #[test]
    fn test_bookmark_pages_are_kept_verbatim() {
        let header = r#"<https://canvas.example.edu/api/v1/courses/1/enrollments?page=bookmark:WzEwXQ&per_page=100>; rel="next""#;
        assert_eq!(
            LinkHeader::parse(header).next_page().as_deref(),
            Some("bookmark:WzEwXQ")
        );
    }

    #[test]
    fn test_commas_inside_urls_stay_in_their_entry() {
        let header = r#"<https://canvas.example.edu/api/v1/courses?include[]=term,teachers&page=1>; rel="current", <https://canvas.example.edu/api/v1/courses?include[]=term,teachers&page=2>; rel="next""#;
        let links = LinkHeader::parse(header);

        assert_eq!(
            links.next.as_deref(),
            Some("https://canvas.example.edu/api/v1/courses?include[]=term,teachers&page=2")
        );
        assert_eq!(links.next_page().as_deref(), Some("2"));
        assert!(links.current.as_deref().unwrap().ends_with("page=1"));
    }

    #[test]
    fn test_garbage_header() {
        assert_eq!(LinkHeader::parse("nonsense"), LinkHeader::default());
        assert_eq!(LinkHeader::parse(""), LinkHeader::default());
    }
}
