use reqwest::{Method, Url};

use crate::error::TransportError;

/// Decides whether a request is the one a canned response was written for.
///
/// The method and the URL without its query string must be equal. Each
/// required query parameter must be present with the given value; order and
/// additional parameters are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMatcher {
    method: Method,
    base: String,
    query: Vec<(String, String)>,
}

impl RequestMatcher {
    /// Build from a base URL (`scheme://host/path`). The base is normalized the
    /// way request URLs render, so `https://example.com` matches
    /// `https://example.com/`. Query pairs in `base` become required. A base
    /// that is not an absolute URL is kept verbatim and matches nothing.
    pub fn new(method: Method, base: impl Into<String>) -> Self {
        let base = base.into();
        match Url::parse(&base) {
            Ok(parsed) => Self {
                method,
                base: strip_query(&parsed),
                query: parsed
                    .query_pairs()
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect(),
            },
            Err(_) => Self {
                method,
                base,
                query: Vec::new(),
            },
        }
    }

    /// Build from a full URL; every query pair in it becomes required.
    pub fn from_url(method: Method, url: &str) -> Result<Self, TransportError> {
        Url::parse(url).map_err(|e| TransportError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::new(method, url))
    }

    /// Parse a `"<METHOD> <URL>"` signature such as
    /// `GET https://sqladmin.googleapis.com/sql/v1beta4/projects/p/instances/i?alt=json`.
    pub fn parse(signature: &str) -> Result<Self, TransportError> {
        let (method, url) = signature
            .trim()
            .split_once(' ')
            .ok_or_else(|| TransportError::InvalidSignature(signature.to_string()))?;
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| TransportError::InvalidSignature(signature.to_string()))?;
        Self::from_url(method, url.trim())
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Shorthand for the `alt=json&prettyPrint=false` pair every GCP JSON client sends.
    pub fn gcp_json(self) -> Self {
        self.query("alt", "json").query("prettyPrint", "false")
    }

    pub fn matches(&self, method: &Method, url: &Url) -> bool {
        if *method != self.method || strip_query(url) != self.base {
            return false;
        }
        self.query
            .iter()
            .all(|(k, v)| url.query_pairs().any(|(qk, qv)| qk == k.as_str() && qv == v.as_str()))
    }
}

impl std::fmt::Display for RequestMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.base)?;
        for (i, (k, v)) in self.query.iter().enumerate() {
            write!(f, "{}{}={}", if i == 0 { '?' } else { '&' }, k, v)?;
        }
        Ok(())
    }
}

fn strip_query(url: &Url) -> String {
    let mut u = url.clone();
    u.set_query(None);
    u.set_fragment(None);
    u.into()
}
