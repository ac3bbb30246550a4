//! Vary Selector Module
//!
//! Captures the request header values a stored response varied on.

use std::collections::BTreeMap;
use std::fmt;

use http::header::VARY;

use crate::models::{CacheRequest, HttpResponse};

/// Header name used by `Vary: *`.
const WILDCARD: &str = "*";

// == Vary ==
/// Request header values a cached response was negotiated against.
///
/// Names are lower-cased and kept sorted so equality and hashing do not
/// depend on the order headers were listed in. A `None` value records that
/// the original request did not carry the header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Vary {
    headers: BTreeMap<String, Option<String>>,
}

impl Vary {
    // == Constructors ==
    /// Creates a selector from explicit `(name, value)` pairs.
    pub fn new<I, N>(headers: I) -> Self
    where
        I: IntoIterator<Item = (N, Option<String>)>,
        N: AsRef<str>,
    {
        Self {
            headers: headers
                .into_iter()
                .map(|(name, value)| (name.as_ref().to_ascii_lowercase(), value))
                .collect(),
        }
    }

    /// Builds the selector for storing `response` as the answer to `request`.
    ///
    /// Every header named in the response's `Vary` field(s) is captured from
    /// the request.
    pub fn from_exchange(request: &CacheRequest, response: &HttpResponse) -> Self {
        let headers = response
            .headers()
            .get_all(VARY)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .map(|name| name.trim().to_ascii_lowercase())
            .filter(|name| !name.is_empty())
            .map(|name| {
                let value = if name == WILDCARD {
                    None
                } else {
                    request.header_value(&name)
                };
                (name, value)
            })
            .collect();

        Self { headers }
    }

    // == Matches ==
    /// Returns true if `request` carries the same values for every captured header.
    ///
    /// An empty selector matches every request; a wildcard selector matches none.
    pub fn matches(&self, request: &CacheRequest) -> bool {
        self.headers.iter().all(|(name, captured)| {
            name != WILDCARD && request.header_value(name).as_ref() == captured.as_ref()
        })
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Captured value for `name`, if the selector names that header.
    pub fn get(&self, name: &str) -> Option<Option<&str>> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|value| value.as_deref())
    }
}

impl fmt::Display for Vary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in &self.headers {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            match value {
                Some(value) => write!(f, "{}={}", name, value)?,
                None => write!(f, "{}", name)?,
            }
        }
        Ok(())
    }
}
