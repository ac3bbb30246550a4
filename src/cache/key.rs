//! Cache Key Module
//!
//! Addresses one cached variant by normalized URI and Vary selector.

use std::fmt;

use url::Url;

use crate::cache::Vary;
use crate::models::{CacheRequest, HttpResponse};

// == Key ==
/// Identity of one stored variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    uri: Url,
    vary: Vary,
}

impl Key {
    pub fn new(uri: Url, vary: Vary) -> Self {
        Self { uri, vary }
    }

    /// Derives the key under which `response` is stored for `request`.
    pub fn create(request: &CacheRequest, response: &HttpResponse) -> Self {
        Self {
            uri: request.normalized_uri().clone(),
            vary: Vary::from_exchange(request, response),
        }
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn vary(&self) -> &Vary {
        &self.vary
    }

    pub fn into_parts(self) -> (Url, Vary) {
        (self.uri, self.vary)
    }

    /// Returns true if `request` targets this URI and satisfies the selector.
    pub fn matches(&self, request: &CacheRequest) -> bool {
        &self.uri == request.normalized_uri() && self.vary.matches(request)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.vary.is_empty() {
            write!(f, "{}", self.uri)
        } else {
            write!(f, "{} [{}]", self.uri, self.vary)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{HeaderValue, ACCEPT_LANGUAGE, VARY};
    use http::StatusCode;
    use std::collections::HashSet;

    fn request(uri: &str, lang: &'static str) -> CacheRequest {
        CacheRequest::parse(uri)
            .unwrap()
            .with_header(ACCEPT_LANGUAGE, HeaderValue::from_static(lang))
    }

    fn response() -> HttpResponse {
        HttpResponse::new(StatusCode::OK)
            .with_header(VARY, HeaderValue::from_static("Accept-Language"))
    }

    #[test]
    fn test_key_equality_and_hash() {
        let a = Key::create(&request("http://example.com/x", "en"), &response());
        let b = Key::create(&request("HTTP://EXAMPLE.com/x", "en"), &response());
        let c = Key::create(&request("http://example.com/x", "fr"), &response());

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<Key> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_key_matches_request() {
        let key = Key::create(&request("http://example.com/x", "en"), &response());

        assert!(key.matches(&request("http://example.com/x", "en")));
        assert!(!key.matches(&request("http://example.com/x", "fr")));
        assert!(!key.matches(&request("http://example.com/y", "en")));
    }

    #[test]
    fn test_key_display() {
        let key = Key::create(&request("http://example.com/x", "en"), &response());
        assert_eq!(key.to_string(), "http://example.com/x [accept-language=en]");
    }
}
