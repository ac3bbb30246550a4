//! Request model consumed by the cache storage
//!
//! Only the normalized URI and header lookup are needed to address entries.

use http::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

/// A request as seen by the cache storage.
///
/// The URI is normalized on parse (lower-cased scheme and host, default
/// port elided) and the fragment is dropped.
#[derive(Debug, Clone)]
pub struct CacheRequest {
    uri: Url,
    headers: HeaderMap,
}

impl CacheRequest {
    /// Creates a request for an already parsed URI.
    pub fn new(mut uri: Url) -> Self {
        uri.set_fragment(None);
        Self {
            uri,
            headers: HeaderMap::new(),
        }
    }

    /// Parses `uri` and creates a request for it.
    pub fn parse(uri: &str) -> Result<Self, url::ParseError> {
        Url::parse(uri).map(Self::new)
    }

    /// Adds a header value (builder style).
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn normalized_uri(&self) -> &Url {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns every value of `name` joined with `", "`, or `None` when absent.
    ///
    /// Values that are not visible ASCII are compared by their lossy form.
    pub fn header_value(&self, name: &str) -> Option<String> {
        let mut values = self.headers.get_all(name).iter().peekable();
        values.peek()?;
        let joined = values
            .map(|v| String::from_utf8_lossy(v.as_bytes()).trim().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Some(joined)
    }
}
