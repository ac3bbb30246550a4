//! Response model stored by the cache storage

use std::sync::Arc;

use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use http::StatusCode;

use crate::models::payload::{ByteArrayPayload, Payload, StreamPayload, DEFAULT_MIME_TYPE};

/// An HTTP response with an optional body.
///
/// Cloning is cheap: the payload is shared.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    payload: Option<Arc<dyn Payload>>,
}

impl HttpResponse {
    /// Creates a response without a body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            payload: None,
        }
    }

    /// Creates a response whose body is a live, single-read stream.
    pub fn streaming<R>(status: StatusCode, stream: R, mime_type: &str) -> Self
    where
        R: std::io::Read + Send + 'static,
    {
        Self::new(status).with_payload(Arc::new(StreamPayload::new(stream, mime_type)))
    }

    /// Creates a response whose body already lives in memory.
    pub fn buffered(status: StatusCode, body: impl Into<bytes::Bytes>, mime_type: &str) -> Self {
        Self::new(status).with_payload(Arc::new(ByteArrayPayload::new(body, mime_type)))
    }

    /// Adds a header value (builder style).
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Returns a copy of this response carrying `payload` instead.
    pub fn with_payload(&self, payload: Arc<dyn Payload>) -> Self {
        Self {
            status: self.status,
            headers: self.headers.clone(),
            payload: Some(payload),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn payload(&self) -> Option<&Arc<dyn Payload>> {
        self.payload.as_ref()
    }

    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// Mime type of the body: the payload's own tag, then `Content-Type`.
    pub fn mime_type(&self) -> &str {
        if let Some(payload) = &self.payload {
            return payload.mime_type();
        }
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_MIME_TYPE)
    }
}
