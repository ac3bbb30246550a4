//! Payload Materializer Module
//!
//! Copies a response's single-read body into memory so the stored entry can
//! be served any number of times.

use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, StorageError};
use crate::models::{ByteArrayPayload, HttpResponse, Payload};

// == Materialize ==
/// Returns `response` with its body (if any) backed by an in-memory buffer.
///
/// Responses without a body are returned unchanged. The source stream is
/// opened in its own scope and released on every exit path.
///
/// # Errors
/// `NotCacheable` if the stream cannot be opened or read, or if the copy
/// reports itself unavailable (empty).
pub fn materialize(response: HttpResponse) -> Result<HttpResponse> {
    let Some(payload) = response.payload().cloned() else {
        return Ok(response);
    };

    let copy = {
        let mut stream = payload.open().map_err(StorageError::unreadable)?;
        ByteArrayPayload::read_from(&mut stream, payload.mime_type())
            .map_err(StorageError::unreadable)?
    };

    if !copy.is_available() {
        return Err(StorageError::NotCacheable(
            "response body is empty".to_string(),
        ));
    }

    debug!(
        bytes = copy.length().unwrap_or_default(),
        mime_type = copy.mime_type(),
        "materialized response body"
    );
    Ok(response.with_payload(Arc::new(copy)))
}
