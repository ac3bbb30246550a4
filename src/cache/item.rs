//! Cache Item Module
//!
//! Defines the immutable record stored for each variant.

use chrono::{DateTime, Duration, Utc};

use crate::models::HttpResponse;

// == Cache Item ==
/// A stored response together with the time it was cached.
///
/// Items are never mutated; an update replaces the whole item.
#[derive(Debug, Clone)]
pub struct CacheItem {
    response: HttpResponse,
    cached_at: DateTime<Utc>,
}

impl CacheItem {
    // == Constructor ==
    /// Wraps `response`, stamping it with the current time.
    pub fn new(response: HttpResponse) -> Self {
        Self::cached_at(response, Utc::now())
    }

    /// Wraps `response` with an explicit cache time.
    pub fn cached_at(response: HttpResponse, cached_at: DateTime<Utc>) -> Self {
        Self {
            response,
            cached_at,
        }
    }

    pub fn response(&self) -> &HttpResponse {
        &self.response
    }

    pub fn into_response(self) -> HttpResponse {
        self.response
    }

    /// When the item was stored.
    pub fn created(&self) -> DateTime<Utc> {
        self.cached_at
    }

    // == Age ==
    /// Time elapsed since the item was stored, clamped at zero.
    pub fn age(&self) -> Duration {
        let age = Utc::now() - self.cached_at;
        if age < Duration::zero() {
            Duration::zero()
        } else {
            age
        }
    }
}
