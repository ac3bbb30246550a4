//! Vary Cache - A bounded in-memory storage engine for cached HTTP responses
//!
//! Stores responses by normalized URI and Vary selector, with capacity
//! eviction and safe concurrent access.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use cache::{CacheItem, CacheStats, CacheStore, Key, PolicyKind, Vary};
pub use config::Config;
pub use error::{Result, StorageError};
pub use models::{ByteArrayPayload, CacheRequest, HttpResponse, Payload, StreamPayload};
pub use tasks::{RemovalCause, RemovalListener, RemovalNotification};
