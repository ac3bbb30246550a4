//! Request, response and payload models used by the cache storage
//!
//! These are the collaborator types the storage stores and compares; HTTP
//! semantics beyond header lookup and body presence live elsewhere.

pub mod payload;
pub mod request;
pub mod response;

// Re-export commonly used types
pub use payload::{ByteArrayPayload, Payload, StreamPayload, DEFAULT_MIME_TYPE};
pub use request::CacheRequest;
pub use response::HttpResponse;
