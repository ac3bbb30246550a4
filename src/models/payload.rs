//! Response payloads
//!
//! A payload is a body plus its mime type. Live payloads wrap a transport
//! stream that can be read once; byte-array payloads live in memory and can
//! be opened any number of times.

use std::fmt;
use std::io::{self, Cursor, Read};

use bytes::Bytes;
use parking_lot::Mutex;

/// Mime type used when a response does not declare one.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

// == Payload Trait ==
/// Body of a response.
pub trait Payload: Send + Sync + fmt::Debug {
    /// Content type of the body.
    fn mime_type(&self) -> &str;

    /// Opens the body for reading.
    ///
    /// The returned reader is released when dropped.
    fn open(&self) -> io::Result<Box<dyn Read + Send + '_>>;

    /// Whether `open` can currently produce content.
    fn is_available(&self) -> bool;

    /// Body length in bytes, when known up front.
    fn length(&self) -> Option<u64> {
        None
    }
}

// == Byte Array Payload ==
/// Immutable in-memory payload, readable repeatedly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteArrayPayload {
    bytes: Bytes,
    mime_type: String,
}

impl ByteArrayPayload {
    pub fn new(bytes: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Reads `reader` to the end and keeps the result.
    pub fn read_from<R: Read>(reader: &mut R, mime_type: impl Into<String>) -> io::Result<Self> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Ok(Self::new(buf, mime_type))
    }

    /// Returns the buffered bytes. Cloning `Bytes` is reference counted.
    pub fn bytes(&self) -> Bytes {
        self.bytes.clone()
    }
}

impl Payload for ByteArrayPayload {
    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn open(&self) -> io::Result<Box<dyn Read + Send + '_>> {
        Ok(Box::new(Cursor::new(self.bytes.clone())))
    }

    fn is_available(&self) -> bool {
        !self.bytes.is_empty()
    }

    fn length(&self) -> Option<u64> {
        Some(self.bytes.len() as u64)
    }
}

// == Stream Payload ==
/// Payload backed by a live stream that can be opened exactly once.
pub struct StreamPayload {
    stream: Mutex<Option<Box<dyn Read + Send>>>,
    mime_type: String,
}

impl StreamPayload {
    pub fn new<R>(stream: R, mime_type: impl Into<String>) -> Self
    where
        R: Read + Send + 'static,
    {
        Self {
            stream: Mutex::new(Some(Box::new(stream))),
            mime_type: mime_type.into(),
        }
    }
}

impl Payload for StreamPayload {
    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn open(&self) -> io::Result<Box<dyn Read + Send + '_>> {
        match self.stream.lock().take() {
            Some(stream) => Ok(stream),
            None => Err(io::Error::new(
                io::ErrorKind::Other,
                "payload stream already consumed",
            )),
        }
    }

    fn is_available(&self) -> bool {
        self.stream.lock().is_some()
    }
}

impl fmt::Debug for StreamPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamPayload")
            .field("mime_type", &self.mime_type)
            .field("consumed", &!self.is_available())
            .finish()
    }
}
