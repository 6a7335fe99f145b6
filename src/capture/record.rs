//! Captured request records.

use std::net::SocketAddr;
use std::time::SystemTime;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use uuid::Uuid;

/// Read-only snapshot of a request the server received.
///
/// Built once by the transport adapter and never mutated after it enters the
/// [`CaptureLog`](crate::capture::CaptureLog).
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    id: Uuid,
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
    remote_addr: Option<SocketAddr>,
    received_at: SystemTime,
}

impl CapturedRequest {
    /// Create a record stamped with a fresh id and the current time.
    pub fn new(method: Method, path: impl Into<String>, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            id: Uuid::new_v4(),
            method,
            path: path.into(),
            query: None,
            headers,
            body,
            remote_addr: None,
            received_at: SystemTime::now(),
        }
    }

    /// Attach the raw query string.
    pub fn with_query(mut self, query: Option<String>) -> Self {
        self.query = query;
        self
    }

    /// Attach the peer address of the connection.
    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of header `name`, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the body as JSON.
    pub fn body_json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    pub fn received_at(&self) -> SystemTime {
        self.received_at
    }
}
