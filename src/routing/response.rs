//! Canned response configuration.
//!
//! # Responsibilities
//! - Describe what a matched route returns (status, body, content type)
//! - Carry the HTTP method the route answers to
//! - Fluent `with_*` setters usable before and after registration
//!
//! # Design Decisions
//! - A `ResponseConfig` is a handle: clones share one cell
//! - Each setter swaps in a whole new `ResponseSnapshot` (`arc-swap`), so a
//!   reader sees either the old or the new value of every field
//! - Two setters are two swaps; a concurrent reader may observe the first
//!   without the second
//! - No validation here: status and content type are evaluated at dispatch

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;

use crate::error::Error;

/// Default content type for string bodies.
pub const TEXT_PLAIN: &str = "text/plain";

/// Content type set by [`ResponseConfig::with_json_body`].
pub const APPLICATION_JSON: &str = "application/json";

/// Immutable view of a route's response at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSnapshot {
    /// Status code to answer with. Not range checked.
    pub status: u16,
    /// Response body, written verbatim.
    pub body: String,
    /// Value of the `content-type` header.
    pub content_type: String,
    /// Method the route answers to (compared case-insensitively).
    pub method: String,
}

impl Default for ResponseSnapshot {
    fn default() -> Self {
        Self {
            status: 200,
            body: String::new(),
            content_type: TEXT_PLAIN.to_string(),
            method: "GET".to_string(),
        }
    }
}

impl ResponseSnapshot {
    /// Whether this response answers requests with the given method.
    pub fn answers(&self, method: &str) -> bool {
        self.method.eq_ignore_ascii_case(method)
    }
}

/// Shared, mutable response configuration for one route.
///
/// Returned by [`RouteTable::add_route`](crate::routing::RouteTable::add_route).
/// Every setter mutates the shared cell and returns `&self`, so calls chain:
///
/// ```
/// use local_web_server::routing::RouteTable;
///
/// let table = RouteTable::new();
/// table
///     .add_route("/test")
///     .with_http_status_code(202)
///     .with_string_body("hello from route")
///     .with_method("POST");
///
/// let snapshot = table.lookup("/test", "post").unwrap();
/// assert_eq!(snapshot.status, 202);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResponseConfig {
    inner: Arc<ArcSwap<ResponseSnapshot>>,
}

impl ResponseConfig {
    /// Create a config with the defaults: `GET`, `200`, empty `text/plain` body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the status code.
    pub fn with_http_status_code(&self, status: u16) -> &Self {
        self.update(|r| r.status = status)
    }

    /// Set the body to the given text.
    pub fn with_string_body(&self, body: impl Into<String>) -> &Self {
        let body = body.into();
        self.update(move |r| r.body = body.clone())
    }

    /// Serialize `value` to JSON and use it as the body.
    ///
    /// Sets the content type to `application/json`. Fails synchronously if
    /// `value` cannot be serialized, leaving the config untouched.
    pub fn with_json_body<T: Serialize + ?Sized>(&self, value: &T) -> Result<&Self, Error> {
        let json = serde_json::to_string(value)?;
        Ok(self.update(move |r| {
            r.content_type = APPLICATION_JSON.to_string();
            r.body = json.clone();
        }))
    }

    /// Set the method this route answers to.
    pub fn with_method(&self, method: impl Into<String>) -> &Self {
        let method = method.into();
        self.update(move |r| r.method = method.clone())
    }

    /// Set the `content-type` header value.
    pub fn with_content_type(&self, content_type: impl Into<String>) -> &Self {
        let content_type = content_type.into();
        self.update(move |r| r.content_type = content_type.clone())
    }

    /// Current values.
    pub fn snapshot(&self) -> Arc<ResponseSnapshot> {
        self.inner.load_full()
    }

    /// Whether two handles point at the same cell.
    pub fn same_config(&self, other: &ResponseConfig) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // rcu may retry the closure under contention, hence Fn + clones above.
    fn update<F>(&self, f: F) -> &Self
    where
        F: Fn(&mut ResponseSnapshot),
    {
        self.inner.rcu(|current| {
            let mut next = ResponseSnapshot::clone(current);
            f(&mut next);
            next
        });
        self
    }
}
