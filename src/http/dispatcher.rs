//! Per-request dispatch decision.
//!
//! # Responsibilities
//! - Capture every request before anything else happens to it
//! - Look the request up in the route table
//! - Turn a matched response snapshot into an HTTP response
//!
//! # State Machine
//! ```text
//! Received → Captured → Matched   → Responded   (render)
//!                     → Unmatched → Delegated   (transport fallback)
//! ```
//!
//! # Design Decisions
//! - `dispatch` is synchronous and lock-light: the append and the lookup
//!   both finish before any response I/O starts
//! - Dispatch returns a tagged outcome; the fallback response belongs to
//!   the transport adapter
//! - Status and content type are validated here, at dispatch time

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::capture::{CaptureLog, CapturedRequest};
use crate::routing::{ResponseSnapshot, RouteTable, TEXT_PLAIN};

/// Body of the fallback response.
pub const NOT_FOUND_BODY: &str = "No matching route found";

/// Outcome of dispatching one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// A route answered; carries its response as of dispatch time.
    Matched(Arc<ResponseSnapshot>),
    /// No route for this path and method.
    Unmatched,
}

/// A matched route's configuration cannot be turned into a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("configured status code {0} is not a valid HTTP status")]
    InvalidStatus(u16),

    #[error("configured content type {0:?} is not a valid header value")]
    InvalidContentType(String),
}

/// Captures requests and decides how they are answered.
///
/// Safe to share across tasks; holds no lock across calls.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    routes: Arc<RouteTable>,
    captures: Arc<CaptureLog>,
}

impl Dispatcher {
    pub fn new(routes: Arc<RouteTable>, captures: Arc<CaptureLog>) -> Self {
        Self { routes, captures }
    }

    /// Capture `request`, then look it up.
    pub fn dispatch(&self, request: CapturedRequest) -> Dispatch {
        let request = self.captures.append(request);

        tracing::debug!(
            record_id = %request.id(),
            method = %request.method(),
            path = %request.path(),
            "Request captured"
        );

        match self.routes.lookup(request.path(), request.method().as_str()) {
            Some(snapshot) => {
                tracing::debug!(path = %request.path(), status = snapshot.status, "Route matched");
                Dispatch::Matched(snapshot)
            }
            None => {
                tracing::debug!(
                    method = %request.method(),
                    path = %request.path(),
                    "No route matched"
                );
                Dispatch::Unmatched
            }
        }
    }
}

/// Build the response for a matched route.
pub fn render(snapshot: &ResponseSnapshot) -> Result<Response, DispatchError> {
    let status =
        StatusCode::from_u16(snapshot.status).map_err(|_| DispatchError::InvalidStatus(snapshot.status))?;
    let content_type = HeaderValue::from_str(&snapshot.content_type)
        .map_err(|_| DispatchError::InvalidContentType(snapshot.content_type.clone()))?;

    let mut response = Response::new(Body::from(snapshot.body.clone()));
    *response.status_mut() = status;
    response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    Ok(response)
}

/// Response for requests no route answers.
pub fn fallback_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN))],
        NOT_FOUND_BODY,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, Method};

    fn dispatcher() -> (Dispatcher, Arc<RouteTable>, Arc<CaptureLog>) {
        let routes = Arc::new(RouteTable::new());
        let captures = Arc::new(CaptureLog::new());
        (
            Dispatcher::new(Arc::clone(&routes), Arc::clone(&captures)),
            routes,
            captures,
        )
    }

    fn request(method: Method, path: &str) -> CapturedRequest {
        CapturedRequest::new(method, path, HeaderMap::new(), Bytes::new())
    }

    #[test]
    fn matched_route_returns_snapshot() {
        let (dispatcher, routes, captures) = dispatcher();
        routes
            .add_route("/test")
            .with_http_status_code(202)
            .with_string_body("hello from route")
            .with_method("POST");

        match dispatcher.dispatch(request(Method::POST, "/test")) {
            Dispatch::Matched(snapshot) => {
                assert_eq!(snapshot.status, 202);
                assert_eq!(snapshot.body, "hello from route");
            }
            Dispatch::Unmatched => panic!("expected a match"),
        }
        assert_eq!(captures.len(), 1);
    }

    #[test]
    fn wrong_method_is_unmatched_but_captured() {
        let (dispatcher, routes, captures) = dispatcher();
        routes.add_route("/test").with_method("POST");

        assert_eq!(dispatcher.dispatch(request(Method::GET, "/test")), Dispatch::Unmatched);

        let snapshot = captures.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(*snapshot[0].method(), Method::GET);
        assert_eq!(snapshot[0].path(), "/test");
    }

    #[test]
    fn unknown_path_is_captured() {
        let (dispatcher, _, captures) = dispatcher();
        assert_eq!(dispatcher.dispatch(request(Method::PUT, "/nowhere")), Dispatch::Unmatched);
        assert_eq!(captures.len(), 1);
    }

    #[test]
    fn render_uses_configured_values() {
        let snapshot = ResponseSnapshot {
            status: 201,
            body: "{\"ok\":true}".into(),
            content_type: "application/json".into(),
            method: "POST".into(),
        };
        let response = render(&snapshot).unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn render_rejects_invalid_values() {
        let mut snapshot = ResponseSnapshot {
            status: 42,
            ..ResponseSnapshot::default()
        };
        assert_eq!(render(&snapshot).unwrap_err(), DispatchError::InvalidStatus(42));

        snapshot.status = 200;
        snapshot.content_type = "text/plain\nx-injected: 1".into();
        assert!(matches!(
            render(&snapshot).unwrap_err(),
            DispatchError::InvalidContentType(_)
        ));
    }

    #[test]
    fn fallback_is_plain_not_found() {
        let response = fallback_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
    }
}
