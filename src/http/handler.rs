//! Transport adapter between axum and the dispatcher.
//!
//! # Responsibilities
//! - Buffer the request body (up to the configured limit)
//! - Build the `CapturedRequest` handed to the dispatcher
//! - Turn the dispatch outcome into a response, including the fallback
//! - Wire up middleware (tracing)
//!
//! The body read is the only await before capture and carries the request
//! timeout; no timeout layer wraps the handler.
//!
//! Writing the response bytes is hyper's job once the handler returns;
//! write failures surface on the connection task, never here.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::capture::CapturedRequest;
use crate::config::ListenerConfig;
use crate::http::dispatcher::{fallback_response, render, Dispatch, Dispatcher};
use crate::net::connection::InFlightTracker;
use crate::observability::metrics;

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub in_flight: InFlightTracker,
    pub max_body_bytes: usize,
    pub body_timeout: Duration,
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>, in_flight: InFlightTracker, config: &ListenerConfig) -> Self {
        Self {
            dispatcher,
            in_flight,
            max_body_bytes: config.max_body_bytes,
            body_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

/// Build the router: every method and path goes to [`intercept`].
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .fallback(intercept)
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// Capture, dispatch, respond.
async fn intercept(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let guard = state.in_flight.track();

    let (parts, body) = request.into_parts();
    let read = axum::body::to_bytes(body, state.max_body_bytes);
    let body = match tokio::time::timeout(state.body_timeout, read).await {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => {
            tracing::warn!(
                request = %guard.seq(),
                path = %parts.uri.path(),
                error = %e,
                "Failed to read request body, capturing without it"
            );
            Bytes::new()
        }
        Err(_) => {
            tracing::warn!(
                request = %guard.seq(),
                path = %parts.uri.path(),
                timeout = ?state.body_timeout,
                "Request body not received in time, capturing without it"
            );
            Bytes::new()
        }
    };

    let mut record = CapturedRequest::new(parts.method, parts.uri.path(), parts.headers, body)
        .with_query(parts.uri.query().map(str::to_string));
    if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
        record = record.with_remote_addr(*addr);
    }

    match state.dispatcher.dispatch(record) {
        Dispatch::Matched(snapshot) => match render(&snapshot) {
            Ok(response) => {
                metrics::record_request("matched", start_time);
                response
            }
            Err(e) => {
                tracing::error!(request = %guard.seq(), error = %e, "Cannot render configured response");
                metrics::record_request("invalid", start_time);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
        },
        Dispatch::Unmatched => {
            metrics::record_request("unmatched", start_time);
            fallback_response()
        }
    }
}
