//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Route paths and methods are well formed
//! - Value ranges (timeouts and limits > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: `&ServerConfig -> Result<(), Vec<ValidationError>>`
//! - Status codes are not range checked; an odd status is a legitimate
//!   thing for a test double to serve

use thiserror::Error;

use crate::config::schema::{RouteSpec, ServerConfig};

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route #{index}: path {path:?} must start with '/'")]
    RelativePath { index: usize, path: String },

    #[error("route #{index}: method {method:?} is not a valid HTTP token")]
    InvalidMethod { index: usize, method: String },

    #[error("route #{index}: `body` and `json` are mutually exclusive")]
    ConflictingBody { index: usize },

    #[error("listener.{field} must be greater than zero")]
    Zero { field: &'static str },
}

/// Check `config`, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let listener = &config.listener;
    if listener.max_body_bytes == 0 {
        errors.push(ValidationError::Zero { field: "max_body_bytes" });
    }
    if listener.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "request_timeout_secs" });
    }
    if listener.shutdown_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "shutdown_timeout_secs" });
    }

    for (index, route) in config.routes.iter().enumerate() {
        validate_route(index, route, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_route(index: usize, route: &RouteSpec, errors: &mut Vec<ValidationError>) {
    if !route.path.starts_with('/') {
        errors.push(ValidationError::RelativePath {
            index,
            path: route.path.clone(),
        });
    }
    if !is_token(&route.method) {
        errors.push(ValidationError::InvalidMethod {
            index,
            method: route.method.clone(),
        });
    }
    if route.body.is_some() && route.json.is_some() {
        errors.push(ValidationError::ConflictingBody { index });
    }
}

// RFC 9110 token characters.
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~'
                )
        })
}
