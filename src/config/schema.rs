//! Configuration schema definitions.
//!
//! This module defines the configuration structure for the stub server.
//! All types derive Serde traits for deserialization from TOML files.

use serde::{Deserialize, Serialize};

/// Root configuration for the stub server.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (port, limits, timeouts).
    pub listener: ListenerConfig,

    /// Routes registered at startup.
    pub routes: Vec<RouteSpec>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Loopback port to bind; 0 picks an ephemeral port.
    pub port: u16,

    /// Largest request body that is buffered and captured.
    pub max_body_bytes: usize,

    /// How long a request body may take to arrive, in seconds.
    pub request_timeout_secs: u64,

    /// Deadline for `stop` to drain in-flight requests and join the server.
    pub shutdown_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            port: 0,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
            request_timeout_secs: 30,
            shutdown_timeout_secs: 5,
        }
    }
}

/// A route declared in the configuration file.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RouteSpec {
    /// Exact path to match, starting with `/`.
    pub path: String,

    /// HTTP method to match.
    #[serde(default = "default_method")]
    pub method: String,

    /// Status code to answer with.
    #[serde(default = "default_status")]
    pub status: u16,

    /// Plain text body.
    #[serde(default)]
    pub body: Option<String>,

    /// JSON body; sets the content type to `application/json`.
    #[serde(default)]
    pub json: Option<serde_json::Value>,

    /// Explicit content type, applied after the body.
    #[serde(default)]
    pub content_type: Option<String>,
}

impl RouteSpec {
    /// A `GET` route answering `200` with an empty body.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: default_method(),
            status: default_status(),
            body: None,
            json: None,
            content_type: None,
        }
    }
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_status() -> u16 {
    200
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.listener.max_body_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn parses_routes() {
        let config: ServerConfig = toml::from_str(
            r#"
            [listener]
            port = 45763

            [[routes]]
            path = "/test"
            method = "POST"
            status = 202
            body = "hello from route"

            [[routes]]
            path = "/items"
            json = { id = 7, tags = ["a", "b"] }
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.port, 45763);
        assert_eq!(config.listener.request_timeout_secs, 30);
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[0].method, "POST");
        assert_eq!(config.routes[0].status, 202);
        assert_eq!(config.routes[1].method, "GET");
        assert_eq!(config.routes[1].status, 200);
        assert_eq!(config.routes[1].json.as_ref().unwrap()["id"], 7);
    }
}
