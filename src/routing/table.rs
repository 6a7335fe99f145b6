//! Route registration and lookup.
//!
//! # Responsibilities
//! - Map a path to the response configured for it
//! - Answer lookups by exact path and case-insensitive method
//! - Accept registrations while requests are being dispatched
//!
//! # Design Decisions
//! - One config per path; registering a path again replaces it
//! - Backed by `DashMap`: an insert is visible whole or not at all
//! - A lookup returns the config's current snapshot, not the one taken at
//!   registration time
//! - Explicit `None` on miss; the caller owns the fallback

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;

use crate::routing::response::{ResponseConfig, ResponseSnapshot};

/// Concurrent table of registered routes keyed by path.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: DashMap<String, ResponseConfig>,
}

impl RouteTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `path` with a default response and return it for customization.
    ///
    /// A path without a leading `/` gets one. Registering the same path twice
    /// discards the earlier config.
    pub fn add_route(&self, path: &str) -> ResponseConfig {
        let config = ResponseConfig::new();
        self.insert(path, config.clone());
        config
    }

    /// Register an already configured response under `path`.
    pub fn insert(&self, path: &str, config: ResponseConfig) {
        let path = normalize_path(path);
        if self.routes.insert(path.clone(), config).is_some() {
            tracing::debug!(path = %path, "Route replaced");
        } else {
            tracing::debug!(path = %path, "Route added");
        }
    }

    /// Make `routes` the whole table.
    ///
    /// Every entry is upserted before any stale path is removed, so a path
    /// kept across the swap never misses a lookup.
    pub fn replace_all<I>(&self, routes: I)
    where
        I: IntoIterator<Item = (String, ResponseConfig)>,
    {
        let mut keep = HashSet::new();
        for (path, config) in routes {
            let path = normalize_path(&path);
            self.routes.insert(path.clone(), config);
            keep.insert(path);
        }
        self.routes.retain(|path, _| keep.contains(path));
    }

    /// Find the response for `path` if it is registered under `method`.
    pub fn lookup(&self, path: &str, method: &str) -> Option<Arc<ResponseSnapshot>> {
        // Clone the handle out so the shard lock is released before loading.
        let config = self.routes.get(path).map(|entry| entry.value().clone())?;
        let snapshot = config.snapshot();
        snapshot.answers(method).then_some(snapshot)
    }

    /// The config handle registered for `path`, regardless of method.
    pub fn get(&self, path: &str) -> Option<ResponseConfig> {
        self.routes.get(&normalize_path(path)).map(|entry| entry.value().clone())
    }

    /// Remove every route.
    pub fn clear(&self) {
        self.routes.clear();
    }

    /// Number of registered paths.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no route is registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}
