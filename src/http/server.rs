//! Stub server lifecycle.
//!
//! # Responsibilities
//! - Own the route table and capture log for one server instance
//! - Bind the loopback listener and spawn the axum serve task
//! - Expose the bound address once listening
//! - Stop: graceful shutdown with a deadline, then release the port
//!
//! # Design Decisions
//! - `Idle → Running → Stopped`; `Stopped` is terminal
//! - Bind errors are returned from `start` itself, never from the accept loop
//! - Routes and captures outlive a stop so test code can still inspect them

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use url::Url;

use crate::capture::{CaptureLog, CapturedRequest};
use crate::config::{ListenerConfig, RouteSpec, ServerConfig};
use crate::error::{Error, Result};
use crate::http::dispatcher::Dispatcher;
use crate::http::handler::{build_router, AppState};
use crate::net::connection::InFlightTracker;
use crate::net::listener::bind_loopback;
use crate::routing::{ResponseConfig, RouteTable};

/// Host name used in [`StubServer::uri`].
pub const LOCALHOST: &str = "localhost";

enum ServerState {
    Idle,
    Running(Running),
    Stopped,
}

struct Running {
    addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<std::io::Result<()>>,
}

impl Running {
    fn trigger(&self) {
        self.shutdown.send_replace(true);
    }
}

/// Local HTTP server answering registered routes with canned responses.
///
/// ```no_run
/// # async fn demo() -> local_web_server::Result<()> {
/// use local_web_server::StubServer;
///
/// let mut server = StubServer::new(45763);
/// server.start().await?;
/// server
///     .add_route("/test")
///     .with_http_status_code(202)
///     .with_string_body("hello from route")
///     .with_method("POST");
///
/// let endpoint = server.url("/test")?;
/// // point the code under test at `endpoint`, then:
/// for request in server.captured_requests() {
///     println!("{} {}", request.method(), request.path());
/// }
/// server.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct StubServer {
    config: ListenerConfig,
    routes: Arc<RouteTable>,
    captures: Arc<CaptureLog>,
    in_flight: InFlightTracker,
    state: ServerState,
}

impl StubServer {
    /// Server that will listen on `127.0.0.1:port` (0 for an ephemeral port).
    pub fn new(port: u16) -> Self {
        Self::with_listener(ListenerConfig {
            port,
            ..ListenerConfig::default()
        })
    }

    /// Server with explicit listener settings and no routes.
    pub fn with_listener(config: ListenerConfig) -> Self {
        Self {
            config,
            routes: Arc::new(RouteTable::new()),
            captures: Arc::new(CaptureLog::new()),
            in_flight: InFlightTracker::new(),
            state: ServerState::Idle,
        }
    }

    /// Server built from a full configuration, with its routes registered.
    pub fn with_config(config: &ServerConfig) -> Result<Self> {
        let server = Self::with_listener(config.listener.clone());
        server.apply_routes(&config.routes)?;
        Ok(server)
    }

    /// Bind and start serving.
    pub async fn start(&mut self) -> Result<SocketAddr> {
        self.start_with_cancel(std::future::pending()).await
    }

    /// Bind and start serving, unless `cancel` resolves first.
    ///
    /// A cancelled start leaves the server idle and the port unbound.
    pub async fn start_with_cancel<F>(&mut self, cancel: F) -> Result<SocketAddr>
    where
        F: Future<Output = ()>,
    {
        match &self.state {
            ServerState::Idle => {}
            ServerState::Running(running) => return Err(Error::AlreadyStarted(running.addr)),
            ServerState::Stopped => return Err(Error::Disposed),
        }

        let listener = tokio::select! {
            biased;
            _ = cancel => {
                tracing::info!(port = self.config.port, "Server start cancelled");
                return Err(Error::Cancelled);
            }
            bound = bind_loopback(self.config.port) => bound?,
        };
        let addr = listener.local_addr().map_err(Error::Bind)?;

        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&self.routes),
            Arc::clone(&self.captures),
        ));
        let state = AppState::new(dispatcher, self.in_flight.clone(), &self.config);
        let app = build_router(state).into_make_service_with_connect_info::<SocketAddr>();

        let (shutdown, mut signal) = watch::channel(false);
        let task = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    // A dropped sender also ends the wait.
                    let _ = signal.wait_for(|stop| *stop).await;
                })
                .await;
            tracing::info!(address = %addr, "HTTP server stopped");
            result
        });

        tracing::info!(address = %addr, routes = self.routes.len(), "Stub server listening");
        self.state = ServerState::Running(Running { addr, shutdown, task });
        Ok(addr)
    }

    /// Stop serving and release the port. Safe to call repeatedly.
    ///
    /// Draining in-flight requests and joining the serve task share one
    /// `shutdown_timeout_secs` deadline; after it the serve task is aborted.
    /// A stopped server cannot be started again.
    pub async fn stop(&mut self) -> Result<()> {
        let running = match std::mem::replace(&mut self.state, ServerState::Stopped) {
            ServerState::Running(running) => running,
            ServerState::Idle | ServerState::Stopped => return Ok(()),
        };

        let deadline = Instant::now() + Duration::from_secs(self.config.shutdown_timeout_secs);
        tracing::info!(
            address = %running.addr,
            in_flight = self.in_flight.active_count(),
            "Stopping stub server"
        );
        running.trigger();

        if !self.in_flight.wait_idle_until(deadline).await {
            tracing::warn!(
                in_flight = self.in_flight.active_count(),
                "In-flight requests did not finish before the deadline"
            );
        }

        let Running { addr, mut task, .. } = running;
        match tokio::time::timeout_at(deadline, &mut task).await {
            Ok(Ok(result)) => result.map_err(Error::Transport),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Serve task failed");
                Ok(())
            }
            Err(_) => {
                tracing::warn!(address = %addr, "Graceful shutdown timed out, aborting");
                task.abort();
                let _ = task.await;
                Ok(())
            }
        }
    }

    /// Address the server is bound to.
    pub fn address(&self) -> Result<SocketAddr> {
        match &self.state {
            ServerState::Running(running) => Ok(running.addr),
            ServerState::Idle => Err(Error::NotStarted),
            ServerState::Stopped => Err(Error::Disposed),
        }
    }

    /// `http://localhost:<port>/` for the bound port.
    pub fn uri(&self) -> Result<Url> {
        let addr = self.address()?;
        Ok(Url::parse(&format!("http://{LOCALHOST}:{}/", addr.port()))?)
    }

    /// Absolute URL for `path` on this server.
    pub fn url(&self, path: &str) -> Result<Url> {
        Ok(self.uri()?.join(path.trim_start_matches('/'))?)
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, ServerState::Running(_))
    }

    /// Register or replace a route; see [`RouteTable::add_route`].
    pub fn add_route(&self, path: &str) -> ResponseConfig {
        self.routes.add_route(path)
    }

    /// Register every route in `specs`, in order.
    ///
    /// Each route is fully configured before it becomes visible. Nothing is
    /// registered if any spec fails to build.
    pub fn apply_routes(&self, specs: &[RouteSpec]) -> Result<()> {
        for (path, config) in build_routes(specs)? {
            self.routes.insert(&path, config);
        }
        Ok(())
    }

    /// Swap the whole route set for `specs`.
    ///
    /// A path present in both the old and the new set stays answerable
    /// throughout; paths missing from `specs` are removed afterwards.
    pub fn replace_routes(&self, specs: &[RouteSpec]) -> Result<()> {
        self.routes.replace_all(build_routes(specs)?);
        tracing::info!(routes = self.routes.len(), "Routes replaced");
        Ok(())
    }

    /// Remove every route.
    pub fn clear_routes(&self) {
        self.routes.clear();
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Copy of every request received so far, in arrival order.
    pub fn captured_requests(&self) -> Vec<Arc<CapturedRequest>> {
        self.captures.snapshot()
    }

    pub fn captured_count(&self) -> usize {
        self.captures.len()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let ServerState::Running(running) = &self.state {
            running.trigger();
            running.task.abort();
        }
    }
}

fn build_routes(specs: &[RouteSpec]) -> Result<Vec<(String, ResponseConfig)>> {
    specs
        .iter()
        .map(|spec| {
            let route = ResponseConfig::new();
            route
                .with_method(spec.method.as_str())
                .with_http_status_code(spec.status);
            if let Some(json) = &spec.json {
                route.with_json_body(json)?;
            } else if let Some(body) = &spec.body {
                route.with_string_body(body.as_str());
            }
            if let Some(content_type) = &spec.content_type {
                route.with_content_type(content_type.as_str());
            }
            Ok((spec.path.clone(), route))
        })
        .collect()
}
