//! Shared utilities for integration tests.

use std::net::SocketAddr;

use local_web_server::StubServer;

/// A client that never reuses connections or consults proxy settings.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Start a stub server on `port` and return it with its address.
pub async fn start_server(port: u16) -> (StubServer, SocketAddr) {
    let mut server = StubServer::new(port);
    let addr = server.start().await.expect("server starts");
    (server, addr)
}

/// `http://<addr><path>`.
pub fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{addr}{path}")
}
