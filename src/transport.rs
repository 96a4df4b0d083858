//! User agent and connection pool setup.

use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::{header::HeaderValue, RequestBuilder};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::{config::HTTPS_PORT, PagerDutyError, Result};

/// Prefix of every `User-Agent` sent by this crate.
pub const USER_AGENT_PREFIX: &str = "PagerDuty Client/";

/// Pool limit applied both in total and per route.
pub const MAX_CONNECTIONS: usize = 4;

/// Version string appended to [`USER_AGENT_PREFIX`].
pub fn library_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Protocol parameters applied to every outbound request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransportParams {
    user_agent: String,
}

impl TransportParams {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn user_agent_header(&self) -> Result<HeaderValue> {
        HeaderValue::from_str(&self.user_agent)
            .map_err(|_| PagerDutyError::InvalidHeader(format!("user agent '{}'", self.user_agent)))
    }

    pub fn apply(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        Ok(request.header(reqwest::header::USER_AGENT, self.user_agent_header()?))
    }
}

impl Default for TransportParams {
    fn default() -> Self {
        Self::new(format!("{USER_AGENT_PREFIX}{}", library_version()))
    }
}

/// URL scheme the connection manager accepts, with its default port.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Scheme {
    name: &'static str,
    default_port: u16,
}

impl Scheme {
    pub fn https() -> Self {
        Self {
            name: "https",
            default_port: HTTPS_PORT,
        }
    }

    /// Plain HTTP, for local stubs and proxies only.
    pub fn http() -> Self {
        Self {
            name: "http",
            default_port: 80,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn default_port(&self) -> u16 {
        self.default_port
    }
}

/// Pooled HTTP transport shared by every clone of a client.
///
/// At most [`MAX_CONNECTIONS`] requests are in flight at once. Every client
/// talks to a single tenant route, so the total cap is also the per-route cap.
#[derive(Clone, Debug)]
pub struct ConnectionManager {
    schemes: Vec<Scheme>,
    max_total: usize,
    max_per_route: usize,
    permits: Arc<Semaphore>,
    http: reqwest::Client,
}

impl ConnectionManager {
    pub fn builder() -> ConnectionManagerBuilder {
        ConnectionManagerBuilder::default()
    }

    pub fn schemes(&self) -> &[Scheme] {
        &self.schemes
    }

    pub fn is_registered(&self, scheme: &str) -> bool {
        self.schemes
            .iter()
            .any(|registered| registered.name.eq_ignore_ascii_case(scheme))
    }

    pub fn max_total(&self) -> usize {
        self.max_total
    }

    pub fn max_per_route(&self) -> usize {
        self.max_per_route
    }

    /// Connection slots not currently held by an in-flight request.
    pub fn available_connections(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Waits for a free connection slot; the slot is released when the
    /// permit is dropped.
    pub(crate) async fn acquire(&self) -> Result<OwnedSemaphorePermit> {
        Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| PagerDutyError::PoolClosed)
    }
}

/// Builder for [`ConnectionManager`]. Starts with only `https` registered.
#[derive(Debug)]
pub struct ConnectionManagerBuilder {
    schemes: Vec<Scheme>,
    resolve: Vec<(String, SocketAddr)>,
}

impl Default for ConnectionManagerBuilder {
    fn default() -> Self {
        Self {
            schemes: vec![Scheme::https()],
            resolve: Vec::new(),
        }
    }
}

impl ConnectionManagerBuilder {
    /// Registers an additional scheme; registering the same name twice is a no-op.
    pub fn register(mut self, scheme: Scheme) -> Self {
        if !self.schemes.iter().any(|known| known.name == scheme.name) {
            self.schemes.push(scheme);
        }
        self
    }

    /// Pins `host` to `addr`, bypassing DNS. The port comes from the URL.
    pub fn resolve(mut self, host: impl Into<String>, addr: SocketAddr) -> Self {
        self.resolve.push((host.into(), addr));
        self
    }

    /// Builds the pooled client.
    ///
    /// An error here means the TLS backend could not be initialized; it is
    /// not recoverable by retrying.
    pub fn build(self) -> Result<ConnectionManager> {
        let https_only = !self.schemes.iter().any(|scheme| scheme.name == "http");
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .https_only(https_only)
            .pool_max_idle_per_host(MAX_CONNECTIONS);
        for (host, addr) in &self.resolve {
            builder = builder.resolve(host, *addr);
        }
        let http = builder.build().map_err(PagerDutyError::ConnectionSetup)?;

        Ok(ConnectionManager {
            schemes: self.schemes,
            max_total: MAX_CONNECTIONS,
            max_per_route: MAX_CONNECTIONS,
            permits: Arc::new(Semaphore::new(MAX_CONNECTIONS)),
            http,
        })
    }
}
