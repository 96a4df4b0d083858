use std::fmt;
use std::time::Duration;

use reqwest::{header, Method, RequestBuilder, Url};

use crate::{
    auth::RequestContext,
    factory::{build_connection_manager, build_request_context, build_transport_params},
    transport::{ConnectionManager, TransportParams},
    ClientConfig, ClientOptions, PagerDutyError, PagerDutyResponse, Result, Settings,
};

#[derive(Clone)]
/// HTTP client whose requests to the tenant host are authenticated up front.
///
/// Cloning is cheap and shares the connection pool.
pub struct PagerDutyClient {
    config: ClientConfig,
    context: RequestContext,
    params: TransportParams,
    connections: ConnectionManager,
    base_url: Url,
    options: ClientOptions,
}

impl fmt::Debug for PagerDutyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagerDutyClient")
            .field("host", &self.config.host())
            .field("auth_type", &self.config.auth_type())
            .field("credential", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("user_agent", &self.params.user_agent())
            .field("options", &self.options)
            .finish()
    }
}

impl PagerDutyClient {
    /// Creates a client for `config` with the default HTTPS-only pool.
    ///
    /// Fails only when the TLS backend cannot be initialized.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pagerduty_http::{ClientConfig, PagerDutyClient};
    ///
    /// let client = PagerDutyClient::new(ClientConfig::for_token_auth("acme", "my-token"))
    ///     .expect("tls backend must initialize");
    /// ```
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::from_parts(config, build_connection_manager()?)
    }

    /// Creates a client that sends through a caller-built connection manager.
    pub fn from_parts(config: ClientConfig, connections: ConnectionManager) -> Result<Self> {
        let base_url = config.base_url()?;
        let context = build_request_context(&config);
        let params = build_transport_params(&config);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            host = config.host(),
            auth_type = ?config.auth_type(),
            "pagerduty client configured"
        );

        Ok(Self {
            config,
            context,
            params,
            connections,
            base_url,
            options: ClientOptions::default(),
        })
    }

    /// Creates a client from `PAGERDUTY_*` environment variables.
    ///
    /// See [`Settings::from_env`].
    pub fn from_env() -> Result<Self> {
        Self::new(Settings::from_env()?.into_config()?)
    }

    /// Applies client options such as the request timeout.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    /// Sends requests to `base_url` instead of `https://<subdomain>.pagerduty.com/`.
    ///
    /// Credentials are still only attached to `https` URLs on the tenant host.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    pub fn transport_params(&self) -> &TransportParams {
        &self.params
    }

    pub fn connections(&self) -> &ConnectionManager {
        &self.connections
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds a request for `path` relative to the base URL with
    /// `Authorization`, `User-Agent` and the timeout already set.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self
            .base_url
            .join(path)
            .map_err(|err| PagerDutyError::InvalidUrl(format!("{path}: {err}")))?;
        if !self.connections.is_registered(url.scheme()) {
            return Err(PagerDutyError::UnsupportedScheme(url.scheme().to_owned()));
        }

        let authorization = self.context.authorize(&url)?;
        let mut builder = self
            .connections
            .http()
            .request(method, url)
            .timeout(Duration::from_millis(self.options.timeout_ms));
        builder = self.params.apply(builder)?;
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        Ok(builder)
    }

    pub fn get(&self, path: &str) -> Result<RequestBuilder> {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> Result<RequestBuilder> {
        self.request(Method::POST, path)
    }

    pub fn put(&self, path: &str) -> Result<RequestBuilder> {
        self.request(Method::PUT, path)
    }

    pub fn delete(&self, path: &str) -> Result<RequestBuilder> {
        self.request(Method::DELETE, path)
    }

    /// Sends a request built by this client once.
    ///
    /// Waits for one of the pool's connection slots first; the slot is held
    /// by the returned response until its body is consumed. Non-success
    /// statuses, including 401/403 for bad credentials, are returned as
    /// [`PagerDutyError::Http`]; nothing is retried.
    pub async fn send(&self, request: RequestBuilder) -> Result<PagerDutyResponse> {
        let permit = self.connections.acquire().await?;
        let response = request.send().await.map_err(PagerDutyError::Transport)?;
        let status = response.status();

        #[cfg(feature = "tracing")]
        tracing::debug!(url = %response.url(), %status, "pagerduty request completed");

        if status.is_success() {
            return Ok(PagerDutyResponse::new(response, permit));
        }

        #[cfg(feature = "tracing")]
        tracing::warn!(%status, host = self.config.host(), "pagerduty request failed");

        let body = response.text().await.map_err(PagerDutyError::Transport)?;
        drop(permit);
        Err(PagerDutyError::Http {
            status: status.as_u16(),
            body,
        })
    }
}
