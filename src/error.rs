/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum PagerDutyError {
    /// The TLS backend or connection pool could not be initialized.
    ///
    /// This is a startup-time condition; callers should abort rather than retry.
    #[error("connection setup failed: {0}")]
    ConnectionSetup(reqwest::Error),
    /// The connection pool stopped handing out slots.
    #[error("connection pool closed")]
    PoolClosed,
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// A credential or header could not be encoded as an HTTP header value.
    #[error("invalid header value: {0}")]
    InvalidHeader(String),
    /// A request path could not be resolved against the base URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    /// The request URL uses a scheme the connection manager does not serve.
    #[error("unsupported url scheme '{0}'")]
    UnsupportedScheme(String),
    /// Missing or inconsistent settings.
    #[error("config error: {0}")]
    Config(String),
}
