//! `pagerduty-http` builds pre-authenticated HTTP clients for PagerDuty
//! tenant hosts (`https://<subdomain>.pagerduty.com`).
//!
//! - [`ClientConfig::for_basic_auth`] / [`ClientConfig::for_token_auth`]
//!   choose the credential and scheme.
//! - [`PagerDutyClient`] attaches `Authorization` and `User-Agent` to every
//!   request for the tenant host, starting with the first one.
//! - [`build_request_context`], [`build_credentials_provider`],
//!   [`build_transport_params`] and [`build_connection_manager`] expose the
//!   individual building steps.

mod auth;
mod client;
mod config;
mod credential;
mod error;
mod factory;
mod options;
mod response;
mod settings;
mod transport;

pub use auth::{AuthCache, AuthScheme, AuthState, RequestContext, TargetHost};
pub use client::PagerDutyClient;
pub use config::{subdomain_to_host, ClientConfig, HTTPS_PORT, PAGERDUTY_DOMAIN};
pub use credential::{AuthScope, AuthType, Credential, CredentialsProvider};
pub use error::PagerDutyError;
pub use factory::{
    build_connection_manager, build_credentials_provider, build_request_context,
    build_transport_params,
};
pub use options::ClientOptions;
pub use response::PagerDutyResponse;
pub use settings::Settings;
pub use transport::{
    library_version, ConnectionManager, ConnectionManagerBuilder, Scheme, TransportParams,
    MAX_CONNECTIONS, USER_AGENT_PREFIX,
};

pub type Result<T> = std::result::Result<T, PagerDutyError>;
