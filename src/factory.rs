//! Builds the pieces a [`crate::PagerDutyClient`] is made of from a
//! [`ClientConfig`].

use std::sync::Arc;

use crate::{
    auth::{AuthCache, AuthScheme, AuthState, RequestContext, TargetHost},
    config::HTTPS_PORT,
    transport::{ConnectionManager, TransportParams},
    ClientConfig, CredentialsProvider, Result,
};

/// Credentials store returning the config's credential for its auth scope.
pub fn build_credentials_provider(config: &ClientConfig) -> CredentialsProvider {
    let mut provider = CredentialsProvider::new();
    provider.set_credentials(config.auth_scope().clone(), config.credential().clone());
    provider
}

/// Seeds the auth cache for `https` on the tenant host, port 443 and the
/// wildcard port, both sharing one scheme instance, and sets the target auth
/// state so the first request is sent already authenticated.
pub fn build_request_context(config: &ClientConfig) -> RequestContext {
    let scheme = Arc::new(AuthScheme::for_type(config.auth_type()));

    let mut cache = AuthCache::new();
    cache.put(
        TargetHost::https(config.host(), Some(HTTPS_PORT)),
        Arc::clone(&scheme),
    );
    cache.put(TargetHost::https(config.host(), None), Arc::clone(&scheme));

    let state = AuthState::new(
        scheme,
        config.auth_scope().clone(),
        config.credential().clone(),
    );
    RequestContext::new(cache, state)
}

/// `User-Agent: PagerDuty Client/<version>`.
pub fn build_transport_params(_config: &ClientConfig) -> TransportParams {
    TransportParams::default()
}

/// One `https` scheme on port 443, pool limits fixed at
/// [`crate::MAX_CONNECTIONS`].
pub fn build_connection_manager() -> Result<ConnectionManager> {
    ConnectionManager::builder().build()
}
