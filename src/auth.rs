//! Authentication schemes, the pre-seeded auth cache and the per-client
//! request context that attaches credentials before the first request.

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::{header::HeaderValue, Url};

use crate::{AuthScope, AuthType, Credential, PagerDutyError, Result};

/// Algorithm producing an `Authorization` header value from a credential.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AuthScheme {
    Basic,
    Token,
}

impl AuthScheme {
    pub fn for_type(auth_type: AuthType) -> Self {
        match auth_type {
            AuthType::Basic => Self::Basic,
            AuthType::Token => Self::Token,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Token => "Token",
        }
    }

    /// Produces the header value for `credential`.
    ///
    /// Fails when the credential variant belongs to the other scheme.
    pub fn authenticate(self, credential: &Credential) -> Result<HeaderValue> {
        if Self::for_type(credential.auth_type()) != self {
            return Err(PagerDutyError::InvalidHeader(format!(
                "{} scheme cannot use {:?} credentials",
                self.name(),
                credential.auth_type()
            )));
        }
        credential.header_value()
    }
}

/// Scheme, host and port (or the wildcard port) an auth cache entry is keyed on.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct TargetHost {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
}

impl TargetHost {
    pub fn new(scheme: &str, host: &str, port: Option<u16>) -> Self {
        Self {
            scheme: scheme.to_ascii_lowercase(),
            host: host.to_ascii_lowercase(),
            port,
        }
    }

    pub fn https(host: &str, port: Option<u16>) -> Self {
        Self::new("https", host, port)
    }
}

/// Maps a target host to a pre-authenticated scheme.
#[derive(Clone, Debug, Default)]
pub struct AuthCache {
    entries: HashMap<TargetHost, Arc<AuthScheme>>,
}

impl AuthCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, target: TargetHost, scheme: Arc<AuthScheme>) {
        self.entries.insert(target, scheme);
    }

    /// Exact lookup; `port: None` addresses the wildcard entry.
    pub fn get(&self, scheme: &str, host: &str, port: Option<u16>) -> Option<&Arc<AuthScheme>> {
        self.entries.get(&TargetHost::new(scheme, host, port))
    }

    /// Looks up the explicit port first, then the wildcard entry for the
    /// same scheme and host.
    pub fn resolve(&self, scheme: &str, host: &str, port: Option<u16>) -> Option<&Arc<AuthScheme>> {
        port.and_then(|port| self.get(scheme, host, Some(port)))
            .or_else(|| self.get(scheme, host, None))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Target authentication state: which scheme, scope and credential every
/// request to the tenant host carries.
#[derive(Clone, Debug)]
pub struct AuthState {
    scheme: Arc<AuthScheme>,
    scope: AuthScope,
    credential: Credential,
}

impl AuthState {
    pub(crate) fn new(scheme: Arc<AuthScheme>, scope: AuthScope, credential: Credential) -> Self {
        Self {
            scheme,
            scope,
            credential,
        }
    }

    pub fn scheme(&self) -> &Arc<AuthScheme> {
        &self.scheme
    }

    pub fn scope(&self) -> &AuthScope {
        &self.scope
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn header_value(&self) -> Result<HeaderValue> {
        self.scheme.authenticate(&self.credential)
    }
}

/// Per-client context holding the seeded cache and target auth state.
#[derive(Clone, Debug)]
pub struct RequestContext {
    auth_cache: AuthCache,
    target_auth_state: AuthState,
}

impl RequestContext {
    pub(crate) fn new(auth_cache: AuthCache, target_auth_state: AuthState) -> Self {
        Self {
            auth_cache,
            target_auth_state,
        }
    }

    pub fn auth_cache(&self) -> &AuthCache {
        &self.auth_cache
    }

    pub fn target_auth_state(&self) -> &AuthState {
        &self.target_auth_state
    }

    /// Returns the `Authorization` value for a request to `url`, or `None`
    /// when the URL's scheme and host are not covered by the cache.
    ///
    /// Only `https` entries are seeded; the wildcard entry covers every port
    /// on the tenant host, so credentials never travel in cleartext.
    pub fn authorize(&self, url: &Url) -> Result<Option<HeaderValue>> {
        let Some(host) = url.host_str() else {
            return Ok(None);
        };
        match self
            .auth_cache
            .resolve(url.scheme(), host, url.port_or_known_default())
        {
            Some(scheme) => scheme
                .authenticate(&self.target_auth_state.credential)
                .map(Some),
            None => Ok(None),
        }
    }
}
