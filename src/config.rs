use reqwest::Url;

use crate::{AuthScope, AuthType, Credential, PagerDutyError, Result};

/// Domain every tenant subdomain lives under.
pub const PAGERDUTY_DOMAIN: &str = "pagerduty.com";

/// Port every tenant host is reached on.
pub const HTTPS_PORT: u16 = 443;

/// Formats a tenant subdomain into its host name.
///
/// Example: `"acme"` → `"acme.pagerduty.com"`
pub fn subdomain_to_host(subdomain: &str) -> String {
    format!("{subdomain}.{PAGERDUTY_DOMAIN}")
}

/// Immutable client configuration for one PagerDuty tenant.
///
/// Built with [`ClientConfig::for_basic_auth`] or
/// [`ClientConfig::for_token_auth`]; neither validates its inputs, bad
/// credentials are reported by the server at request time.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientConfig {
    subdomain: String,
    auth_scope: AuthScope,
    credential: Credential,
}

impl ClientConfig {
    pub fn for_basic_auth(
        subdomain: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::with_credential(subdomain, Credential::username_password(username, password))
    }

    pub fn for_token_auth(subdomain: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_credential(subdomain, Credential::token(token))
    }

    fn with_credential(subdomain: impl Into<String>, credential: Credential) -> Self {
        let subdomain = subdomain.into();
        let auth_scope = AuthScope::new(subdomain_to_host(&subdomain), HTTPS_PORT);
        Self {
            subdomain,
            auth_scope,
            credential,
        }
    }

    pub fn subdomain(&self) -> &str {
        &self.subdomain
    }

    pub fn host(&self) -> &str {
        &self.auth_scope.host
    }

    pub fn auth_scope(&self) -> &AuthScope {
        &self.auth_scope
    }

    pub fn auth_type(&self) -> AuthType {
        self.credential.auth_type()
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// `https://<subdomain>.pagerduty.com/`
    pub fn base_url(&self) -> Result<Url> {
        let raw = format!("https://{}/", self.host());
        Url::parse(&raw).map_err(|err| PagerDutyError::InvalidUrl(format!("{raw}: {err}")))
    }
}
