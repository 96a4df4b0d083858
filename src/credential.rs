use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::HeaderValue;

use crate::{PagerDutyError, Result};

/// Authentication scheme selected by the credential variant.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AuthType {
    /// HTTP Basic (`Authorization: Basic <base64(user:pass)>`).
    Basic,
    /// PagerDuty API token (`Authorization: Token token=<token>`).
    Token,
}

/// Credential attached to requests for a tenant host.
///
/// `Debug` never prints passwords or tokens.
#[derive(Clone, Eq, PartialEq)]
pub enum Credential {
    UsernamePassword { username: String, password: String },
    Token { token: String },
}

impl Credential {
    pub fn username_password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::UsernamePassword {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn token(token: impl Into<String>) -> Self {
        Self::Token {
            token: token.into(),
        }
    }

    pub fn auth_type(&self) -> AuthType {
        match self {
            Self::UsernamePassword { .. } => AuthType::Basic,
            Self::Token { .. } => AuthType::Token,
        }
    }

    /// Serializes the credential into its `Authorization` header value.
    ///
    /// Inputs are never validated up front, so a value containing bytes that
    /// are illegal in a header only fails here, at request time.
    pub fn header_value(&self) -> Result<HeaderValue> {
        let raw = match self {
            Self::UsernamePassword { username, password } => {
                format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
            }
            Self::Token { token } => format!("Token token={token}"),
        };
        let mut value = HeaderValue::from_str(&raw).map_err(|_| {
            PagerDutyError::InvalidHeader(format!(
                "{:?} credential contains characters not allowed in a header",
                self.auth_type()
            ))
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UsernamePassword { username, .. } => f
                .debug_struct("UsernamePassword")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Token { .. } => f
                .debug_struct("Token")
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}

/// Host and port a credential applies to. A `None` port matches any port.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct AuthScope {
    pub host: String,
    pub port: Option<u16>,
}

impl AuthScope {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port: Some(port),
        }
    }

    pub fn any_port(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
        }
    }

    /// Host comparison is case-insensitive; an unspecified port on either
    /// side matches every port.
    pub fn matches(&self, other: &AuthScope) -> bool {
        if !self.host.eq_ignore_ascii_case(&other.host) {
            return false;
        }
        match (self.port, other.port) {
            (Some(left), Some(right)) => left == right,
            _ => true,
        }
    }
}

/// Credentials store consulted when a request was not pre-authenticated.
#[derive(Clone, Debug, Default)]
pub struct CredentialsProvider {
    entries: Vec<(AuthScope, Credential)>,
}

impl CredentialsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `credential` for `scope`, replacing an identical scope.
    pub fn set_credentials(&mut self, scope: AuthScope, credential: Credential) {
        if let Some(entry) = self.entries.iter_mut().find(|(existing, _)| *existing == scope) {
            entry.1 = credential;
        } else {
            self.entries.push((scope, credential));
        }
    }

    pub fn credentials(&self, scope: &AuthScope) -> Option<&Credential> {
        self.entries
            .iter()
            .find(|(registered, _)| registered.matches(scope))
            .map(|(_, credential)| credential)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
