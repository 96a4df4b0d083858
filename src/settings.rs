use std::fmt;

use serde::Deserialize;

use crate::{ClientConfig, PagerDutyError, Result};

/// Tenant settings as they appear in a JSON properties file.
///
/// A token takes precedence over username/password.
#[derive(Clone, Default, Deserialize, Eq, PartialEq)]
pub struct Settings {
    #[serde(rename = "pagerduty.subdomain")]
    pub subdomain: String,
    #[serde(rename = "pagerduty.username", default)]
    pub username: Option<String>,
    #[serde(rename = "pagerduty.password", default)]
    pub password: Option<String>,
    #[serde(rename = "pagerduty.token", default)]
    pub token: Option<String>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("Settings")
            .field("subdomain", &self.subdomain)
            .field("username", &self.username)
            .field("password", &redacted(&self.password))
            .field("token", &redacted(&self.token))
            .finish()
    }
}

impl Settings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|err| PagerDutyError::Config(format!("invalid settings JSON: {err}")))
    }

    /// Reads `PAGERDUTY_SUBDOMAIN` and either `PAGERDUTY_TOKEN` or
    /// `PAGERDUTY_USERNAME` + `PAGERDUTY_PASSWORD`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let subdomain = lookup("PAGERDUTY_SUBDOMAIN").ok_or_else(|| {
            PagerDutyError::Config("missing PAGERDUTY_SUBDOMAIN environment variable".to_owned())
        })?;
        Ok(Self {
            subdomain,
            username: lookup("PAGERDUTY_USERNAME"),
            password: lookup("PAGERDUTY_PASSWORD"),
            token: lookup("PAGERDUTY_TOKEN"),
        })
    }

    pub fn into_config(self) -> Result<ClientConfig> {
        if self.subdomain.trim().is_empty() {
            return Err(PagerDutyError::Config(
                "pagerduty.subdomain is set but empty".to_owned(),
            ));
        }
        if let Some(token) = self.token.filter(|token| !token.trim().is_empty()) {
            return Ok(ClientConfig::for_token_auth(self.subdomain, token));
        }
        match (self.username, self.password) {
            (Some(username), Some(password)) => Ok(ClientConfig::for_basic_auth(
                self.subdomain,
                username,
                password,
            )),
            _ => Err(PagerDutyError::Config(
                "either pagerduty.token or pagerduty.username and pagerduty.password are required"
                    .to_owned(),
            )),
        }
    }
}
