//! Platform configuration
//!
//! Everything the platform needs is passed in explicitly through
//! `PlatformConfig`; there is no global configuration state.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use common::Secret;
use serde::Deserialize;

/// RingCentral API environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Server {
    #[default]
    Sandbox,
    Production,
}

impl Server {
    pub fn base_url(&self) -> &'static str {
        match self {
            Server::Sandbox => "https://platform.devtest.ringcentral.com",
            Server::Production => "https://platform.ringcentral.com",
        }
    }
}

impl FromStr for Server {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Server::Sandbox),
            "production" => Ok(Server::Production),
            other => Err(format!(
                "unknown server {other:?}, expected sandbox or production"
            )),
        }
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Server::Sandbox => f.write_str("sandbox"),
            Server::Production => f.write_str("production"),
        }
    }
}

/// Application credentials and transport settings for a `Platform`.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub app_key: String,
    pub app_secret: Secret<String>,
    /// API base URL, e.g. `https://platform.ringcentral.com`
    pub base_url: String,
    /// Sent as `User-Agent` on every request when set
    pub user_agent: Option<String>,
    /// Per-request timeout; the transport default applies when unset
    pub timeout: Option<Duration>,
}

impl PlatformConfig {
    pub fn new(app_key: impl Into<String>, app_secret: impl Into<String>, server: Server) -> Self {
        Self {
            app_key: app_key.into(),
            app_secret: Secret::new(app_secret.into()),
            base_url: server.base_url().to_string(),
            user_agent: None,
            timeout: None,
        }
    }

    /// Point at a custom API base URL instead of a named server.
    ///
    /// Endpoints are absolute paths, so only the scheme, host and port of
    /// `base_url` are used: `https://host/prefix` sends `/restapi/...` to
    /// `https://host/restapi/...`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
