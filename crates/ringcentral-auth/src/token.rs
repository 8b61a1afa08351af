//! Token endpoint payloads
//!
//! Builds the form bodies for the password and refresh grants and describes
//! the JSON the token endpoint answers with. Both grants POST to
//! `TOKEN_ENDPOINT` and authenticate the application with HTTP Basic
//! credentials derived from the app key and secret.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::constants::{ACCESS_TOKEN_TTL, refresh_token_ttl};

/// Response from the token endpoint for both password and refresh grants.
///
/// TTLs are deltas in seconds from the response time. They are optional
/// here because the endpoint may omit them; `Auth` falls back to the
/// requested lifetimes in that case.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token_expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub endpoint_id: Option<String>,
}

/// OAuth grant sent to the token endpoint.
#[derive(Debug, Clone, Copy)]
pub enum Grant<'a> {
    /// Resource owner password credentials.
    Password {
        username: &'a str,
        password: &'a str,
        extension: &'a str,
        remember: bool,
    },
    /// Exchange a refresh token for a new token pair.
    RefreshToken {
        refresh_token: &'a str,
        remember: bool,
    },
}

impl Grant<'_> {
    /// The `grant_type` form value.
    pub fn grant_type(&self) -> &'static str {
        match self {
            Grant::Password { .. } => "password",
            Grant::RefreshToken { .. } => "refresh_token",
        }
    }

    /// Form fields in the order they are sent.
    ///
    /// Values are raw: the form encoder escapes every field the same way,
    /// the password included. An empty extension is left out.
    pub fn form(&self) -> Vec<(String, String)> {
        let mut fields = Vec::with_capacity(6);
        let remember = match *self {
            Grant::Password {
                username,
                password,
                extension,
                remember,
            } => {
                fields.push(("username".to_string(), username.to_string()));
                fields.push(("password".to_string(), password.to_string()));
                if !extension.is_empty() {
                    fields.push(("extension".to_string(), extension.to_string()));
                }
                remember
            }
            Grant::RefreshToken {
                refresh_token,
                remember,
            } => {
                fields.push(("refresh_token".to_string(), refresh_token.to_string()));
                remember
            }
        };
        fields.push(("grant_type".to_string(), self.grant_type().to_string()));
        fields.push(("access_token_ttl".to_string(), ACCESS_TOKEN_TTL.to_string()));
        fields.push((
            "refresh_token_ttl".to_string(),
            refresh_token_ttl(remember).to_string(),
        ));
        fields
    }
}

/// `Authorization` header value for the OAuth endpoints.
///
/// `Basic BASE64(app_key:app_secret)`
pub fn basic_authorization(app_key: &str, app_secret: &str) -> String {
    let encoded = STANDARD.encode(format!("{app_key}:{app_secret}"));
    format!("Basic {encoded}")
}
