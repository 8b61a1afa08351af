//! In-memory token state for one SDK session
//!
//! `Auth` records when a token pair was issued and how long each half lives.
//! Validity is a timestamp comparison against that issue time; nothing here
//! talks to the network or persists anything.

use std::collections::BTreeMap;

use common::Secret;
use serde::Deserialize;
use tracing::debug;

use crate::constants::{ACCESS_TOKEN_TTL, refresh_token_ttl};
use crate::error::{Error, Result};
use crate::token::TokenResponse;

/// Current time as unix milliseconds.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// OAuth token state.
///
/// `issued_at` is a unix timestamp in milliseconds; TTLs are seconds. Token
/// strings are wrapped in `Secret` so `{:?}` never prints them.
#[derive(Debug, Clone, Default)]
pub struct Auth {
    access_token: Option<Secret<String>>,
    refresh_token: Option<Secret<String>>,
    token_type: Option<String>,
    issued_at: Option<u64>,
    access_ttl: u64,
    refresh_ttl: u64,
    remember: bool,
    scope: Option<String>,
    owner_id: Option<String>,
    endpoint_id: Option<String>,
}

impl Auth {
    /// Empty, unauthenticated state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a token endpoint answer, issued now.
    pub fn set_data(&mut self, json: &serde_json::Value) -> Result<()> {
        self.set_data_at(json, now_millis())
    }

    /// Store a token endpoint answer with an explicit issue time.
    ///
    /// On error the previous state is kept. Issue times in the future are
    /// clamped to now.
    pub fn set_data_at(&mut self, json: &serde_json::Value, issued_at: u64) -> Result<()> {
        let token = TokenResponse::deserialize_value(json)?;
        self.set_token(token, issued_at);
        Ok(())
    }

    /// Store an already parsed token response.
    pub fn set_token(&mut self, token: TokenResponse, issued_at: u64) {
        let issued_at = issued_at.min(now_millis());
        self.access_ttl = token
            .expires_in
            .filter(|ttl| *ttl > 0)
            .unwrap_or(ACCESS_TOKEN_TTL);
        self.refresh_ttl = token
            .refresh_token_expires_in
            .filter(|ttl| *ttl > 0)
            .unwrap_or_else(|| refresh_token_ttl(self.remember));
        self.access_token = Some(Secret::new(token.access_token));
        self.refresh_token = Some(Secret::new(token.refresh_token));
        self.token_type = token.token_type;
        self.scope = token.scope;
        self.owner_id = token.owner_id;
        self.endpoint_id = token.endpoint_id;
        self.issued_at = Some(issued_at);
        debug!(
            access_ttl = self.access_ttl,
            refresh_ttl = self.refresh_ttl,
            "stored token data"
        );
    }

    pub fn is_access_token_valid(&self) -> bool {
        self.is_access_token_valid_at(now_millis())
    }

    /// True iff an access token is held and `now < issued_at + access_ttl`.
    pub fn is_access_token_valid_at(&self, now: u64) -> bool {
        self.access_token.is_some() && self.valid_until(self.access_ttl, now)
    }

    pub fn is_refresh_token_valid(&self) -> bool {
        self.is_refresh_token_valid_at(now_millis())
    }

    /// True iff a refresh token is held and `now < issued_at + refresh_ttl`.
    pub fn is_refresh_token_valid_at(&self, now: u64) -> bool {
        self.refresh_token.is_some() && self.valid_until(self.refresh_ttl, now)
    }

    fn valid_until(&self, ttl_secs: u64, now: u64) -> bool {
        match self.issued_at {
            Some(issued_at) => now < issued_at.saturating_add(ttl_secs.saturating_mul(1000)),
            None => false,
        }
    }

    /// Drop every token field, back to the state of `Auth::new()`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn set_remember(&mut self, remember: bool) {
        self.remember = remember;
    }

    pub fn is_remember(&self) -> bool {
        self.remember
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_ref().map(|t| t.expose().as_str())
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_ref().map(|t| t.expose().as_str())
    }

    pub fn token_type(&self) -> Option<&str> {
        self.token_type.as_deref()
    }

    /// Issue time in unix milliseconds, if tokens are held.
    pub fn issued_at(&self) -> Option<u64> {
        self.issued_at
    }

    pub fn access_ttl(&self) -> u64 {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> u64 {
        self.refresh_ttl
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    /// Snapshot of the stored fields, keyed by their token endpoint names.
    ///
    /// Contains token values in clear text; do not log it.
    pub fn auth_data(&self) -> BTreeMap<String, String> {
        let mut data = BTreeMap::new();
        let mut put = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                data.insert(key.to_string(), value);
            }
        };
        put("access_token", self.access_token().map(str::to_string));
        put("refresh_token", self.refresh_token().map(str::to_string));
        put("token_type", self.token_type.clone());
        put("scope", self.scope.clone());
        put("owner_id", self.owner_id.clone());
        put("endpoint_id", self.endpoint_id.clone());
        if let Some(issued_at) = self.issued_at {
            put("issued_at", Some(issued_at.to_string()));
            put("expires_in", Some(self.access_ttl.to_string()));
            put(
                "refresh_token_expires_in",
                Some(self.refresh_ttl.to_string()),
            );
        }
        put("remember", Some(self.remember.to_string()));
        data
    }
}

impl TokenResponse {
    fn deserialize_value(json: &serde_json::Value) -> Result<Self> {
        Self::deserialize(json)
            .map_err(|e| Error::TokenData(format!("invalid token response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{REFRESH_TOKEN_TTL, REFRESH_TOKEN_TTL_REMEMBER};
    use serde_json::json;

    const HOUR_MS: u64 = 3_600_000;

    fn token_json(access_ttl: u64, refresh_ttl: u64) -> serde_json::Value {
        json!({
            "access_token": "at_1",
            "refresh_token": "rt_1",
            "token_type": "bearer",
            "expires_in": access_ttl,
            "refresh_token_expires_in": refresh_ttl,
        })
    }

    #[test]
    fn fresh_auth_is_invalid() {
        let auth = Auth::new();
        assert!(!auth.is_access_token_valid());
        assert!(!auth.is_refresh_token_valid());
        assert!(auth.access_token().is_none());
        assert!(auth.issued_at().is_none());
    }

    #[test]
    fn validity_follows_ttl_timeline() {
        for (access_ttl, refresh_ttl) in [(1, 2), (60, 3600), (3600, 36000), (3600, 604800)] {
            let issued = now_millis() - 10 * 24 * HOUR_MS;
            let mut auth = Auth::new();
            auth.set_data_at(&token_json(access_ttl, refresh_ttl), issued)
                .unwrap();

            assert!(auth.is_access_token_valid_at(issued));
            assert!(auth.is_refresh_token_valid_at(issued));

            let between = issued + access_ttl * 1000;
            assert!(!auth.is_access_token_valid_at(between), "ttl {access_ttl}");
            assert!(auth.is_refresh_token_valid_at(between), "ttl {refresh_ttl}");

            let past = issued + refresh_ttl * 1000;
            assert!(!auth.is_access_token_valid_at(past));
            assert!(!auth.is_refresh_token_valid_at(past));
        }
    }

    #[test]
    fn set_data_is_valid_immediately() {
        let mut auth = Auth::new();
        auth.set_data(&token_json(3600, 36000)).unwrap();
        assert!(auth.is_access_token_valid());
        assert!(auth.is_refresh_token_valid());
        assert_eq!(auth.access_token(), Some("at_1"));
        assert_eq!(auth.refresh_token(), Some("rt_1"));
        assert_eq!(auth.token_type(), Some("bearer"));
    }

    #[test]
    fn missing_ttls_fall_back_to_remember_defaults() {
        let json = json!({"access_token": "at", "refresh_token": "rt"});

        let mut auth = Auth::new();
        auth.set_data(&json).unwrap();
        assert_eq!(auth.access_ttl(), ACCESS_TOKEN_TTL);
        assert_eq!(auth.refresh_ttl(), REFRESH_TOKEN_TTL);

        let mut auth = Auth::new();
        auth.set_remember(true);
        auth.set_data(&json).unwrap();
        assert_eq!(auth.refresh_ttl(), REFRESH_TOKEN_TTL_REMEMBER);
    }

    #[test]
    fn zero_ttl_is_treated_as_missing() {
        let mut auth = Auth::new();
        auth.set_data(&token_json(0, 0)).unwrap();
        assert_eq!(auth.access_ttl(), ACCESS_TOKEN_TTL);
        assert_eq!(auth.refresh_ttl(), REFRESH_TOKEN_TTL);
    }

    #[test]
    fn malformed_data_keeps_previous_state() {
        let mut auth = Auth::new();
        auth.set_data(&token_json(3600, 36000)).unwrap();

        let err = auth.set_data(&json!({"error": "invalid_grant"})).unwrap_err();
        assert!(matches!(err, Error::TokenData(_)));
        assert_eq!(auth.access_token(), Some("at_1"));
        assert!(auth.is_access_token_valid());
    }

    #[test]
    fn future_issue_time_is_clamped() {
        let mut auth = Auth::new();
        let future = now_millis() + 24 * HOUR_MS;
        auth.set_data_at(&token_json(3600, 36000), future).unwrap();
        assert!(auth.issued_at().unwrap() <= now_millis());
    }

    #[test]
    fn reset_returns_to_empty_state() {
        let mut auth = Auth::new();
        auth.set_remember(true);
        auth.set_data(&token_json(3600, 36000)).unwrap();

        auth.reset();
        assert_eq!(auth.auth_data(), Auth::new().auth_data());
        assert!(!auth.is_access_token_valid());
        assert!(!auth.is_refresh_token_valid());
        assert!(!auth.is_remember());
    }

    #[test]
    fn debug_output_redacts_tokens() {
        let mut auth = Auth::new();
        auth.set_data(&token_json(3600, 36000)).unwrap();
        let debug = format!("{auth:?}");
        assert!(!debug.contains("at_1"), "got: {debug}");
        assert!(!debug.contains("rt_1"), "got: {debug}");
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn auth_data_exposes_stored_fields() {
        let mut auth = Auth::new();
        auth.set_data_at(&token_json(3600, 36000), 1_700_000_000_000)
            .unwrap();
        let data = auth.auth_data();
        assert_eq!(data["access_token"], "at_1");
        assert_eq!(data["refresh_token"], "rt_1");
        assert_eq!(data["expires_in"], "3600");
        assert_eq!(data["refresh_token_expires_in"], "36000");
        assert_eq!(data["issued_at"], "1700000000000");
        assert_eq!(data["remember"], "false");
    }
}
