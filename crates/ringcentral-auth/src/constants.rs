//! RingCentral OAuth constants

/// Token endpoint for password and refresh grants
pub const TOKEN_ENDPOINT: &str = "/restapi/oauth/token";

/// Revoke endpoint, invalidates the current access token
pub const REVOKE_ENDPOINT: &str = "/restapi/oauth/revoke";

/// Requested access token lifetime in seconds (60 minutes)
pub const ACCESS_TOKEN_TTL: u64 = 3600;

/// Requested refresh token lifetime in seconds (10 hours)
pub const REFRESH_TOKEN_TTL: u64 = 36000;

/// Requested refresh token lifetime with "remember me" set (1 week)
pub const REFRESH_TOKEN_TTL_REMEMBER: u64 = 604800;

/// Refresh token lifetime to request for the given remember flag.
pub fn refresh_token_ttl(remember: bool) -> u64 {
    if remember {
        REFRESH_TOKEN_TTL_REMEMBER
    } else {
        REFRESH_TOKEN_TTL
    }
}
