//! SDK metrics
//!
//! Emitted through the `metrics` facade; they are no-ops unless the
//! application installs a recorder.
//!
//! - `ringcentral_requests_total` (counter): labels `method`, `status`
//! - `ringcentral_transport_errors_total` (counter): label `method`
//! - `ringcentral_token_refresh_total` (counter): label `outcome`

/// Record a completed API call.
pub fn record_request(method: &str, status: u16) {
    ::metrics::counter!(
        "ringcentral_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a call that never produced a response.
pub fn record_transport_error(method: &str) {
    ::metrics::counter!("ringcentral_transport_errors_total", "method" => method.to_string())
        .increment(1);
}

/// Record a token refresh attempt: `success`, `rejected`, `expired` or `error`.
pub fn record_refresh(outcome: &'static str) {
    ::metrics::counter!("ringcentral_token_refresh_total", "outcome" => outcome).increment(1);
}
