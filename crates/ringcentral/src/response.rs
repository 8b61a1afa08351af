//! API response wrapper
//!
//! The body is kept as raw text and only parsed when asked for, so a
//! malformed JSON body surfaces as `Error::Deserialize` at the call to
//! `json()`, not when the response is received.

use std::collections::BTreeMap;

use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, Error, Result};
use crate::request::Request;

/// Status, headers and raw body of an API response.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    body: String,
    /// Lowercase header names; repeated headers joined with ", "
    headers: BTreeMap<String, String>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>, headers: BTreeMap<String, String>) -> Self {
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
        Self {
            status,
            body: body.into(),
            headers,
        }
    }

    /// Read a transport response to completion.
    pub(crate) async fn read(response: reqwest::Response) -> Result<Self> {
        let status = response.status().as_u16();
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in response.headers() {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("reading response body: {e}")))?;
        Ok(Self {
            status,
            body,
            headers,
        })
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            Error::Deserialize(format!(
                "status {} body is not the expected JSON: {e}",
                self.status
            ))
        })
    }

    pub fn json_value(&self) -> Result<serde_json::Value> {
        self.json()
    }

    /// Wrap this response and the request that produced it into an API error.
    pub fn into_api_error(
        self,
        message: impl Into<String>,
        method: Method,
        request: &Request,
    ) -> Error {
        ApiError {
            message: message.into(),
            method,
            endpoint: request.endpoint().to_string(),
            response: self,
        }
        .into()
    }
}
