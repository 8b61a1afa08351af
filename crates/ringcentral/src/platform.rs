//! Token lifecycle and request dispatch
//!
//! The platform moves between two states: unauthenticated (no usable token)
//! and authenticated. A stale access token is noticed lazily, when a REST
//! call goes through `ensure_access()`, and repaired with one refresh if the
//! refresh token is still valid.
//!
//! OAuth calls authenticate the application with HTTP Basic credentials;
//! REST calls carry `Bearer <access_token>`. Every header is built for the
//! request it belongs to, so nothing leaks from one call into the next.

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use ringcentral_auth::{Auth, Grant, REVOKE_ENDPOINT, TOKEN_ENDPOINT, basic_authorization};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::PlatformConfig;
use crate::error::{Error, Result};
use crate::metrics;
use crate::request::Request;
use crate::response::Response;

/// Identifies the SDK on every request.
pub const SDK_AGENT: &str = concat!("RingCentral Rust SDK/", env!("CARGO_PKG_VERSION"));

const SDK_AGENT_HEADER: HeaderName = HeaderName::from_static("sdk-agent");
const METHOD_OVERRIDE_HEADER: HeaderName = HeaderName::from_static("x-http-method-override");

/// Authenticated client for the RingCentral REST API.
pub struct Platform {
    config: PlatformConfig,
    base_url: Url,
    client: reqwest::Client,
    auth: Auth,
}

impl Platform {
    /// Create an unauthenticated platform with its own HTTP client.
    pub fn new(config: PlatformConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Transport(format!("building HTTP client: {e}")))?;
        Self::with_client(config, client)
    }

    /// Create an unauthenticated platform around an existing HTTP client.
    pub fn with_client(config: PlatformConfig, client: reqwest::Client) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            Error::InvalidRequest(format!("invalid base URL {:?}: {e}", config.base_url))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::InvalidRequest(format!(
                "base URL must be http or https, got: {base_url}"
            )));
        }
        Ok(Self {
            config,
            base_url,
            client,
            auth: Auth::new(),
        })
    }

    /// Password grant. Starts a new session on success.
    ///
    /// `remember` selects the one-week refresh token lifetime instead of
    /// ten hours. On a non-2xx answer the previous session is kept and the
    /// answer is returned as `Error::Api`.
    pub async fn authenticate(
        &mut self,
        username: &str,
        password: &str,
        extension: &str,
        remember: bool,
    ) -> Result<Response> {
        let grant = Grant::Password {
            username,
            password,
            extension,
            remember,
        };
        let request = Request::new(TOKEN_ENDPOINT).form(grant.form());
        let response = self.oauth_post(&request).await?;
        if !response.is_success() {
            warn!(status = response.status(), "authentication rejected");
            return Err(response.into_api_error("authentication failed", Method::POST, &request));
        }

        let mut auth = Auth::new();
        auth.set_remember(remember);
        auth.set_data(&response.json_value()?)?;
        self.auth = auth;
        info!(remember, "authenticated");
        Ok(response)
    }

    /// Refresh grant. Fails without a network call if the refresh token
    /// has expired.
    pub async fn refresh(&mut self) -> Result<Response> {
        let refresh_token = match self.auth.refresh_token() {
            Some(token) if self.auth.is_refresh_token_valid() => token.to_string(),
            _ => {
                metrics::record_refresh("expired");
                return Err(Error::RefreshTokenExpired);
            }
        };

        let grant = Grant::RefreshToken {
            refresh_token: &refresh_token,
            remember: self.auth.is_remember(),
        };
        let request = Request::new(TOKEN_ENDPOINT).form(grant.form());
        let response = match self.oauth_post(&request).await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_refresh("error");
                return Err(e);
            }
        };
        if !response.is_success() {
            metrics::record_refresh("rejected");
            warn!(status = response.status(), "token refresh rejected");
            return Err(response.into_api_error("token refresh failed", Method::POST, &request));
        }

        let data = response.json_value().inspect_err(|_| {
            metrics::record_refresh("error");
        })?;
        self.auth.set_data(&data).inspect_err(|_| {
            metrics::record_refresh("error");
        })?;
        metrics::record_refresh("success");
        info!("access token refreshed");
        Ok(response)
    }

    /// Revoke the access token and clear the session.
    ///
    /// Local state is cleared whatever the outcome of the call. Without a
    /// held access token there is nothing to revoke: the state is cleared
    /// and `AccessExpired` returned without a network call, so unlike a
    /// revoke with a token, no POST to the revoke endpoint is made.
    pub async fn revoke(&mut self) -> Result<Response> {
        let token = self.auth.access_token().map(str::to_string);
        self.auth.reset();

        let Some(token) = token else {
            return Err(Error::AccessExpired);
        };
        let request = Request::new(REVOKE_ENDPOINT).form([("token", token)]);
        let response = self.oauth_post(&request).await?;
        if response.is_success() {
            info!("access token revoked");
        } else {
            warn!(status = response.status(), "revoke rejected, local session cleared anyway");
        }
        Ok(response)
    }

    /// Make sure a valid access token is held.
    ///
    /// Refreshes exactly once when only the refresh token is still valid.
    /// With both tokens expired this fails with `AccessExpired` and sends
    /// nothing: credentials are not kept, so the caller has to
    /// authenticate again.
    pub async fn ensure_access(&mut self) -> Result<()> {
        if self.auth.is_access_token_valid() {
            return Ok(());
        }
        if self.auth.is_refresh_token_valid() {
            debug!("access token stale, refreshing");
            self.refresh().await?;
            return Ok(());
        }
        Err(Error::AccessExpired)
    }

    /// Whether the access token is valid right now. Never refreshes.
    pub fn is_authorized(&self) -> bool {
        self.auth.is_access_token_valid()
    }

    pub async fn get_request(&mut self, request: &Request) -> Result<Response> {
        self.api_call(Method::GET, request).await
    }

    pub async fn post_request(&mut self, request: &Request) -> Result<Response> {
        self.api_call(Method::POST, request).await
    }

    pub async fn put_request(&mut self, request: &Request) -> Result<Response> {
        self.api_call(Method::PUT, request).await
    }

    pub async fn delete_request(&mut self, request: &Request) -> Result<Response> {
        self.api_call(Method::DELETE, request).await
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Replace the token state, e.g. to resume a session saved elsewhere.
    pub fn set_auth(&mut self, auth: Auth) {
        self.auth = auth;
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    async fn api_call(&mut self, method: Method, request: &Request) -> Result<Response> {
        self.ensure_access().await?;
        let token = self.auth.access_token().ok_or(Error::AccessExpired)?;
        let mut headers = self.base_headers(&format!("Bearer {token}"))?;

        if let Some(override_method) = request.override_method() {
            if method == Method::POST || method == Method::PUT {
                let value = HeaderValue::from_str(&override_method.as_str().to_ascii_uppercase())
                    .map_err(|e| Error::InvalidRequest(format!("invalid method override: {e}")))?;
                headers.insert(METHOD_OVERRIDE_HEADER, value);
            } else {
                debug!(%method, "method override only applies to POST and PUT, ignoring");
            }
        }

        self.send(method, request, headers).await
    }

    async fn oauth_post(&self, request: &Request) -> Result<Response> {
        let authorization =
            basic_authorization(&self.config.app_key, self.config.app_secret.expose());
        let headers = self.base_headers(&authorization)?;
        self.send(Method::POST, request, headers).await
    }

    fn base_headers(&self, authorization: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(SDK_AGENT_HEADER, HeaderValue::from_static(SDK_AGENT));
        if let Some(user_agent) = &self.config.user_agent {
            let value = HeaderValue::from_str(user_agent)
                .map_err(|e| Error::InvalidRequest(format!("invalid user agent: {e}")))?;
            headers.insert(USER_AGENT, value);
        }
        let mut value = HeaderValue::from_str(authorization)
            .map_err(|e| Error::InvalidRequest(format!("invalid authorization value: {e}")))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    async fn send(
        &self,
        method: Method,
        request: &Request,
        headers: HeaderMap,
    ) -> Result<Response> {
        let url = request.url(&self.base_url)?;
        let mut builder = self.client.request(method.clone(), url).headers(headers);

        if method != Method::GET && method != Method::DELETE {
            if let Some(body) = request.encoded_body()? {
                builder = builder
                    .header(CONTENT_TYPE, body.content_type)
                    .body(body.bytes);
            } else if let Some(form) = request.multipart_form()? {
                builder = builder.multipart(form);
            }
        }
        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }

        debug!(%method, endpoint = request.endpoint(), "sending request");
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_transport_error(method.as_str());
                warn!(%method, endpoint = request.endpoint(), error = %e, "request failed");
                return Err(Error::Transport(format!(
                    "{method} {} failed: {e}",
                    request.endpoint()
                )));
            }
        };

        let response = Response::read(response).await?;
        metrics::record_request(method.as_str(), response.status());
        debug!(
            %method,
            endpoint = request.endpoint(),
            status = response.status(),
            "received response"
        );
        Ok(response)
    }
}
