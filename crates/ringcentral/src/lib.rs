//! RingCentral REST SDK
//!
//! `Platform` owns the HTTP client and the token state. It performs the
//! OAuth password, refresh and revoke flows against the RingCentral token
//! endpoints and dispatches generic REST calls with a bearer token,
//! refreshing the access token first when it has gone stale.
//!
//! Session flow:
//! 1. `Platform::new(PlatformConfig)` starts unauthenticated
//! 2. `authenticate()` runs the password grant with Basic client credentials
//! 3. `get_request()` / `post_request()` / ... call `ensure_access()`, which
//!    refreshes once if only the refresh token is still valid
//! 4. `revoke()` invalidates the access token and clears local state
//!
//! A `Platform` is driven through `&mut self`; share one across tasks only
//! behind a lock, or use one instance per task.

pub mod config;
pub mod error;
pub mod metrics;
pub mod platform;
pub mod request;
pub mod response;

pub use config::{PlatformConfig, Server};
pub use error::{ApiError, Error, Result};
pub use platform::Platform;
pub use request::{ContentKind, EncodedBody, Part, Request};
pub use response::Response;
pub use reqwest::Method;
pub use ringcentral_auth::Auth;
