//! RingCentral OAuth token state
//!
//! Holds the access/refresh token pair returned by the RingCentral token
//! endpoint and answers validity questions about it. This crate performs no
//! I/O: the `ringcentral` crate sends the grant forms built here and feeds
//! the endpoint's JSON answer back into [`Auth::set_data`].
//!
//! Token lifecycle:
//! 1. `Auth::new()` starts empty (unauthenticated)
//! 2. Password grant built by `Grant::Password`, answer stored via `set_data`
//! 3. Access token expires; refresh grant built from `Auth::refresh_token()`
//! 4. `Auth::reset()` after revoke returns to the empty state

pub mod auth;
pub mod constants;
pub mod error;
pub mod token;

pub use auth::{Auth, now_millis};
pub use constants::*;
pub use error::{Error, Result};
pub use token::{Grant, TokenResponse, basic_authorization};
