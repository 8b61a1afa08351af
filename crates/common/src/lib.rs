//! Types shared by the RingCentral SDK crates and the command-line client

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
