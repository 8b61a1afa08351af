//! CLI-specific error types

use thiserror::Error;

/// Errors from command-line handling.
///
/// SDK and configuration failures are reported through `anyhow` with
/// context; these cover what the CLI itself decides is wrong.
#[derive(Error, Debug)]
pub enum Error {
    #[error("usage: {0}")]
    Usage(String),

    #[error("no receiver configured, set receiver in the config file or RC_RECEIVER")]
    MissingReceiver,
}

/// Result alias using CLI Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages_are_descriptive() {
        assert_eq!(
            Error::Usage("missing endpoint".into()).to_string(),
            "usage: missing endpoint"
        );
        assert!(Error::MissingReceiver.to_string().contains("RC_RECEIVER"));
    }

    #[test]
    fn error_debug_includes_variant_name() {
        let debug = format!("{:?}", Error::MissingReceiver);
        assert!(debug.contains("MissingReceiver"), "got: {debug}");
    }
}
