//! Configuration types and loading
//!
//! Config precedence: env vars > config file > defaults. Every setting can
//! come from the environment alone, so the TOML file is optional. Secrets
//! (app secret, password) are wrapped in `Secret` as soon as they are read.

use std::path::{Path, PathBuf};
use std::time::Duration;

use common::Secret;
use ringcentral::{PlatformConfig, Server};
use serde::Deserialize;

/// Settings as they appear in the TOML file, all optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    app_key: Option<String>,
    app_secret: Option<String>,
    server: Option<Server>,
    server_url: Option<String>,
    username: Option<String>,
    extension: Option<String>,
    password: Option<String>,
    receiver: Option<String>,
    timeout_secs: Option<u64>,
}

/// Resolved, validated configuration.
#[derive(Debug)]
pub struct Config {
    pub app_key: String,
    pub app_secret: Secret<String>,
    pub server_url: String,
    pub username: String,
    pub extension: String,
    pub password: Secret<String>,
    /// Phone number the `sms` command sends to
    pub receiver: Option<String>,
    pub timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from an optional TOML file, then overlay
    /// `RC_*` environment variables.
    pub fn load(path: &Path) -> common::Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Like `load`, with environment lookups going through `env`.
    pub fn load_with(path: &Path, env: impl Fn(&str) -> Option<String>) -> common::Result<Self> {
        let file = if path.exists() {
            let contents = std::fs::read_to_string(path).map_err(|source| common::Error::Read {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&contents).map_err(|source| common::Error::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            FileConfig::default()
        };
        Self::resolve(file, env)
    }

    fn resolve(mut file: FileConfig, env: impl Fn(&str) -> Option<String>) -> common::Result<Self> {
        let overlay = |value: &mut Option<String>, key: &str| {
            if let Some(v) = env(key) {
                *value = Some(v);
            }
        };
        overlay(&mut file.app_key, "RC_APP_KEY");
        overlay(&mut file.app_secret, "RC_APP_SECRET");
        overlay(&mut file.username, "RC_USERNAME");
        overlay(&mut file.extension, "RC_EXTENSION");
        overlay(&mut file.password, "RC_PASSWORD");
        overlay(&mut file.receiver, "RC_RECEIVER");

        // RC_APP_SERVER takes a server name or a full URL
        if let Some(server) = env("RC_APP_SERVER") {
            if server.starts_with("http://") || server.starts_with("https://") {
                file.server_url = Some(server);
            } else {
                file.server = Some(server.parse().map_err(common::Error::Config)?);
                file.server_url = None;
            }
        }

        let server_url = file
            .server_url
            .unwrap_or_else(|| file.server.unwrap_or_default().base_url().to_string());
        if !server_url.starts_with("http://") && !server_url.starts_with("https://") {
            return Err(common::Error::Config(format!(
                "server_url must start with http:// or https://, got: {server_url}"
            )));
        }

        let app_key = required(file.app_key, "app_key", "RC_APP_KEY")?;
        let app_secret = required_secret(file.app_secret, "app_secret", "RC_APP_SECRET")?;
        let username = required(file.username, "username", "RC_USERNAME")?;
        let password = required_secret(file.password, "password", "RC_PASSWORD")?;

        if file.timeout_secs == Some(0) {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(Self {
            app_key,
            app_secret,
            server_url,
            username,
            extension: file.extension.unwrap_or_default(),
            password,
            receiver: file.receiver.filter(|r| !r.trim().is_empty()),
            timeout: file.timeout_secs.map(Duration::from_secs),
        })
    }

    /// Platform settings derived from this configuration.
    pub fn platform_config(&self) -> PlatformConfig {
        let mut config =
            PlatformConfig::new(&self.app_key, self.app_secret.expose(), Server::default())
                .with_base_url(&self.server_url)
                .with_user_agent(concat!("ringcentral-cli/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        config
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("ringcentral.toml")
    }
}

fn required(value: Option<String>, name: &str, env_key: &str) -> common::Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(missing(name, env_key)),
    }
}

/// Like `required`, but the value is wrapped before it is inspected.
fn required_secret(
    value: Option<String>,
    name: &str,
    env_key: &str,
) -> common::Result<Secret<String>> {
    let secret: Secret<String> = value.unwrap_or_default().into();
    if secret.is_blank() {
        return Err(missing(name, env_key));
    }
    Ok(secret)
}

fn missing(name: &str, env_key: &str) -> common::Error {
    common::Error::Config(format!(
        "{name} must be set in the config file or {env_key}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serializes tests that touch CONFIG_PATH.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn valid_toml() -> &'static str {
        r#"
app_key = "key-from-file"
app_secret = "secret-from-file"
server = "production"
username = "+15551234567"
extension = "101"
password = "pass-from-file"
receiver = "+15557654321"
"#
    }

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("ringcentral.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn loads_file_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, valid_toml());

        let config = Config::load_with(&path, env_of(&[])).unwrap();
        assert_eq!(config.app_key, "key-from-file");
        assert_eq!(config.app_secret.expose(), "secret-from-file");
        assert_eq!(config.server_url, "https://platform.ringcentral.com");
        assert_eq!(config.username, "+15551234567");
        assert_eq!(config.extension, "101");
        assert_eq!(config.receiver.as_deref(), Some("+15557654321"));
        assert!(config.timeout.is_none());
    }

    #[test]
    fn env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, valid_toml());

        let config = Config::load_with(
            &path,
            env_of(&[("RC_APP_KEY", "key-from-env"), ("RC_APP_SERVER", "sandbox")]),
        )
        .unwrap();
        assert_eq!(config.app_key, "key-from-env");
        assert_eq!(config.server_url, "https://platform.devtest.ringcentral.com");
        assert_eq!(config.password.expose(), "pass-from-file");
    }

    #[test]
    fn env_only_configuration_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let config = Config::load_with(
            &path,
            env_of(&[
                ("RC_APP_KEY", "k"),
                ("RC_APP_SECRET", "s"),
                ("RC_APP_SERVER", "http://127.0.0.1:8080"),
                ("RC_USERNAME", "u"),
                ("RC_PASSWORD", "p"),
            ]),
        )
        .unwrap();
        assert_eq!(config.server_url, "http://127.0.0.1:8080");
        assert_eq!(config.extension, "");
        assert!(config.receiver.is_none());
    }

    #[test]
    fn defaults_to_sandbox() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "app_key = \"k\"\napp_secret = \"s\"\nusername = \"u\"\npassword = \"p\"\n",
        );
        let config = Config::load_with(&path, env_of(&[])).unwrap();
        assert_eq!(config.server_url, Server::Sandbox.base_url());
    }

    #[test]
    fn missing_secret_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "app_key = \"k\"\nusername = \"u\"\npassword = \"p\"\n");

        let err = Config::load_with(&path, env_of(&[])).unwrap_err();
        assert!(err.to_string().contains("app_secret"), "got: {err}");
        assert!(err.to_string().contains("RC_APP_SECRET"), "got: {err}");
    }

    #[test]
    fn blank_password_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, valid_toml());

        let err = Config::load_with(&path, env_of(&[("RC_PASSWORD", "  ")])).unwrap_err();
        assert!(err.to_string().contains("password"), "got: {err}");
    }

    #[test]
    fn blank_app_secret_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, valid_toml());

        let err = Config::load_with(&path, env_of(&[("RC_APP_SECRET", "")])).unwrap_err();
        assert!(matches!(err, common::Error::Config(_)), "got: {err:?}");
        assert!(err.to_string().contains("RC_APP_SECRET"), "got: {err}");
    }

    #[test]
    fn unreadable_config_path_names_the_file() {
        let dir = tempfile::tempdir().unwrap();

        // A directory exists but cannot be read as a file
        let err = Config::load_with(dir.path(), env_of(&[])).unwrap_err();
        assert!(matches!(err, common::Error::Read { .. }), "got: {err:?}");
        assert!(
            err.to_string().contains(&dir.path().display().to_string()),
            "got: {err}"
        );
    }

    #[test]
    fn unknown_server_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, valid_toml());

        let err = Config::load_with(&path, env_of(&[("RC_APP_SERVER", "staging")])).unwrap_err();
        assert!(err.to_string().contains("staging"), "got: {err}");
    }

    #[test]
    fn non_http_server_url_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let contents = format!("{}server_url = \"ftp://example.com\"\n", valid_toml());
        let path = write_config(&dir, &contents);

        assert!(Config::load_with(&path, env_of(&[])).is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let contents = format!("{}timeout_secs = 0\n", valid_toml());
        let path = write_config(&dir, &contents);

        let err = Config::load_with(&path, env_of(&[])).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"), "got: {err}");
    }

    #[test]
    fn invalid_toml_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "not valid {{{{ toml");

        let err = Config::load_with(&path, env_of(&[])).unwrap_err();
        assert!(matches!(err, common::Error::Parse { .. }), "got: {err:?}");
        assert!(err.to_string().contains("ringcentral.toml"), "got: {err}");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let contents = format!("{}app_scret = \"typo\"\n", valid_toml());
        let path = write_config(&dir, &contents);

        assert!(Config::load_with(&path, env_of(&[])).is_err());
    }

    #[test]
    fn platform_config_carries_settings() {
        let dir = tempfile::tempdir().unwrap();
        let contents = format!("{}timeout_secs = 15\n", valid_toml());
        let path = write_config(&dir, &contents);

        let config = Config::load_with(&path, env_of(&[])).unwrap();
        let platform = config.platform_config();
        assert_eq!(platform.app_key, "key-from-file");
        assert_eq!(platform.app_secret.expose(), "secret-from-file");
        assert_eq!(platform.base_url, "https://platform.ringcentral.com");
        assert_eq!(platform.timeout, Some(Duration::from_secs(15)));
        assert!(platform.user_agent.unwrap().starts_with("ringcentral-cli/"));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, valid_toml());

        let config = Config::load_with(&path, env_of(&[])).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-from-file"), "got: {debug}");
        assert!(!debug.contains("pass-from-file"), "got: {debug}");
    }

    #[test]
    fn resolve_path_prefers_cli_arg() {
        let path = Config::resolve_path(Some("/custom/ringcentral.toml"));
        assert_eq!(path, PathBuf::from("/custom/ringcentral.toml"));
    }

    #[test]
    fn resolve_path_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        if std::env::var("CONFIG_PATH").is_err() {
            assert_eq!(
                Config::resolve_path(None),
                PathBuf::from("ringcentral.toml")
            );
        }
    }
}
