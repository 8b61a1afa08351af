//! RingCentral command-line client
//!
//! Authenticates with the configured user credentials, runs one command,
//! then revokes the session:
//!
//! - `get <endpoint> [key=value ...]` prints the response body
//! - `sms <text>` sends an SMS from the configured user to the receiver
//! - `token` prints the token lifetimes of the new session

mod config;
mod error;

use anyhow::{Context, Result};
use ringcentral::{Method, Platform, Request};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::error::Error;

const SMS_ENDPOINT: &str = "/restapi/v1.0/account/~/extension/~/sms";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Get {
        endpoint: String,
        query: Vec<(String, String)>,
    },
    Sms {
        text: String,
    },
    Token,
}

#[derive(Debug, PartialEq, Eq)]
struct Invocation {
    config_path: Option<String>,
    command: Command,
}

fn parse_args(args: &[String]) -> error::Result<Invocation> {
    let mut config_path = None;
    let mut rest = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            let path = iter
                .next()
                .ok_or_else(|| Error::Usage("--config needs a path".into()))?;
            config_path = Some(path.clone());
        } else {
            rest.push(arg.as_str());
        }
    }

    let command = match rest.as_slice() {
        ["get", endpoint, params @ ..] => {
            let query = params
                .iter()
                .map(|p| {
                    p.split_once('=')
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .ok_or_else(|| {
                            Error::Usage(format!("query parameter {p:?} is not key=value"))
                        })
                })
                .collect::<error::Result<Vec<_>>>()?;
            Command::Get {
                endpoint: endpoint.to_string(),
                query,
            }
        }
        ["sms", words @ ..] if !words.is_empty() => Command::Sms {
            text: words.join(" "),
        },
        ["token"] => Command::Token,
        _ => {
            return Err(Error::Usage(
                "ringcentral-cli [--config PATH] (get <endpoint> [key=value ...] | sms <text> | token)"
                    .into(),
            ));
        }
    };

    Ok(Invocation {
        config_path,
        command,
    })
}

async fn run(platform: &mut Platform, config: &Config, command: Command) -> Result<String> {
    match command {
        Command::Get { endpoint, query } => {
            let request = query
                .into_iter()
                .fold(Request::new(endpoint), |request, (k, v)| request.query(k, v));
            let response = platform.get_request(&request).await?;
            if !response.is_success() {
                warn!(status = response.status(), "request was not successful");
            }
            Ok(pretty(response.body()))
        }
        Command::Sms { text } => {
            let receiver = config.receiver.as_deref().ok_or(Error::MissingReceiver)?;
            let request = Request::new(SMS_ENDPOINT).json(json!({
                "from": {"phoneNumber": config.username},
                "to": [{"phoneNumber": receiver}],
                "text": text,
            }));
            let response = platform.post_request(&request).await?;
            if !response.is_success() {
                return Err(response
                    .into_api_error("sending SMS failed", Method::POST, &request)
                    .into());
            }
            Ok(pretty(response.body()))
        }
        Command::Token => {
            let auth = platform.auth();
            let summary = json!({
                "authorized": platform.is_authorized(),
                "token_type": auth.token_type(),
                "owner_id": auth.owner_id(),
                "expires_in": auth.access_ttl(),
                "refresh_token_expires_in": auth.refresh_ttl(),
            });
            Ok(serde_json::to_string_pretty(&summary)?)
        }
    }
}

/// Pretty-print JSON bodies; anything else is returned unchanged.
fn pretty(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| body.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = parse_args(&args)?;

    let config_path = Config::resolve_path(invocation.config_path.as_deref());
    info!(path = %config_path.display(), "loading configuration");
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    info!(
        server_url = %config.server_url,
        username = %config.username,
        "configuration loaded"
    );

    let mut platform =
        Platform::new(config.platform_config()).context("failed to create platform")?;
    platform
        .authenticate(
            &config.username,
            config.password.expose(),
            &config.extension,
            false,
        )
        .await
        .context("authentication failed")?;

    let outcome = run(&mut platform, &config, invocation.command).await;

    if let Err(e) = platform.revoke().await {
        warn!(error = %e, "failed to revoke session");
    }

    println!("{}", outcome?);
    Ok(())
}
