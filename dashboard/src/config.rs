//! Process-wide configuration, read once at startup.

use std::fmt;
use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::errors::{Error, Result};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;

#[derive(Debug, Clone, Parser)]
#[command(name = "cctv-dashboard", about = "CCTV 안전 상황판 (terminal dashboard)")]
pub struct Args {
    /// Base URL of the HTTP API, without the route
    #[arg(long, env = "CCTV_API_ENDPOINT")]
    pub api_endpoint: String,

    /// CloudFront distribution URL serving captured frames (with trailing slash)
    #[arg(long, env = "CCTV_CLOUDFRONT_URL", default_value = "")]
    pub cloudfront_url: String,

    #[arg(long, env = "CCTV_USERPOOL_ID")]
    pub user_pool_id: Option<String>,

    #[arg(long, env = "CCTV_USERPOOL_CLIENT_ID")]
    pub user_pool_client_id: Option<String>,

    #[arg(long, env = "CCTV_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "CCTV_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Pre-issued id token; skips the Cognito sign-in
    #[arg(long, env = "CCTV_ID_TOKEN", hide_env_values = true)]
    pub id_token: Option<String>,

    #[arg(long, env = "CCTV_POLL_INTERVAL_MS", default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval_ms: u64,

    #[arg(long, env = "CCTV_AUTO_UPDATE", default_value_t = true, action = ArgAction::Set)]
    pub auto_update: bool,
}

#[derive(Clone, PartialEq)]
pub enum Credentials {
    Password {
        user_pool_id: String,
        client_id: String,
        username: String,
        password: String,
    },
    Token(String),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Password {
                user_pool_id,
                client_id,
                username,
                ..
            } => f
                .debug_struct("Password")
                .field("user_pool_id", user_pool_id)
                .field("client_id", client_id)
                .field("username", username)
                .finish_non_exhaustive(),
            Credentials::Token(_) => f.write_str("Token(..)"),
        }
    }
}

/// Immutable after construction; shared by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_endpoint: String,
    pub cloudfront_url: String,
    pub credentials: Credentials,
    pub poll_interval: Duration,
    pub auto_update: bool,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        let api_endpoint = args.api_endpoint.trim().trim_end_matches('/').to_string();
        if api_endpoint.is_empty() {
            return Err(Error::Config("API endpoint is empty".into()));
        }

        if args.poll_interval_ms == 0 {
            return Err(Error::Config("Polling interval must be positive".into()));
        }

        let credentials = match args.id_token.filter(|token| !token.trim().is_empty()) {
            Some(token) => Credentials::Token(token.trim().to_string()),
            None => match (
                args.user_pool_id,
                args.user_pool_client_id,
                args.username,
                args.password,
            ) {
                (Some(user_pool_id), Some(client_id), Some(username), Some(password)) => {
                    Credentials::Password {
                        user_pool_id,
                        client_id,
                        username,
                        password,
                    }
                }
                _ => {
                    return Err(Error::Config(
                        "Either an id token or user pool id, client id, username and password are required"
                            .into(),
                    ))
                }
            },
        };

        Ok(Self {
            api_endpoint,
            cloudfront_url: args.cloudfront_url.trim().to_string(),
            credentials,
            poll_interval: Duration::from_millis(args.poll_interval_ms),
            auto_update: args.auto_update,
        })
    }

    pub fn caption_url(&self) -> String {
        format!("{}/caption", self.api_endpoint)
    }

    pub fn prompts_url(&self) -> String {
        format!("{}/prompts", self.api_endpoint)
    }

    pub fn prompt_url(&self) -> String {
        format!("{}/prompt", self.api_endpoint)
    }
}
