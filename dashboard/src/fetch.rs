//! Authenticated fetch: the single capability the poll loop and the prompt
//! selector depend on.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::auth::Session;
use crate::errors::{Error, Result};

const USER_AGENT: &str = concat!("cctv-dashboard/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait AuthFetch: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value>;

    async fn put_json(&self, url: &str, body: &Value) -> Result<Value>;
}

pub struct HttpFetch {
    http_client: reqwest::Client,
    session: Arc<dyn Session>,
}

impl HttpFetch {
    pub fn new(session: Arc<dyn Session>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            session,
        })
    }
}

#[async_trait]
impl AuthFetch for HttpFetch {
    async fn get_json(&self, url: &str) -> Result<Value> {
        let token = self.session.bearer_token().await?;
        debug!(url = %url, "GET");

        let response = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .send()
            .await?;

        read_json(response).await
    }

    async fn put_json(&self, url: &str, body: &Value) -> Result<Value> {
        let token = self.session.bearer_token().await?;
        debug!(url = %url, "PUT");

        let response = self
            .http_client
            .put(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        read_json(response).await
    }
}

async fn read_json(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let body = response.text().await?;

    check_status(status, &body)?;
    parse_body(&body)
}

fn check_status(status: StatusCode, body: &str) -> Result<()> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(Error::Auth(format!("API rejected credential ({})", status)));
    }

    if !status.is_success() {
        return Err(Error::Api {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    Ok(())
}

/// Empty bodies are fine for writes; anything else must be JSON.
fn parse_body(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(body).map_err(|e| Error::Decode(e.to_string()))
}
