//! Prompt selection for the captioning pipeline.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::info;

use crate::errors::{Error, Result};
use crate::fetch::AuthFetch;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptDescriptor {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptConfig {
    #[serde(default)]
    pub selected_id: Option<String>,
    #[serde(default)]
    pub prompts: Vec<PromptDescriptor>,
}

/// Reads the prompt list through a cache and writes the selection.
///
/// Writes are not applied optimistically: after a `PUT` the cache is dropped
/// and refilled from the API, so readers keep seeing the old selection until
/// the refetch lands.
pub struct PromptSelector {
    fetch: Arc<dyn AuthFetch>,
    prompts_url: String,
    prompt_url: String,
    cache: RwLock<Option<PromptConfig>>,
}

impl PromptSelector {
    pub fn new(
        fetch: Arc<dyn AuthFetch>,
        prompts_url: impl Into<String>,
        prompt_url: impl Into<String>,
    ) -> Self {
        Self {
            fetch,
            prompts_url: prompts_url.into(),
            prompt_url: prompt_url.into(),
            cache: RwLock::new(None),
        }
    }

    pub async fn list(&self) -> Result<PromptConfig> {
        if let Some(config) = self.cache.read().await.clone() {
            return Ok(config);
        }
        self.refresh().await
    }

    pub async fn cached(&self) -> Option<PromptConfig> {
        self.cache.read().await.clone()
    }

    pub async fn invalidate(&self) {
        self.cache.write().await.take();
    }

    pub async fn refresh(&self) -> Result<PromptConfig> {
        self.invalidate().await;

        let body = self.fetch.get_json(&self.prompts_url).await?;
        let config: PromptConfig =
            serde_json::from_value(body).map_err(|e| Error::Decode(format!("prompts: {}", e)))?;

        *self.cache.write().await = Some(config.clone());
        Ok(config)
    }

    /// Sends the selection even when the id is unknown or already selected.
    pub async fn select(&self, selected_id: &str) -> Result<PromptConfig> {
        self.fetch
            .put_json(&self.prompt_url, &json!({ "selectedId": selected_id }))
            .await?;
        info!("Selected prompt {}", selected_id);

        self.refresh().await
    }
}
