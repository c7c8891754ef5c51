//! HTTP client for the document store's data API.
//!
//! Pipelines are posted as `{database, collection, pipeline}` to the
//! `aggregate` action; sampling goes through a `$sample` stage so the store
//! does the random draw.

use anyhow::{bail, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value as Json};
use tracing::debug;

use crate::document::{render_pipeline, Stage};
use crate::error::EngineError;
use crate::outbound::{DocumentBackend, APP_USER_AGENT};
use crate::settings::DocumentSettings;

pub struct DocumentApiClient {
    client: Client,
    url: String,
    database: String,
}

#[derive(Debug, Deserialize)]
struct AggregateResponse {
    #[serde(default)]
    documents: Vec<Json>,
}

impl DocumentApiClient {
    pub fn new(settings: &DocumentSettings) -> Result<Self> {
        let client = Client::builder().user_agent(APP_USER_AGENT).build()?;
        Ok(Self {
            client,
            url: settings.url.trim_end_matches('/').to_string(),
            database: settings.database.clone(),
        })
    }

    async fn run_pipeline(&self, collection: &str, pipeline: &[Json]) -> Result<Vec<Json>> {
        let body = json!({
            "database": self.database,
            "collection": collection,
            "pipeline": pipeline,
        });
        debug!(collection, ?pipeline, "running aggregation");
        let response = self
            .client
            .post(format!("{}/action/aggregate", self.url))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("document API returned {status}: {body}");
        }
        Ok(response.json::<AggregateResponse>().await?.documents)
    }
}

#[async_trait]
impl DocumentBackend for DocumentApiClient {
    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &[Stage],
    ) -> Result<Vec<Json>, EngineError> {
        self.run_pipeline(collection, &render_pipeline(pipeline))
            .await
            .map_err(|e| EngineError::BackendExecution(e.to_string()))
    }

    async fn sample(&self, collection: &str, size: u64) -> Result<Vec<Json>, EngineError> {
        self.run_pipeline(collection, &[json!({ "$sample": { "size": size } })])
            .await
            .map_err(|e| EngineError::BackendExecution(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_documents_field_defaults_to_empty() {
        let response: AggregateResponse = serde_json::from_str("{}").unwrap();
        assert!(response.documents.is_empty());
    }
}
