//! HTTP client for the DBHub-style relational query API.
//!
//! The API takes the statement base64-encoded in a form field alongside the
//! credential and database coordinates; rows come back as arrays of
//! `{Name, Type, Value}` column triples, which are normalized into one JSON
//! object per row before the engine sees them.

use anyhow::{bail, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value as Json};
use tracing::debug;

use crate::error::EngineError;
use crate::outbound::{RelationalBackend, APP_USER_AGENT};
use crate::settings::RelationalSettings;

pub struct DbHubClient {
    client: Client,
    url: String,
    api_key: String,
    owner: String,
    database: String,
}

#[derive(Debug, Deserialize)]
struct Column {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Value", default)]
    value: Json,
}

impl DbHubClient {
    pub fn new(settings: &RelationalSettings) -> Result<Self> {
        let client = Client::builder().user_agent(APP_USER_AGENT).build()?;
        Ok(Self {
            client,
            url: settings.url.clone(),
            api_key: settings.api_key.clone(),
            owner: settings.owner.clone(),
            database: settings.database.clone(),
        })
    }

    async fn post_statement(&self, sql: &str) -> Result<Vec<Vec<Column>>> {
        let encoded = encode_statement(sql);
        let form = [
            ("apikey", self.api_key.as_str()),
            ("dbowner", self.owner.as_str()),
            ("dbname", self.database.as_str()),
            ("sql", encoded.as_str()),
        ];
        let response = self.client.post(&self.url).form(&form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("relational API returned {status}: {body}");
        }
        // The API answers `null` for statements that produce no rows.
        let rows: Option<Vec<Vec<Column>>> = response.json().await?;
        Ok(rows.unwrap_or_default())
    }
}

/// The transport requires the statement base64-encoded (standard alphabet).
fn encode_statement(sql: &str) -> String {
    general_purpose::STANDARD.encode(sql)
}

fn rows_to_objects(rows: Vec<Vec<Column>>) -> Vec<Json> {
    rows.into_iter()
        .map(|row| {
            let mut object = Map::new();
            for column in row {
                object.insert(column.name, column.value);
            }
            Json::Object(object)
        })
        .collect()
}

#[async_trait]
impl RelationalBackend for DbHubClient {
    async fn execute(&self, sql: &str) -> Result<Vec<Json>, EngineError> {
        debug!(statement = sql, "executing relational statement");
        let rows = self
            .post_statement(sql)
            .await
            .map_err(|e| EngineError::BackendExecution(e.to_string()))?;
        Ok(rows_to_objects(rows))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn statements_are_base64_encoded_for_transport() {
        assert_eq!(encode_statement("SELECT 1;"), "U0VMRUNUIDE7");
    }

    #[test]
    fn column_triples_normalize_into_row_objects() {
        let rows: Vec<Vec<Column>> = serde_json::from_value(json!([
            [
                {"Name": "product_name", "Type": 3, "Value": "Espresso"},
                {"Name": "units_sold", "Type": 4, "Value": "128"},
            ],
            [
                {"Name": "product_name", "Type": 3, "Value": "Latte"},
                {"Name": "units_sold", "Type": 4},
            ]
        ]))
        .unwrap();

        let objects = rows_to_objects(rows);
        assert_eq!(
            objects,
            vec![
                json!({"product_name": "Espresso", "units_sold": "128"}),
                json!({"product_name": "Latte", "units_sold": null}),
            ]
        );
    }
}
