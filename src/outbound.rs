//! Outbound clients for the two backing stores.
//!
//! The engine only sees these traits; the HTTP realizations live in the
//! submodules and convert transport failures into
//! [`EngineError::BackendExecution`].

pub(crate) mod document;
pub(crate) mod relational;

use async_trait::async_trait;
use serde_json::Value as Json;

use crate::document::Stage;
use crate::error::EngineError;

const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// Executes complete SQL statements and returns rows as JSON objects, one
/// per row, keyed by column name.
#[async_trait]
pub trait RelationalBackend: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<Vec<Json>, EngineError>;
}

/// Runs aggregation pipelines against a named collection.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    async fn aggregate(&self, collection: &str, pipeline: &[Stage])
        -> Result<Vec<Json>, EngineError>;

    /// Draws a bounded random sample of documents.
    async fn sample(&self, collection: &str, size: u64) -> Result<Vec<Json>, EngineError>;
}
