//! Per-request dispatch between the relational and document-store paths.
//!
//! The backend is explicit caller input when given; otherwise the legacy
//! inference picks the document store for analytics-flavored questions.
//! Nothing here panics or escapes: callers receive the result alongside the
//! backend that produced it so failures can be tagged.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::Value as Json;
use tracing::{info, warn};

use crate::document::profiler::{self, FieldClassification, DEFAULT_SAMPLE_SIZE};
use crate::document::synthesizer::{self, Complexity};
use crate::document::{parser, render_pipeline};
use crate::error::EngineError;
use crate::outbound::{DocumentBackend, RelationalBackend};
use crate::relational::{self, SqlTranslation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Sql,
    Mongodb,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Sql => "sql",
            Backend::Mongodb => "mongodb",
        }
    }

    /// Parses an explicit `database_type` request field. Unknown names fall
    /// back to inference rather than failing.
    pub fn from_request(name: &str) -> Option<Backend> {
        match name.trim().to_lowercase().as_str() {
            "sql" | "sqlite" | "relational" => Some(Backend::Sql),
            "mongodb" | "mongo" | "nosql" | "document" => Some(Backend::Mongodb),
            _ => None,
        }
    }
}

/// Substrings that route a question to the document store when the caller
/// did not pick a backend.
const DOCUMENT_HINTS: &[&str] = &["analytics", "metrics", "dashboard", "trend", "analysis"];

fn infer_backend(query: &str) -> Backend {
    let lowered = query.to_lowercase();
    if DOCUMENT_HINTS.iter().any(|hint| lowered.contains(hint)) {
        Backend::Mongodb
    } else {
        Backend::Sql
    }
}

/// The query as it was handed to a backend, echoed back to callers.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedQuery {
    Sql(String),
    Pipeline(Vec<Json>),
}

/// A successful pass through one backend path.
#[derive(Debug, Clone, PartialEq)]
pub struct Routed {
    pub data: Vec<Json>,
    /// Set when the question was understood as unsupported: a fixed help
    /// message replaces the query, and no backend is contacted.
    pub guidance: Option<&'static str>,
    pub rendered: Option<RenderedQuery>,
}

pub struct RoutedResponse {
    pub backend: Backend,
    pub result: Result<Routed, EngineError>,
}

/// Result of synthesizing and running a sample pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleQuery {
    pub pipeline: Vec<Json>,
    pub data: Vec<Json>,
}

pub struct QueryRouter {
    relational: Box<dyn RelationalBackend>,
    document: Box<dyn DocumentBackend>,
}

impl QueryRouter {
    pub fn new(relational: Box<dyn RelationalBackend>, document: Box<dyn DocumentBackend>) -> Self {
        Self {
            relational,
            document,
        }
    }

    pub async fn process(&self, query: &str, requested: Option<Backend>) -> RoutedResponse {
        let backend = requested.unwrap_or_else(|| infer_backend(query));
        info!(backend = backend.as_str(), "routing query");
        let result = match backend {
            Backend::Sql => self.run_relational(query).await,
            Backend::Mongodb => self.run_document(query).await,
        };
        if let Err(error) = &result {
            warn!(backend = backend.as_str(), %error, "query failed");
        }
        RoutedResponse { backend, result }
    }

    async fn run_relational(&self, query: &str) -> Result<Routed, EngineError> {
        match relational::translate(query) {
            SqlTranslation::Guidance(message) => Ok(Routed {
                data: Vec::new(),
                guidance: Some(message),
                rendered: None,
            }),
            SqlTranslation::Statement { intent, sql } => {
                info!(intent = intent.as_str(), "assembled statement");
                let data = self.relational.execute(&sql).await?;
                Ok(Routed {
                    data,
                    guidance: None,
                    rendered: Some(RenderedQuery::Sql(sql)),
                })
            }
        }
    }

    async fn run_document(&self, query: &str) -> Result<Routed, EngineError> {
        let parsed = parser::parse_query(query)?;
        let pipeline = parser::build_pipeline(&parsed.field, &parsed.condition, parsed.value)?;
        let data = self.document.aggregate(&parsed.collection, &pipeline).await?;
        Ok(Routed {
            data,
            guidance: None,
            rendered: Some(RenderedQuery::Pipeline(render_pipeline(&pipeline))),
        })
    }

    /// Profiles a fresh random sample of the collection.
    pub async fn analyze_collection(
        &self,
        collection: &str,
        sample_size: u64,
    ) -> Result<FieldClassification, EngineError> {
        let docs = self.document.sample(collection, sample_size).await?;
        info!(collection, sampled = docs.len(), "profiling collection");
        Ok(profiler::classify(&docs))
    }

    /// Synthesizes a sample pipeline of the requested tier and runs it. An
    /// empty pipeline (degenerate classification) is returned without
    /// touching the store again, since an empty aggregation would scan the
    /// whole collection.
    pub async fn sample_query(
        &self,
        collection: &str,
        complexity: Complexity,
        seed: Option<u64>,
    ) -> Result<SampleQuery, EngineError> {
        let docs = self.document.sample(collection, DEFAULT_SAMPLE_SIZE).await?;
        let profile = profiler::classify(&docs);
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => rand::make_rng::<StdRng>(),
        };
        let stages = synthesizer::synthesize(&profile, complexity, &mut rng);
        if stages.is_empty() {
            return Ok(SampleQuery {
                pipeline: Vec::new(),
                data: Vec::new(),
            });
        }
        let data = self.document.aggregate(collection, &stages).await?;
        Ok(SampleQuery {
            pipeline: render_pipeline(&stages),
            data,
        })
    }
}
