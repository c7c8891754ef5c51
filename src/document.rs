//! The document-store translation path: aggregation stages, the fixed
//! sentence grammar, field profiling, and sample pipeline synthesis.

pub(crate) mod parser;
pub(crate) mod profiler;
pub(crate) mod synthesizer;

use std::collections::BTreeMap;

use serde_json::{json, Map, Value as Json};

use crate::nlp::CmpOp;

/// Predicate applied to one field inside a `$match` stage.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldPredicate {
    Eq(Json),
    Cmp(CmpOp, Json),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn mongo(self) -> i64 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

/// One step of an aggregation pipeline. Stage order is significant and
/// fixed per synthesis tier: Match, or Group then Sort then optional Limit.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(BTreeMap<String, FieldPredicate>),
    /// Groups by `key`, summing each named metric into a `total_*` alias
    /// and counting grouped documents.
    Group { key: String, metrics: Vec<String> },
    Sort { field: String, direction: SortDirection },
    Limit(u64),
}

impl Stage {
    /// Renders the stage as its wire-format document.
    pub fn to_document(&self) -> Json {
        match self {
            Stage::Match(predicates) => {
                let mut body = Map::new();
                for (field, predicate) in predicates {
                    let value = match predicate {
                        FieldPredicate::Eq(value) => value.clone(),
                        FieldPredicate::Cmp(op, value) => json!({ (op.mongo()): value }),
                    };
                    body.insert(field.clone(), value);
                }
                json!({ "$match": body })
            }
            Stage::Group { key, metrics } => {
                let mut body = Map::new();
                body.insert("_id".to_string(), json!(format!("${key}")));
                for metric in metrics {
                    body.insert(
                        format!("total_{metric}"),
                        json!({ "$sum": format!("${metric}") }),
                    );
                }
                body.insert("count".to_string(), json!({ "$sum": 1 }));
                json!({ "$group": body })
            }
            Stage::Sort { field, direction } => {
                json!({ "$sort": { (field.as_str()): direction.mongo() } })
            }
            Stage::Limit(n) => json!({ "$limit": n }),
        }
    }
}

pub fn render_pipeline(stages: &[Stage]) -> Vec<Json> {
    stages.iter().map(Stage::to_document).collect()
}
