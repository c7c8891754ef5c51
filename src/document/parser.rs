//! The fixed sentence grammar accepted on the document-store path:
//! `Find all <collection> where <field> <condition phrase> <integer>`.
//!
//! Anything else is an [`EngineError::InvalidQueryFormat`]; the condition
//! phrase must appear verbatim in the operator lexicon.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use crate::document::{FieldPredicate, Stage};
use crate::error::EngineError;
use crate::nlp;

static QUERY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Find all ([\w\-]+) where (\w+) (.+) (\d+)$").expect("hard-coded pattern")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub collection: String,
    pub field: String,
    pub condition: String,
    pub value: i64,
}

pub fn parse_query(text: &str) -> Result<ParsedQuery, EngineError> {
    let caps = QUERY_PATTERN
        .captures(text.trim())
        .ok_or(EngineError::InvalidQueryFormat)?;
    let value = caps[4]
        .parse::<i64>()
        .map_err(|_| EngineError::InvalidQueryFormat)?;
    Ok(ParsedQuery {
        collection: caps[1].to_string(),
        field: caps[2].to_string(),
        condition: caps[3].to_string(),
        value,
    })
}

/// Builds the single-stage pipeline for a parsed comparison.
pub fn build_pipeline(field: &str, condition: &str, value: i64) -> Result<Vec<Stage>, EngineError> {
    let op = nlp::lookup_operator(condition)
        .ok_or_else(|| EngineError::UnsupportedOperator(condition.to_string()))?;
    let mut predicates = BTreeMap::new();
    predicates.insert(field.to_string(), FieldPredicate::Cmp(op, json!(value)));
    Ok(vec![Stage::Match(predicates)])
}
