//! Field-role inference over a sampled slice of a schema-less collection.
//!
//! Classification is a pure pass over the sample: no state survives the
//! call, and profiles are rebuilt from a fresh sample every time. Nested
//! objects are flattened to dot-joined paths with an explicit worklist;
//! arrays are leaves and are never recursed into.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Map, Value as Json};

/// Sample values retained per field path.
const MAX_SAMPLES: usize = 5;

/// Documents drawn per analysis pass when the caller does not say otherwise.
pub const DEFAULT_SAMPLE_SIZE: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    Array,
    Object,
    Unknown,
}

impl FieldType {
    fn of(value: &Json) -> FieldType {
        match value {
            Json::Null => FieldType::Null,
            Json::Bool(_) => FieldType::Boolean,
            Json::Number(n) if n.is_i64() || n.is_u64() => FieldType::Integer,
            Json::Number(n) if n.is_f64() => FieldType::Float,
            Json::Number(_) => FieldType::Unknown,
            Json::String(_) => FieldType::String,
            Json::Array(_) => FieldType::Array,
            Json::Object(_) => FieldType::Object,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldRole {
    Dimension,
    Metric,
    Unclassified,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldProfile {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub role: FieldRole,
    pub samples: Vec<Json>,
}

/// Result of one analysis pass. Boolean, null, array, and unknown fields
/// appear in `field_types` but in neither role set.
#[derive(Debug, Clone, Serialize)]
pub struct FieldClassification {
    pub field_types: BTreeMap<String, FieldProfile>,
    pub dimensions: Vec<String>,
    pub metrics: Vec<String>,
}

impl FieldClassification {
    pub fn samples(&self, path: &str) -> &[Json] {
        self.field_types
            .get(path)
            .map(|profile| profile.samples.as_slice())
            .unwrap_or(&[])
    }

    pub fn summary(&self) -> Json {
        json!({
            "total_fields": self.field_types.len(),
            "dimensions": self.dimensions,
            "metrics": self.metrics,
            "field_types": self.field_types,
        })
    }
}

pub fn classify(docs: &[Json]) -> FieldClassification {
    let mut field_types: BTreeMap<String, FieldProfile> = BTreeMap::new();
    for doc in docs {
        if let Json::Object(map) = doc {
            flatten_into(&mut field_types, map);
        }
    }

    let mut dimensions = Vec::new();
    let mut metrics = Vec::new();
    for (path, profile) in &mut field_types {
        profile.role = role_of(profile);
        match profile.role {
            FieldRole::Dimension => dimensions.push(path.clone()),
            FieldRole::Metric => metrics.push(path.clone()),
            FieldRole::Unclassified => {}
        }
    }

    FieldClassification {
        field_types,
        dimensions,
        metrics,
    }
}

fn flatten_into(fields: &mut BTreeMap<String, FieldProfile>, root: &Map<String, Json>) {
    let mut work: Vec<(String, &Map<String, Json>)> = vec![(String::new(), root)];
    while let Some((prefix, map)) = work.pop() {
        for (key, value) in map {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            record(fields, &path, value);
            if let Json::Object(inner) = value {
                work.push((path, inner));
            }
        }
    }
}

/// The first observed type wins; later occurrences only contribute samples.
fn record(fields: &mut BTreeMap<String, FieldProfile>, path: &str, value: &Json) {
    let profile = fields
        .entry(path.to_string())
        .or_insert_with(|| FieldProfile {
            field_type: FieldType::of(value),
            role: FieldRole::Unclassified,
            samples: Vec::new(),
        });
    if profile.samples.len() < MAX_SAMPLES {
        profile.samples.push(value.clone());
    }
}

/// Numeric fields qualify as metrics only with observed variation; a
/// constant numeric is likely an identifier and stays unclassified.
fn role_of(profile: &FieldProfile) -> FieldRole {
    match profile.field_type {
        FieldType::Integer | FieldType::Float => {
            let mut distinct: Vec<&Json> = Vec::new();
            for sample in &profile.samples {
                if !distinct.contains(&sample) {
                    distinct.push(sample);
                }
            }
            if distinct.len() > 1 {
                FieldRole::Metric
            } else {
                FieldRole::Unclassified
            }
        }
        FieldType::String | FieldType::Object => FieldRole::Dimension,
        _ => FieldRole::Unclassified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varying_numeric_is_metric_and_string_is_dimension() {
        let docs = vec![
            json!({"a": 1, "b": "x"}),
            json!({"a": 1, "b": "y"}),
            json!({"a": 2}),
        ];
        let classification = classify(&docs);
        assert_eq!(classification.metrics, vec!["a"]);
        assert_eq!(classification.dimensions, vec!["b"]);
    }

    #[test]
    fn constant_numeric_is_excluded_from_metrics() {
        let docs = vec![json!({"id": 7}), json!({"id": 7}), json!({"id": 7})];
        let classification = classify(&docs);
        assert!(classification.metrics.is_empty());
        assert_eq!(
            classification.field_types["id"].role,
            FieldRole::Unclassified
        );
    }

    #[test]
    fn nested_objects_flatten_to_dot_paths() {
        let docs = vec![json!({"publisher": {"name": "Nintendo", "founded": 1889}})];
        let classification = classify(&docs);
        assert!(classification.field_types.contains_key("publisher"));
        assert!(classification.field_types.contains_key("publisher.name"));
        assert_eq!(
            classification.field_types["publisher"].field_type,
            FieldType::Object
        );
        assert!(classification.dimensions.contains(&"publisher".to_string()));
        assert!(classification
            .dimensions
            .contains(&"publisher.name".to_string()));
    }

    #[test]
    fn arrays_are_leaves() {
        let docs = vec![json!({"tags": ["a", "b"]})];
        let classification = classify(&docs);
        assert_eq!(classification.field_types["tags"].field_type, FieldType::Array);
        assert!(!classification.field_types.keys().any(|k| k.starts_with("tags.")));
        assert!(classification.dimensions.is_empty());
        assert!(classification.metrics.is_empty());
    }

    #[test]
    fn booleans_and_nulls_stay_unclassified_but_profiled() {
        let docs = vec![json!({"active": true, "gone": null})];
        let classification = classify(&docs);
        assert_eq!(classification.field_types.len(), 2);
        assert!(classification.dimensions.is_empty());
        assert!(classification.metrics.is_empty());
    }

    #[test]
    fn samples_are_bounded() {
        let docs: Vec<Json> = (0..20).map(|i| json!({"n": i})).collect();
        let classification = classify(&docs);
        assert_eq!(classification.samples("n").len(), 5);
    }

    #[test]
    fn empty_sample_classifies_nothing() {
        let classification = classify(&[]);
        assert!(classification.field_types.is_empty());
        assert_eq!(classification.summary()["total_fields"], 0);
    }
}
