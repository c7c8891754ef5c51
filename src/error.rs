use thiserror::Error;

/// Failures the translation engine can surface to a caller.
///
/// An unrecognized intent is deliberately not represented here: the
/// relational path answers it with a fixed guidance message instead of
/// failing (see [`crate::relational::SqlTranslation::Guidance`]).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid query format: expected \"Find all <collection> where <field> <condition> <value>\"")]
    InvalidQueryFormat,

    #[error("unsupported condition: {0}")]
    UnsupportedOperator(String),

    #[error("backend error: {0}")]
    BackendExecution(String),
}
