//! Tokenization and the shared English-phrase operator lexicon.
//!
//! Both backend paths build on this module: intent keywords are matched
//! against the stopword-filtered stream, while condition cues are read from
//! the unfiltered stream so that numeric and temporal tokens survive.

use serde::Serialize;

/// Words carrying no analytic signal, removed before intent matching.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "were", "will", "with",
];

/// Comparison operators understood by both query backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CmpOp {
    Lt,
    Gt,
    Eq,
    Ne,
}

impl CmpOp {
    pub fn sql(self) -> &'static str {
        match self {
            CmpOp::Lt => "<",
            CmpOp::Gt => ">",
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
        }
    }

    pub fn mongo(self) -> &'static str {
        match self {
            CmpOp::Lt => "$lt",
            CmpOp::Gt => "$gt",
            CmpOp::Eq => "$eq",
            CmpOp::Ne => "$ne",
        }
    }
}

/// English comparison phrases mapped to operators. Lookup is exact-phrase
/// and case-insensitive; no fuzzy matching. Single-word entries double as
/// the magnitude direction cues of the relational path.
const OPERATOR_LEXICON: &[(&str, CmpOp)] = &[
    ("greater than", CmpOp::Gt),
    ("more than", CmpOp::Gt),
    ("less than", CmpOp::Lt),
    ("lesser than", CmpOp::Lt),
    ("equal to", CmpOp::Eq),
    ("not equal to", CmpOp::Ne),
    ("under", CmpOp::Lt),
    ("below", CmpOp::Lt),
    ("less", CmpOp::Lt),
    ("over", CmpOp::Gt),
    ("above", CmpOp::Gt),
    ("more", CmpOp::Gt),
];

pub fn lookup_operator(phrase: &str) -> Option<CmpOp> {
    let phrase = phrase.trim().to_lowercase();
    OPERATOR_LEXICON
        .iter()
        .find(|(p, _)| *p == phrase)
        .map(|&(_, op)| op)
}

/// A value extracted from user text. Conversion is total: integer parse
/// first, then float, otherwise the token is kept verbatim as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    Null,
}

impl Value {
    pub fn parse(token: &str) -> Value {
        if let Ok(n) = token.parse::<i64>() {
            Value::Integer(n)
        } else if let Ok(f) = token.parse::<f64>() {
            Value::Float(f)
        } else {
            Value::Text(token.to_string())
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// Renders the value as a SQL literal. Text is single-quoted with
    /// embedded quotes doubled.
    pub fn to_sql(&self) -> String {
        match self {
            Value::Integer(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Value::Null => "NULL".to_string(),
        }
    }
}

/// Lower-cases and splits text into tokens. Currency symbols, decimal
/// points, and hyphens stay inside a token; anything without an
/// alphanumeric character is dropped. Never fails on empty input.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '$' | '.' | '-')))
        .map(|t| t.trim_matches(|c| matches!(c, '.' | '-')))
        .filter(|t| t.chars().any(|c| c.is_ascii_alphanumeric()))
        .map(str::to_owned)
        .collect()
}

pub fn strip_stopwords(tokens: &[String]) -> Vec<String> {
    tokens
        .iter()
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .cloned()
        .collect()
}
