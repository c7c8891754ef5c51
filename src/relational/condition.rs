//! Condition extraction for the relational path.
//!
//! Two independent rule passes over the unfiltered token stream: magnitude
//! cues and time-window cues. Either, both, or neither may fire.

use crate::nlp::{self, CmpOp, Value};

/// Left-hand side of a magnitude comparison. The amount columns live in the
/// transaction join, so only condition-bearing templates may use this.
const AMOUNT_CLAUSE: &str = "(quantity * unit_price)";

/// A structured condition, rendered to one SQL fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        clause: &'static str,
        op: CmpOp,
        value: Value,
    },
    Window(TimeWindow),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Today,
    Yesterday,
    LastWeek,
    LastMonth,
}

impl TimeWindow {
    fn to_sql(self) -> &'static str {
        match self {
            TimeWindow::Today => "DATE(transaction_date) = DATE('now')",
            TimeWindow::Yesterday => "DATE(transaction_date) = DATE('now', '-1 day')",
            TimeWindow::LastWeek => "transaction_date >= DATE('now', '-7 days')",
            TimeWindow::LastMonth => "transaction_date >= DATE('now', '-30 days')",
        }
    }
}

impl Condition {
    pub fn to_sql(&self) -> String {
        match self {
            Condition::Compare { clause, op, value } => {
                format!("{clause} {} {}", op.sql(), value.to_sql())
            }
            Condition::Window(window) => window.to_sql().to_string(),
        }
    }
}

/// Temporal keywords in priority order; the first present in the stream
/// wins, so at most one window condition is ever extracted.
const TIME_RULES: &[(&str, TimeWindow)] = &[
    ("recent", TimeWindow::LastWeek),
    ("today", TimeWindow::Today),
    ("yesterday", TimeWindow::Yesterday),
    ("week", TimeWindow::LastWeek),
    ("month", TimeWindow::LastMonth),
];

pub fn extract(tokens: &[String]) -> Vec<Condition> {
    let mut conditions = Vec::new();
    if let Some(compare) = magnitude_condition(tokens) {
        conditions.push(compare);
    }
    if let Some(window) = window_condition(tokens) {
        conditions.push(Condition::Window(window));
    }
    conditions
}

/// The first direction cue decides the comparison; the token after it must
/// parse numerically once a leading currency symbol is stripped. A cue
/// without a parsable amount yields no condition.
fn magnitude_condition(tokens: &[String]) -> Option<Condition> {
    let cue = tokens
        .iter()
        .position(|t| direction_cue(t).is_some())?;
    let op = direction_cue(&tokens[cue])?;
    let amount = tokens.get(cue + 1)?;
    let value = Value::parse(amount.strip_prefix('$').unwrap_or(amount));
    value.is_numeric().then(|| Condition::Compare {
        clause: AMOUNT_CLAUSE,
        op,
        value,
    })
}

fn direction_cue(token: &str) -> Option<CmpOp> {
    nlp::lookup_operator(token).filter(|op| matches!(op, CmpOp::Lt | CmpOp::Gt))
}

fn window_condition(tokens: &[String]) -> Option<TimeWindow> {
    TIME_RULES
        .iter()
        .find(|(keyword, _)| tokens.iter().any(|t| t == keyword))
        .map(|&(_, window)| window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::tokenize;

    #[test]
    fn magnitude_below_currency_amount() {
        let conditions = extract(&tokenize("show me sales under $5"));
        assert_eq!(
            conditions,
            vec![Condition::Compare {
                clause: AMOUNT_CLAUSE,
                op: CmpOp::Lt,
                value: Value::Integer(5),
            }]
        );
        assert_eq!(conditions[0].to_sql(), "(quantity * unit_price) < 5");
    }

    #[test]
    fn magnitude_above_decimal_amount() {
        let conditions = extract(&tokenize("orders over 4.50"));
        assert_eq!(conditions[0].to_sql(), "(quantity * unit_price) > 4.5");
    }

    #[test]
    fn unparsable_amount_is_swallowed() {
        assert!(extract(&tokenize("we are under staffed")).is_empty());
        assert!(extract(&tokenize("sales under")).is_empty());
    }

    #[test]
    fn cue_direction_comes_from_the_cue_before_the_number() {
        // "over" precedes the amount; a later "under" must not flip it.
        let conditions = extract(&tokenize("transactions over $10 but not under par"));
        assert_eq!(conditions[0].to_sql(), "(quantity * unit_price) > 10");
    }

    #[test]
    fn temporal_rules_fire_in_priority_order() {
        let conditions = extract(&tokenize("recent sales this week"));
        // "recent" outranks "week"; both map to the same 7-day window.
        assert_eq!(conditions, vec![Condition::Window(TimeWindow::LastWeek)]);

        let conditions = extract(&tokenize("sales this month"));
        assert_eq!(
            conditions[0].to_sql(),
            "transaction_date >= DATE('now', '-30 days')"
        );
    }

    #[test]
    fn at_most_one_window_condition() {
        let conditions = extract(&tokenize("sales today and yesterday"));
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].to_sql(), "DATE(transaction_date) = DATE('now')");
    }

    #[test]
    fn magnitude_and_window_compose() {
        let conditions = extract(&tokenize("sales under $5 today"));
        assert_eq!(conditions.len(), 2);
    }

    #[test]
    fn empty_stream_extracts_nothing() {
        assert!(extract(&[]).is_empty());
    }
}
