//! In-process evaluation of filters, orderings, and projections.
//!
//! Used by the in-memory store and by the query pipeline for projection. The
//! ordering mirrors PostgreSQL's `jsonb` comparison so both stores return the
//! same sequence: missing < null < string < number < boolean < array < object.

use std::cmp::Ordering;

use serde_json::Value;

use super::{Comparison, Condition, FieldPath, Filter, Projection, SortKey};
use crate::domain::resource::{Document, ID_FIELD};

/// Resolve `path` inside `document`.
pub fn lookup<'a>(document: &'a Document, path: &FieldPath) -> Option<&'a Value> {
    let (head, rest) = path.segments().split_first()?;
    rest.iter()
        .try_fold(document.get(head)?, |value, segment| value.get(segment))
}

impl Filter {
    /// Return `true` when every condition holds for `document`.
    pub fn matches(&self, document: &Document) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition.matches(document))
    }
}

impl Condition {
    /// Evaluate against one document. A missing field never matches.
    pub fn matches(&self, document: &Document) -> bool {
        let Some(value) = lookup(document, &self.field) else {
            return false;
        };
        match value {
            Value::Array(items) => items.iter().any(|item| self.matches_scalar(item)),
            scalar => self.matches_scalar(scalar),
        }
    }

    fn matches_scalar(&self, value: &Value) -> bool {
        match self.comparison {
            Comparison::Eq | Comparison::In => self
                .operands
                .iter()
                .any(|operand| scalar_equals(value, operand)),
            Comparison::Gt => self.compare_first(value, Ordering::is_gt),
            Comparison::Gte => self.compare_first(value, Ordering::is_ge),
            Comparison::Lt => self.compare_first(value, Ordering::is_lt),
            Comparison::Lte => self.compare_first(value, Ordering::is_le),
        }
    }

    fn compare_first(&self, value: &Value, accept: fn(Ordering) -> bool) -> bool {
        self.operands
            .first()
            .and_then(|operand| scalar_cmp(value, operand))
            .is_some_and(accept)
    }
}

fn scalar_equals(value: &Value, operand: &str) -> bool {
    match value {
        Value::String(text) => text == operand,
        Value::Number(number) => parse_number(operand)
            .zip(number.as_f64())
            .is_some_and(|(wanted, stored)| stored == wanted),
        Value::Bool(flag) => operand.parse::<bool>().is_ok_and(|wanted| wanted == *flag),
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}

/// Order a stored scalar against a raw operand, when the types agree.
fn scalar_cmp(value: &Value, operand: &str) -> Option<Ordering> {
    match value {
        Value::String(text) => Some(text.as_str().cmp(operand)),
        Value::Number(number) => number.as_f64()?.partial_cmp(&parse_number(operand)?),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None => 0,
        Some(Value::Null) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Number(_)) => 3,
        Some(Value::Bool(_)) => 4,
        Some(Value::Array(_)) => 5,
        Some(Value::Object(_)) => 6,
    }
}

fn value_cmp(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    match (left, right) {
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .zip(b.as_f64())
            .and_then(|(x, y)| x.partial_cmp(&y))
            .unwrap_or(Ordering::Equal),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(Value::Array(a)), Some(Value::Array(b))) => a.len().cmp(&b.len()).then_with(|| {
            a.iter()
                .zip(b)
                .map(|(x, y)| value_cmp(Some(x), Some(y)))
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        }),
        _ => type_rank(left).cmp(&type_rank(right)),
    }
}

/// Compare two documents by `sort`; ties stay equal so a stable sort keeps
/// creation order.
pub fn compare_documents(left: &Document, right: &Document, sort: &[SortKey]) -> Ordering {
    sort.iter()
        .map(|key| {
            let ordering = value_cmp(lookup(left, &key.field), lookup(right, &key.field));
            if key.descending {
                ordering.reverse()
            } else {
                ordering
            }
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

impl Projection {
    /// Keep only the selected fields and `id`.
    pub fn apply(&self, document: &Document) -> Document {
        let mut projected = Document::new();
        if let Some(id) = document.get(ID_FIELD) {
            projected.insert(ID_FIELD.to_owned(), id.clone());
        }
        for path in &self.fields {
            if let Some(value) = lookup(document, path) {
                insert_path(&mut projected, path.segments(), value.clone());
            }
        }
        projected
    }
}

fn insert_path(target: &mut Document, segments: &[String], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };
    if rest.is_empty() {
        target.insert(head.clone(), value);
        return;
    }
    let slot = target
        .entry(head.clone())
        .or_insert_with(|| Value::Object(Document::new()));
    if let Value::Object(nested) = slot {
        insert_path(nested, rest, value);
    }
}
