//! Compiles the domain query model into parameterised PostgreSQL.
//!
//! Values never reach the SQL text; every operand, path, and window bound
//! is a positional bind. Field paths are resolved with `body #> $n` and
//! scalars are coerced per stored `jsonb` type, mirroring the in-memory
//! evaluator: equality on an array field holds when any element matches,
//! and a missing field never matches.

use std::fmt::Write as _;

use crate::domain::geo::GeoCap;
use crate::domain::ports::FindQuery;
use crate::domain::query::{Comparison, Condition, FieldPath, Filter, SortKey};

/// A value bound to a positional parameter.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SqlBind {
    /// `text`.
    Text(String),
    /// `text[]`, used for `#>` paths.
    TextArray(Vec<String>),
    /// Nullable `double precision`.
    Double(Option<f64>),
    /// `bigint`.
    BigInt(i64),
}

/// SQL text plus its binds in parameter order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SqlStatement {
    pub(crate) sql: String,
    pub(crate) binds: Vec<SqlBind>,
}

#[derive(Default)]
struct Builder {
    sql: String,
    binds: Vec<SqlBind>,
}

impl Builder {
    fn bind(&mut self, value: SqlBind) -> String {
        self.binds.push(value);
        format!("${}", self.binds.len())
    }

    fn push(&mut self, fragment: &str) {
        self.sql.push_str(fragment);
    }

    fn finish(self) -> SqlStatement {
        SqlStatement {
            sql: self.sql,
            binds: self.binds,
        }
    }

    fn path(&mut self, field: &FieldPath) -> String {
        self.bind(SqlBind::TextArray(field.segments().to_vec()))
    }

    fn where_collection(&mut self, collection: &str) {
        let param = self.bind(SqlBind::Text(collection.to_owned()));
        let _ = write!(self.sql, " WHERE collection = {param}");
    }

    fn filter(&mut self, filter: &Filter) {
        for condition in filter.conditions() {
            self.push(" AND ");
            self.condition(condition);
        }
    }

    fn condition(&mut self, condition: &Condition) {
        let path = self.path(&condition.field);
        let value = format!("body #> {path}");
        let ordering = match condition.comparison {
            Comparison::Eq | Comparison::In => None,
            Comparison::Gt => Some(">"),
            Comparison::Gte => Some(">="),
            Comparison::Lt => Some("<"),
            Comparison::Lte => Some("<="),
        };
        let predicates: Vec<String> = match ordering {
            None => condition
                .operands
                .iter()
                .map(|operand| self.equals("elem.value", operand))
                .collect(),
            Some(op) => condition
                .operands
                .first()
                .map(|operand| self.ordered("elem.value", op, operand))
                .into_iter()
                .collect(),
        };
        if predicates.is_empty() {
            self.push("FALSE");
            return;
        }
        let _ = write!(
            self.sql,
            "EXISTS (SELECT 1 FROM jsonb_array_elements(CASE WHEN jsonb_typeof({value}) = 'array' \
             THEN {value} ELSE jsonb_build_array({value}) END) AS elem(value) WHERE {})",
            predicates.join(" OR ")
        );
    }

    fn equals(&mut self, element: &str, operand: &str) -> String {
        let text = self.bind(SqlBind::Text(operand.to_owned()));
        let number = self.bind(SqlBind::Double(parse_number(operand)));
        format!(
            "((jsonb_typeof({element}) IN ('string', 'boolean') AND {element} #>> '{{}}' = {text}) \
             OR {} = {number})",
            number_expr(element)
        )
    }

    fn ordered(&mut self, element: &str, op: &str, operand: &str) -> String {
        let text = self.bind(SqlBind::Text(operand.to_owned()));
        let number = self.bind(SqlBind::Double(parse_number(operand)));
        format!(
            "((jsonb_typeof({element}) = 'string' AND ({element} #>> '{{}}') COLLATE \"C\" {op} {text}) \
             OR {} {op} {number})",
            number_expr(element)
        )
    }

    fn order_by(&mut self, sort: &[SortKey]) {
        self.push(" ORDER BY ");
        for key in sort {
            let path = self.path(&key.field);
            let direction = if key.descending {
                "DESC NULLS LAST"
            } else {
                "ASC NULLS FIRST"
            };
            let _ = write!(self.sql, "body #> {path} {direction}, ");
        }
        self.push("seq ASC");
    }

    fn window(&mut self, skip: u64, limit: Option<u64>) {
        let offset = self.bind(SqlBind::BigInt(clamp_i64(skip)));
        let _ = write!(self.sql, " OFFSET {offset}");
        if let Some(limit) = limit {
            let limit = self.bind(SqlBind::BigInt(clamp_i64(limit)));
            let _ = write!(self.sql, " LIMIT {limit}");
        }
    }
}

/// `double precision` value of a `jsonb` number, `NULL` for anything else.
fn number_expr(element: &str) -> String {
    format!(
        "(CASE WHEN jsonb_typeof({element}) = 'number' THEN ({element} #>> '{{}}')::double precision END)"
    )
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// `SELECT body` for a filtered, ordered, windowed read.
pub(crate) fn select_documents(collection: &str, query: &FindQuery) -> SqlStatement {
    let mut builder = Builder::default();
    builder.push("SELECT body FROM documents");
    builder.where_collection(collection);
    builder.filter(&query.filter);
    builder.order_by(&query.sort);
    builder.window(query.skip, query.limit);
    builder.finish()
}

/// `SELECT COUNT(*) AS total` for a filter.
pub(crate) fn count_documents(collection: &str, filter: &Filter) -> SqlStatement {
    let mut builder = Builder::default();
    builder.push("SELECT COUNT(*) AS total FROM documents");
    builder.where_collection(collection);
    builder.filter(filter);
    builder.finish()
}

/// `SELECT body` for documents whose GeoJSON point lies inside `cap`,
/// using the haversine great-circle angle.
pub(crate) fn select_within(collection: &str, field: &FieldPath, cap: GeoCap) -> SqlStatement {
    let mut builder = Builder::default();
    let collection_param = builder.bind(SqlBind::Text(collection.to_owned()));
    let path = builder.path(field);
    let center = cap.center();
    let lat = builder.bind(SqlBind::Double(Some(center.latitude)));
    let lng = builder.bind(SqlBind::Double(Some(center.longitude)));
    let radius = builder.bind(SqlBind::Double(Some(cap.radius())));
    let lng_expr = number_expr(&format!("(body #> {path} #> '{{coordinates,0}}')"));
    let lat_expr = number_expr(&format!("(body #> {path} #> '{{coordinates,1}}')"));
    let _ = write!(
        builder.sql,
        "SELECT body FROM (SELECT body, seq, {lng_expr} AS lng, {lat_expr} AS lat \
         FROM documents WHERE collection = {collection_param}) AS located \
         WHERE lng IS NOT NULL AND lat IS NOT NULL \
         AND 2 * asin(least(1.0, sqrt(\
         power(sin(radians(lat - {lat}) / 2), 2) \
         + cos(radians({lat})) * cos(radians(lat)) * power(sin(radians(lng - {lng}) / 2), 2)\
         ))) <= {radius} ORDER BY seq ASC"
    );
    builder.finish()
}
