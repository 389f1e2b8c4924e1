//! Query-string driven filtering, sorting, and field selection.
//!
//! A listing request is decoded into a [`ListQuery`]: reserved keys control
//! selection, ordering, and paging while every other key becomes a
//! [`Condition`]. Conditions keep their operands as raw strings; each store
//! coerces them against the stored value's type when evaluating.

mod eval;

use std::fmt;
use std::sync::OnceLock;

use pagination::PageRequest;
use regex::Regex;

use super::Error;
use super::resource::ID_FIELD;

pub use eval::{compare_documents, lookup};

/// Keys that steer the listing instead of filtering it.
pub const RESERVED_KEYS: [&str; 4] = ["select", "sort", "page", "limit"];

/// Dotted path addressing a possibly nested document field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Parse `location.state` style paths.
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let segments: Vec<String> = raw.trim().split('.').map(str::to_owned).collect();
        if segments.iter().any(|segment| segment.trim().is_empty()) {
            return Err(QueryError::EmptyField {
                key: raw.to_owned(),
            });
        }
        Ok(Self(segments))
    }

    /// Path of the top-level identifier field.
    #[must_use]
    pub fn id() -> Self {
        Self(vec![ID_FIELD.to_owned()])
    }

    /// Path segments from the document root.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Return `true` for the top-level identifier field.
    pub fn is_id(&self) -> bool {
        self.0.len() == 1 && self.0[0] == ID_FIELD
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// Comparison applied by a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Plain `field=value`.
    Eq,
    /// `field[gt]=value`.
    Gt,
    /// `field[gte]=value`.
    Gte,
    /// `field[lt]=value`.
    Lt,
    /// `field[lte]=value`.
    Lte,
    /// `field[in]=a,b,c`.
    In,
}

impl Comparison {
    /// Resolve a bracket operator name.
    pub fn from_operator(op: &str) -> Option<Self> {
        match op {
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "in" => Some(Self::In),
            _ => None,
        }
    }
}

/// One filter term: `field <comparison> operands`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Field the condition inspects.
    pub field: FieldPath,
    /// Comparison to apply.
    pub comparison: Comparison,
    /// Raw operands; exactly one unless the comparison is [`Comparison::In`].
    pub operands: Vec<String>,
}

impl Condition {
    /// Equality condition on a single value.
    pub fn eq(field: FieldPath, value: impl Into<String>) -> Self {
        Self {
            field,
            comparison: Comparison::Eq,
            operands: vec![value.into()],
        }
    }

    /// Membership condition over several values.
    pub fn any_of<I, S>(field: FieldPath, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field,
            comparison: Comparison::In,
            operands: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Conjunction of conditions. The empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Filter matching every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// Add a condition.
    #[must_use]
    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Conditions in the order they were supplied.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }
}

/// One ordering term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Field to order by.
    pub field: FieldPath,
    /// Order largest first.
    pub descending: bool,
}

/// Fields to keep in each returned document. `id` is always kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    fields: Vec<FieldPath>,
}

impl Projection {
    /// Selected fields.
    pub fn fields(&self) -> &[FieldPath] {
        &self.fields
    }

    /// Return `true` when `field` (top-level name) survives projection.
    pub fn keeps(&self, field: &str) -> bool {
        field == ID_FIELD
            || self
                .fields
                .iter()
                .any(|path| path.segments().first().is_some_and(|head| head == field))
    }
}

/// Decoded listing request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    /// Filter built from the non-reserved keys.
    pub filter: Filter,
    /// Explicit ordering; empty means creation order.
    pub sort: Vec<SortKey>,
    /// Optional field selection.
    pub projection: Option<Projection>,
    /// Requested page.
    pub page: PageRequest,
}

/// Problems decoding a listing query string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// A key or path segment was blank.
    #[error("Invalid query field '{key}'")]
    EmptyField {
        /// Offending key.
        key: String,
    },
    /// A bracketed key named an operator outside `gt, gte, lt, lte, in`.
    #[error("Unsupported query operator '{operator}' on '{key}'")]
    UnknownOperator {
        /// Offending key.
        key: String,
        /// Operator as written.
        operator: String,
    },
    /// Brackets that do not form `field[op]`.
    #[error("Malformed query parameter '{key}'")]
    Malformed {
        /// Offending key.
        key: String,
    },
    /// Filtering or sorting on a field that is never exposed.
    #[error("Cannot filter or sort by '{field}'")]
    HiddenField {
        /// Offending field path.
        field: String,
    },
}

impl From<QueryError> for Error {
    fn from(value: QueryError) -> Self {
        Self::invalid_request(value.to_string())
    }
}

static OPERATOR_RE: OnceLock<Regex> = OnceLock::new();

fn operator_regex() -> &'static Regex {
    OPERATOR_RE.get_or_init(|| {
        let pattern = r"^([^\[\]]+)\[([^\[\]]*)\]$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("operator regex failed to compile: {error}"))
    })
}

impl ListQuery {
    /// Decode query-string pairs. Paging values are lenient; filter keys are
    /// not.
    pub fn from_params(params: &[(String, String)], default_limit: u32) -> Result<Self, QueryError> {
        let mut filter = Filter::all();
        let mut sort = Vec::new();
        let mut projection = None;
        let mut page = None;
        let mut limit = None;

        for (key, value) in params {
            match key.as_str() {
                "select" => projection = parse_projection(value)?,
                "sort" => sort = parse_sort(value)?,
                "page" => page = Some(value.as_str()),
                "limit" => limit = Some(value.as_str()),
                _ => filter = filter.and(parse_condition(key, value)?),
            }
        }

        Ok(Self {
            filter,
            sort,
            projection,
            page: PageRequest::from_raw(page, limit, default_limit),
        })
    }
}

impl ListQuery {
    /// Refuse filter and sort terms rooted at one of `hidden`.
    ///
    /// Projections are not checked here; hidden fields are stripped from
    /// every document regardless of selection.
    pub fn reject_hidden(&self, hidden: &[&str]) -> Result<(), QueryError> {
        let is_hidden = |path: &FieldPath| {
            path.segments()
                .first()
                .is_some_and(|head| hidden.contains(&head.as_str()))
        };
        let offending = self
            .filter
            .conditions()
            .iter()
            .map(|condition| &condition.field)
            .chain(self.sort.iter().map(|key| &key.field))
            .find(|path| is_hidden(path));
        match offending {
            Some(path) => Err(QueryError::HiddenField {
                field: path.to_string(),
            }),
            None => Ok(()),
        }
    }
}

fn parse_condition(key: &str, value: &str) -> Result<Condition, QueryError> {
    if !key.contains(['[', ']']) {
        return Ok(Condition::eq(FieldPath::parse(key)?, value));
    }
    let captures = operator_regex()
        .captures(key)
        .ok_or_else(|| QueryError::Malformed {
            key: key.to_owned(),
        })?;
    let field = FieldPath::parse(&captures[1])?;
    let operator = &captures[2];
    let comparison =
        Comparison::from_operator(operator).ok_or_else(|| QueryError::UnknownOperator {
            key: key.to_owned(),
            operator: operator.to_owned(),
        })?;
    let operands = if comparison == Comparison::In {
        split_list(value).map(str::to_owned).collect()
    } else {
        vec![value.to_owned()]
    };
    Ok(Condition {
        field,
        comparison,
        operands,
    })
}

fn parse_projection(raw: &str) -> Result<Option<Projection>, QueryError> {
    let fields = split_list(raw)
        .map(FieldPath::parse)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((!fields.is_empty()).then_some(Projection { fields }))
}

fn parse_sort(raw: &str) -> Result<Vec<SortKey>, QueryError> {
    split_list(raw)
        .map(|entry| {
            let (descending, name) = match entry.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, entry),
            };
            Ok(SortKey {
                field: FieldPath::parse(name)?,
                descending,
            })
        })
        .collect()
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty())
}
