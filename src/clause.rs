//! Clause encoders
//!
//! Each encoder owns one builder concern and writes it into a [`HeaderMap`],
//! returning a body fragment when the concern cannot travel in headers.

use crate::error::ValidationError;
use crate::header::{is_blank, HeaderMap};
use crate::request::Verb;
use serde_json::{Map, Value};
use std::fmt;

/// Predicate that targets every row of a table
pub const WILDCARD: &str = "*";

/// Comparison operators for typed WHERE conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    NotLike,
    IsNull,
    IsNotNull,
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonOp::Eq => write!(f, "="),
            ComparisonOp::Ne => write!(f, "!="),
            ComparisonOp::Lt => write!(f, "<"),
            ComparisonOp::Le => write!(f, "<="),
            ComparisonOp::Gt => write!(f, ">"),
            ComparisonOp::Ge => write!(f, ">="),
            ComparisonOp::Like => write!(f, "LIKE"),
            ComparisonOp::NotLike => write!(f, "NOT LIKE"),
            ComparisonOp::IsNull => write!(f, "IS NULL"),
            ComparisonOp::IsNotNull => write!(f, "IS NOT NULL"),
        }
    }
}

/// Logical operators for combining conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOp::And => write!(f, "AND"),
            LogicalOp::Or => write!(f, "OR"),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// Join kinds the protocol can express
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
}

impl JoinType {
    pub fn header(&self) -> &'static str {
        match self {
            JoinType::Inner => "JOIN",
            JoinType::Left => "LEFT-JOIN",
        }
    }
}

/// Aggregate function usable in a projection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunc {
    Count,
    CountDistinct,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunc {
    pub fn render(&self, column: &str) -> String {
        match self {
            AggregateFunc::Count => "COUNT(*)".to_string(),
            AggregateFunc::CountDistinct => format!("COUNT(DISTINCT {})", column),
            AggregateFunc::Sum => format!("SUM({})", column),
            AggregateFunc::Avg => format!("AVG({})", column),
            AggregateFunc::Min => format!("MIN({})", column),
            AggregateFunc::Max => format!("MAX({})", column),
        }
    }
}

/// Result-shape hint sent in the `VIEW` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewFormat {
    #[default]
    Object,
    Row,
    Column,
}

impl ViewFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewFormat::Object => "object",
            ViewFormat::Row => "row",
            ViewFormat::Column => "column",
        }
    }
}

/// WHERE condition
///
/// Conditions are rendered to free-form text before they reach the header
/// map; the server receives the same strings either way.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Simple {
        column: String,
        op: ComparisonOp,
        value: Option<Value>,
    },
    Compound {
        conditions: Vec<Condition>,
        op: LogicalOp,
    },
    Raw(String),
}

impl Condition {
    /// Condition matching every row
    pub fn all_rows() -> Self {
        Condition::Raw(WILDCARD.to_string())
    }

    pub fn render(&self) -> String {
        match self {
            Condition::Simple { column, op, value } => {
                if matches!(op, ComparisonOp::IsNull | ComparisonOp::IsNotNull) {
                    format!("{} {}", column, op)
                } else {
                    let val = value
                        .as_ref()
                        .map(format_value)
                        .unwrap_or_else(|| "NULL".to_string());
                    format!("{} {} {}", column, op, val)
                }
            }
            Condition::Compound { conditions, op } => {
                if conditions.is_empty() {
                    "TRUE".to_string()
                } else {
                    let parts = conditions
                        .iter()
                        .map(|c| c.render())
                        .collect::<Vec<_>>()
                        .join(&format!(" {} ", op));
                    format!("({})", parts)
                }
            }
            Condition::Raw(text) => text.clone(),
        }
    }
}

impl From<&str> for Condition {
    fn from(text: &str) -> Self {
        Condition::Raw(text.to_string())
    }
}

impl From<String> for Condition {
    fn from(text: String) -> Self {
        Condition::Raw(text)
    }
}

/// Render a JSON value as an SQL literal
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string().to_uppercase(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Array(_) | Value::Object(_) => {
            format!("'{}'", value.to_string().replace('\'', "''"))
        }
    }
}

/// Column projection, `COLUMNS` header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    columns: Vec<String>,
}

impl Projection {
    /// Replace the projection; blank column names are skipped
    pub fn replace<I, S>(&mut self, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.clear();
        for column in columns {
            self.push(column);
        }
    }

    pub fn push(&mut self, column: impl Into<String>) {
        let column = column.into();
        if !is_blank(&column) {
            self.columns.push(column);
        }
    }

    pub fn clear(&mut self) {
        self.columns.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn encode(&self, headers: &mut HeaderMap) {
        if !self.columns.is_empty() {
            headers.insert("COLUMNS", self.columns.join(", "));
        }
    }
}

/// WHERE and WHERE-IN predicates of one builder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicates {
    conditions: Vec<String>,
    value_sets: Vec<(String, Vec<Value>)>,
}

impl Predicates {
    /// Add a WHERE condition; conditions that render blank are dropped
    pub fn push(&mut self, condition: impl Into<Condition>) {
        let rendered = condition.into().render();
        if !is_blank(&rendered) {
            self.conditions.push(rendered);
        }
    }

    /// Add a value-set predicate; naming a column again replaces its set in place
    ///
    /// An empty set matches nothing and is not a predicate, so it removes the
    /// column instead.
    pub fn push_value_set(&mut self, column: impl Into<String>, values: Vec<Value>) {
        let column = column.into();
        if values.is_empty() || is_blank(&column) {
            self.value_sets.retain(|(name, _)| *name != column);
            return;
        }
        match self.value_sets.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = values,
            None => self.value_sets.push((column, values)),
        }
    }

    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    pub fn value_set_columns(&self) -> impl Iterator<Item = &str> {
        self.value_sets.iter().map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.value_sets.is_empty()
    }

    pub fn has_value_sets(&self) -> bool {
        !self.value_sets.is_empty()
    }

    /// True when the predicates explicitly target every row
    pub fn is_wildcard(&self) -> bool {
        self.conditions.iter().any(|c| c.trim() == WILDCARD)
    }

    /// Gate for UPDATE and DELETE
    ///
    /// Requires at least one predicate. The `"*"` wildcard must stand alone:
    /// the server stops at a leading wildcard and would ignore any narrower
    /// predicate sent with it.
    pub fn check_mutation(&self, verb: Verb) -> std::result::Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::MissingPredicate(verb));
        }
        let narrowed = self.has_value_sets()
            || self.conditions().iter().any(|c| c.trim() != WILDCARD);
        if self.is_wildcard() && narrowed {
            return Err(ValidationError::AmbiguousWildcard(verb));
        }
        Ok(())
    }

    /// Write `WHERE`/`WHERE-IN` and return the value-set body, if any
    ///
    /// One value-set column encodes as a bare array body; several encode as
    /// an object keyed by column in insertion order.
    pub fn encode(&self, headers: &mut HeaderMap) -> Option<Value> {
        headers.set_all("WHERE", self.conditions.iter().cloned());
        headers.set_all("WHERE-IN", self.value_set_columns());

        match self.value_sets.as_slice() {
            [] => None,
            [(_, values)] => Some(Value::Array(values.clone())),
            _ => Some(Value::Object(self.value_set_object())),
        }
    }

    /// Value-sets as an object, for merging into a larger body
    pub fn value_set_object(&self) -> Map<String, Value> {
        self.value_sets
            .iter()
            .map(|(name, values)| (name.clone(), Value::Array(values.clone())))
            .collect()
    }
}

/// Join clause
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub table: String,
    pub on_condition: String,
}

impl Join {
    pub fn render(&self) -> String {
        format!("{} ON {}", self.table, self.on_condition)
    }
}

/// Inner and left joins, kept in insertion order per kind
pub fn encode_joins(joins: &[Join], headers: &mut HeaderMap) {
    for join in joins {
        headers.set(join.join_type.header(), join.render());
    }
}

/// ORDER BY entry
#[derive(Debug, Clone, PartialEq)]
pub enum OrderBy {
    Column {
        column: String,
        direction: SortDirection,
    },
    Raw(String),
}

impl OrderBy {
    pub fn render(&self) -> String {
        match self {
            OrderBy::Column { column, .. } if is_blank(column) => String::new(),
            OrderBy::Column { column, direction } => format!("{} {}", column, direction),
            OrderBy::Raw(text) => text.clone(),
        }
    }
}

/// Ordering, grouping, pagination and result-shape settings of a SELECT
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shaping {
    pub order_by: Vec<OrderBy>,
    pub group_by: Vec<String>,
    pub having: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub distinct: bool,
    pub view: ViewFormat,
}

impl Shaping {
    pub fn encode(&self, headers: &mut HeaderMap) {
        let group_by = self
            .group_by
            .iter()
            .filter(|column| !is_blank(column))
            .map(String::as_str)
            .collect::<Vec<_>>();
        if !group_by.is_empty() {
            headers.insert("GROUP-BY", group_by.join(", "));
        }

        if let Some(having) = &self.having {
            headers.insert("HAVING", having.clone());
        }

        let order = self
            .order_by
            .iter()
            .map(|o| o.render())
            .filter(|o| !is_blank(o))
            .collect::<Vec<_>>();
        if !order.is_empty() {
            headers.insert("ORDER-BY", order.join(", "));
        }

        if let Some(limit) = self.limit {
            headers.insert("LIMIT", limit.to_string());
        }

        if let Some(offset) = self.offset {
            headers.insert("OFFSET", offset.to_string());
        }

        if self.distinct {
            headers.insert("DISTINCT", "true");
        }

        if self.view != ViewFormat::default() {
            headers.insert("VIEW", self.view.as_str());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_projection_order_preserved() {
        let mut headers = HeaderMap::new();
        let mut projection = Projection::default();
        projection.replace(["id", "name", "email"]);
        projection.encode(&mut headers);
        assert_eq!(headers.get_str("COLUMNS"), Some("id, name, email"));
    }

    #[test]
    fn test_empty_projection_is_absent() {
        let mut headers = HeaderMap::new();
        Projection::default().encode(&mut headers);
        assert!(!headers.contains("COLUMNS"));
    }

    #[test]
    fn test_multiple_where_conditions() {
        let mut headers = HeaderMap::new();
        let mut predicates = Predicates::default();
        predicates.push("age > 18");
        predicates.push("active = 1");
        predicates.push("country = 'NZ'");

        assert_eq!(predicates.encode(&mut headers), None);
        let value = headers.get("WHERE").unwrap();
        assert_eq!(value.values(), ["age > 18", "active = 1", "country = 'NZ'"]);
        assert!(!headers.contains("WHERE-1"));
    }

    #[test]
    fn test_single_value_set() {
        let mut headers = HeaderMap::new();
        let mut predicates = Predicates::default();
        predicates.push_value_set("id", vec![json!(1), json!(2), json!(3)]);

        let body = predicates.encode(&mut headers);
        assert_eq!(headers.get("WHERE-IN").unwrap().as_scalar(), Some("id"));
        assert_eq!(body, Some(json!([1, 2, 3])));
    }

    #[test]
    fn test_multiple_value_sets() {
        let mut headers = HeaderMap::new();
        let mut predicates = Predicates::default();
        predicates.push_value_set("status", vec![json!("open"), json!("held")]);
        predicates.push_value_set("id", vec![json!(7)]);

        let body = predicates.encode(&mut headers).unwrap();
        assert_eq!(headers.get("WHERE-IN").unwrap().values(), ["status", "id"]);
        assert_eq!(body, json!({"status": ["open", "held"], "id": [7]}));

        let keys: Vec<_> = body.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["status", "id"]);
    }

    #[test]
    fn test_value_set_column_replaced() {
        let mut predicates = Predicates::default();
        predicates.push_value_set("id", vec![json!(1)]);
        predicates.push_value_set("id", vec![json!(2)]);

        let mut headers = HeaderMap::new();
        assert_eq!(predicates.encode(&mut headers), Some(json!([2])));
        assert_eq!(headers.get_str("WHERE-IN"), Some("id"));
    }

    #[test]
    fn test_wildcard_detection() {
        let mut predicates = Predicates::default();
        assert_eq!(
            predicates.check_mutation(Verb::Delete),
            Err(ValidationError::MissingPredicate(Verb::Delete))
        );
        predicates.push(Condition::all_rows());
        assert!(predicates.is_wildcard());
        assert_eq!(predicates.check_mutation(Verb::Delete), Ok(()));
    }

    #[test]
    fn test_wildcard_must_stand_alone() {
        let mut predicates = Predicates::default();
        predicates.push(Condition::all_rows());
        predicates.push("id = 1");
        assert_eq!(
            predicates.check_mutation(Verb::Update),
            Err(ValidationError::AmbiguousWildcard(Verb::Update))
        );

        let mut predicates = Predicates::default();
        predicates.push(Condition::all_rows());
        predicates.push_value_set("id", vec![json!(1)]);
        assert_eq!(
            predicates.check_mutation(Verb::Delete),
            Err(ValidationError::AmbiguousWildcard(Verb::Delete))
        );
    }

    #[test]
    fn test_blank_predicates_do_not_count() {
        let mut predicates = Predicates::default();
        predicates.push("");
        predicates.push("   ");
        predicates.push_value_set("id", Vec::new());
        assert!(predicates.is_empty());
        assert!(predicates.conditions().is_empty());
        assert!(!predicates.has_value_sets());
        assert_eq!(
            predicates.check_mutation(Verb::Delete),
            Err(ValidationError::MissingPredicate(Verb::Delete))
        );

        let mut headers = HeaderMap::new();
        assert_eq!(predicates.encode(&mut headers), None);
        assert!(headers.is_empty());
    }

    #[test]
    fn test_empty_value_set_drops_column() {
        let mut predicates = Predicates::default();
        predicates.push_value_set("id", vec![json!(1)]);
        predicates.push_value_set("id", Vec::new());
        assert!(!predicates.has_value_sets());
    }

    #[test]
    fn test_projection_skips_blank_columns() {
        let mut projection = Projection::default();
        projection.replace(["", "  "]);
        assert!(projection.is_empty());

        projection.push("id");
        projection.push("");
        let mut headers = HeaderMap::new();
        projection.encode(&mut headers);
        assert_eq!(headers.get_str("COLUMNS"), Some("id"));
    }

    #[test]
    fn test_joins_by_kind() {
        let joins = vec![
            Join {
                join_type: JoinType::Inner,
                table: "orders".to_string(),
                on_condition: "users.id = orders.user_id".to_string(),
            },
            Join {
                join_type: JoinType::Left,
                table: "profiles".to_string(),
                on_condition: "users.id = profiles.user_id".to_string(),
            },
            Join {
                join_type: JoinType::Inner,
                table: "items".to_string(),
                on_condition: "orders.id = items.order_id".to_string(),
            },
        ];
        let mut headers = HeaderMap::new();
        encode_joins(&joins, &mut headers);

        assert_eq!(
            headers.get("JOIN").unwrap().values(),
            ["orders ON users.id = orders.user_id", "items ON orders.id = items.order_id"]
        );
        assert_eq!(
            headers.get_str("LEFT-JOIN"),
            Some("profiles ON users.id = profiles.user_id")
        );
    }

    #[test]
    fn test_shaping_headers() {
        let shaping = Shaping {
            order_by: vec![
                OrderBy::Column {
                    column: "name".to_string(),
                    direction: SortDirection::Asc,
                },
                OrderBy::Raw("created_at DESC".to_string()),
            ],
            group_by: vec!["country".to_string(), "city".to_string()],
            having: Some("COUNT(*) > 1".to_string()),
            limit: Some(10),
            offset: Some(20),
            distinct: true,
            view: ViewFormat::Row,
        };
        let mut headers = HeaderMap::new();
        shaping.encode(&mut headers);

        assert_eq!(headers.get_str("ORDER-BY"), Some("name ASC, created_at DESC"));
        assert_eq!(headers.get_str("GROUP-BY"), Some("country, city"));
        assert_eq!(headers.get_str("HAVING"), Some("COUNT(*) > 1"));
        assert_eq!(headers.get_str("LIMIT"), Some("10"));
        assert_eq!(headers.get_str("OFFSET"), Some("20"));
        assert_eq!(headers.get_str("DISTINCT"), Some("true"));
        assert_eq!(headers.get_str("VIEW"), Some("row"));
    }

    #[test]
    fn test_blank_shaping_entries_omitted() {
        let shaping = Shaping {
            order_by: vec![
                OrderBy::Raw(String::new()),
                OrderBy::Column {
                    column: " ".to_string(),
                    direction: SortDirection::Desc,
                },
            ],
            group_by: vec![String::new()],
            having: Some(String::new()),
            ..Shaping::default()
        };
        let mut headers = HeaderMap::new();
        shaping.encode(&mut headers);
        assert!(headers.is_empty());
    }

    #[test]
    fn test_default_view_omitted() {
        let mut headers = HeaderMap::new();
        Shaping::default().encode(&mut headers);
        assert!(headers.is_empty());
    }

    #[test]
    fn test_condition_rendering() {
        let condition = Condition::Compound {
            conditions: vec![
                Condition::Simple {
                    column: "name".to_string(),
                    op: ComparisonOp::Like,
                    value: Some(json!("%O'Reilly%")),
                },
                Condition::Simple {
                    column: "deleted_at".to_string(),
                    op: ComparisonOp::IsNull,
                    value: None,
                },
            ],
            op: LogicalOp::Or,
        };
        assert_eq!(
            condition.render(),
            "(name LIKE '%O''Reilly%' OR deleted_at IS NULL)"
        );
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&Value::Null), "NULL");
        assert_eq!(format_value(&json!(true)), "TRUE");
        assert_eq!(format_value(&json!(42)), "42");
        assert_eq!(format_value(&json!("it's")), "'it''s'");
    }
}
