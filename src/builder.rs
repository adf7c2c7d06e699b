use crate::clause::{
    encode_joins, AggregateFunc, ComparisonOp, Condition, Join, JoinType, OrderBy, Predicates,
    Projection, Shaping, SortDirection, ViewFormat,
};
use crate::client::Client;
use crate::error::{Result, ValidationError};
use crate::header::HeaderMap;
use crate::request::{Body, Request, Target, Verb};
use crate::response::Response;
use serde_json::{Map, Value};

/// Typed WHERE helpers shared by every builder that filters rows
macro_rules! where_helpers {
    () => {
        /// Add a WHERE condition; repeated calls are combined with AND by the server
        pub fn where_clause(mut self, condition: impl Into<Condition>) -> Self {
            self.predicates.push(condition);
            self
        }

        /// Target every row explicitly
        pub fn all_rows(self) -> Self {
            self.where_clause(Condition::all_rows())
        }

        /// Add a WHERE column = value condition
        pub fn where_eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
            self.where_op(column, ComparisonOp::Eq, value)
        }

        /// Add a WHERE column > value condition
        pub fn where_gt(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
            self.where_op(column, ComparisonOp::Gt, value)
        }

        /// Add a WHERE column < value condition
        pub fn where_lt(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
            self.where_op(column, ComparisonOp::Lt, value)
        }

        /// Add a WHERE column LIKE pattern condition
        pub fn where_like(self, column: impl Into<String>, pattern: impl Into<String>) -> Self {
            self.where_op(column, ComparisonOp::Like, Value::String(pattern.into()))
        }

        /// Add a WHERE column IS NULL condition
        pub fn where_null(self, column: impl Into<String>) -> Self {
            self.where_clause(Condition::Simple {
                column: column.into(),
                op: ComparisonOp::IsNull,
                value: None,
            })
        }

        pub fn where_op(
            self,
            column: impl Into<String>,
            op: ComparisonOp,
            value: impl Into<Value>,
        ) -> Self {
            self.where_clause(Condition::Simple {
                column: column.into(),
                op,
                value: Some(value.into()),
            })
        }

        /// Restrict a column to an explicit set of values, carried in the body
        pub fn where_in<I, V>(mut self, column: impl Into<String>, values: I) -> Self
        where
            I: IntoIterator<Item = V>,
            V: Into<Value>,
        {
            self.predicates
                .push_value_set(column, values.into_iter().map(Into::into).collect());
            self
        }
    };
}

/// True when there is no row data to send
fn is_missing(values: &Option<Body>) -> bool {
    match values {
        None => true,
        Some(Body::Json(Value::Null)) => true,
        Some(Body::Json(Value::Array(rows))) => rows.is_empty(),
        Some(Body::Json(Value::Object(fields))) => fields.is_empty(),
        Some(Body::Raw(text)) => text.trim().is_empty(),
        Some(Body::Json(_)) => false,
    }
}

/// SELECT builder
#[derive(Debug, Clone)]
pub struct SelectBuilder<'a> {
    client: &'a Client,
    table: String,
    projection: Projection,
    joins: Vec<Join>,
    predicates: Predicates,
    shaping: Shaping,
}

impl<'a> SelectBuilder<'a> {
    pub(crate) fn new(client: &'a Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
            projection: Projection::default(),
            joins: Vec::new(),
            predicates: Predicates::default(),
            shaping: Shaping::default(),
        }
    }

    /// Select specific columns, replacing any earlier projection
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection.replace(columns);
        self
    }

    /// Select all columns
    pub fn select_all(mut self) -> Self {
        self.projection.clear();
        self
    }

    /// Add a column to select
    pub fn add_column(mut self, column: impl Into<String>) -> Self {
        self.projection.push(column);
        self
    }

    /// Add an aggregate to the projection
    pub fn aggregate(
        mut self,
        func: AggregateFunc,
        column: impl Into<String>,
        alias: Option<&str>,
    ) -> Self {
        let expr = func.render(&column.into());
        match alias {
            Some(alias) => self.projection.push(format!("{} AS {}", expr, alias)),
            None => self.projection.push(expr),
        }
        self
    }

    /// Use DISTINCT
    pub fn distinct(mut self) -> Self {
        self.shaping.distinct = true;
        self
    }

    where_helpers!();

    /// Add a JOIN clause
    pub fn join(
        mut self,
        join_type: JoinType,
        table: impl Into<String>,
        on: impl Into<Condition>,
    ) -> Self {
        self.joins.push(Join {
            join_type,
            table: table.into(),
            on_condition: on.into().render(),
        });
        self
    }

    /// Add an INNER JOIN
    pub fn inner_join(self, table: impl Into<String>, on: impl Into<Condition>) -> Self {
        self.join(JoinType::Inner, table, on)
    }

    /// Add a LEFT JOIN
    pub fn left_join(self, table: impl Into<String>, on: impl Into<Condition>) -> Self {
        self.join(JoinType::Left, table, on)
    }

    /// Set GROUP BY columns
    pub fn group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shaping.group_by = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the HAVING condition; only meaningful together with GROUP BY
    pub fn having(mut self, condition: impl Into<Condition>) -> Self {
        self.shaping.having = Some(condition.into().render());
        self
    }

    /// Add a free-form ORDER BY entry such as `"name ASC"`
    pub fn order_by(mut self, order: impl Into<String>) -> Self {
        self.shaping.order_by.push(OrderBy::Raw(order.into()));
        self
    }

    pub fn order(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.shaping.order_by.push(OrderBy::Column {
            column: column.into(),
            direction,
        });
        self
    }

    /// Add ascending ORDER BY
    pub fn order_asc(self, column: impl Into<String>) -> Self {
        self.order(column, SortDirection::Asc)
    }

    /// Add descending ORDER BY
    pub fn order_desc(self, column: impl Into<String>) -> Self {
        self.order(column, SortDirection::Desc)
    }

    /// Set LIMIT
    pub fn limit(mut self, limit: u64) -> Self {
        self.shaping.limit = Some(limit);
        self
    }

    /// Set OFFSET
    pub fn offset(mut self, offset: u64) -> Self {
        self.shaping.offset = Some(offset);
        self
    }

    /// Set the result shape
    pub fn view(mut self, view: ViewFormat) -> Self {
        self.shaping.view = view;
        self
    }

    /// Encode the request without sending it
    pub fn build(self) -> Result<Request> {
        let mut headers = HeaderMap::new();
        headers.insert("FROM", self.table);
        self.projection.encode(&mut headers);
        encode_joins(&self.joins, &mut headers);
        let body = self.predicates.encode(&mut headers).map(Body::Json);
        self.shaping.encode(&mut headers);

        Ok(self
            .client
            .request(Verb::Select, Target::Rows, headers, body))
    }

    pub async fn execute(self) -> Result<Response> {
        let client = self.client;
        let request = self.build()?;
        client.dispatch(request).await
    }
}

/// INSERT builder
#[derive(Debug, Clone)]
pub struct InsertBuilder<'a> {
    client: &'a Client,
    table: String,
    projection: Projection,
    values: Option<Body>,
    if_not_exists: bool,
}

impl<'a> InsertBuilder<'a> {
    pub(crate) fn new(client: &'a Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
            projection: Projection::default(),
            values: None,
            if_not_exists: false,
        }
    }

    /// Row data: one object, an array of objects, or an array of value arrays
    pub fn values(mut self, rows: impl Into<Value>) -> Self {
        self.values = Some(Body::Json(rows.into()));
        self
    }

    /// Row data already encoded as JSON text
    pub fn raw_values(mut self, json: impl Into<String>) -> Self {
        self.values = Some(Body::Raw(json.into()));
        self
    }

    /// Name the columns positional row arrays map onto
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection.replace(columns);
        self
    }

    /// Skip rows that already exist instead of failing
    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    pub fn build(self) -> Result<Request> {
        if is_missing(&self.values) {
            return Err(ValidationError::MissingValues(Verb::Insert).into());
        }

        let mut headers = HeaderMap::new();
        headers.insert("TABLE", self.table);
        self.projection.encode(&mut headers);
        if self.if_not_exists {
            headers.insert("IF-NOT-EXISTS", "true");
        }

        Ok(self
            .client
            .request(Verb::Insert, Target::Rows, headers, self.values))
    }

    pub async fn execute(self) -> Result<Response> {
        let client = self.client;
        let request = self.build()?;
        client.dispatch(request).await
    }
}

/// UPSERT builder
#[derive(Debug, Clone)]
pub struct UpsertBuilder<'a> {
    client: &'a Client,
    table: String,
    projection: Projection,
    key: Vec<String>,
    values: Option<Body>,
}

impl<'a> UpsertBuilder<'a> {
    pub(crate) fn new(client: &'a Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
            projection: Projection::default(),
            key: Vec::new(),
            values: None,
        }
    }

    pub fn values(mut self, rows: impl Into<Value>) -> Self {
        self.values = Some(Body::Json(rows.into()));
        self
    }

    pub fn raw_values(mut self, json: impl Into<String>) -> Self {
        self.values = Some(Body::Raw(json.into()));
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection.replace(columns);
        self
    }

    /// Conflict key columns deciding between insert and update
    pub fn key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> Result<Request> {
        if is_missing(&self.values) {
            return Err(ValidationError::MissingValues(Verb::Upsert).into());
        }

        let mut headers = HeaderMap::new();
        headers.insert("TABLE", self.table);
        self.projection.encode(&mut headers);
        if !self.key.is_empty() {
            headers.insert("KEY", self.key.join(" "));
        }

        Ok(self
            .client
            .request(Verb::Upsert, Target::Rows, headers, self.values))
    }

    pub async fn execute(self) -> Result<Response> {
        let client = self.client;
        let request = self.build()?;
        client.dispatch(request).await
    }
}

/// UPDATE builder
#[derive(Debug, Clone)]
pub struct UpdateBuilder<'a> {
    client: &'a Client,
    table: String,
    assignments: Map<String, Value>,
    predicates: Predicates,
}

impl<'a> UpdateBuilder<'a> {
    pub(crate) fn new(client: &'a Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
            assignments: Map::new(),
            predicates: Predicates::default(),
        }
    }

    /// Set a column value
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.assignments.insert(column.into(), value.into());
        self
    }

    /// Set multiple column values
    pub fn set_many<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (column, value) in values {
            self.assignments.insert(column.into(), value.into());
        }
        self
    }

    where_helpers!();

    /// Encode the request without sending it
    ///
    /// The body is the assignment object; WHERE-IN value-sets are merged into
    /// it under their column names.
    pub fn build(self) -> Result<Request> {
        if self.assignments.is_empty() {
            return Err(ValidationError::MissingAssignment.into());
        }
        self.predicates.check_mutation(Verb::Update)?;
        if let Some(column) = self
            .predicates
            .value_set_columns()
            .find(|column| self.assignments.contains_key(*column))
        {
            return Err(ValidationError::ConflictingColumn(column.to_string()).into());
        }

        let mut headers = HeaderMap::new();
        headers.insert("TABLE", self.table);
        self.predicates.encode(&mut headers);

        let mut body = self.assignments;
        body.extend(self.predicates.value_set_object());

        Ok(self.client.request(
            Verb::Update,
            Target::Rows,
            headers,
            Some(Body::Json(Value::Object(body))),
        ))
    }

    pub async fn execute(self) -> Result<Response> {
        let client = self.client;
        let request = self.build()?;
        client.dispatch(request).await
    }
}

/// DELETE builder
#[derive(Debug, Clone)]
pub struct DeleteBuilder<'a> {
    client: &'a Client,
    table: String,
    predicates: Predicates,
}

impl<'a> DeleteBuilder<'a> {
    pub(crate) fn new(client: &'a Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
            predicates: Predicates::default(),
        }
    }

    where_helpers!();

    pub fn build(self) -> Result<Request> {
        self.predicates.check_mutation(Verb::Delete)?;

        let mut headers = HeaderMap::new();
        headers.insert("TABLE", self.table);
        let body = self.predicates.encode(&mut headers).map(Body::Json);

        Ok(self
            .client
            .request(Verb::Delete, Target::Rows, headers, body))
    }

    pub async fn execute(self) -> Result<Response> {
        let client = self.client;
        let request = self.build()?;
        client.dispatch(request).await
    }
}

/// RESET builder
///
/// Replaces a slice of a table in one server-side transaction: rows matching
/// the WHERE conditions are deleted, then the supplied rows are inserted.
/// Without a condition nothing is deleted.
#[derive(Debug, Clone)]
pub struct ResetBuilder<'a> {
    client: &'a Client,
    table: String,
    projection: Projection,
    predicates: Predicates,
    values: Option<Body>,
}

impl<'a> ResetBuilder<'a> {
    pub(crate) fn new(client: &'a Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
            projection: Projection::default(),
            predicates: Predicates::default(),
            values: None,
        }
    }

    /// Columns the replacement rows map onto
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection.replace(columns);
        self
    }

    /// Select the rows to delete before inserting
    pub fn where_clause(mut self, condition: impl Into<Condition>) -> Self {
        self.predicates.push(condition);
        self
    }

    pub fn values(mut self, rows: impl Into<Value>) -> Self {
        self.values = Some(Body::Json(rows.into()));
        self
    }

    pub fn raw_values(mut self, json: impl Into<String>) -> Self {
        self.values = Some(Body::Raw(json.into()));
        self
    }

    pub fn build(self) -> Result<Request> {
        if is_missing(&self.values) {
            return Err(ValidationError::MissingValues(Verb::Reset).into());
        }
        if self.projection.is_empty() {
            return Err(ValidationError::MissingHeader {
                operation: "RESET",
                header: "COLUMNS",
            }
            .into());
        }

        let mut headers = HeaderMap::new();
        headers.insert("TABLE", self.table);
        self.projection.encode(&mut headers);
        self.predicates.encode(&mut headers);

        Ok(self
            .client
            .request(Verb::Reset, Target::Rows, headers, self.values))
    }

    pub async fn execute(self) -> Result<Response> {
        let client = self.client;
        let request = self.build()?;
        client.dispatch(request).await
    }
}
