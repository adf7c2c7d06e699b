use crate::clause::{Condition, Predicates};
use crate::client::Client;
use crate::error::{Result, ValidationError};
use crate::header::{is_blank, HeaderMap};
use crate::request::{Request, Target, Verb};
use crate::response::Response;
use std::fmt;

/// Column type names understood by the server's SQLite engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Blob,
    Numeric,
    Boolean,
    Timestamp,
    Json,
    /// Any other type name, passed through verbatim
    Other(String),
}

impl ColumnType {
    pub fn as_str(&self) -> &str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
            ColumnType::Blob => "BLOB",
            ColumnType::Numeric => "NUMERIC",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Json => "JSON",
            ColumnType::Other(name) => name.as_str(),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ColumnType {
    fn from(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "INTEGER" => ColumnType::Integer,
            "REAL" => ColumnType::Real,
            "TEXT" => ColumnType::Text,
            "BLOB" => ColumnType::Blob,
            "NUMERIC" => ColumnType::Numeric,
            "BOOLEAN" => ColumnType::Boolean,
            "TIMESTAMP" => ColumnType::Timestamp,
            "JSON" => ColumnType::Json,
            _ => ColumnType::Other(name.to_string()),
        }
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    /// Inline modifiers such as `DEFAULT 0` or `COLLATE NOCASE`
    pub modifiers: Vec<String>,
}

impl ColumnDef {
    pub fn render(&self) -> String {
        let mut def = format!("{} {}", self.name, self.column_type);
        for modifier in &self.modifiers {
            def.push(' ');
            def.push_str(modifier);
        }
        def
    }
}

/// Table storage kind sent in the `TYPE` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Temporary,
    Memory,
}

impl TableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Temporary => "temporary",
            TableKind::Memory => "memory",
        }
    }
}

/// Table-level constraints, kept apart from column definitions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub primary_key: Vec<String>,
    pub not_null: Vec<String>,
    pub unique: Vec<Vec<String>>,
    pub foreign_keys: Vec<String>,
    pub autoinc: Option<String>,
}

/// Full CREATE TABLE definition
///
/// Constraint columns are not checked against the declared columns; the
/// server rejects inconsistent definitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSchema {
    pub columns: Vec<ColumnDef>,
    pub constraints: Constraints,
    pub if_not_exists: bool,
    pub without_rowid: bool,
    pub kind: Option<TableKind>,
}

impl TableSchema {
    pub fn encode(&self, headers: &mut HeaderMap) {
        headers.set_all("COLUMN", self.columns.iter().map(ColumnDef::render));

        let constraints = &self.constraints;
        if !constraints.primary_key.is_empty() {
            headers.insert("PRIMARY-KEY", constraints.primary_key.join(" "));
        }
        if !constraints.not_null.is_empty() {
            headers.insert("NOT-NULL", constraints.not_null.join(" "));
        }
        headers.set_all("UNIQUE", constraints.unique.iter().map(|group| group.join(" ")));
        if let Some(column) = &constraints.autoinc {
            headers.insert("AUTOINC", column.clone());
        }
        headers.set_all("FOREIGN-KEY", constraints.foreign_keys.iter().cloned());

        if self.if_not_exists {
            headers.insert("IF-NOT-EXISTS", "true");
        }
        if let Some(kind) = self.kind {
            headers.insert("TYPE", kind.as_str());
        }
        if self.without_rowid {
            headers.insert("WITHOUT-ROWID", "true");
        }
    }
}

fn collect<I, S>(columns: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    columns
        .into_iter()
        .map(Into::into)
        .filter(|column: &String| !is_blank(column))
        .collect()
}

/// CREATE TABLE builder
#[derive(Debug, Clone)]
pub struct CreateTableBuilder<'a> {
    client: &'a Client,
    name: String,
    schema: TableSchema,
}

impl<'a> CreateTableBuilder<'a> {
    pub(crate) fn new(client: &'a Client, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
            schema: TableSchema::default(),
        }
    }

    /// Declare a column
    pub fn column(self, name: impl Into<String>, column_type: impl Into<ColumnType>) -> Self {
        self.column_with(name, column_type, Vec::<String>::new())
    }

    /// Declare a column with inline modifiers
    pub fn column_with<I, S>(
        mut self,
        name: impl Into<String>,
        column_type: impl Into<ColumnType>,
        modifiers: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schema.columns.push(ColumnDef {
            name: name.into(),
            column_type: column_type.into(),
            modifiers: collect(modifiers),
        });
        self
    }

    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schema.constraints.primary_key = collect(columns);
        self
    }

    pub fn not_null<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schema.constraints.not_null = collect(columns);
        self
    }

    /// Add a unique constraint over a group of columns
    pub fn unique<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schema.constraints.unique.push(collect(columns));
        self
    }

    /// Add a foreign key, e.g. `"user_id REFERENCES users(id)"`
    pub fn foreign_key(mut self, definition: impl Into<String>) -> Self {
        self.schema.constraints.foreign_keys.push(definition.into());
        self
    }

    pub fn autoinc(mut self, column: impl Into<String>) -> Self {
        self.schema.constraints.autoinc = Some(column.into());
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.schema.if_not_exists = true;
        self
    }

    pub fn without_rowid(mut self) -> Self {
        self.schema.without_rowid = true;
        self
    }

    pub fn kind(mut self, kind: TableKind) -> Self {
        self.schema.kind = Some(kind);
        self
    }

    pub fn build(self) -> Result<Request> {
        let mut headers = HeaderMap::new();
        headers.insert("NAME", self.name);
        self.schema.encode(&mut headers);
        Ok(self
            .client
            .request(Verb::Create, Target::Table, headers, None))
    }

    pub async fn execute(self) -> Result<Response> {
        let client = self.client;
        let request = self.build()?;
        client.dispatch(request).await
    }
}

/// DROP TABLE / DROP INDEX / DROP TRIGGER builder
#[derive(Debug, Clone)]
pub struct DropBuilder<'a> {
    client: &'a Client,
    target: Target,
    name: String,
    if_exists: bool,
}

impl<'a> DropBuilder<'a> {
    pub(crate) fn new(client: &'a Client, target: Target, name: impl Into<String>) -> Self {
        Self {
            client,
            target,
            name: name.into(),
            if_exists: false,
        }
    }

    pub fn if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }

    pub fn build(self) -> Result<Request> {
        let mut headers = HeaderMap::new();
        headers.insert("NAME", self.name);
        if self.if_exists {
            headers.insert("IF-EXISTS", "true");
        }
        Ok(self.client.request(Verb::Drop, self.target, headers, None))
    }

    pub async fn execute(self) -> Result<Response> {
        let client = self.client;
        let request = self.build()?;
        client.dispatch(request).await
    }
}

/// CREATE INDEX builder
#[derive(Debug, Clone)]
pub struct CreateIndexBuilder<'a> {
    client: &'a Client,
    name: String,
    table: String,
    columns: Vec<String>,
    predicates: Predicates,
    unique: bool,
    if_not_exists: bool,
}

impl<'a> CreateIndexBuilder<'a> {
    pub(crate) fn new(client: &'a Client, name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
            table: table.into(),
            columns: Vec::new(),
            predicates: Predicates::default(),
            unique: false,
            if_not_exists: false,
        }
    }

    /// Indexed columns, in key order
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(collect(columns));
        self
    }

    /// Restrict the index to matching rows; repeated calls are AND-ed
    pub fn where_clause(mut self, condition: impl Into<Condition>) -> Self {
        self.predicates.push(condition);
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    pub fn build(self) -> Result<Request> {
        if self.columns.is_empty() {
            return Err(ValidationError::MissingHeader {
                operation: "CREATE INDEX",
                header: "COLUMN",
            }
            .into());
        }

        let mut headers = HeaderMap::new();
        headers.insert("NAME", self.name);
        headers.insert("TABLE", self.table);
        headers.set_all("COLUMN", self.columns);
        self.predicates.encode(&mut headers);
        if self.unique {
            headers.insert("UNIQUE", "true");
        }
        if self.if_not_exists {
            headers.insert("IF-NOT-EXISTS", "true");
        }
        Ok(self
            .client
            .request(Verb::Create, Target::Index, headers, None))
    }

    pub async fn execute(self) -> Result<Response> {
        let client = self.client;
        let request = self.build()?;
        client.dispatch(request).await
    }
}

/// When a trigger fires relative to its event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerTiming {
    Before,
    After,
    InsteadOf,
}

impl TriggerTiming {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerTiming::Before => "BEFORE",
            TriggerTiming::After => "AFTER",
            TriggerTiming::InsteadOf => "INSTEAD OF",
        }
    }
}

/// Row operation a trigger listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    Insert,
    Update,
    Delete,
}

impl TriggerEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerEvent::Insert => "INSERT",
            TriggerEvent::Update => "UPDATE",
            TriggerEvent::Delete => "DELETE",
        }
    }
}

/// CREATE TRIGGER builder
///
/// Each action is one SQL statement of the trigger body, sent as its own
/// `ACTION` value in order.
#[derive(Debug, Clone)]
pub struct CreateTriggerBuilder<'a> {
    client: &'a Client,
    name: String,
    table: String,
    timing: TriggerTiming,
    event: TriggerEvent,
    update_of: Vec<String>,
    for_each_row: bool,
    when: Option<String>,
    actions: Vec<String>,
    temporary: bool,
    if_not_exists: bool,
}

impl<'a> CreateTriggerBuilder<'a> {
    pub(crate) fn new(client: &'a Client, name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
            table: table.into(),
            timing: TriggerTiming::After,
            event: TriggerEvent::Insert,
            update_of: Vec::new(),
            for_each_row: true,
            when: None,
            actions: Vec::new(),
            temporary: false,
            if_not_exists: false,
        }
    }

    pub fn timing(mut self, timing: TriggerTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn before(self, event: TriggerEvent) -> Self {
        self.timing(TriggerTiming::Before).on(event)
    }

    pub fn after(self, event: TriggerEvent) -> Self {
        self.timing(TriggerTiming::After).on(event)
    }

    pub fn instead_of(self, event: TriggerEvent) -> Self {
        self.timing(TriggerTiming::InsteadOf).on(event)
    }

    pub fn on(mut self, event: TriggerEvent) -> Self {
        self.event = event;
        self
    }

    /// Fire only when one of these columns changes; implies an UPDATE event
    pub fn update_of<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.event = TriggerEvent::Update;
        self.update_of = collect(columns);
        self
    }

    /// Fire once per statement instead of once per row
    pub fn for_each_statement(mut self) -> Self {
        self.for_each_row = false;
        self
    }

    pub fn when(mut self, condition: impl Into<Condition>) -> Self {
        self.when = Some(condition.into().render());
        self
    }

    /// Append one statement to the trigger body
    pub fn action(mut self, statement: impl Into<String>) -> Self {
        let statement = statement.into();
        if !is_blank(&statement) {
            self.actions.push(statement);
        }
        self
    }

    pub fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    pub fn build(self) -> Result<Request> {
        if self.actions.is_empty() {
            return Err(ValidationError::MissingHeader {
                operation: "CREATE TRIGGER",
                header: "ACTION",
            }
            .into());
        }

        let mut headers = HeaderMap::new();
        headers.insert("NAME", self.name);
        headers.insert("TABLE", self.table);
        headers.insert("TIMING", self.timing.as_str());
        headers.insert("EVENT", self.event.as_str());
        if !self.update_of.is_empty() {
            headers.insert("UPDATE-OF", self.update_of.join(", "));
        }
        if !self.for_each_row {
            headers.insert("FOR-EACH-ROW", "false");
        }
        if let Some(condition) = self.when {
            headers.insert("WHEN", condition);
        }
        headers.set_all("ACTION", self.actions);
        if self.temporary {
            headers.insert("TYPE", TableKind::Temporary.as_str());
        }
        if self.if_not_exists {
            headers.insert("IF-NOT-EXISTS", "true");
        }

        Ok(self
            .client
            .request(Verb::Create, Target::Trigger, headers, None))
    }

    pub async fn execute(self) -> Result<Response> {
        let client = self.client;
        let request = self.build()?;
        client.dispatch(request).await
    }
}

/// Schema change applied by ALTER TABLE
#[derive(Debug, Clone, PartialEq)]
pub enum AlterAction {
    RenameTable { new_name: String },
    AddColumn(ColumnDef),
    RenameColumn { column: String, new_name: String },
    DropColumn { column: String },
}

impl AlterAction {
    pub fn name(&self) -> &'static str {
        match self {
            AlterAction::RenameTable { .. } => "RENAME-TABLE",
            AlterAction::AddColumn(_) => "ADD-COLUMN",
            AlterAction::RenameColumn { .. } => "RENAME-COLUMN",
            AlterAction::DropColumn { .. } => "DROP-COLUMN",
        }
    }

    fn encode(&self, headers: &mut HeaderMap) {
        headers.insert("ACTION", self.name());
        match self {
            AlterAction::RenameTable { new_name } => {
                headers.insert("NEW-NAME", new_name.clone());
            }
            AlterAction::AddColumn(def) => {
                headers.insert("COLUMN", def.render());
            }
            AlterAction::RenameColumn { column, new_name } => {
                headers.insert("COLUMN", column.clone());
                headers.insert("NEW-NAME", new_name.clone());
            }
            AlterAction::DropColumn { column } => {
                headers.insert("COLUMN", column.clone());
            }
        }
    }
}

/// ALTER TABLE builder
///
/// The server applies one action per request; the last action set wins.
#[derive(Debug, Clone)]
pub struct AlterTableBuilder<'a> {
    client: &'a Client,
    name: String,
    action: Option<AlterAction>,
}

impl<'a> AlterTableBuilder<'a> {
    pub(crate) fn new(client: &'a Client, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
            action: None,
        }
    }

    pub fn action(mut self, action: AlterAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn rename_to(self, new_name: impl Into<String>) -> Self {
        self.action(AlterAction::RenameTable {
            new_name: new_name.into(),
        })
    }

    pub fn add_column(self, name: impl Into<String>, column_type: impl Into<ColumnType>) -> Self {
        self.action(AlterAction::AddColumn(ColumnDef {
            name: name.into(),
            column_type: column_type.into(),
            modifiers: Vec::new(),
        }))
    }

    pub fn rename_column(self, column: impl Into<String>, new_name: impl Into<String>) -> Self {
        self.action(AlterAction::RenameColumn {
            column: column.into(),
            new_name: new_name.into(),
        })
    }

    pub fn drop_column(self, column: impl Into<String>) -> Self {
        self.action(AlterAction::DropColumn {
            column: column.into(),
        })
    }

    /// Encode the request; without an action only `NAME` is sent and the
    /// server answers with its own error
    pub fn build(self) -> Result<Request> {
        let mut headers = HeaderMap::new();
        headers.insert("NAME", self.name);
        if let Some(action) = &self.action {
            action.encode(&mut headers);
        }
        Ok(self
            .client
            .request(Verb::Alter, Target::Table, headers, None))
    }

    pub async fn execute(self) -> Result<Response> {
        let client = self.client;
        let request = self.build()?;
        client.dispatch(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfig;
    use crate::header::HeaderValue;
    use crate::transport::{RawResponse, Transport};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;

    struct NullTransport;

    #[async_trait]
    impl Transport for NullTransport {
        async fn send(&self, _request: &Request) -> Result<RawResponse> {
            Ok(RawResponse::new(200, ""))
        }
    }

    fn client() -> Client {
        Client::new(ClientConfig::new("http://db/main"), Arc::new(NullTransport)).unwrap()
    }

    #[test]
    fn test_column_type_parsing() {
        assert_eq!(ColumnType::from("integer"), ColumnType::Integer);
        assert_eq!(
            ColumnType::from("VARCHAR(64)"),
            ColumnType::Other("VARCHAR(64)".to_string())
        );
        assert_eq!(ColumnType::Other("VARCHAR(64)".to_string()).to_string(), "VARCHAR(64)");
    }

    #[test]
    fn test_create_table() {
        let client = client();
        let request = client
            .create_table("users")
            .column("id", ColumnType::Integer)
            .column_with("email", "TEXT", ["COLLATE NOCASE"])
            .column_with("score", ColumnType::Real, ["DEFAULT 0"])
            .column("org_id", "INTEGER")
            .primary_key(["id"])
            .not_null(["email", "org_id"])
            .unique(["email"])
            .unique(["org_id", "email"])
            .foreign_key("org_id REFERENCES orgs(id)")
            .autoinc("id")
            .if_not_exists()
            .without_rowid()
            .kind(TableKind::Temporary)
            .build()
            .unwrap();

        assert_eq!(request.method(), "SQTP-CREATE");
        assert_eq!(request.url(), "http://db/main#table");
        assert_eq!(
            request.headers().to_json(),
            json!({
                "NAME": "users",
                "COLUMN": [
                    "id INTEGER",
                    "email TEXT COLLATE NOCASE",
                    "score REAL DEFAULT 0",
                    "org_id INTEGER"
                ],
                "PRIMARY-KEY": "id",
                "NOT-NULL": "email org_id",
                "UNIQUE": ["email", "org_id email"],
                "AUTOINC": "id",
                "FOREIGN-KEY": "org_id REFERENCES orgs(id)",
                "IF-NOT-EXISTS": "true",
                "TYPE": "temporary",
                "WITHOUT-ROWID": "true"
            })
        );
        assert!(request.body().is_none());
    }

    #[test]
    fn test_single_column_collapses() {
        let client = client();
        let request = client
            .create_table("kv")
            .column("k", ColumnType::Text)
            .build()
            .unwrap();
        assert_eq!(
            request.headers().get("COLUMN"),
            Some(&HeaderValue::scalar("k TEXT"))
        );
    }

    #[test]
    fn test_drop_table() {
        let client = client();
        let request = client.drop_table("users").if_exists().build().unwrap();
        assert_eq!(request.method(), "SQTP-DROP");
        assert_eq!(request.url(), "http://db/main#table");
        assert_eq!(
            request.headers().to_json(),
            json!({"NAME": "users", "IF-EXISTS": "true"})
        );

        let request = client.drop_table("users").build().unwrap();
        assert!(!request.headers().contains("IF-EXISTS"));
    }

    #[test]
    fn test_create_and_drop_index() {
        let client = client();
        let request = client
            .create_index("idx_users_email", "users")
            .columns(["email", "org_id"])
            .unique()
            .if_not_exists()
            .build()
            .unwrap();

        assert_eq!(request.url(), "http://db/main#index");
        assert_eq!(
            request.headers().to_json(),
            json!({
                "NAME": "idx_users_email",
                "TABLE": "users",
                "COLUMN": ["email", "org_id"],
                "UNIQUE": "true",
                "IF-NOT-EXISTS": "true"
            })
        );

        let request = client.drop_index("idx_users_email").build().unwrap();
        assert_eq!(request.method(), "SQTP-DROP");
        assert_eq!(request.fragment(), "#index");
    }

    #[test]
    fn test_partial_index() {
        let client = client();
        let err = client.create_index("idx_empty", "users").build().unwrap_err();
        assert!(err.is_validation());

        let request = client
            .create_index("idx_active_email", "users")
            .columns(["email"])
            .where_clause("active = 1")
            .where_clause("deleted_at IS NULL")
            .build()
            .unwrap();

        assert_eq!(
            request.headers().get("WHERE").unwrap().values(),
            ["active = 1", "deleted_at IS NULL"]
        );
        assert!(request.body().is_none());
    }

    #[test]
    fn test_create_trigger() {
        let client = client();
        let request = client
            .create_trigger("audit_email", "users")
            .after(TriggerEvent::Update)
            .update_of(["email"])
            .when("OLD.email != NEW.email")
            .action("INSERT INTO audit (user_id) VALUES (NEW.id)")
            .action("UPDATE users SET touched = 1 WHERE id = NEW.id")
            .if_not_exists()
            .build()
            .unwrap();

        assert_eq!(request.method(), "SQTP-CREATE");
        assert_eq!(request.url(), "http://db/main#trigger");
        assert_eq!(
            request.headers().to_json(),
            json!({
                "NAME": "audit_email",
                "TABLE": "users",
                "TIMING": "AFTER",
                "EVENT": "UPDATE",
                "UPDATE-OF": "email",
                "WHEN": "OLD.email != NEW.email",
                "ACTION": [
                    "INSERT INTO audit (user_id) VALUES (NEW.id)",
                    "UPDATE users SET touched = 1 WHERE id = NEW.id"
                ],
                "IF-NOT-EXISTS": "true"
            })
        );
    }

    #[test]
    fn test_trigger_single_action_and_statement_level() {
        let client = client();
        let request = client
            .create_trigger("no_deletes", "ledger")
            .instead_of(TriggerEvent::Delete)
            .for_each_statement()
            .temporary()
            .action("SELECT RAISE(ABORT, 'read only')")
            .build()
            .unwrap();

        let headers = request.headers();
        assert_eq!(headers.get_str("TIMING"), Some("INSTEAD OF"));
        assert_eq!(headers.get_str("EVENT"), Some("DELETE"));
        assert_eq!(headers.get_str("FOR-EACH-ROW"), Some("false"));
        assert_eq!(headers.get_str("TYPE"), Some("temporary"));
        assert_eq!(
            headers.get("ACTION"),
            Some(&HeaderValue::scalar("SELECT RAISE(ABORT, 'read only')"))
        );
    }

    #[test]
    fn test_trigger_requires_action() {
        let client = client();
        let err = client
            .create_trigger("t", "users")
            .action("")
            .build()
            .unwrap_err();
        match err {
            crate::error::SqtpError::Validation(v) => assert_eq!(
                v,
                ValidationError::MissingHeader {
                    operation: "CREATE TRIGGER",
                    header: "ACTION"
                }
            ),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_drop_trigger() {
        let client = client();
        let request = client.drop_trigger("audit_email").if_exists().build().unwrap();
        assert_eq!(request.url(), "http://db/main#trigger");
        assert_eq!(
            request.headers().to_json(),
            json!({"NAME": "audit_email", "IF-EXISTS": "true"})
        );
    }

    #[test]
    fn test_alter_table_actions() {
        let client = client();

        let request = client.alter_table("users").rename_to("members").build().unwrap();
        assert_eq!(request.method(), "SQTP-ALTER");
        assert_eq!(request.url(), "http://db/main#table");
        assert_eq!(
            request.headers().to_json(),
            json!({"NAME": "users", "ACTION": "RENAME-TABLE", "NEW-NAME": "members"})
        );

        let request = client
            .alter_table("users")
            .add_column("nickname", ColumnType::Text)
            .build()
            .unwrap();
        assert_eq!(request.headers().get_str("ACTION"), Some("ADD-COLUMN"));
        assert_eq!(request.headers().get_str("COLUMN"), Some("nickname TEXT"));

        let request = client
            .alter_table("users")
            .rename_column("nickname", "handle")
            .build()
            .unwrap();
        assert_eq!(request.headers().get_str("COLUMN"), Some("nickname"));
        assert_eq!(request.headers().get_str("NEW-NAME"), Some("handle"));

        let request = client
            .alter_table("users")
            .drop_column("handle")
            .build()
            .unwrap();
        assert_eq!(request.headers().get_str("ACTION"), Some("DROP-COLUMN"));
    }
}
