use crate::error::Result;
use crate::header::HeaderMap;
use serde_json::Value;
use std::fmt;

/// Prefix that turns a logical verb into an SQTP method token
pub const METHOD_PREFIX: &str = "SQTP-";

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Logical protocol verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Select,
    Insert,
    Update,
    Upsert,
    Delete,
    Reset,
    Create,
    Drop,
    Alter,
    Begin,
    Commit,
    Rollback,
    Savepoint,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Select => "SELECT",
            Verb::Insert => "INSERT",
            Verb::Update => "UPDATE",
            Verb::Upsert => "UPSERT",
            Verb::Delete => "DELETE",
            Verb::Reset => "RESET",
            Verb::Create => "CREATE",
            Verb::Drop => "DROP",
            Verb::Alter => "ALTER",
            Verb::Begin => "BEGIN",
            Verb::Commit => "COMMIT",
            Verb::Rollback => "ROLLBACK",
            Verb::Savepoint => "SAVEPOINT",
        }
    }

    /// Method token sent on the wire, e.g. `SQTP-SELECT`
    pub fn method(&self) -> String {
        format!("{}{}", METHOD_PREFIX, self.as_str())
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Object kind addressed by a DDL request, carried in the URL fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Rows,
    Table,
    Index,
    Trigger,
}

impl Target {
    pub fn fragment(&self) -> &'static str {
        match self {
            Target::Rows => "",
            Target::Table => "#table",
            Target::Index => "#index",
            Target::Trigger => "#trigger",
        }
    }
}

/// Request payload
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    /// Pre-encoded JSON text, sent untouched
    Raw(String),
}

impl Body {
    pub fn encode(&self) -> Result<String> {
        match self {
            Body::Json(value) => Ok(serde_json::to_string(value)?),
            Body::Raw(text) => Ok(text.clone()),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            Body::Raw(_) => None,
        }
    }
}

/// A fully encoded request, ready for a transport
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    verb: Verb,
    url: String,
    target: Target,
    headers: HeaderMap,
    body: Option<Body>,
}

impl Request {
    pub(crate) fn new(
        verb: Verb,
        base_address: &str,
        target: Target,
        headers: HeaderMap,
        body: Option<Body>,
    ) -> Self {
        Self {
            verb,
            url: format!("{}{}", base_address, target.fragment()),
            target,
            headers,
            body,
        }
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn method(&self) -> String {
        self.verb.method()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn fragment(&self) -> &'static str {
        self.target.fragment()
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Content type implied by the body, if any
    pub fn content_type(&self) -> Option<&'static str> {
        self.body.as_ref().map(|_| JSON_CONTENT_TYPE)
    }
}
