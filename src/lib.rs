//! sqtp-client - Client for the Structured Query Transfer Protocol
//!
//! SQTP carries database operations over HTTP: each operation is a custom
//! method (`SQTP-SELECT`, `SQTP-INSERT`, ...) and every clause travels in a
//! dedicated header field. JSON bodies are only used for row data and for
//! value-set (`WHERE-IN`) predicates.
//!
//! # Architecture
//!
//! - **Header Map**: ordered, case-insensitive headers with true multi-valued entries
//! - **Clause Encoders**: projection, predicates, joins, ordering and table definitions
//! - **Operation Builders**: fluent, single-use builders with a terminal `build`/`execute`
//! - **Transport**: pluggable async capability that moves a [`Request`] to the server
//! - **Response Normalizer**: status classification and best-effort JSON decoding
//!
//! # Example
//!
//! ```rust,no_run
//! use sqtp_client::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run(transport: Arc<dyn Transport>) -> sqtp_client::Result<()> {
//! let config = ClientConfig::new("http://localhost:8080/db/main");
//! let client = Client::new(config, transport)?;
//!
//! let adults = client
//!     .select("users")
//!     .columns(["id", "name"])
//!     .where_clause("age > 18")
//!     .order_by("name ASC")
//!     .limit(10)
//!     .execute()
//!     .await?;
//! println!("{} rows", adults.rows().len());
//!
//! client.delete("users").where_in("id", [1, 2, 3]).execute().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Transports
//!
//! Enable the bundled HTTP transport via Cargo features:
//!
//! ```toml
//! [dependencies]
//! sqtp-client = { version = "0.1", features = ["reqwest"] }
//! ```
//!
//! # Safety gate
//!
//! UPDATE and DELETE refuse to build without a predicate. Pass the literal
//! `"*"` (or call `all_rows()`) to deliberately touch every row; the wildcard
//! cannot be combined with other predicates. Blank conditions and empty
//! value-sets do not count.

pub mod builder;
pub mod clause;
pub mod client;
pub mod error;
pub mod header;
pub mod request;
pub mod response;
pub mod schema;
pub mod trace;
pub mod transport;

#[cfg(feature = "reqwest")]
pub mod reqwest;

pub use builder::{
    DeleteBuilder, InsertBuilder, ResetBuilder, SelectBuilder, UpdateBuilder, UpsertBuilder,
};
pub use clause::{
    AggregateFunc, ComparisonOp, Condition, JoinType, LogicalOp, SortDirection, ViewFormat,
};
pub use client::{Client, ClientConfig, TransactionBuilder};
pub use error::{Result, SqtpError, ValidationError};
pub use header::{HeaderMap, HeaderValue};
pub use request::{Body, Request, Target, Verb};
pub use response::{Payload, Response};
pub use schema::{
    AlterAction, AlterTableBuilder, ColumnDef, ColumnType, CreateIndexBuilder,
    CreateTableBuilder, CreateTriggerBuilder, DropBuilder, TableKind, TriggerEvent, TriggerTiming,
};
pub use trace::{NoopSink, TraceSink, TracingSink};
pub use transport::{RawResponse, Transport};

#[cfg(feature = "reqwest")]
pub use crate::reqwest::ReqwestTransport;

/// Prelude for common imports
pub mod prelude {
    pub use crate::clause::{Condition, JoinType, SortDirection, ViewFormat};
    pub use crate::client::{Client, ClientConfig};
    pub use crate::error::{Result, SqtpError, ValidationError};
    pub use crate::response::{Payload, Response};
    pub use crate::schema::{ColumnType, TableKind, TriggerEvent, TriggerTiming};
    pub use crate::transport::{RawResponse, Transport};

    #[cfg(feature = "reqwest")]
    pub use crate::reqwest::ReqwestTransport;
}
