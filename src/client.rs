use crate::builder::{
    DeleteBuilder, InsertBuilder, ResetBuilder, SelectBuilder, UpdateBuilder, UpsertBuilder,
};
use crate::error::{Result, SqtpError};
use crate::header::HeaderMap;
use crate::request::{Request, Target, Verb};
use crate::response::{self, Response};
use crate::schema::{
    AlterTableBuilder, CreateIndexBuilder, CreateTableBuilder, CreateTriggerBuilder, DropBuilder,
};
use crate::trace::{TraceSink, TracingSink};
use crate::transport::Transport;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_PROTOCOL_VERSION: &str = "SQTP/1.0";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration shared by every request of a [`Client`]
#[derive(Clone)]
pub struct ClientConfig {
    /// Server address without a trailing slash
    pub base_address: String,
    pub protocol_version: String,
    /// Deadline applied to each request
    pub request_timeout: Duration,
    /// Whether the trace sink is invoked
    pub trace_enabled: bool,
    pub trace_sink: Arc<dyn TraceSink>,
}

impl ClientConfig {
    pub fn new(base_address: impl Into<String>) -> Self {
        let base_address = base_address.into();
        Self {
            base_address: base_address.trim_end_matches('/').to_string(),
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            trace_enabled: false,
            trace_sink: Arc::new(TracingSink),
        }
    }

    /// Read configuration from `SQTP_BASE_URL`, `SQTP_TIMEOUT_MS`,
    /// `SQTP_PROTOCOL` and `SQTP_TRACE`
    pub fn from_env() -> Result<Self> {
        let base = std::env::var("SQTP_BASE_URL")
            .map_err(|_| SqtpError::Config("SQTP_BASE_URL is not set".to_string()))?;
        let mut config = Self::new(base);

        if let Ok(timeout) = std::env::var("SQTP_TIMEOUT_MS") {
            let millis: u64 = timeout.trim().parse().map_err(|_| {
                SqtpError::Config(format!("SQTP_TIMEOUT_MS is not a number: {}", timeout))
            })?;
            config.request_timeout = Duration::from_millis(millis);
        }

        if let Ok(protocol) = std::env::var("SQTP_PROTOCOL") {
            config.protocol_version = protocol;
        }

        if let Ok(trace) = std::env::var("SQTP_TRACE") {
            config.trace_enabled = matches!(trace.trim(), "1" | "true" | "yes" | "on");
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = version.into();
        self
    }

    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.trace_enabled = enabled;
        self
    }

    /// Install a trace sink and enable tracing
    pub fn with_trace_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.trace_sink = sink;
        self.trace_enabled = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_address.is_empty() {
            return Err(SqtpError::Config("base address is empty".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(SqtpError::Config("request timeout must be positive".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_address", &self.base_address)
            .field("protocol_version", &self.protocol_version)
            .field("request_timeout", &self.request_timeout)
            .field("trace_enabled", &self.trace_enabled)
            .finish_non_exhaustive()
    }
}

/// Entry point: hands out operation builders and dispatches their requests
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl Client {
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            transport,
        })
    }

    /// Client over the bundled reqwest transport
    #[cfg(feature = "reqwest")]
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let transport = crate::reqwest::ReqwestTransport::new()?;
        Self::new(config, Arc::new(transport))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_address(&self) -> &str {
        &self.config.base_address
    }

    pub fn protocol_version(&self) -> &str {
        &self.config.protocol_version
    }

    pub fn select(&self, table: impl Into<String>) -> SelectBuilder<'_> {
        SelectBuilder::new(self, table)
    }

    pub fn insert(&self, table: impl Into<String>) -> InsertBuilder<'_> {
        InsertBuilder::new(self, table)
    }

    pub fn update(&self, table: impl Into<String>) -> UpdateBuilder<'_> {
        UpdateBuilder::new(self, table)
    }

    pub fn upsert(&self, table: impl Into<String>) -> UpsertBuilder<'_> {
        UpsertBuilder::new(self, table)
    }

    pub fn delete(&self, table: impl Into<String>) -> DeleteBuilder<'_> {
        DeleteBuilder::new(self, table)
    }

    /// Delete the rows matching WHERE and insert replacements in one transaction
    pub fn reset(&self, table: impl Into<String>) -> ResetBuilder<'_> {
        ResetBuilder::new(self, table)
    }

    pub fn create_table(&self, name: impl Into<String>) -> CreateTableBuilder<'_> {
        CreateTableBuilder::new(self, name)
    }

    pub fn drop_table(&self, name: impl Into<String>) -> DropBuilder<'_> {
        DropBuilder::new(self, Target::Table, name)
    }

    pub fn create_index(
        &self,
        name: impl Into<String>,
        table: impl Into<String>,
    ) -> CreateIndexBuilder<'_> {
        CreateIndexBuilder::new(self, name, table)
    }

    pub fn drop_index(&self, name: impl Into<String>) -> DropBuilder<'_> {
        DropBuilder::new(self, Target::Index, name)
    }

    pub fn create_trigger(
        &self,
        name: impl Into<String>,
        table: impl Into<String>,
    ) -> CreateTriggerBuilder<'_> {
        CreateTriggerBuilder::new(self, name, table)
    }

    pub fn drop_trigger(&self, name: impl Into<String>) -> DropBuilder<'_> {
        DropBuilder::new(self, Target::Trigger, name)
    }

    pub fn alter_table(&self, name: impl Into<String>) -> AlterTableBuilder<'_> {
        AlterTableBuilder::new(self, name)
    }

    pub fn begin(&self) -> TransactionBuilder<'_> {
        TransactionBuilder::new(self, Verb::Begin, None)
    }

    pub fn commit(&self) -> TransactionBuilder<'_> {
        TransactionBuilder::new(self, Verb::Commit, None)
    }

    pub fn rollback(&self) -> TransactionBuilder<'_> {
        TransactionBuilder::new(self, Verb::Rollback, None)
    }

    pub fn savepoint(&self, name: impl Into<String>) -> TransactionBuilder<'_> {
        TransactionBuilder::new(self, Verb::Savepoint, Some(name.into()))
    }

    pub(crate) fn request(
        &self,
        verb: Verb,
        target: Target,
        headers: HeaderMap,
        body: Option<crate::request::Body>,
    ) -> Request {
        Request::new(verb, &self.config.base_address, target, headers, body)
    }

    /// Send a built request under the configured deadline and normalize the reply
    pub async fn dispatch(&self, request: Request) -> Result<Response> {
        let trace = self.config.trace_enabled;
        if trace {
            self.config.trace_sink.on_request(&request);
        }

        let deadline = self.config.request_timeout;
        let outcome = match tokio::time::timeout(deadline, self.transport.send(&request)).await {
            Ok(Ok(raw)) => response::normalize(raw),
            Ok(Err(err)) => Err(err),
            // Dropping the transport future cancels the in-flight request
            Err(_) => Err(SqtpError::Timeout(deadline)),
        };

        if trace {
            self.config.trace_sink.on_response(&request, &outcome);
        }
        outcome
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// BEGIN, COMMIT, ROLLBACK and SAVEPOINT
///
/// Transaction state lives on the server; the client only forwards the verb.
#[derive(Debug)]
pub struct TransactionBuilder<'a> {
    client: &'a Client,
    verb: Verb,
    name: Option<String>,
}

impl<'a> TransactionBuilder<'a> {
    fn new(client: &'a Client, verb: Verb, name: Option<String>) -> Self {
        Self { client, verb, name }
    }

    pub fn build(self) -> Result<Request> {
        let mut headers = HeaderMap::new();
        if let Some(name) = self.name {
            headers.insert("NAME", name);
        }
        Ok(self.client.request(self.verb, Target::Rows, headers, None))
    }

    pub async fn execute(self) -> Result<Response> {
        let client = self.client;
        let request = self.build()?;
        client.dispatch(request).await
    }
}
