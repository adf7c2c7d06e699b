use crate::error::Result;
use crate::request::Request;
use async_trait::async_trait;

/// Response exactly as a transport received it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Header entries in arrival order; names may be lower-cased
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Capability that moves an encoded request to the server
///
/// Implementations must be cancel-safe: the client drops the returned future
/// when the request deadline elapses.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the raw response
    async fn send(&self, request: &Request) -> Result<RawResponse>;
}
