use crate::error::Result;
use crate::request::Request;
use crate::response::Response;

/// Observer invoked around every dispatched request
///
/// Both hooks run synchronously on the caller's task: `on_request` right
/// before the transport is called, `on_response` once the outcome is known.
/// Requests rejected by validation never reach a sink.
pub trait TraceSink: Send + Sync {
    fn on_request(&self, request: &Request);

    fn on_response(&self, request: &Request, outcome: &Result<Response>);
}

/// Emits structured `tracing` events under the `sqtp` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn on_request(&self, request: &Request) {
        let headers = request.headers().to_json();
        let body = request
            .body()
            .and_then(|b| b.encode().ok())
            .unwrap_or_default();
        tracing::debug!(
            target: "sqtp",
            method = %request.method(),
            url = request.url(),
            headers = %headers,
            body = %body,
            "sending request"
        );
    }

    fn on_response(&self, request: &Request, outcome: &Result<Response>) {
        match outcome {
            Ok(response) => tracing::debug!(
                target: "sqtp",
                method = %request.method(),
                status = response.status,
                changes = ?response.changes(),
                rows = response.rows().len(),
                "received response"
            ),
            Err(err) => tracing::warn!(
                target: "sqtp",
                method = %request.method(),
                status = ?err.status(),
                error = %err,
                "request failed"
            ),
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {
    fn on_request(&self, _request: &Request) {}

    fn on_response(&self, _request: &Request, _outcome: &Result<Response>) {}
}
