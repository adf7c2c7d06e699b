use crate::error::{Result, SqtpError};
use crate::request::Request;
use crate::transport::{RawResponse, Transport};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;

/// Transport over a pooled `reqwest` client
///
/// Multi-valued headers are sent as repeated header lines. Header names go
/// out lower-cased, which the server matches case-insensitively.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }

    /// Use an existing client, sharing its connection pool
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &Request) -> Result<RawResponse> {
        let method = Method::from_bytes(request.method().as_bytes())
            .map_err(|e| SqtpError::Transport(format!("invalid method {}: {}", request.method(), e)))?;

        let mut builder = self.client.request(method, request.url());
        for (name, value) in request.headers().wire_pairs() {
            builder = builder.header(name, value);
        }

        if let Some(body) = request.body() {
            builder = builder
                .header(CONTENT_TYPE, crate::request::JSON_CONTENT_TYPE)
                .body(body.encode()?);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.text().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
