use crate::error::{Result, SqtpError};
use crate::header::normalize_response_headers;
use crate::transport::RawResponse;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Decoded response body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Json(Value),
    /// Body that was not valid JSON
    Text(String),
    Empty,
}

impl Payload {
    /// Decode a raw body, degrading to text when it is not JSON
    pub fn decode(body: &str) -> Self {
        if body.trim().is_empty() {
            return Payload::Empty;
        }
        match serde_json::from_str(body) {
            Ok(value) => Payload::Json(value),
            Err(err) => {
                tracing::debug!(target: "sqtp", error = %err, "response body is not JSON, keeping raw text");
                Payload::Text(body.to_string())
            }
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Json(value) => write!(f, "{}", value),
            Payload::Text(text) => f.write_str(text),
            Payload::Empty => Ok(()),
        }
    }
}

/// Successful protocol response
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub data: Payload,
}

impl Response {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Rows affected, from `X-SQTP-Changes`
    pub fn changes(&self) -> Option<u64> {
        self.header("X-SQTP-Changes")
            .and_then(|v| v.trim().parse().ok())
    }

    /// Row id of the last insert, from `X-SQTP-Last-Insert-Id`
    pub fn last_insert_id(&self) -> Option<i64> {
        self.header("X-SQTP-Last-Insert-Id")
            .and_then(|v| v.trim().parse().ok())
    }

    /// Rows of a JSON array body
    pub fn rows(&self) -> &[Value] {
        match &self.data {
            Payload::Json(Value::Array(rows)) => rows,
            _ => &[],
        }
    }
}

/// Turn a raw transport response into a [`Response`] or an HTTP error
///
/// The status decides success before the body is looked at, so a body that
/// fails to decode never hides a failing status.
pub fn normalize(raw: RawResponse) -> Result<Response> {
    let RawResponse {
        status,
        headers,
        body,
    } = raw;
    let data = Payload::decode(&body);

    if !(200..300).contains(&status) {
        return Err(SqtpError::Http { status, body: data });
    }

    Ok(Response {
        status,
        headers: normalize_response_headers(headers),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status,
            headers: vec![
                ("x-sqtp-changes".to_string(), "2".to_string()),
                ("x-sqtp-last-insert-id".to_string(), "41".to_string()),
                ("content-type".to_string(), "application/json".to_string()),
            ],
            body: body.to_string(),
        }
    }

    #[test]
    fn test_json_body() {
        let response = normalize(raw(200, r#"[{"id":1},{"id":2}]"#)).unwrap();
        assert_eq!(response.data, Payload::Json(json!([{"id": 1}, {"id": 2}])));
        assert_eq!(response.rows().len(), 2);
    }

    #[test]
    fn test_text_fallback() {
        let response = normalize(raw(200, "not json")).unwrap();
        assert_eq!(response.data, Payload::Text("not json".to_string()));
        assert!(response.rows().is_empty());
    }

    #[test]
    fn test_empty_body() {
        let response = normalize(raw(204, "")).unwrap();
        assert!(response.data.is_empty());
    }

    #[test]
    fn test_status_wins_over_body() {
        match normalize(raw(404, r#"{"error":"Database not found"}"#)) {
            Err(SqtpError::Http { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, Payload::Json(json!({"error": "Database not found"})));
            }
            other => panic!("expected HTTP error, got {:?}", other),
        }

        match normalize(raw(404, "<html>missing</html>")) {
            Err(SqtpError::Http { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body.as_text(), Some("<html>missing</html>"));
            }
            other => panic!("expected HTTP error, got {:?}", other),
        }
    }

    #[test]
    fn test_protocol_headers_restored() {
        let response = normalize(raw(200, "{}")).unwrap();
        assert_eq!(response.headers.get("X-SQTP-Changes").map(String::as_str), Some("2"));
        assert_eq!(response.changes(), Some(2));
        assert_eq!(response.last_insert_id(), Some(41));
        assert_eq!(response.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_payload_display() {
        assert_eq!(Payload::Json(json!({"a": 1})).to_string(), r#"{"a":1}"#);
        assert_eq!(Payload::Text("boom".to_string()).to_string(), "boom");
        assert_eq!(Payload::Empty.to_string(), "");
    }
}
