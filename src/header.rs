use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// Response headers whose mixed-case spelling is part of the protocol
pub const CANONICAL_RESPONSE_HEADERS: &[&str] = &[
    "X-SQTP-Changes",
    "X-SQTP-Last-Insert-Id",
    "X-SQTP-Protocol",
];

/// Value of a single header field
///
/// Serializes as a plain string or an array of strings. A multi-valued entry
/// always holds at least two values; use [`HeaderValue::from_values`] to get
/// the collapsed form.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Scalar(String),
    Multi(Vec<String>),
}

impl HeaderValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        HeaderValue::Scalar(value.into())
    }

    /// Build from an ordered list of values; `None` when the list is empty
    pub fn from_values(values: Vec<String>) -> Option<Self> {
        let mut values = values;
        match values.len() {
            0 => None,
            1 => values.pop().map(HeaderValue::Scalar),
            _ => Some(HeaderValue::Multi(values)),
        }
    }

    pub fn values(&self) -> &[String] {
        match self {
            HeaderValue::Scalar(value) => std::slice::from_ref(value),
            HeaderValue::Multi(values) => values,
        }
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, HeaderValue::Multi(_))
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            HeaderValue::Scalar(value) => Some(value),
            HeaderValue::Multi(_) => None,
        }
    }

    fn push(&mut self, value: String) {
        match self {
            HeaderValue::Scalar(existing) => {
                let first = std::mem::take(existing);
                *self = HeaderValue::Multi(vec![first, value]);
            }
            HeaderValue::Multi(values) => values.push(value),
        }
    }
}

/// Ordered header map keyed case-insensitively
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, HeaderValue)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    /// Add a value, upgrading an existing entry to multi-valued
    ///
    /// Blank values are dropped; a header never carries an empty string.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        if is_blank(&value) {
            return self;
        }
        match self.position(&name) {
            Some(idx) => self.entries[idx].1.push(value),
            None => self.entries.push((name, HeaderValue::Scalar(value))),
        }
        self
    }

    /// Add every value in order; an empty iterator leaves the map untouched
    pub fn set_all<I, S>(&mut self, name: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            self.set(name, value);
        }
        self
    }

    /// Replace any existing entry with a single value; a blank value removes the entry
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        if is_blank(&value) {
            self.remove(&name);
            return self;
        }
        let value = HeaderValue::Scalar(value);
        match self.position(&name) {
            Some(idx) => self.entries[idx] = (name, value),
            None => self.entries.push((name, value)),
        }
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<HeaderValue> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.position(name).map(|idx| &self.entries[idx].1)
    }

    /// First value of a header
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|value| value.values().first())
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// One `(name, value)` pair per value, repeating the name for multi-valued entries
    pub fn wire_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(name, value)| {
            value
                .values()
                .iter()
                .map(move |v| (name.as_str(), v.as_str()))
        })
    }

    /// Key to string-or-array JSON form
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .entries
            .iter()
            .map(|(name, value)| {
                let json = match value {
                    HeaderValue::Scalar(v) => serde_json::Value::String(v.clone()),
                    HeaderValue::Multi(vs) => serde_json::Value::Array(
                        vs.iter().cloned().map(serde_json::Value::String).collect(),
                    ),
                };
                (name.clone(), json)
            })
            .collect();
        serde_json::Value::Object(map)
    }
}

impl Serialize for HeaderMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Restore the protocol's spelling for lower-cased response header names
pub fn canonical_response_name(name: &str) -> String {
    CANONICAL_RESPONSE_HEADERS
        .iter()
        .find(|canonical| canonical.eq_ignore_ascii_case(name))
        .map(|canonical| canonical.to_string())
        .unwrap_or_else(|| name.to_string())
}

/// Fold raw response headers into a single-valued map
///
/// Repeated names are comma-joined in arrival order, the same way HTTP
/// transports merge duplicate fields.
pub fn normalize_response_headers<I, K, V>(raw: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut merged: HashMap<String, String> = HashMap::new();
    for (name, value) in raw {
        let name = canonical_response_name(name.as_ref());
        let value = value.into();
        let existing = merged
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(&name))
            .map(|(_, v)| v);
        match existing {
            Some(current) => {
                current.push_str(", ");
                current.push_str(&value);
            }
            None => {
                merged.insert(name, value);
            }
        }
    }
    merged
}
