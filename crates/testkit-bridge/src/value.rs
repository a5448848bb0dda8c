//! Wire values and the token codec.
//!
//! Every argument sent to the test server travels as a query-string token,
//! and every response body decodes back into a [`Value`]. Primitives carry
//! an explicit mark (quotes for strings, `I`/`D` prefixes for numbers, the
//! `null`/`true`/`false` keywords); remote handles are the unmarked case
//! and pass through byte-for-byte. Collections serialize element-wise as
//! JSON arrays/objects of tokens.

use crate::config::ProtocolConfig;
use crate::error::{BridgeError, Result};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

/// Opaque reference to an object living in the remote server process.
///
/// The token is minted by the server and never inspected locally; the
/// client's only obligations are to forward it verbatim and to pass it to
/// [`Client::release`](crate::Client::release) once the remote object is
/// no longer needed. An unreleased handle leaks the backing object for the
/// lifetime of the server process.
///
/// Handles cannot be constructed by callers; they only come out of decoded
/// responses, so a `Handle` always originated from the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Handle {
    token: String,
}

impl Handle {
    pub(crate) fn from_token(token: impl Into<String>) -> Self {
        Handle {
            token: token.into(),
        }
    }

    /// The raw wire token, exactly as the server minted it.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

/// A value transmissible over the bridge wire protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    /// Opaque remote-object reference.
    Pointer(Handle),
    Array(Vec<Value>),
    Dict(BTreeMap<String, Value>),
}

impl Value {
    /// Encode this value as a query-string token.
    ///
    /// Round-trips through [`Value::from_token`] for every variant. Handle
    /// tokens pass through unmodified; the server guarantees they do not
    /// mimic a primitive encoding.
    pub fn to_token(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            Value::Int(i) => format!("I{}", i),
            Value::Double(d) => format!("D{}", d),
            Value::String(s) => format!("\"{}\"", s),
            Value::Pointer(handle) => handle.token().to_string(),
            Value::Array(items) => {
                let tokens: Vec<JsonValue> = items
                    .iter()
                    .map(|item| JsonValue::String(item.to_token()))
                    .collect();
                JsonValue::Array(tokens).to_string()
            }
            Value::Dict(entries) => {
                let tokens: serde_json::Map<String, JsonValue> = entries
                    .iter()
                    .map(|(k, v)| (k.clone(), JsonValue::String(v.to_token())))
                    .collect();
                JsonValue::Object(tokens).to_string()
            }
        }
    }

    /// Decode a single wire token.
    ///
    /// An empty token decodes as [`Value::Null`] (the method returned no
    /// value). Tokens that match no primitive or collection form decode as
    /// a [`Value::Pointer`]. Structurally malformed tokens (an unterminated
    /// quote, invalid collection JSON) fail with a decoding error carrying
    /// the raw token.
    pub fn from_token(token: &str) -> Result<Value> {
        match token {
            "" | "null" => return Ok(Value::Null),
            "true" => return Ok(Value::Bool(true)),
            "false" => return Ok(Value::Bool(false)),
            _ => {}
        }

        if let Some(rest) = token.strip_prefix('"') {
            return match rest.strip_suffix('"') {
                Some(inner) => Ok(Value::String(inner.to_string())),
                None => Err(BridgeError::decoding(token, "unterminated string token")),
            };
        }

        // Numeric prefixes only claim the token when the remainder parses;
        // the server owns bare-token generation, so an unparseable
        // remainder means this is a handle, not a malformed number.
        if let Some(rest) = token.strip_prefix('I') {
            if let Ok(i) = rest.parse::<i64>() {
                return Ok(Value::Int(i));
            }
        }
        if let Some(rest) = token.strip_prefix('D') {
            if let Ok(d) = rest.parse::<f64>() {
                return Ok(Value::Double(d));
            }
        }

        if token.starts_with('[') || token.starts_with('{') {
            let parsed: JsonValue = serde_json::from_str(token)
                .map_err(|e| BridgeError::decoding(token, format!("invalid collection token: {}", e)))?;
            return Self::collection_from_json(token, parsed);
        }

        Ok(Value::Pointer(Handle::from_token(token)))
    }

    /// Decode a raw (non-JSON) response body.
    pub fn from_raw(body: &[u8]) -> Result<Value> {
        if body.is_empty() {
            return Ok(Value::Null);
        }
        let token = std::str::from_utf8(body).map_err(|_| {
            BridgeError::decoding(String::from_utf8_lossy(body), "response body is not valid UTF-8")
        })?;
        Self::from_token(token)
    }

    /// Decode a JSON response body.
    ///
    /// Maps structurally, except that an object of exactly
    /// `{"_ref": "<token>"}` is the server's representation of a remote
    /// handle.
    pub fn from_json(json: JsonValue) -> Value {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Double(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => {
                Value::Array(items.into_iter().map(Value::from_json).collect())
            }
            JsonValue::Object(map) => {
                if map.len() == 1 {
                    if let Some(JsonValue::String(token)) = map.get(ProtocolConfig::HANDLE_REF_KEY)
                    {
                        return Value::Pointer(Handle::from_token(token.clone()));
                    }
                }
                Value::Dict(
                    map.into_iter()
                        .map(|(k, v)| (k, Value::from_json(v)))
                        .collect(),
                )
            }
        }
    }

    fn collection_from_json(token: &str, parsed: JsonValue) -> Result<Value> {
        match parsed {
            JsonValue::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(Self::element_from_json(token, item)?);
                }
                Ok(Value::Array(out))
            }
            JsonValue::Object(map) => {
                let mut out = BTreeMap::new();
                for (k, v) in map {
                    out.insert(k, Self::element_from_json(token, v)?);
                }
                Ok(Value::Dict(out))
            }
            _ => Err(BridgeError::decoding(token, "collection token is not an array or object")),
        }
    }

    fn element_from_json(token: &str, element: JsonValue) -> Result<Value> {
        match element {
            JsonValue::String(inner) => Self::from_token(&inner),
            other => Err(BridgeError::decoding(
                token,
                format!("collection element {} is not a token string", other),
            )),
        }
    }

    /// Short variant name, used in shape-mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Pointer(_) => "pointer",
            Value::Array(_) => "array",
            Value::Dict(_) => "dict",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_pointer(&self) -> Option<&Handle> {
        match self {
            Value::Pointer(h) => Some(h),
            _ => None,
        }
    }

    /// Consume the value, expecting a remote handle.
    pub fn into_pointer(self) -> Result<Handle> {
        match self {
            Value::Pointer(h) => Ok(h),
            other => Err(BridgeError::UnexpectedValue {
                expected: "pointer",
                actual: other.type_name().to_string(),
            }),
        }
    }

    /// Consume the value, expecting a string.
    pub fn into_string(self) -> Result<String> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(BridgeError::UnexpectedValue {
                expected: "string",
                actual: other.type_name().to_string(),
            }),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&Handle> for Value {
    fn from(h: &Handle) -> Self {
        Value::Pointer(h.clone())
    }
}
