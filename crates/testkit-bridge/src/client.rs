//! RPC client for a remote test-server process.
//!
//! One endpoint per method name: `POST {base_url}/{method}?k=<token>&...`,
//! optional JSON body, and a 200/JSON-or-raw response decoded through the
//! wire codec. The client is a transparent proxy: no retries, no fallback
//! values, every failure reaches the caller typed.

use crate::args::Args;
use crate::config::{NetworkConfig, ProtocolConfig};
use crate::error::{BridgeError, Result};
use crate::value::{Handle, Value};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Client bound to one test-server base URL.
///
/// One instance per logical test actor; invocations issued sequentially by
/// one caller go out in that order. Concurrent callers should use
/// independent instances, and racing on the same remote handle is the
/// server's problem, not the client's.
#[derive(Debug)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Create a client with the default request timeout.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, NetworkConfig::REQUEST_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    ///
    /// The timeout is the only cancellation mechanism the bridge has; a
    /// call that exceeds it fails with [`BridgeError::Timeout`].
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|e| BridgeError::InvalidBaseUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(BridgeError::InvalidBaseUrl {
                url: base_url.to_string(),
                message: format!("unsupported scheme {:?}", parsed.scheme()),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| BridgeError::Transport {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(e),
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The base URL this client was constructed with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Invoke a remote method with the given arguments.
    pub async fn invoke(&self, method: &str, args: &Args) -> Result<Value> {
        self.dispatch(method, args, None).await
    }

    /// Invoke a remote method with arguments and a JSON body payload, for
    /// bulk data that does not fit in a query string.
    pub async fn invoke_with_body(
        &self,
        method: &str,
        args: &Args,
        body: &JsonValue,
    ) -> Result<Value> {
        self.dispatch(method, args, Some(body)).await
    }

    /// Free the remote object behind `handle`.
    ///
    /// Issues exactly one invocation of the well-known release method.
    /// The client keeps no handle registry, so calling this twice sends
    /// two invocations; whether a double release is an error is the
    /// server's call and surfaces as a normal invocation error.
    pub async fn release(&self, handle: &Handle) -> Result<()> {
        let mut args = Args::new();
        args.set_handle(ProtocolConfig::RELEASE_ARG, handle);
        self.invoke(ProtocolConfig::RELEASE_METHOD, &args).await?;
        Ok(())
    }

    async fn dispatch(&self, method: &str, args: &Args, body: Option<&JsonValue>) -> Result<Value> {
        let url = self.request_url(method, args);
        debug!("invoking {} -> {}", method, url);

        let mut request = self.http.post(&url);
        if let Some(payload) = body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(serde_json::to_string(payload)?);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.as_u16() != 200 {
            // The body is the server's error message; pass it through
            // verbatim, falling back to the HTTP reason phrase when empty.
            let message = response.text().await.unwrap_or_default();
            let message = if message.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                message
            };
            debug!("{} failed with {}: {}", method, status, message);
            return Err(BridgeError::MethodInvocation {
                status: status.as_u16(),
                message,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;
        debug!("{} returned {} bytes", method, bytes.len());

        if is_json(content_type.as_deref()) {
            if bytes.is_empty() {
                return Ok(Value::Null);
            }
            let json: JsonValue = serde_json::from_slice(&bytes).map_err(|e| {
                BridgeError::decoding(
                    String::from_utf8_lossy(&bytes),
                    format!("invalid JSON response: {}", e),
                )
            })?;
            Ok(Value::from_json(json))
        } else {
            // Absent or unrecognized content type: raw token path, no JSON
            // parsing attempted.
            Value::from_raw(&bytes)
        }
    }

    /// Build the request URL: endpoint path plus the serialized query
    /// string, arguments in caller order.
    fn request_url(&self, method: &str, args: &Args) -> String {
        let mut url = format!("{}/{}", self.base_url, method);
        for (i, (name, value)) in args.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(name);
            url.push('=');
            url.push_str(&urlencoding::encode(&value.to_token()));
        }
        url
    }
}

/// True when the declared content type is JSON, ignoring parameters such
/// as `; charset=utf-8`.
fn is_json(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}
