//! Centralized configuration for the bridge.

use std::time::Duration;

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    pub const USER_AGENT: &'static str = "testkit-bridge/1.0";
}

/// Protocol-level configuration.
pub struct ProtocolConfig;

impl ProtocolConfig {
    /// Well-known method that frees a remote object.
    pub const RELEASE_METHOD: &'static str = "release";
    /// Argument name the release endpoint reads the handle from.
    pub const RELEASE_ARG: &'static str = "object";
    /// JSON object key under which servers return a remote handle.
    pub const HANDLE_REF_KEY: &'static str = "_ref";
}
