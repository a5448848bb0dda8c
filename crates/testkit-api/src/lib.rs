//! Typed wrappers for the remote test-server object families.
//!
//! Each wrapper owns a [`Client`](testkit_bridge::Client) bound to one
//! test-server base URL and maps one method per remote operation. No
//! protocol logic lives here: a wrapper method serializes its arguments,
//! issues one invocation, and checks the shape of the decoded result.
//!
//! Handles returned by these wrappers follow the usual lifecycle
//! discipline: pass them back into later calls untouched, and release
//! them through [`Database::release`] / [`Document::release`] when done.

pub mod database;
pub mod document;

pub use database::Database;
pub use document::Document;
