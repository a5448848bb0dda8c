//! Bridge for driving a remote mobile-database test server over HTTP RPC.
//!
//! A test server exposes one HTTP endpoint per method name. This crate
//! provides the client half of that protocol: a wire codec for typed
//! query-string tokens, opaque handles to objects living in the server
//! process, and a thin synchronous-per-call RPC client.
//!
//! # Example
//!
//! ```rust,ignore
//! use testkit_bridge::{Args, Client};
//!
//! #[tokio::main]
//! async fn main() -> testkit_bridge::Result<()> {
//!     let client = Client::new("http://192.168.0.117:8080")?;
//!
//!     let mut args = Args::new();
//!     args.set_string("name", "foo");
//!     let db = client.invoke("database_create", &args).await?.into_pointer()?;
//!
//!     // ... drive the database through further invocations ...
//!
//!     client.release(&db).await?;
//!     Ok(())
//! }
//! ```
//!
//! Every handle obtained from the server must eventually be passed to
//! [`Client::release`]; the client has no finalizer, so a forgotten
//! release leaks the object in the server process.

pub mod args;
pub mod client;
pub mod config;
pub mod error;
pub mod value;

pub use args::Args;
pub use client::Client;
pub use error::{BridgeError, Result};
pub use value::{Handle, Value};
