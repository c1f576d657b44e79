//! Async SNMP relay core.
//!
//! A chat-driven relay that accepts OID queries, validates them, executes
//! GET and GETNEXT-walk operations against a runtime-configurable endpoint,
//! and normalizes every outcome into presentation-ready results.
//!
//! # Layers
//!
//! - [`oid`] - OID parsing, validation, and BER encoding
//! - [`ber`], [`value`], [`varbind`], [`message`] - the SNMP wire format
//! - [`transport`], [`client`] - UDP transport and the request/response client
//! - [`config`] - the replaceable target endpoint
//! - [`engine`] - validated queries with normalized, never-panicking results
//! - [`report`] - serializable presentation structs
//!
//! # Example
//!
//! ```rust,no_run
//! use snmp_relay::config::ConfigStore;
//! use snmp_relay::engine::{QueryEngine, QueryResult};
//!
//! # async fn example() {
//! let store = ConfigStore::default();
//! store.set("192.168.1.1", Some("public"), Some("161")).ok();
//!
//! let engine = QueryEngine::new(store);
//! match engine.get_value("1.3.6.1.2.1.1.1.0").await {
//!     QueryResult::Success { oid, value, value_type } => {
//!         println!("{oid} ({value_type}) = {value}");
//!     }
//!     QueryResult::Failure { message } => println!("{message}"),
//! }
//! # }
//! ```

pub mod ber;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod message;
pub mod oid;
pub mod report;
pub mod transport;
pub mod value;
pub mod varbind;

#[cfg(feature = "cli")]
pub mod cli;

mod util;

pub use client::{Client, ClientConfig, Walk};
pub use config::{ConfigStore, EndpointConfig, RelayConfig};
pub use engine::{QueryEngine, QueryResult, WalkEntry, WalkResult};
pub use error::{Error, ErrorStatus, Result};
pub use message::Version;
pub use oid::Oid;
pub use value::Value;
pub use varbind::VarBind;
