//! Query engine: validated, normalized SNMP reads.
//!
//! Everything here returns a tagged result instead of `Result`. The engine
//! sits between the chat dispatcher and the SNMP client; whatever goes wrong
//! underneath (bad input, timeout, agent error, malformed response), the
//! dispatcher always gets a `Success` or a `Failure` with an operator-facing
//! message, never an `Err` and never a panic.

use std::future::poll_fn;
use std::pin::Pin;
use std::time::Duration;

use futures_core::Stream;
use tracing::{debug, info, warn};

use crate::client::{Client, Walk};
use crate::config::ConfigStore;
use crate::error::Error;
use crate::message::Version;
use crate::oid::Oid;
use crate::transport::UdpTransport;

/// Per-attempt timeout applied to every query.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
/// Retries after the first attempt.
pub const DEFAULT_RETRIES: u32 = 3;
/// Default cap on entries returned by a walk.
pub const DEFAULT_WALK_LIMIT: usize = 10;

const INVALID_OID_MESSAGE: &str =
    "Invalid OID format. OID should contain only numbers and dots (e.g., 1.3.6.1.2.1.1.1.0)";
const NO_DATA_MESSAGE: &str =
    "No data received from SNMP query. Verify the OID and target configuration.";

/// Outcome of a single-OID fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    Success {
        /// Normalized dotted form of the queried OID.
        oid: String,
        /// Rendered value.
        value: String,
        /// SMI type name of the value.
        value_type: String,
    },
    Failure {
        message: String,
    },
}

/// One row of a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub oid: String,
    pub value: String,
}

/// Outcome of a subtree walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkResult {
    Success {
        entries: Vec<WalkEntry>,
        count: usize,
    },
    Failure {
        message: String,
    },
}

/// Executes queries against the currently configured endpoint.
///
/// Each call snapshots the endpoint once at entry, so a concurrent
/// reconfiguration affects the next query, not the running one.
#[derive(Clone)]
pub struct QueryEngine {
    config: ConfigStore,
    timeout: Duration,
    retries: u32,
    version: Version,
}

impl QueryEngine {
    pub fn new(config: ConfigStore) -> Self {
        Self {
            config,
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            version: Version::V2c,
        }
    }

    /// Override the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the retry count.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Override the protocol version (defaults to v2c).
    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Fetch the value of a single OID.
    pub async fn get_value(&self, oid_input: &str) -> QueryResult {
        let Some(oid) = validate_oid(oid_input) else {
            debug!(input = oid_input, "rejected malformed OID");
            return QueryResult::Failure {
                message: INVALID_OID_MESSAGE.to_string(),
            };
        };

        let client = match self.connect().await {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "connect failed");
                return QueryResult::Failure {
                    message: connect_error_message(&e),
                };
            }
        };

        match client.get(&oid).await {
            Ok(varbinds) => {
                let Some(vb) = varbinds.into_iter().next() else {
                    return QueryResult::Failure {
                        message: NO_DATA_MESSAGE.to_string(),
                    };
                };
                if vb.value.is_exception() {
                    // noSuchObject and friends come back as values with
                    // noError status; report them like protocol errors
                    return QueryResult::Failure {
                        message: format!("SNMP Error: {} at {}", vb.value, vb.oid),
                    };
                }
                info!(oid = %vb.oid, value_type = vb.value.type_name(), "get succeeded");
                QueryResult::Success {
                    oid: vb.oid.to_string(),
                    value: vb.value.to_string(),
                    value_type: vb.value.type_name().to_string(),
                }
            }
            Err(e) => {
                warn!(oid = %oid, error = %e, "get failed");
                QueryResult::Failure {
                    message: classify_get_error(&e),
                }
            }
        }
    }

    /// Walk the subtree under an OID, returning at most `max_results` entries.
    pub async fn walk(&self, oid_input: &str, max_results: usize) -> WalkResult {
        let Some(oid) = validate_oid(oid_input) else {
            debug!(input = oid_input, "rejected malformed OID");
            return WalkResult::Failure {
                message: "Invalid OID format".to_string(),
            };
        };

        if max_results == 0 {
            return WalkResult::Success {
                entries: Vec::new(),
                count: 0,
            };
        }

        let client = match self.connect().await {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "connect failed");
                return WalkResult::Failure {
                    message: connect_error_message(&e),
                };
            }
        };

        let mut walk = client.walk(oid);
        let mut entries = Vec::new();
        while entries.len() < max_results {
            match next_item(&mut walk).await {
                Some(Ok(vb)) => entries.push(WalkEntry {
                    oid: vb.oid.to_string(),
                    value: vb.value.to_string(),
                }),
                Some(Err(e)) => {
                    warn!(error = %e, collected = entries.len(), "walk failed");
                    return WalkResult::Failure {
                        message: classify_walk_error(&e),
                    };
                }
                None => break,
            }
        }

        // An exhausted walk with zero entries is still a success; "no
        // results" is a presentation concern, not an engine failure.
        let count = entries.len();
        info!(count, "walk succeeded");
        WalkResult::Success { entries, count }
    }

    async fn connect(&self) -> crate::error::Result<Client<UdpTransport>> {
        let endpoint = self.config.snapshot();
        match self.version {
            Version::V1 => {
                Client::v1(endpoint.socket_target())
                    .community(endpoint.community.as_bytes())
                    .timeout(self.timeout)
                    .retries(self.retries)
                    .connect()
                    .await
            }
            Version::V2c => {
                Client::v2c(endpoint.socket_target())
                    .community(endpoint.community.as_bytes())
                    .timeout(self.timeout)
                    .retries(self.retries)
                    .connect()
                    .await
            }
        }
    }
}

/// Validate and parse operator OID input.
///
/// Accepts an optional leading dot, then dot-separated decimal arcs. Anything
/// the syntax check passes but the parser cannot represent (arc overflow, too
/// many arcs) is rejected the same way.
fn validate_oid(input: &str) -> Option<Oid> {
    if !Oid::is_valid(input) {
        return None;
    }
    Oid::parse(input).ok()
}

/// Failures while setting up the per-call transport (bind, resolve, connect).
fn connect_error_message(e: &Error) -> String {
    format!("Connection error: {e}. Ensure the SNMP target is configured correctly.")
}

fn classify_get_error(e: &Error) -> String {
    match e {
        Error::InvalidOid { .. } => INVALID_OID_MESSAGE.to_string(),
        Error::Timeout { .. } => {
            "SNMP request timed out. Check if the target device is reachable or increase timeout."
                .to_string()
        }
        Error::Snmp { status, oid, .. } => {
            let at = oid
                .as_ref()
                .map(|o| o.to_string())
                .unwrap_or_else(|| "?".to_string());
            format!("SNMP Error: {status} at {at}")
        }
        // Transport indications: unreachable device, malformed or
        // mismatched responses, misbehaving agents
        Error::Io { .. }
        | Error::Decode { .. }
        | Error::RequestIdMismatch { .. }
        | Error::VersionMismatch { .. }
        | Error::NonIncreasingOid { .. } => {
            format!("SNMP Error: {e}. Check if the target device is reachable and SNMP is enabled.")
        }
    }
}

fn classify_walk_error(e: &Error) -> String {
    match e {
        Error::InvalidOid { .. } => "Invalid OID format".to_string(),
        Error::Timeout { .. } => {
            "SNMP walk timed out. Check if the target device is reachable or increase timeout."
                .to_string()
        }
        Error::Snmp { status, .. } => format!("SNMP Error: {status}"),
        Error::Io { .. }
        | Error::Decode { .. }
        | Error::RequestIdMismatch { .. }
        | Error::VersionMismatch { .. }
        | Error::NonIncreasingOid { .. } => {
            format!("SNMP Error: {e}. Check if the target device is reachable and SNMP is enabled.")
        }
    }
}

async fn next_item(
    walk: &mut Walk<UdpTransport>,
) -> Option<crate::error::Result<crate::varbind::VarBind>> {
    poll_fn(|cx| Pin::new(&mut *walk).poll_next(cx)).await
}
