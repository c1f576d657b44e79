//! Relay endpoint configuration.
//!
//! The target endpoint is replaceable at runtime: operators point the relay
//! at a different device without restarting it. Reads take a snapshot, so a
//! query in flight keeps the endpoint it started with even if the target is
//! swapped mid-query. Concurrent writers race and the last one wins.

use std::net::IpAddr;

use tokio::sync::watch;
use tracing::info;

/// Default target host when nothing is configured.
pub const DEFAULT_HOST: &str = "192.168.137.130";
/// Default community string.
pub const DEFAULT_COMMUNITY: &str = "public";
/// Default SNMP port.
pub const DEFAULT_PORT: u16 = 161;

/// Configuration errors surfaced to the operator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Port is not a number in 1-65535.
    #[error("invalid port: {input}. Port must be a number between 1 and 65535")]
    InvalidPort { input: String },
}

/// The SNMP endpoint a query is sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub host: String,
    pub community: String,
    pub port: u16,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            community: DEFAULT_COMMUNITY.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl EndpointConfig {
    /// The "host:port" string handed to the client builder.
    ///
    /// IPv6 literals are bracketed so the port parses unambiguously.
    pub fn socket_target(&self) -> String {
        match self.host.parse::<IpAddr>() {
            Ok(IpAddr::V6(v6)) => format!("[{}]:{}", v6, self.port),
            _ => format!("{}:{}", self.host, self.port),
        }
    }
}

/// Parse a port string the way the set-target command accepts it.
pub fn parse_port(input: &str) -> Result<u16, ConfigError> {
    let trimmed = input.trim();
    let invalid = || ConfigError::InvalidPort {
        input: trimmed.to_string(),
    };
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match trimmed.parse::<u16>() {
        Ok(port) if port >= 1 => Ok(port),
        _ => Err(invalid()),
    }
}

/// Shared, replaceable endpoint configuration.
///
/// Built on a watch channel: `snapshot` is lock-free for readers, `set`
/// replaces the whole endpoint atomically. Clones share the same state.
#[derive(Clone)]
pub struct ConfigStore {
    tx: watch::Sender<EndpointConfig>,
    rx: watch::Receiver<EndpointConfig>,
}

impl ConfigStore {
    /// Create a store holding the given endpoint.
    pub fn new(initial: EndpointConfig) -> Self {
        let (tx, rx) = watch::channel(initial);
        Self { tx, rx }
    }

    /// The endpoint as of this call. Later `set` calls do not affect the
    /// returned value.
    pub fn snapshot(&self) -> EndpointConfig {
        self.rx.borrow().clone()
    }

    /// Replace the endpoint wholesale.
    pub fn replace(&self, endpoint: EndpointConfig) {
        info!(
            host = %endpoint.host,
            port = endpoint.port,
            "target endpoint replaced"
        );
        self.tx.send_replace(endpoint);
    }

    /// Set a new target from operator input.
    ///
    /// `host` is required; `community` and `port` fall back to the defaults
    /// when absent. The port is validated before anything is stored, so a bad
    /// port leaves the current endpoint untouched.
    pub fn set(
        &self,
        host: &str,
        community: Option<&str>,
        port: Option<&str>,
    ) -> Result<EndpointConfig, ConfigError> {
        let port = match port {
            Some(p) => parse_port(p)?,
            None => DEFAULT_PORT,
        };
        let endpoint = EndpointConfig {
            host: host.trim().to_string(),
            community: community
                .map(|c| c.trim().to_string())
                .unwrap_or_else(|| DEFAULT_COMMUNITY.to_string()),
            port,
        };
        self.replace(endpoint.clone());
        Ok(endpoint)
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(EndpointConfig::default())
    }
}

/// Process-level configuration read from the environment at startup.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub endpoint: EndpointConfig,
    /// Chat user IDs allowed to issue commands. Empty means open access.
    pub admin_ids: Vec<i64>,
}

impl RelayConfig {
    /// Read `SNMP_HOST`, `SNMP_COMMUNITY`, `SNMP_PORT`, and `ADMIN_IDS`,
    /// falling back to defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let host = std::env::var("SNMP_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let community =
            std::env::var("SNMP_COMMUNITY").unwrap_or_else(|_| DEFAULT_COMMUNITY.to_string());
        let port = std::env::var("SNMP_PORT")
            .ok()
            .and_then(|p| parse_port(&p).ok())
            .unwrap_or(DEFAULT_PORT);
        let admin_ids = std::env::var("ADMIN_IDS")
            .map(|raw| parse_admin_ids(&raw))
            .unwrap_or_default();

        Self {
            endpoint: EndpointConfig {
                host,
                community,
                port,
            },
            admin_ids,
        }
    }

    /// Whether a chat user may issue commands. An empty allow-list means
    /// open access.
    pub fn is_allowed(&self, user_id: i64) -> bool {
        self.admin_ids.is_empty() || self.admin_ids.contains(&user_id)
    }
}

/// Parse a comma-separated admin ID list, skipping blank entries.
pub fn parse_admin_ids(raw: &str) -> Vec<i64> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<i64>().ok())
        .collect()
}
