//! CLI utilities for the `relay-*` tools.
//!
//! This module is only available with the `cli` feature.

use std::time::Duration;

use clap::Args;

use crate::config::{ConfigStore, EndpointConfig, DEFAULT_COMMUNITY, DEFAULT_HOST, DEFAULT_PORT};

/// Target and protocol options shared by the relay tools.
#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Target host (name or address).
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Target UDP port.
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Community string.
    #[arg(short, long, default_value = DEFAULT_COMMUNITY)]
    pub community: String,

    /// Per-attempt timeout in seconds.
    #[arg(short, long, default_value_t = 5)]
    pub timeout_secs: u64,

    /// Retries after the first attempt.
    #[arg(short, long, default_value_t = 3)]
    pub retries: u32,
}

impl CommonArgs {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build a config store seeded from the command line.
    pub fn config_store(&self) -> ConfigStore {
        ConfigStore::new(EndpointConfig {
            host: self.host.clone(),
            community: self.community.clone(),
            port: self.port,
        })
    }
}

/// Output options shared by the relay tools.
#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl OutputArgs {
    /// Initialize tracing. `RUST_LOG` takes precedence over `-v` flags.
    pub fn init_tracing(&self) {
        use tracing_subscriber::EnvFilter;

        let default_level = match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("snmp_relay={default_level}")));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
