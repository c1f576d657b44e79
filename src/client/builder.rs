//! Builders for SNMP clients.
//!
//! # Entry Points
//!
//! - [`Client::v1()`] - SNMPv1 with community string
//! - [`Client::v2c()`] - SNMPv2c with community string
//!
//! # Examples
//!
//! ```rust,no_run
//! # use snmp_relay::Client;
//! # use std::time::Duration;
//! # async fn example() -> snmp_relay::Result<()> {
//! let client = Client::v2c("192.168.1.1:161")
//!     .community(b"public")
//!     .timeout(Duration::from_secs(5))
//!     .connect()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::message::Version;
use crate::transport::{Transport, UdpTransport};

use super::{Client, ClientConfig};

/// Common configuration shared by both builder types.
struct BaseConfig {
    target: String,
    timeout: Duration,
    retries: u32,
}

impl BaseConfig {
    fn new(target: impl Into<String>) -> Self {
        let defaults = ClientConfig::default();
        Self {
            target: target.into(),
            timeout: defaults.timeout,
            retries: defaults.retries,
        }
    }

    fn resolve_target(&self) -> Result<SocketAddr> {
        self.target
            .to_socket_addrs()
            .map_err(|e| Error::Io {
                target: None,
                source: e,
            })?
            .next()
            .ok_or_else(|| Error::Io {
                target: None,
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "could not resolve address",
                ),
            })
    }
}

macro_rules! impl_common_methods {
    ($builder:ty) => {
        impl $builder {
            /// Set the request timeout.
            pub fn timeout(mut self, timeout: Duration) -> Self {
                self.base.timeout = timeout;
                self
            }

            /// Set the number of retries.
            pub fn retries(mut self, retries: u32) -> Self {
                self.base.retries = retries;
                self
            }

            /// Set the community string.
            pub fn community(mut self, community: &[u8]) -> Self {
                self.community = Bytes::copy_from_slice(community);
                self
            }
        }
    };
}

/// Builder for SNMPv1 clients.
///
/// Created via [`Client::v1()`].
pub struct V1ClientBuilder {
    base: BaseConfig,
    community: Bytes,
}

impl V1ClientBuilder {
    pub(crate) fn new(target: impl Into<String>) -> Self {
        Self {
            base: BaseConfig::new(target),
            community: Bytes::from_static(b"public"),
        }
    }

    /// Connect and create the client with owned UDP transport.
    pub async fn connect(self) -> Result<Client<UdpTransport>> {
        let addr = self.base.resolve_target()?;
        let transport = UdpTransport::connect(addr).await?;
        Ok(self.build(transport))
    }

    /// Build client with a pre-supplied transport.
    pub fn build<T: Transport>(self, transport: T) -> Client<T> {
        let config = ClientConfig {
            version: Version::V1,
            community: self.community,
            timeout: self.base.timeout,
            retries: self.base.retries,
        };
        Client::new(transport, config)
    }
}

impl_common_methods!(V1ClientBuilder);

/// Builder for SNMPv2c clients.
///
/// Created via [`Client::v2c()`].
pub struct V2cClientBuilder {
    base: BaseConfig,
    community: Bytes,
}

impl V2cClientBuilder {
    pub(crate) fn new(target: impl Into<String>) -> Self {
        Self {
            base: BaseConfig::new(target),
            community: Bytes::from_static(b"public"),
        }
    }

    /// Connect and create the client with owned UDP transport.
    pub async fn connect(self) -> Result<Client<UdpTransport>> {
        let addr = self.base.resolve_target()?;
        let transport = UdpTransport::connect(addr).await?;
        Ok(self.build(transport))
    }

    /// Build client with a pre-supplied transport.
    pub fn build<T: Transport>(self, transport: T) -> Client<T> {
        let config = ClientConfig {
            version: Version::V2c,
            community: self.community,
            timeout: self.base.timeout,
            retries: self.base.retries,
        };
        Client::new(transport, config)
    }
}

impl_common_methods!(V2cClientBuilder);

impl Client<UdpTransport> {
    /// Create an SNMPv1 client builder.
    pub fn v1(target: impl Into<String>) -> V1ClientBuilder {
        V1ClientBuilder::new(target)
    }

    /// Create an SNMPv2c client builder.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use snmp_relay::Client;
    /// # async fn example() -> snmp_relay::Result<()> {
    /// let client = Client::v2c("192.168.1.1:161")
    ///     .community(b"public")
    ///     .connect()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn v2c(target: impl Into<String>) -> V2cClientBuilder {
        V2cClientBuilder::new(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn test_builder_defaults() {
        let mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        let client = Client::v2c("127.0.0.1:161").build(mock);
        assert_eq!(client.config.version, Version::V2c);
        assert_eq!(&client.config.community[..], b"public");
        assert_eq!(client.config.timeout, Duration::from_secs(5));
        assert_eq!(client.config.retries, 3);
    }

    #[test]
    fn test_builder_overrides() {
        let mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        let client = Client::v1("127.0.0.1:161")
            .community(b"private")
            .timeout(Duration::from_millis(250))
            .retries(1)
            .build(mock);
        assert_eq!(client.config.version, Version::V1);
        assert_eq!(&client.config.community[..], b"private");
        assert_eq!(client.config.timeout, Duration::from_millis(250));
        assert_eq!(client.config.retries, 1);
    }

    #[test]
    fn test_resolve_target_rejects_garbage() {
        let base = BaseConfig::new("not a host name:xyz");
        assert!(base.resolve_target().is_err());
    }
}
