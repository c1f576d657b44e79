//! Owned UDP transport.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::net::UdpSocket;

use super::Transport;
use crate::error::{Error, Result};
use crate::util::bind_udp_socket;

/// Maximum UDP datagram payload.
const MAX_DATAGRAM: usize = 65535;

/// A UDP transport owned by a single client.
///
/// The socket is connected to the peer, so the kernel filters datagrams from
/// other sources.
#[derive(Clone)]
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
    local: SocketAddr,
}

impl UdpTransport {
    /// Bind an ephemeral local socket and connect it to the peer.
    pub async fn connect(peer: SocketAddr) -> Result<Self> {
        let bind_addr: SocketAddr = if peer.is_ipv6() {
            (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
        } else {
            (std::net::Ipv4Addr::UNSPECIFIED, 0).into()
        };

        let socket = bind_udp_socket(bind_addr).await.map_err(|source| Error::Io {
            target: Some(peer),
            source,
        })?;
        socket.connect(peer).await.map_err(|source| Error::Io {
            target: Some(peer),
            source,
        })?;
        let local = socket.local_addr().map_err(|source| Error::Io {
            target: Some(peer),
            source,
        })?;

        Ok(Self {
            socket: Arc::new(socket),
            peer,
            local,
        })
    }
}

impl Transport for UdpTransport {
    async fn send(&self, data: &[u8]) -> Result<()> {
        self.socket.send(data).await.map_err(|source| Error::Io {
            target: Some(self.peer),
            source,
        })?;
        Ok(())
    }

    async fn recv(&self, request_id: i32, timeout: Duration) -> Result<(Bytes, SocketAddr)> {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        match tokio::time::timeout(timeout, self.socket.recv(&mut buf)).await {
            Ok(Ok(len)) => {
                buf.truncate(len);
                Ok((Bytes::from(buf), self.peer))
            }
            Ok(Err(source)) => Err(Error::Io {
                target: Some(self.peer),
                source,
            }),
            Err(_) => Err(Error::Timeout {
                target: Some(self.peer),
                elapsed: timeout,
                request_id,
                retries: 0,
            }),
        }
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    fn local_addr(&self) -> SocketAddr {
        self.local
    }

    fn is_stream(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_binds_matching_family() {
        let peer: SocketAddr = "127.0.0.1:16100".parse().unwrap();
        let transport = UdpTransport::connect(peer).await.unwrap();
        assert_eq!(transport.peer_addr(), peer);
        assert!(transport.local_addr().is_ipv4());
        assert!(!transport.is_stream());
    }

    #[tokio::test]
    async fn test_recv_times_out() {
        let peer: SocketAddr = "127.0.0.1:16101".parse().unwrap();
        let transport = UdpTransport::connect(peer).await.unwrap();
        let err = transport
            .recv(1, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_send_recv_echo() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let server_addr = server.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = [0u8; 64];
            let (len, from) = server.recv_from(&mut buf).await.unwrap();
            server.send_to(&buf[..len], from).await.unwrap();
        });

        let transport = UdpTransport::connect(server_addr).await.unwrap();
        transport.send(b"ping").await.unwrap();
        let (data, from) = transport
            .recv(1, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(&data[..], b"ping");
        assert_eq!(from, server_addr);
    }
}
