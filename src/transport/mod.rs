//! Transport layer abstraction.
//!
//! Provides the `Transport` trait and the UDP implementation the relay uses.

mod udp;

#[cfg(any(test, feature = "testing"))]
mod mock;

pub use udp::*;

#[cfg(any(test, feature = "testing"))]
pub use mock::*;

use crate::error::Result;
use bytes::Bytes;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

/// Client-side transport abstraction.
///
/// # Clone Requirement
///
/// The `Clone` bound is required because walk streams own a clone of the client
/// (and thus the transport). All implementations use `Arc` internally, making
/// clone cheap (reference count increment).
pub trait Transport: Send + Sync + Clone {
    /// Send request data to the target.
    fn send(&self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Receive response with correlation and timeout.
    ///
    /// - `request_id`: Available for response correlation and diagnostics
    /// - `timeout`: Maximum time to wait for response
    ///
    /// Returns (response_data, actual_source_address)
    fn recv(
        &self,
        request_id: i32,
        timeout: Duration,
    ) -> impl Future<Output = Result<(Bytes, SocketAddr)>> + Send;

    /// The peer address for this transport.
    fn peer_addr(&self) -> SocketAddr;

    /// Local bind address.
    fn local_addr(&self) -> SocketAddr;

    /// Whether this is a stream transport.
    ///
    /// When true, the client skips retries (stream guarantees delivery or
    /// failure). When false (UDP), the client retries on timeout.
    fn is_stream(&self) -> bool;
}
