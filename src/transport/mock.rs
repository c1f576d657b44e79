//! Mock transport for tests.
//!
//! Queues canned responses and records sent frames, so client and walk logic
//! can be tested without sockets.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;

use super::Transport;
use crate::error::{Error, ErrorStatus, Result};
use crate::message::{Message, Pdu, PduType, Version};
use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::VarBind;

enum Reply {
    Data(Bytes),
    Timeout,
}

struct Shared {
    replies: VecDeque<Reply>,
    sent: Vec<Bytes>,
}

/// In-memory transport that replays queued responses.
///
/// Clones share the same queue, matching how walk streams clone the client.
#[derive(Clone)]
pub struct MockTransport {
    shared: Arc<Mutex<Shared>>,
    peer: SocketAddr,
}

impl MockTransport {
    pub fn new(peer: SocketAddr) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                replies: VecDeque::new(),
                sent: Vec::new(),
            })),
            peer,
        }
    }

    /// Queue a response frame to be returned by the next `recv`.
    pub fn queue_response(&mut self, data: Bytes) {
        if let Ok(mut shared) = self.shared.lock() {
            shared.replies.push_back(Reply::Data(data));
        }
    }

    /// Queue a timeout for the next `recv`.
    pub fn queue_timeout(&mut self) {
        if let Ok(mut shared) = self.shared.lock() {
            shared.replies.push_back(Reply::Timeout);
        }
    }

    /// Frames sent through this transport, in order.
    pub fn sent_frames(&self) -> Vec<Bytes> {
        self.shared
            .lock()
            .map(|shared| shared.sent.clone())
            .unwrap_or_default()
    }
}

impl Transport for MockTransport {
    async fn send(&self, data: &[u8]) -> Result<()> {
        if let Ok(mut shared) = self.shared.lock() {
            shared.sent.push(Bytes::copy_from_slice(data));
        }
        Ok(())
    }

    async fn recv(&self, request_id: i32, timeout: Duration) -> Result<(Bytes, SocketAddr)> {
        let reply = self
            .shared
            .lock()
            .ok()
            .and_then(|mut shared| shared.replies.pop_front());
        match reply {
            Some(Reply::Data(data)) => Ok((data, self.peer)),
            // An exhausted queue behaves like a silent agent
            Some(Reply::Timeout) | None => Err(Error::Timeout {
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
        match self.peer {
            SocketAddr::V4(_) => "127.0.0.1:0".parse().unwrap_or(self.peer),
            SocketAddr::V6(_) => "[::1]:0".parse().unwrap_or(self.peer),
        }
    }

    fn is_stream(&self) -> bool {
        false
    }
}

/// Builds encoded Response messages for [`MockTransport`] queues.
pub struct ResponseBuilder {
    request_id: i32,
    error_status: ErrorStatus,
    error_index: i32,
    varbinds: Vec<VarBind>,
}

impl ResponseBuilder {
    pub fn new(request_id: i32) -> Self {
        Self {
            request_id,
            error_status: ErrorStatus::NoError,
            error_index: 0,
            varbinds: Vec::new(),
        }
    }

    /// Append a varbind to the response.
    pub fn varbind(mut self, oid: Oid, value: Value) -> Self {
        self.varbinds.push(VarBind::new(oid, value));
        self
    }

    /// Set the error status and index fields.
    pub fn error(mut self, status: ErrorStatus, index: i32) -> Self {
        self.error_status = status;
        self.error_index = index;
        self
    }

    /// Build an encoded v2c response.
    pub fn build_v2c(self, community: &[u8]) -> Bytes {
        self.build(Version::V2c, community)
    }

    /// Build an encoded v1 response.
    pub fn build_v1(self, community: &[u8]) -> Bytes {
        self.build(Version::V1, community)
    }

    fn build(self, version: Version, community: &[u8]) -> Bytes {
        Message::new(
            version,
            Bytes::copy_from_slice(community),
            Pdu {
                pdu_type: PduType::Response,
                request_id: self.request_id,
                error_status: self.error_status,
                error_index: self.error_index,
                varbinds: self.varbinds,
            },
        )
        .encode()
    }
}
