//! SNMP client.
//!
//! Generic over [`Transport`] so the same request logic runs over real UDP
//! sockets and mock transports in tests.

mod builder;
mod walk;

pub use builder::*;
pub use walk::Walk;

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::error::{Error, ErrorStatus, OidErrorKind, Result};
use crate::message::{Message, Pdu, PduType, Version};
use crate::oid::Oid;
use crate::transport::Transport;
use crate::varbind::VarBind;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub version: Version,
    pub community: Bytes,
    /// Per-attempt receive timeout.
    pub timeout: Duration,
    /// Retries after the first attempt (UDP only).
    pub retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: Version::V2c,
            community: Bytes::from_static(b"public"),
            timeout: Duration::from_secs(5),
            retries: 3,
        }
    }
}

/// An SNMP client bound to one target.
///
/// Cheap to clone; clones share the transport and request ID counter.
pub struct Client<T: Transport> {
    transport: T,
    config: ClientConfig,
    next_request_id: Arc<AtomicI32>,
}

impl<T: Transport> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            config: self.config.clone(),
            next_request_id: Arc::clone(&self.next_request_id),
        }
    }
}

impl<T: Transport> Client<T> {
    /// Create a client over an existing transport.
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            config,
            next_request_id: Arc::new(AtomicI32::new(1)),
        }
    }

    /// The configured target address.
    pub fn peer_addr(&self) -> std::net::SocketAddr {
        self.transport.peer_addr()
    }

    /// Fetch the varbinds for a single OID with a GET request.
    ///
    /// Returns the response binding list as-is; an agent that answers with an
    /// empty list yields `Ok(vec![])` so callers can distinguish "no data"
    /// from transport failure.
    pub async fn get(&self, oid: &Oid) -> Result<Vec<VarBind>> {
        check_encodable(oid)?;
        let pdu = self.request_pdu(PduType::GetRequest, vec![VarBind::null(oid.clone())]);
        let response = self.send_request(pdu).await?;
        Ok(response.varbinds)
    }

    /// Fetch the lexicographic successor of an OID with a GETNEXT request.
    pub async fn get_next(&self, oid: &Oid) -> Result<VarBind> {
        check_encodable(oid)?;
        let pdu = self.request_pdu(PduType::GetNextRequest, vec![VarBind::null(oid.clone())]);
        let mut response = self.send_request(pdu).await?;
        if response.varbinds.is_empty() {
            return Err(Error::decode(0, crate::error::DecodeErrorKind::EmptyResponse));
        }
        Ok(response.varbinds.remove(0))
    }

    /// Walk the subtree under `oid` as a stream of varbinds.
    pub fn walk(&self, oid: Oid) -> Walk<T>
    where
        T: 'static,
    {
        Walk::new(self.clone(), oid)
    }

    fn request_pdu(&self, pdu_type: PduType, varbinds: Vec<VarBind>) -> Pdu {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        Pdu::request(pdu_type, request_id, varbinds)
    }

    /// Send a request and await the matching response PDU.
    ///
    /// Retries on timeout for datagram transports. Any other error, including
    /// a malformed response, fails immediately.
    async fn send_request(&self, pdu: Pdu) -> Result<Pdu> {
        let request_id = pdu.request_id;
        let message = Message::new(self.config.version, self.config.community.clone(), pdu);
        let frame = message.encode();

        let attempts = if self.transport.is_stream() {
            1
        } else {
            self.config.retries + 1
        };

        let mut last_timeout = None;
        for attempt in 0..attempts {
            if attempt > 0 {
                debug!(
                    request_id,
                    attempt,
                    target = %self.transport.peer_addr(),
                    "retrying after timeout"
                );
            }
            self.transport.send(&frame).await?;

            match self.transport.recv(request_id, self.config.timeout).await {
                Ok((data, source)) => {
                    trace!(request_id, %source, len = data.len(), "received response");
                    let response = Message::decode(data)?;
                    return self.check_response(request_id, response);
                }
                Err(Error::Timeout {
                    target, elapsed, ..
                }) => {
                    last_timeout = Some(Error::Timeout {
                        target,
                        elapsed,
                        request_id,
                        retries: self.config.retries,
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_timeout.unwrap_or(Error::Timeout {
            target: Some(self.transport.peer_addr()),
            elapsed: self.config.timeout,
            request_id,
            retries: self.config.retries,
        }))
    }

    fn check_response(&self, request_id: i32, response: Message) -> Result<Pdu> {
        if response.pdu.request_id != request_id {
            return Err(Error::RequestIdMismatch {
                expected: request_id,
                actual: response.pdu.request_id,
            });
        }
        if response.version != self.config.version {
            return Err(Error::VersionMismatch {
                expected: self.config.version,
                actual: response.version,
            });
        }
        if response.pdu.error_status != ErrorStatus::NoError {
            let index = response.pdu.error_index.max(0) as u32;
            // error_index is 1-based into the binding list; resolve it to the
            // offending OID when it lands inside the list
            let oid = (index > 0)
                .then(|| response.pdu.varbinds.get(index as usize - 1))
                .flatten()
                .map(|vb| vb.oid.clone());
            return Err(Error::Snmp {
                target: Some(self.transport.peer_addr()),
                status: response.pdu.error_status,
                index,
                oid,
            });
        }
        Ok(response.pdu)
    }
}

/// GET/GETNEXT requests need an OID that can appear on the wire, which
/// requires at least two arcs.
fn check_encodable(oid: &Oid) -> Result<()> {
    if oid.len() < 2 {
        return Err(Error::invalid_oid(OidErrorKind::TooShort));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use crate::transport::{MockTransport, ResponseBuilder};
    use crate::value::Value;

    fn mock_client(mock: MockTransport) -> Client<MockTransport> {
        let config = ClientConfig {
            version: Version::V2c,
            community: Bytes::from_static(b"public"),
            timeout: Duration::from_millis(50),
            retries: 0,
        };
        Client::new(mock, config)
    }

    #[tokio::test]
    async fn test_get_returns_varbinds() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(
                    oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
                    Value::OctetString("router".into()),
                )
                .build_v2c(b"public"),
        );

        let client = mock_client(mock);
        let vbs = client.get(&oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)).await.unwrap();
        assert_eq!(vbs.len(), 1);
        assert_eq!(vbs[0].value, Value::OctetString("router".into()));
    }

    #[tokio::test]
    async fn test_get_sends_well_formed_request() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(oid!(1, 3, 6, 1), Value::Integer(1))
                .build_v2c(b"public"),
        );

        let client = mock_client(mock.clone());
        client.get(&oid!(1, 3, 6, 1)).await.unwrap();

        let frames = mock.sent_frames();
        assert_eq!(frames.len(), 1);
        let request = Message::decode(frames[0].clone()).unwrap();
        assert_eq!(request.pdu.pdu_type, PduType::GetRequest);
        assert_eq!(request.pdu.request_id, 1);
        assert_eq!(request.pdu.varbinds[0].value, Value::Null);
        assert_eq!(&request.community[..], b"public");
    }

    #[tokio::test]
    async fn test_get_rejects_short_oid() {
        let mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        let client = mock_client(mock.clone());
        let err = client.get(&Oid::from_slice(&[5])).await.unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidOid {
                kind: OidErrorKind::TooShort,
                ..
            }
        ));
        // Nothing should hit the wire
        assert!(mock.sent_frames().is_empty());
    }

    #[tokio::test]
    async fn test_retries_on_timeout_then_succeeds() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.queue_timeout();
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(oid!(1, 3, 6, 1), Value::Integer(1))
                .build_v2c(b"public"),
        );

        let config = ClientConfig {
            retries: 2,
            timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let client = Client::new(mock.clone(), config);
        let vbs = client.get(&oid!(1, 3, 6, 1)).await.unwrap();
        assert_eq!(vbs.len(), 1);
        // Two sends: original plus one retry
        assert_eq!(mock.sent_frames().len(), 2);
    }

    #[tokio::test]
    async fn test_timeout_after_all_retries() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.queue_timeout();
        mock.queue_timeout();
        mock.queue_timeout();

        let config = ClientConfig {
            retries: 2,
            timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let client = Client::new(mock.clone(), config);
        let err = client.get(&oid!(1, 3, 6, 1)).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { retries: 2, .. }));
        assert_eq!(mock.sent_frames().len(), 3);
    }

    #[tokio::test]
    async fn test_request_id_mismatch() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.queue_response(
            ResponseBuilder::new(999)
                .varbind(oid!(1, 3, 6, 1), Value::Integer(1))
                .build_v2c(b"public"),
        );

        let client = mock_client(mock);
        let err = client.get(&oid!(1, 3, 6, 1)).await.unwrap_err();
        assert!(matches!(
            err,
            Error::RequestIdMismatch {
                expected: 1,
                actual: 999
            }
        ));
    }

    #[tokio::test]
    async fn test_error_status_resolves_oid_from_index() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(oid!(1, 3, 6, 1, 2, 1, 1, 9, 0), Value::Null)
                .error(ErrorStatus::NoSuchName, 1)
                .build_v2c(b"public"),
        );

        let client = mock_client(mock);
        let err = client.get(&oid!(1, 3, 6, 1, 2, 1, 1, 9, 0)).await.unwrap_err();
        match err {
            Error::Snmp { status, oid, .. } => {
                assert_eq!(status, ErrorStatus::NoSuchName);
                assert_eq!(oid, Some(oid!(1, 3, 6, 1, 2, 1, 1, 9, 0)));
            }
            other => panic!("expected Snmp error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_status_with_out_of_range_index() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.queue_response(
            ResponseBuilder::new(1)
                .error(ErrorStatus::GenErr, 5)
                .build_v2c(b"public"),
        );

        let client = mock_client(mock);
        let err = client.get(&oid!(1, 3, 6, 1)).await.unwrap_err();
        match err {
            Error::Snmp { status, oid, .. } => {
                assert_eq!(status, ErrorStatus::GenErr);
                assert_eq!(oid, None);
            }
            other => panic!("expected Snmp error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_next_returns_successor() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(oid!(1, 3, 6, 1, 2, 1, 1, 2, 0), Value::Integer(3))
                .build_v2c(b"public"),
        );

        let client = mock_client(mock.clone());
        let vb = client.get_next(&oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)).await.unwrap();
        assert_eq!(vb.oid, oid!(1, 3, 6, 1, 2, 1, 1, 2, 0));

        let request = Message::decode(mock.sent_frames()[0].clone()).unwrap();
        assert_eq!(request.pdu.pdu_type, PduType::GetNextRequest);
    }

    #[tokio::test]
    async fn test_request_ids_increment() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(oid!(1, 3, 6, 1), Value::Integer(1))
                .build_v2c(b"public"),
        );
        mock.queue_response(
            ResponseBuilder::new(2)
                .varbind(oid!(1, 3, 6, 1), Value::Integer(2))
                .build_v2c(b"public"),
        );

        let client = mock_client(mock);
        client.get(&oid!(1, 3, 6, 1)).await.unwrap();
        client.get(&oid!(1, 3, 6, 1)).await.unwrap();
    }
}
