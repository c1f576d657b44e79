//! Walk stream implementation.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::transport::Transport;
use crate::value::Value;
use crate::varbind::VarBind;

use super::Client;

/// Async stream for walking an OID subtree using GETNEXT.
///
/// Created by [`Client::walk()`]. The stream ends when the agent reports
/// EndOfMibView or the returned OID leaves the walked subtree.
pub struct Walk<T: Transport> {
    client: Client<T>,
    base_oid: Oid,
    current_oid: Oid,
    /// Last OID that was successfully returned to the caller.
    /// Used to detect non-increasing OIDs (agent misbehavior).
    last_returned_oid: Option<Oid>,
    done: bool,
    pending: Option<Pin<Box<dyn std::future::Future<Output = Result<VarBind>> + Send>>>,
}

impl<T: Transport> Walk<T> {
    pub(crate) fn new(client: Client<T>, oid: Oid) -> Self {
        Self {
            client,
            base_oid: oid.clone(),
            current_oid: oid,
            last_returned_oid: None,
            done: false,
            pending: None,
        }
    }
}

// No field is structurally pinned (the in-flight future is boxed), so the
// stream can be polled through a plain `&mut`.
impl<T: Transport> Unpin for Walk<T> {}

impl<T: Transport + 'static> Stream for Walk<T> {
    type Item = Result<VarBind>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }

        if self.pending.is_none() {
            // Start a new GETNEXT request
            let client = self.client.clone();
            let oid = self.current_oid.clone();

            let fut = Box::pin(async move { client.get_next(&oid).await });
            self.pending = Some(fut);
        }

        let Some(pending) = self.pending.as_mut() else {
            return Poll::Ready(None);
        };
        match pending.as_mut().poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(result) => {
                self.pending = None;

                match result {
                    Ok(vb) => {
                        if matches!(vb.value, Value::EndOfMibView) {
                            self.done = true;
                            return Poll::Ready(None);
                        }

                        // Check if OID left the subtree
                        if !vb.oid.starts_with(&self.base_oid) {
                            self.done = true;
                            return Poll::Ready(None);
                        }

                        // Check for non-increasing OID (agent misbehavior).
                        // This prevents infinite loops on non-conformant devices.
                        if let Some(last_oid) = self.last_returned_oid.take()
                            && vb.oid <= last_oid
                        {
                            self.done = true;
                            return Poll::Ready(Some(Err(Error::NonIncreasingOid {
                                previous: last_oid,
                                current: vb.oid,
                            })));
                        }

                        self.current_oid = vb.oid.clone();
                        self.last_returned_oid = Some(vb.oid.clone());

                        Poll::Ready(Some(Ok(vb)))
                    }
                    Err(e) => {
                        self.done = true;
                        Poll::Ready(Some(Err(e)))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfig;
    use crate::message::Version;
    use crate::transport::{MockTransport, ResponseBuilder};
    use bytes::Bytes;
    use std::pin::Pin;
    use std::task::Context;
    use std::time::Duration;

    fn mock_client(mock: MockTransport) -> Client<MockTransport> {
        let config = ClientConfig {
            version: Version::V2c,
            community: Bytes::from_static(b"public"),
            timeout: Duration::from_secs(1),
            retries: 0,
        };
        Client::new(mock, config)
    }

    async fn collect_walk<T: Transport + 'static>(
        mut walk: Pin<&mut Walk<T>>,
        limit: usize,
    ) -> Vec<Result<VarBind>> {
        use std::future::poll_fn;

        let mut results = Vec::new();
        while results.len() < limit {
            let item = poll_fn(|cx: &mut Context<'_>| walk.as_mut().poll_next(cx)).await;
            match item {
                Some(result) => results.push(result),
                None => break,
            }
        }
        results
    }

    #[test]
    fn test_walk_is_unpin() {
        // Callers poll through `Pin::new(&mut walk)`, which needs this
        fn require_unpin<S: Unpin>() {}
        require_unpin::<Walk<MockTransport>>();
    }

    #[tokio::test]
    async fn test_walk_terminates_on_end_of_mib_view() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());

        // First response: valid OID in subtree
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(
                    Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 1, 0]),
                    Value::OctetString("test".into()),
                )
                .build_v2c(b"public"),
        );

        // Second response: EndOfMibView
        mock.queue_response(
            ResponseBuilder::new(2)
                .varbind(
                    Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 1, 0]),
                    Value::EndOfMibView,
                )
                .build_v2c(b"public"),
        );

        let client = mock_client(mock);
        let walk = client.walk(Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1]));

        let mut pinned = Box::pin(walk);
        let results = collect_walk(pinned.as_mut(), 10).await;

        assert_eq!(results.len(), 1);
        assert!(results[0].is_ok());
    }

    #[tokio::test]
    async fn test_walk_terminates_when_leaving_subtree() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());

        // Response with OID outside the walked subtree (interfaces, not system)
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(
                    Oid::from_slice(&[1, 3, 6, 1, 2, 1, 2, 1, 0]),
                    Value::Integer(1),
                )
                .build_v2c(b"public"),
        );

        let client = mock_client(mock);
        let walk = client.walk(Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1]));

        let mut pinned = Box::pin(walk);
        let results = collect_walk(pinned.as_mut(), 10).await;

        // Should terminate immediately with no results
        assert_eq!(results.len(), 0);
    }

    #[tokio::test]
    async fn test_walk_returns_oids_in_sequence() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());

        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(
                    Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 1, 0]),
                    Value::OctetString("desc".into()),
                )
                .build_v2c(b"public"),
        );
        mock.queue_response(
            ResponseBuilder::new(2)
                .varbind(
                    Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 2, 0]),
                    Value::ObjectIdentifier(Oid::from_slice(&[1, 3, 6, 1, 4, 1, 99])),
                )
                .build_v2c(b"public"),
        );
        mock.queue_response(
            ResponseBuilder::new(3)
                .varbind(
                    Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 3, 0]),
                    Value::TimeTicks(12345),
                )
                .build_v2c(b"public"),
        );
        // Fourth response leaves subtree
        mock.queue_response(
            ResponseBuilder::new(4)
                .varbind(
                    Oid::from_slice(&[1, 3, 6, 1, 2, 1, 2, 1, 0]),
                    Value::Integer(1),
                )
                .build_v2c(b"public"),
        );

        let client = mock_client(mock);
        let walk = client.walk(Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1]));

        let mut pinned = Box::pin(walk);
        let results = collect_walk(pinned.as_mut(), 10).await;

        assert_eq!(results.len(), 3);

        // Verify lexicographic ordering
        let oids: Vec<_> = results
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .map(|vb| &vb.oid)
            .collect();
        for i in 1..oids.len() {
            assert!(oids[i] > oids[i - 1], "OIDs should be strictly increasing");
        }
    }

    #[tokio::test]
    async fn test_walk_propagates_errors() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());

        // First response succeeds
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(
                    Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 1, 0]),
                    Value::OctetString("test".into()),
                )
                .build_v2c(b"public"),
        );

        // Second request times out
        mock.queue_timeout();

        let client = mock_client(mock);
        let walk = client.walk(Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1]));

        let mut pinned = Box::pin(walk);
        let results = collect_walk(pinned.as_mut(), 10).await;

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[tokio::test]
    async fn test_walk_errors_on_decreasing_oid() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());

        // First response: .1.3.6.1.2.1.1.5.0
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(
                    Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 5, 0]),
                    Value::OctetString("host1".into()),
                )
                .build_v2c(b"public"),
        );

        // Second response: .1.3.6.1.2.1.1.4.0 (DECREASING - goes backwards!)
        mock.queue_response(
            ResponseBuilder::new(2)
                .varbind(
                    Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 4, 0]),
                    Value::OctetString("admin".into()),
                )
                .build_v2c(b"public"),
        );

        let client = mock_client(mock);
        let walk = client.walk(Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1]));

        let mut pinned = Box::pin(walk);
        let results = collect_walk(pinned.as_mut(), 10).await;

        // Should get first result OK, then error on second
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(
            &results[1],
            Err(Error::NonIncreasingOid { previous, current })
            if previous == &Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 5, 0])
               && current == &Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 4, 0])
        ));
    }

    #[tokio::test]
    async fn test_walk_errors_on_same_oid_returned_twice() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());

        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(
                    Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 1, 0]),
                    Value::OctetString("desc".into()),
                )
                .build_v2c(b"public"),
        );

        // Same OID again, which would cause an infinite loop
        mock.queue_response(
            ResponseBuilder::new(2)
                .varbind(
                    Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 1, 0]),
                    Value::OctetString("desc".into()),
                )
                .build_v2c(b"public"),
        );

        let client = mock_client(mock);
        let walk = client.walk(Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1]));

        let mut pinned = Box::pin(walk);
        let results = collect_walk(pinned.as_mut(), 10).await;

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(
            &results[1],
            Err(Error::NonIncreasingOid { previous, current })
            if previous == current
        ));
    }
}
