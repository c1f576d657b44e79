//! In-process simulated SNMP agent for integration tests.
//!
//! Listens on an ephemeral UDP port and serves GET/GETNEXT from a sorted OID
//! map, echoing the request ID, version, and community of each request.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use tokio::net::UdpSocket;

use snmp_relay::error::ErrorStatus;
use snmp_relay::message::{Message, Pdu, PduType};
use snmp_relay::oid::Oid;
use snmp_relay::value::Value;
use snmp_relay::varbind::VarBind;

#[derive(Clone, Copy)]
enum Mode {
    Normal,
    /// Respond to everything with this error status and index.
    ForcedError(ErrorStatus, i32),
    /// Never respond, to exercise timeout paths.
    Silent,
}

pub struct SimAgent {
    addr: SocketAddr,
    requests: Arc<AtomicUsize>,
}

impl SimAgent {
    /// Start an agent serving the given OID map.
    pub async fn start(objects: BTreeMap<Oid, Value>) -> SimAgent {
        Self::start_with_mode(objects, Mode::Normal).await
    }

    /// Start an agent that answers every request with an error status.
    pub async fn start_with_error(
        objects: BTreeMap<Oid, Value>,
        status: ErrorStatus,
        index: i32,
    ) -> SimAgent {
        Self::start_with_mode(objects, Mode::ForcedError(status, index)).await
    }

    /// Start an agent that receives requests but never answers.
    pub async fn start_silent() -> SimAgent {
        Self::start_with_mode(BTreeMap::new(), Mode::Silent).await
    }

    async fn start_with_mode(objects: BTreeMap<Oid, Value>, mode: Mode) -> SimAgent {
        let socket = UdpSocket::bind("127.0.0.1:0")
            .await
            .expect("bind sim agent");
        let addr = socket.local_addr().expect("sim agent addr");
        let requests = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&requests);

        tokio::spawn(async move {
            let mut buf = vec![0u8; 65535];
            loop {
                let Ok((len, from)) = socket.recv_from(&mut buf).await else {
                    break;
                };
                counter.fetch_add(1, Ordering::SeqCst);

                if matches!(mode, Mode::Silent) {
                    continue;
                }

                let Ok(request) = Message::decode(Bytes::copy_from_slice(&buf[..len])) else {
                    continue;
                };
                let response = build_response(&objects, mode, &request);
                let _ = socket.send_to(&response.encode(), from).await;
            }
        });

        SimAgent { addr, requests }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Number of datagrams received so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

fn build_response(objects: &BTreeMap<Oid, Value>, mode: Mode, request: &Message) -> Message {
    let (error_status, error_index, varbinds) = match mode {
        Mode::ForcedError(status, index) => {
            (status, index, request.pdu.varbinds.clone())
        }
        Mode::Normal | Mode::Silent => {
            let varbinds = request
                .pdu
                .varbinds
                .iter()
                .map(|vb| answer(objects, request.pdu.pdu_type, &vb.oid))
                .collect();
            (ErrorStatus::NoError, 0, varbinds)
        }
    };

    Message::new(
        request.version,
        request.community.clone(),
        Pdu {
            pdu_type: PduType::Response,
            request_id: request.pdu.request_id,
            error_status,
            error_index,
            varbinds,
        },
    )
}

fn answer(objects: &BTreeMap<Oid, Value>, pdu_type: PduType, oid: &Oid) -> VarBind {
    match pdu_type {
        PduType::GetRequest => match objects.get(oid) {
            Some(value) => VarBind::new(oid.clone(), value.clone()),
            None => VarBind::new(oid.clone(), Value::NoSuchObject),
        },
        PduType::GetNextRequest => {
            // Lexicographic successor: first key strictly greater than oid
            match objects.range(oid.clone()..).find(|(k, _)| *k > oid) {
                Some((next_oid, value)) => VarBind::new(next_oid.clone(), value.clone()),
                None => VarBind::new(oid.clone(), Value::EndOfMibView),
            }
        }
        PduType::Response => VarBind::new(oid.clone(), Value::Null),
    }
}
