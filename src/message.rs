//! SNMP message structure: version, community, PDU.

use std::fmt;

use bytes::Bytes;

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Error, ErrorStatus, Result};
use crate::varbind::{VarBind, decode_varbind_list, encode_varbind_list};

/// SNMP protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Version {
    V1,
    #[default]
    V2c,
}

impl Version {
    /// Wire value carried in the message header.
    pub fn as_i32(self) -> i32 {
        match self {
            Version::V1 => 0,
            Version::V2c => 1,
        }
    }

    pub fn from_i32(value: i32) -> Option<Version> {
        match value {
            0 => Some(Version::V1),
            1 => Some(Version::V2c),
            _ => None,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::V1 => write!(f, "v1"),
            Version::V2c => write!(f, "v2c"),
        }
    }
}

/// PDU operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PduType {
    GetRequest,
    GetNextRequest,
    Response,
}

impl PduType {
    pub fn tag(self) -> u8 {
        match self {
            PduType::GetRequest => tag::pdu::GET_REQUEST,
            PduType::GetNextRequest => tag::pdu::GET_NEXT_REQUEST,
            PduType::Response => tag::pdu::RESPONSE,
        }
    }

    pub fn from_tag(tag_byte: u8) -> Option<PduType> {
        match tag_byte {
            tag::pdu::GET_REQUEST => Some(PduType::GetRequest),
            tag::pdu::GET_NEXT_REQUEST => Some(PduType::GetNextRequest),
            tag::pdu::RESPONSE => Some(PduType::Response),
            _ => None,
        }
    }
}

/// An SNMP PDU: request id, error fields, varbind list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdu {
    pub pdu_type: PduType,
    pub request_id: i32,
    pub error_status: ErrorStatus,
    pub error_index: i32,
    pub varbinds: Vec<VarBind>,
}

impl Pdu {
    /// Build a request PDU with zeroed error fields.
    pub fn request(pdu_type: PduType, request_id: i32, varbinds: Vec<VarBind>) -> Self {
        Self {
            pdu_type,
            request_id,
            error_status: ErrorStatus::NoError,
            error_index: 0,
            varbinds,
        }
    }
}

/// A complete SNMP message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub version: Version,
    pub community: Bytes,
    pub pdu: Pdu,
}

impl Message {
    pub fn new(version: Version, community: Bytes, pdu: Pdu) -> Self {
        Self {
            version,
            community,
            pdu,
        }
    }

    /// Encode to wire bytes.
    pub fn encode(&self) -> Bytes {
        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            // Reverse buffer: PDU, community, version for forward wire order
            buf.push_constructed(self.pdu.pdu_type.tag(), |buf| {
                encode_varbind_list(buf, &self.pdu.varbinds);
                buf.push_integer(self.pdu.error_index);
                buf.push_integer(self.pdu.error_status.as_i32());
                buf.push_integer(self.pdu.request_id);
            });
            buf.push_octet_string(&self.community);
            buf.push_integer(self.version.as_i32());
        });
        buf.finish()
    }

    /// Decode from wire bytes.
    pub fn decode(data: Bytes) -> Result<Message> {
        let mut decoder = Decoder::new(data);
        let mut msg = decoder.read_sequence()?;

        let version_raw = msg.read_integer()?;
        let version = Version::from_i32(version_raw)
            .ok_or_else(|| Error::decode(0, DecodeErrorKind::UnknownVersion(version_raw)))?;
        let community = msg.read_octet_string()?;

        if msg.is_empty() {
            return Err(Error::decode(msg.offset(), DecodeErrorKind::MissingPdu));
        }
        let pdu_tag = msg.peek_tag()?;
        let pdu_type = PduType::from_tag(pdu_tag)
            .ok_or_else(|| Error::decode(msg.offset(), DecodeErrorKind::UnknownPduType(pdu_tag)))?;

        let mut pdu = msg.read_constructed(pdu_tag)?;
        let request_id = pdu.read_integer()?;
        let error_status = ErrorStatus::from_i32(pdu.read_integer()?);
        let error_index = pdu.read_integer()?;
        let varbinds = decode_varbind_list(&mut pdu)?;

        Ok(Message {
            version,
            community,
            pdu: Pdu {
                pdu_type,
                request_id,
                error_status,
                error_index,
                varbinds,
            },
        })
    }
}
