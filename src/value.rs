//! SNMP value types.

use bytes::Bytes;
use std::fmt;

use crate::ber::decode::{parse_i32, parse_u32, parse_u64};
use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::Result;
use crate::oid::Oid;

/// An SNMP value as carried in a varbind.
///
/// Covers the SMIv2 base types plus the v2c exception markers. Values with
/// tags we do not recognize are preserved as [`Value::Unknown`] rather than
/// rejected, so a response containing a vendor extension still decodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i32),
    OctetString(Bytes),
    Null,
    ObjectIdentifier(Oid),
    IpAddress([u8; 4]),
    Counter32(u32),
    Gauge32(u32),
    TimeTicks(u32),
    Opaque(Bytes),
    Counter64(u64),
    /// v2c exception: no such object at this OID.
    NoSuchObject,
    /// v2c exception: no such instance at this OID.
    NoSuchInstance,
    /// v2c exception: end of MIB view reached (walk terminator).
    EndOfMibView,
    /// Unrecognized tag, preserved verbatim.
    Unknown { tag: u8, data: Bytes },
}

impl Value {
    /// True for the v2c exception markers (noSuchObject etc).
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView
        )
    }

    /// The SMI type name for this value, e.g. "OctetString" or "TimeTicks".
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::OctetString(_) => "OctetString",
            Value::Null => "Null",
            Value::ObjectIdentifier(_) => "ObjectIdentifier",
            Value::IpAddress(_) => "IpAddress",
            Value::Counter32(_) => "Counter32",
            Value::Gauge32(_) => "Gauge32",
            Value::TimeTicks(_) => "TimeTicks",
            Value::Opaque(_) => "Opaque",
            Value::Counter64(_) => "Counter64",
            Value::NoSuchObject => "NoSuchObject",
            Value::NoSuchInstance => "NoSuchInstance",
            Value::EndOfMibView => "EndOfMibView",
            Value::Unknown { .. } => "Unknown",
        }
    }

    /// Encode this value into the buffer.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        match self {
            Value::Integer(v) => buf.push_integer(*v),
            Value::OctetString(data) => buf.push_octet_string(data),
            Value::Null => buf.push_null(),
            Value::ObjectIdentifier(oid) => buf.push_oid(oid),
            Value::IpAddress(addr) => buf.push_ip_address(*addr),
            Value::Counter32(v) => buf.push_unsigned32(tag::application::COUNTER32, *v),
            Value::Gauge32(v) => buf.push_unsigned32(tag::application::GAUGE32, *v),
            Value::TimeTicks(v) => buf.push_unsigned32(tag::application::TIMETICKS, *v),
            Value::Opaque(data) => buf.push_raw(tag::application::OPAQUE, data),
            Value::Counter64(v) => buf.push_integer64(*v),
            Value::NoSuchObject => buf.push_raw(tag::context::NO_SUCH_OBJECT, &[]),
            Value::NoSuchInstance => buf.push_raw(tag::context::NO_SUCH_INSTANCE, &[]),
            Value::EndOfMibView => buf.push_raw(tag::context::END_OF_MIB_VIEW, &[]),
            Value::Unknown { tag, data } => buf.push_raw(*tag, data),
        }
    }

    /// Decode the next value from the decoder.
    pub fn decode(decoder: &mut Decoder) -> Result<Value> {
        let offset = decoder.offset();
        let (tag, content) = decoder.read_tlv()?;
        let value = match tag {
            tag::universal::INTEGER => Value::Integer(parse_i32(&content, offset)?),
            tag::universal::OCTET_STRING => Value::OctetString(content),
            tag::universal::NULL => Value::Null,
            tag::universal::OBJECT_IDENTIFIER => Value::ObjectIdentifier(Oid::from_ber(&content)?),
            tag::application::IP_ADDRESS => {
                let addr: [u8; 4] = content.as_ref().try_into().map_err(|_| {
                    crate::error::Error::decode(
                        offset,
                        crate::error::DecodeErrorKind::InvalidIpAddressLength {
                            length: content.len(),
                        },
                    )
                })?;
                Value::IpAddress(addr)
            }
            tag::application::COUNTER32 => Value::Counter32(parse_u32(&content, offset)?),
            tag::application::GAUGE32 => Value::Gauge32(parse_u32(&content, offset)?),
            tag::application::TIMETICKS => Value::TimeTicks(parse_u32(&content, offset)?),
            tag::application::OPAQUE => Value::Opaque(content),
            tag::application::COUNTER64 => Value::Counter64(parse_u64(&content, offset)?),
            tag::context::NO_SUCH_OBJECT => Value::NoSuchObject,
            tag::context::NO_SUCH_INSTANCE => Value::NoSuchInstance,
            tag::context::END_OF_MIB_VIEW => Value::EndOfMibView,
            other => Value::Unknown {
                tag: other,
                data: content,
            },
        };
        Ok(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{v}"),
            Value::OctetString(data) => write!(f, "{}", format_octet_string(data)),
            Value::Null => Ok(()),
            Value::ObjectIdentifier(oid) => write!(f, "{oid}"),
            Value::IpAddress([a, b, c, d]) => write!(f, "{a}.{b}.{c}.{d}"),
            Value::Counter32(v) => write!(f, "{v}"),
            Value::Gauge32(v) => write!(f, "{v}"),
            Value::TimeTicks(v) => write!(f, "{v}"),
            Value::Opaque(data) => write!(f, "{}", hex_string(data)),
            Value::Counter64(v) => write!(f, "{v}"),
            Value::NoSuchObject => write!(f, "noSuchObject"),
            Value::NoSuchInstance => write!(f, "noSuchInstance"),
            Value::EndOfMibView => write!(f, "endOfMibView"),
            Value::Unknown { data, .. } => write!(f, "{}", hex_string(data)),
        }
    }
}

/// Render an OCTET STRING as text when printable, hex otherwise.
fn format_octet_string(data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(s) if s.chars().all(|c| !c.is_control() || c == '\t' || c == '\n' || c == '\r') => {
            s.to_string()
        }
        _ => hex_string(data),
    }
}

fn hex_string(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    fn roundtrip(value: Value) -> Value {
        let mut buf = EncodeBuf::new();
        value.encode(&mut buf);
        let mut dec = Decoder::new(buf.finish());
        Value::decode(&mut dec).unwrap()
    }

    #[test]
    fn test_roundtrip_basic_types() {
        assert_eq!(roundtrip(Value::Integer(-42)), Value::Integer(-42));
        assert_eq!(
            roundtrip(Value::OctetString(Bytes::from_static(b"eth0"))),
            Value::OctetString(Bytes::from_static(b"eth0"))
        );
        assert_eq!(roundtrip(Value::Null), Value::Null);
        assert_eq!(
            roundtrip(Value::ObjectIdentifier(oid!(1, 3, 6, 1, 2, 1))),
            Value::ObjectIdentifier(oid!(1, 3, 6, 1, 2, 1))
        );
        assert_eq!(
            roundtrip(Value::IpAddress([192, 168, 1, 1])),
            Value::IpAddress([192, 168, 1, 1])
        );
    }

    #[test]
    fn test_roundtrip_application_types() {
        assert_eq!(roundtrip(Value::Counter32(u32::MAX)), Value::Counter32(u32::MAX));
        assert_eq!(roundtrip(Value::Gauge32(0)), Value::Gauge32(0));
        assert_eq!(roundtrip(Value::TimeTicks(8675309)), Value::TimeTicks(8675309));
        assert_eq!(roundtrip(Value::Counter64(u64::MAX)), Value::Counter64(u64::MAX));
    }

    #[test]
    fn test_roundtrip_exceptions() {
        assert_eq!(roundtrip(Value::NoSuchObject), Value::NoSuchObject);
        assert_eq!(roundtrip(Value::NoSuchInstance), Value::NoSuchInstance);
        assert_eq!(roundtrip(Value::EndOfMibView), Value::EndOfMibView);
    }

    #[test]
    fn test_unknown_tag_passthrough() {
        let value = Value::Unknown {
            tag: 0x47,
            data: Bytes::from_static(&[0xDE, 0xAD]),
        };
        assert_eq!(roundtrip(value.clone()), value);
    }

    #[test]
    fn test_display_octet_string_printable() {
        let v = Value::OctetString(Bytes::from_static(b"Linux router 5.15"));
        assert_eq!(v.to_string(), "Linux router 5.15");
    }

    #[test]
    fn test_display_octet_string_binary() {
        let v = Value::OctetString(Bytes::from_static(&[0x00, 0x1A, 0x2B]));
        assert_eq!(v.to_string(), "00 1A 2B");
    }

    #[test]
    fn test_display_exceptions() {
        assert_eq!(Value::NoSuchObject.to_string(), "noSuchObject");
        assert_eq!(Value::EndOfMibView.to_string(), "endOfMibView");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Integer(1).type_name(), "Integer");
        assert_eq!(
            Value::OctetString(Bytes::new()).type_name(),
            "OctetString"
        );
        assert_eq!(Value::TimeTicks(0).type_name(), "TimeTicks");
        assert_eq!(Value::NoSuchObject.type_name(), "NoSuchObject");
    }
}
