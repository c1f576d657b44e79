//! BER decoding.
//!
//! Bounds-checked TLV reader over a shared [`Bytes`] buffer. Parsing is
//! permissive where net-snmp is (unknown value tags pass through), strict
//! where ambiguity would hurt (indefinite lengths, constructed strings,
//! truncated TLVs are rejected).

use bytes::Bytes;

use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;

use super::tag;

/// Maximum accepted length field, matching the largest message we would read.
const MAX_LENGTH: usize = 1 << 24;

/// Cursor over BER-encoded data.
#[derive(Debug)]
pub struct Decoder {
    data: Bytes,
    pos: usize,
}

impl Decoder {
    /// Create a decoder over the given bytes.
    pub fn new(data: Bytes) -> Self {
        Self { data, pos: 0 }
    }

    /// True if all input has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Current offset, for error reporting.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Peek the next tag without consuming it.
    pub fn peek_tag(&self) -> Result<u8> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or_else(|| Error::decode(self.pos, DecodeErrorKind::TruncatedData))
    }

    /// Read one TLV, returning its tag and content bytes.
    pub fn read_tlv(&mut self) -> Result<(u8, Bytes)> {
        let tag = self.peek_tag()?;
        self.pos += 1;
        let len = self.read_length()?;
        if self.pos + len > self.data.len() {
            return Err(Error::decode(self.pos, DecodeErrorKind::TlvOverflow));
        }
        let content = self.data.slice(self.pos..self.pos + len);
        self.pos += len;
        Ok((tag, content))
    }

    /// Read one TLV and require a specific tag.
    pub fn read_expected(&mut self, expected: u8) -> Result<Bytes> {
        let offset = self.pos;
        let (actual, content) = self.read_tlv()?;
        if actual != expected {
            return Err(Error::decode(
                offset,
                DecodeErrorKind::UnexpectedTag { expected, actual },
            ));
        }
        Ok(content)
    }

    /// Read a SEQUENCE, returning a decoder over its contents.
    pub fn read_sequence(&mut self) -> Result<Decoder> {
        let content = self.read_expected(tag::universal::SEQUENCE)?;
        Ok(Decoder::new(content))
    }

    /// Read a constructed TLV with the given tag (PDUs), returning an inner decoder.
    pub fn read_constructed(&mut self, expected: u8) -> Result<Decoder> {
        let content = self.read_expected(expected)?;
        Ok(Decoder::new(content))
    }

    /// Read an INTEGER as i32.
    pub fn read_integer(&mut self) -> Result<i32> {
        let offset = self.pos;
        let content = self.read_expected(tag::universal::INTEGER)?;
        parse_i32(&content, offset)
    }

    /// Read an OCTET STRING.
    pub fn read_octet_string(&mut self) -> Result<Bytes> {
        let offset = self.pos;
        let tag = self.peek_tag()?;
        if tag == tag::universal::OCTET_STRING_CONSTRUCTED {
            return Err(Error::decode(
                offset,
                DecodeErrorKind::ConstructedOctetString,
            ));
        }
        self.read_expected(tag::universal::OCTET_STRING)
    }

    /// Read an OBJECT IDENTIFIER.
    pub fn read_oid(&mut self) -> Result<Oid> {
        let content = self.read_expected(tag::universal::OBJECT_IDENTIFIER)?;
        Oid::from_ber(&content)
    }

    /// Read a NULL.
    pub fn read_null(&mut self) -> Result<()> {
        let offset = self.pos;
        let content = self.read_expected(tag::universal::NULL)?;
        if !content.is_empty() {
            return Err(Error::decode(offset, DecodeErrorKind::InvalidNull));
        }
        Ok(())
    }

    /// Read a BER length field.
    fn read_length(&mut self) -> Result<usize> {
        let offset = self.pos;
        let first = self
            .data
            .get(self.pos)
            .copied()
            .ok_or_else(|| Error::decode(offset, DecodeErrorKind::TruncatedData))?;
        self.pos += 1;

        if first < 0x80 {
            return Ok(first as usize);
        }
        if first == 0x80 {
            return Err(Error::decode(offset, DecodeErrorKind::IndefiniteLength));
        }

        let octets = (first & 0x7F) as usize;
        if octets > 4 {
            return Err(Error::decode(offset, DecodeErrorKind::LengthTooLong { octets }));
        }
        if self.pos + octets > self.data.len() {
            return Err(Error::decode(offset, DecodeErrorKind::TruncatedData));
        }

        let mut len: usize = 0;
        for _ in 0..octets {
            len = (len << 8) | self.data[self.pos] as usize;
            self.pos += 1;
        }
        if len > MAX_LENGTH {
            return Err(Error::decode(offset, DecodeErrorKind::InvalidLength));
        }
        Ok(len)
    }
}

/// Parse BER INTEGER content as i32.
pub(crate) fn parse_i32(content: &[u8], offset: usize) -> Result<i32> {
    if content.is_empty() {
        return Err(Error::decode(offset, DecodeErrorKind::ZeroLengthInteger));
    }
    if content.len() > 4 {
        return Err(Error::decode(offset, DecodeErrorKind::IntegerOverflow));
    }
    let mut value: i32 = if content[0] & 0x80 != 0 { -1 } else { 0 };
    for &b in content {
        value = (value << 8) | b as i32;
    }
    Ok(value)
}

/// Parse BER unsigned-integer content as u32 (Counter32/Gauge32/TimeTicks).
pub(crate) fn parse_u32(content: &[u8], offset: usize) -> Result<u32> {
    if content.is_empty() {
        return Err(Error::decode(offset, DecodeErrorKind::ZeroLengthInteger));
    }
    // A leading 0x00 is the positive-sign pad for values with the MSB set.
    // Unpadded 4-byte values with the MSB set are accepted as unsigned; some
    // agents encode them that way.
    let trimmed = if content[0] == 0 && content.len() > 1 {
        &content[1..]
    } else {
        content
    };
    if trimmed.len() > 4 {
        return Err(Error::decode(offset, DecodeErrorKind::IntegerOverflow));
    }
    let mut value: u32 = 0;
    for &b in trimmed {
        value = (value << 8) | u32::from(b);
    }
    Ok(value)
}

/// Parse BER unsigned-integer content as u64 (Counter64).
pub(crate) fn parse_u64(content: &[u8], offset: usize) -> Result<u64> {
    if content.is_empty() {
        return Err(Error::decode(offset, DecodeErrorKind::ZeroLengthInteger));
    }
    let trimmed = if content[0] == 0 && content.len() > 1 {
        &content[1..]
    } else {
        content
    };
    if trimmed.len() > 8 {
        return Err(Error::decode(
            offset,
            DecodeErrorKind::Integer64TooLong {
                length: content.len(),
            },
        ));
    }
    let mut value: u64 = 0;
    for &b in trimmed {
        value = (value << 8) | u64::from(b);
    }
    Ok(value)
}
