//! SNMP variable bindings.
//!
//! A varbind pairs an OID with a value. Requests carry Null values;
//! responses carry the retrieved value (or an exception marker).

use std::fmt;

use crate::ber::{Decoder, EncodeBuf};
use crate::error::Result;
use crate::oid::Oid;
use crate::value::Value;

/// A variable binding: OID plus value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBind {
    pub oid: Oid,
    pub value: Value,
}

impl VarBind {
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }

    /// A request varbind: the OID with a Null placeholder value.
    pub fn null(oid: Oid) -> Self {
        Self {
            oid,
            value: Value::Null,
        }
    }

    /// Encode as SEQUENCE { oid, value }.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_sequence(|buf| {
            // Reverse buffer: value first, then OID
            self.value.encode(buf);
            buf.push_oid(&self.oid);
        });
    }

    /// Decode one varbind from the decoder.
    pub fn decode(decoder: &mut Decoder) -> Result<VarBind> {
        let mut seq = decoder.read_sequence()?;
        let oid = seq.read_oid()?;
        let value = Value::decode(&mut seq)?;
        Ok(VarBind { oid, value })
    }
}

impl fmt::Display for VarBind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

/// Encode a varbind list as SEQUENCE OF VarBind.
pub fn encode_varbind_list(buf: &mut EncodeBuf, varbinds: &[VarBind]) {
    buf.push_sequence(|buf| {
        // Reverse buffer: iterate backwards for forward wire order
        for vb in varbinds.iter().rev() {
            vb.encode(buf);
        }
    });
}

/// Decode a SEQUENCE OF VarBind.
pub fn decode_varbind_list(decoder: &mut Decoder) -> Result<Vec<VarBind>> {
    let mut seq = decoder.read_sequence()?;
    let mut varbinds = Vec::new();
    while !seq.is_empty() {
        varbinds.push(VarBind::decode(&mut seq)?);
    }
    Ok(varbinds)
}
