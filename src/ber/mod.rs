//! BER encoding and decoding for SNMP messages.
//!
//! SNMP uses a restricted subset of BER (X.690): definite lengths only,
//! primitive encodings for all value types.

pub mod decode;
pub mod encode;
pub mod length;
pub mod tag;

pub use decode::Decoder;
pub use encode::EncodeBuf;
