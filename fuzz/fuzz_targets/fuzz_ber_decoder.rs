#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use snmp_relay::ber::Decoder;
use snmp_relay::value::Value;

fuzz_target!(|data: &[u8]| {
    // Raw TLV walking must never panic or loop
    let mut decoder = Decoder::new(Bytes::copy_from_slice(data));
    while !decoder.is_empty() {
        if decoder.read_tlv().is_err() {
            break;
        }
    }

    // Value decoding over the same input
    let mut decoder = Decoder::new(Bytes::copy_from_slice(data));
    let _ = Value::decode(&mut decoder);
});
