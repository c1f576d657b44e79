#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use snmp_relay::message::Message;

fuzz_target!(|data: &[u8]| {
    if let Ok(msg) = Message::decode(Bytes::copy_from_slice(data)) {
        // Anything we accept must re-encode and re-decode to the same message
        let reencoded = msg.encode();
        let reparsed = Message::decode(reencoded).expect("re-decode of encoded message");
        assert_eq!(reparsed, msg);
    }
});
