#![no_main]

use libfuzzer_sys::fuzz_target;

use snmp_relay::oid::Oid;

fuzz_target!(|data: &[u8]| {
    // Fuzz OID from BER encoding
    let _ = Oid::from_ber(data);

    // Fuzz OID from dotted string notation (if data is valid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        let valid = Oid::is_valid(s);
        let parsed = Oid::parse(s);
        // The cheap syntax check never rejects something the parser accepts
        if parsed.is_ok() {
            assert!(valid);
        }
    }
});
