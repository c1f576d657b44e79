//! BER length encoding.

/// Encode a BER length.
///
/// Returns a stack-allocated array and the number of valid bytes. The bytes
/// are in REVERSE wire order so [`super::EncodeBuf`] can push them directly
/// into its reverse buffer.
pub fn encode_length(len: usize) -> ([u8; 5], usize) {
    if len < 0x80 {
        return ([len as u8, 0, 0, 0, 0], 1);
    }

    // Long form: length octets in big-endian, prefixed by 0x80 | count.
    // Reversed for the prepend buffer: low octets first, marker last.
    let mut out = [0u8; 5];
    let mut n = 0;
    let mut v = len;
    while v > 0 {
        out[n] = (v & 0xFF) as u8;
        v >>= 8;
        n += 1;
    }
    out[n] = 0x80 | n as u8;
    (out, n + 1)
}
