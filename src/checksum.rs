//! Rolling four-lane XOR used for both the head and the data checksum.
//!
//! Not tamper-proof. It only detects accidental corruption and files written
//! by an unsupported tool version.

/// Fold `bytes` into a 4-byte accumulator, byte `i` XORed into lane `i % 4`,
/// and read the accumulator as a little-endian `i32`.
pub fn checksum(bytes: &[u8]) -> i32 {
    let mut key = [0u8; 4];
    for chunk in bytes.chunks(4) {
        for (lane, b) in key.iter_mut().zip(chunk) {
            *lane ^= b;
        }
    }
    i32::from_le_bytes(key)
}
