//! Content-addressed object keys and their wire encoding.
//!
//! Byte strings cross the JSON control plane base64-encoded with the
//! standard alphabet. An *extended key* additionally fixes the object size
//! next to the key so a single string is enough to materialize an object.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Raw length of an object key: one type byte plus a 20-byte content hash.
pub const OBJECT_KEY_LENGTH: usize = 21;

/// Raw length of an extended key before encoding: an object key followed by
/// the object size as a little-endian u64.
const EXTENDED_KEY_RAW_LENGTH: usize = OBJECT_KEY_LENGTH + 8;

/// Length in characters of a base64-encoded extended key.
pub const EXTENDED_KEY_LENGTH: usize = 40;

/// Encode arbitrary bytes the way the daemon encodes byte arrays in JSON.
pub fn encode_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a base64 byte string received from the daemon.
pub fn decode_bytes(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(text)
}

/// Build the extended key string carried by insert requests.
pub fn encode_extended_key(key: &[u8; OBJECT_KEY_LENGTH], size: u64) -> String {
    let mut raw = [0u8; EXTENDED_KEY_RAW_LENGTH];
    raw[..OBJECT_KEY_LENGTH].copy_from_slice(key);
    raw[OBJECT_KEY_LENGTH..].copy_from_slice(&size.to_le_bytes());
    STANDARD.encode(raw)
}

/// Check that a string is a well-formed extended key.
///
/// Used to reject malformed keys before any I/O happens.
pub fn is_extended_key_valid(key: &str) -> bool {
    key.len() == EXTENDED_KEY_LENGTH
        && STANDARD
            .decode(key)
            .is_ok_and(|raw| raw.len() == EXTENDED_KEY_RAW_LENGTH)
}
