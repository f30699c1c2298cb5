//! Length-prefixed key encoding for LMDB storage.
//!
//! Object keys are encoded as: [type_len][type][uid_len][uid]
//! - No delimiters, no escaping, uids may contain any character
//! - All objects of one type share the prefix [type_len][type]

use crate::error::{CascadeError, Result};
use crate::object::{ObjectKey, ObjectType};

/// Longest part a single length byte can describe
pub const MAX_PART_LEN: usize = u8::MAX as usize;

/// Build a length-prefixed key from parts. Parts must not exceed
/// [`MAX_PART_LEN`] bytes.
#[inline]
pub fn build_key(parts: &[&str]) -> Vec<u8> {
    let total_len: usize = parts.iter().map(|p| 1 + p.len()).sum();
    let mut key = Vec::with_capacity(total_len);
    for part in parts {
        key.push(part.len() as u8);
        key.extend_from_slice(part.as_bytes());
    }
    key
}

/// Key for one object
pub fn object_key(key: &ObjectKey) -> Result<Vec<u8>> {
    if key.uid.is_empty() || key.uid.len() > MAX_PART_LEN {
        return Err(CascadeError::Store(format!(
            "uid of {} must be 1..={} bytes",
            key, MAX_PART_LEN
        )));
    }
    Ok(build_key(&[key.object_type.as_str(), &key.uid]))
}

/// Prefix shared by every object of one type
#[inline]
pub fn type_prefix(object_type: ObjectType) -> Vec<u8> {
    build_key(&[object_type.as_str()])
}

/// Parse a length-prefixed key into parts. Stops at the first truncated or
/// non UTF-8 part.
pub fn parse_key(bytes: &[u8]) -> Vec<&str> {
    let mut parts = Vec::with_capacity(2);
    let mut i = 0;
    while i < bytes.len() {
        let len = bytes[i] as usize;
        if i + 1 + len > bytes.len() {
            break;
        }
        match std::str::from_utf8(&bytes[i + 1..i + 1 + len]) {
            Ok(part) => parts.push(part),
            Err(_) => break,
        }
        i += 1 + len;
    }
    parts
}

/// Get the Nth part from a key
#[inline]
pub fn get_part(bytes: &[u8], n: usize) -> Option<&str> {
    parse_key(bytes).get(n).copied()
}
