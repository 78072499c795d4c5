//! Canonicalization and provenance hashing.
//!
//! A record is first dumped to a `serde_json::Value`, then rendered to a
//! canonical text form: object keys sorted lexicographically at every depth,
//! no insignificant whitespace, array order kept, timestamps already rendered
//! as ISO-8601 strings by the dump. The UTF-8 bytes of that text are digested
//! with SHA-256 and hex-encoded.
//!
//! The same procedure runs at two levels: once over a persona, once over the
//! whole identity record (whose input includes the persona hash).

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Field holding a record's own digest. Never part of its own input.
pub const HASH_FIELD: &str = "provenance_hash";

/// Length of a hex-encoded SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Render `value` in canonical form.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::String(s) => write_string(s, out),
        // null, booleans and numbers have a single JSON spelling
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push_str(&Value::String(s.to_string()).to_string());
}

/// Hex-encoded SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Digest of `value` with its top-level [`HASH_FIELD`] removed.
pub fn provenance_digest(value: &Value) -> String {
    let body = match value {
        Value::Object(map) if map.contains_key(HASH_FIELD) => {
            let mut map = map.clone();
            map.remove(HASH_FIELD);
            canonical_json(&Value::Object(map))
        }
        other => canonical_json(other),
    };
    sha256_hex(body.as_bytes())
}

/// Structural dump of a record for canonicalization.
///
/// Record types in this crate consist of strings, numbers, booleans, string-keyed
/// maps and sequences only, so conversion cannot fail. A failure here is a bug
/// in a `Serialize` impl, not bad input.
pub fn to_canonical_value<T: Serialize>(record: &T) -> Value {
    serde_json::to_value(record).expect("record fields are always representable as JSON")
}

/// Whether `s` looks like a hex-encoded SHA-256 digest.
pub fn is_digest(s: &str) -> bool {
    s.len() == DIGEST_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}
