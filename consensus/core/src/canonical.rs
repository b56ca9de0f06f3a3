use cubic_hashes::{content_hash, Hash};
use serde_json::{Map, Value};

/// The largest integer a JSON number can carry without rounding, per IEEE-754 double
/// precision. Unsigned integers above this threshold are rendered as decimal strings
/// so they survive encode/decode round-trips byte-for-byte.
const MAX_SAFE_INTEGER: u64 = (1u64 << 53) - 1;

/// Rewrites a JSON value into canonical form: object fields keep insertion order
/// (guaranteed by serde_json's `preserve_order` feature), and any unsigned integer
/// exceeding [`MAX_SAFE_INTEGER`] is rendered as a decimal string instead of a number.
/// This is the only transformation applied; no fields are added, removed, or reordered.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, val) in map {
                out.insert(key.clone(), canonicalize(val));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        Value::Number(n) => match n.as_u64() {
            Some(u) if u > MAX_SAFE_INTEGER => Value::String(u.to_string()),
            _ => Value::Number(n.clone()),
        },
        other => other.clone(),
    }
}

/// Serializes a value through [`canonicalize`] into the exact bytes every content
/// hash in the system is computed over.
pub fn canonical_json_bytes(value: &Value) -> Vec<u8> {
    serde_json::to_vec(&canonicalize(value)).expect("canonicalized JSON values always serialize")
}

/// `content_hash(canonical_json(value))` — the universal identity function for every
/// entity above a transaction (transactions, blocks, faces, cubes).
pub fn content_hash_of(value: &Value) -> Hash {
    content_hash(canonical_json_bytes(value))
}

/// Returns a copy of `object` with `key` appended (or overwritten in place if already
/// present), preserving the existing field order for every other key.
pub fn with_field(object: &Value, key: &str, value: Value) -> Value {
    let mut map = object.as_object().cloned().unwrap_or_default();
    map.insert(key.to_string(), value);
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn small_integers_stay_numbers() {
        let v = json!({"amount": 100});
        let canon = canonicalize(&v);
        assert_eq!(canon["amount"], json!(100));
    }

    #[test]
    fn large_integers_become_decimal_strings() {
        let big = MAX_SAFE_INTEGER + 1;
        let v = json!({"timestamp": big});
        let canon = canonicalize(&v);
        assert_eq!(canon["timestamp"], json!(big.to_string()));
    }

    #[test]
    fn field_order_is_preserved() {
        let v = json!({"b": 1, "a": 2, "c": 3});
        let bytes = canonical_json_bytes(&v);
        let s = String::from_utf8(bytes).unwrap();
        assert_eq!(s, r#"{"b":1,"a":2,"c":3}"#);
    }

    #[test]
    fn content_hash_is_stable_across_calls() {
        let v = json!({"type": "utxo", "from": "A", "to": "B", "amount": 100});
        assert_eq!(content_hash_of(&v), content_hash_of(&v));
    }

    #[test]
    fn with_field_appends_without_disturbing_existing_order() {
        let v = json!({"type": "utxo", "amount": 5});
        let extended = with_field(&v, "validationTimestamp", json!(2_000_000));
        let bytes = canonical_json_bytes(&extended);
        let s = String::from_utf8(bytes).unwrap();
        assert_eq!(s, r#"{"type":"utxo","amount":5,"validationTimestamp":2000000}"#);
    }
}
