use serde_json::Value;

/// The field the augmented `tx_data` carries once a validator records its timestamp,
/// appended without disturbing the order of the fields the submitter supplied.
pub const VALIDATION_TIMESTAMP_FIELD: &str = "validationTimestamp";

/// The transaction kinds the ledger recognizes, per the tagged `type` field every
/// transaction carries.
pub const RECOGNIZED_KINDS: [&str; 5] = ["utxo", "identity", "token_creation", "contract", "state_diff"];

/// Opaque, order-preserving transaction payload. Transactions may carry fields beyond
/// the ones a kind requires; those extra fields are never dropped or reordered.
pub type TxData = Value;

/// Fields a transaction of `kind` must carry, or `None` if `kind` isn't recognized.
pub fn required_fields(kind: &str) -> Option<&'static [&'static str]> {
    match kind {
        "utxo" => Some(&["from", "to", "amount"]),
        "identity" => Some(&["publicKey", "signature"]),
        "token_creation" => Some(&["creator", "tokenId"]),
        "contract" => Some(&["contractHash", "abi"]),
        "state_diff" => Some(&["function", "args"]),
        _ => None,
    }
}

/// Reads the `type` tag off a transaction payload, if present and a string.
pub fn kind_of(tx_data: &TxData) -> Option<&str> {
    tx_data.get("type").and_then(Value::as_str)
}

/// Extracts the UTXO identifiers a transaction's `from` field references: a single
/// string becomes a one-element list, an array is taken as-is (non-string entries
/// dropped), and an absent field yields an empty list.
pub fn from_utxos(tx_data: &TxData) -> Vec<String> {
    match tx_data.get("from") {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect(),
        _ => Vec::new(),
    }
}
