pub mod canonical;
pub mod transaction;
pub mod validator;

pub use canonical::{canonical_json_bytes, canonicalize, content_hash_of, with_field};
pub use transaction::{from_utxos, kind_of, required_fields, TxData, RECOGNIZED_KINDS, VALIDATION_TIMESTAMP_FIELD};
pub use validator::{TransactionValidator, TxResult, TxRuleError};
