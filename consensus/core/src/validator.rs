use crate::transaction::{kind_of, required_fields, TxData};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TxRuleError {
    #[error("transaction payload is not a JSON object")]
    NotAnObject,

    #[error("transaction has no `type` field")]
    MissingKind,

    #[error("transaction kind `{0}` is not recognized")]
    UnknownKind(String),

    #[error("transaction of kind `{0}` is missing required field `{1}`")]
    MissingRequiredField(String, String),
}

pub type TxResult<T> = std::result::Result<T, TxRuleError>;

/// Checks a transaction's tagged kind is recognized and carries every field that
/// kind requires. Fields beyond the required set are always accepted.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransactionValidator;

impl TransactionValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, tx_data: &TxData) -> TxResult<()> {
        let object = tx_data.as_object().ok_or(TxRuleError::NotAnObject)?;
        let kind = kind_of(tx_data).ok_or(TxRuleError::MissingKind)?;
        let fields = required_fields(kind).ok_or_else(|| TxRuleError::UnknownKind(kind.to_string()))?;
        for field in fields {
            if !object.contains_key(*field) {
                return Err(TxRuleError::MissingRequiredField(kind.to_string(), field.to_string()));
            }
        }
        Ok(())
    }
}
