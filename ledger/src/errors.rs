use cubic_consensus_core::TxRuleError;
use thiserror::Error;

/// The only error the ledger surfaces to its caller. Every other failure (gossip,
/// persistence) is logged and swallowed per the propagation policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerRejection {
    #[error(transparent)]
    InvalidTransaction(#[from] TxRuleError),
}

pub type LedgerResult<T> = std::result::Result<T, LedgerRejection>;
