use cubic_consensus_core::TxRuleError;
use cubic_mempool::MempoolError;
use thiserror::Error;

/// The only errors that propagate to the caller of [`crate::ConsensusWorkflow::submit`].
/// Every other failure in the workflow is logged and treated as best-effort, per the
/// propagation policy: persistence and transport failures must never stall liveness.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error(transparent)]
    InvalidTransaction(#[from] TxRuleError),

    #[error("transaction already submitted by leader {0}")]
    DuplicateSubmission(String),
}

impl From<MempoolError> for SubmitError {
    fn from(err: MempoolError) -> Self {
        match err {
            MempoolError::DuplicateSubmission(leader_id) => SubmitError::DuplicateSubmission(leader_id),
            MempoolError::NotFound => unreachable!("submit never queries for an existing record"),
        }
    }
}

pub type SubmitResult<T> = std::result::Result<T, SubmitError>;
