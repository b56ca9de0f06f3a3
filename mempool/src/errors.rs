use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MempoolError {
    #[error("transaction already submitted by leader {0}")]
    DuplicateSubmission(String),

    #[error("record not found")]
    NotFound,
}

pub type MempoolResult<T> = std::result::Result<T, MempoolError>;
