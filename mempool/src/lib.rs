mod errors;
mod key;
mod record;
mod store;

pub use errors::{MempoolError, MempoolResult};
pub use key::RawTxKey;
pub use record::{FinalizedTxRecord, ProcessingTxRecord, RawTxRecord, ValidationEntry};
pub use store::{with_validation_timestamp, Mempool, MempoolStats};
