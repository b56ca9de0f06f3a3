mod errors;
mod workflow;

pub use errors::{SubmitError, SubmitResult};
pub use workflow::{
    validator_task_name, ConsensusWorkflow, LookupPublicKeyFn, SignatureHooks, VerifySignatureFn, DEFAULT_REQUIRED_VALIDATIONS,
};
