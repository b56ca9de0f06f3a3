use futures::future::BoxFuture;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum AsyncServiceError {
    #[error("service error: {0}")]
    Service(String),
}

pub type AsyncServiceResult<T> = std::result::Result<T, AsyncServiceError>;
pub type AsyncServiceFuture = BoxFuture<'static, AsyncServiceResult<()>>;

/// A long-running, tokio-task-based component driven by an [`crate::task::runtime::AsyncRuntime`].
pub trait AsyncService: Send + Sync {
    fn ident(self: Arc<Self>) -> &'static str;
    fn start(self: Arc<Self>) -> AsyncServiceFuture;
    fn signal_exit(self: Arc<Self>);
    fn stop(self: Arc<Self>) -> AsyncServiceFuture;
}
