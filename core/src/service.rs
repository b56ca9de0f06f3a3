use crate::core::Core;
use std::{sync::Arc, thread::JoinHandle};

/// A long-running, thread-based component bound to a [`Core`].
pub trait Service: Send + Sync {
    fn ident(self: Arc<Self>) -> &'static str;
    fn start(self: Arc<Self>, core: Arc<Core>) -> Vec<JoinHandle<()>>;
    fn stop(self: Arc<Self>);
}
