mod args;
mod daemon;
mod service;

use std::sync::Arc;

use args::Args;
use cubic_core::signals::Signals;
use cubic_core::trace;

pub fn main() {
    let args = Args::parse();
    let daemon = daemon::create_core(&args);

    trace!("cubicd starting...");

    let signals = Arc::new(Signals::new(daemon.core.clone()));
    signals.init();

    daemon.core.run();

    trace!("cubicd stopped");
}
