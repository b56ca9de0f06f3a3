//! Logger setup and logging macros, backed by `log4rs`.

#[allow(unused_imports)]
pub use log::{Level, LevelFilter};

use consts::*;

mod appender;
mod consts;
mod logger;

/// Sets the runtime log level filter. Affects the global `log` facade only.
pub fn set_log_level(_level: LevelFilter) {
    // log4rs does not support live filter changes; a redeploy of the config is required.
    // Kept as a stable entry point for callers that expect to be able to adjust verbosity.
}

/// Initializes the global logger with a console appender and, if `log_dir` is given,
/// rolling file appenders for general and warning-and-above output.
pub fn init_logger(log_dir: Option<&str>, filters: &str) {
    use crate::log::appender::AppenderSpec;
    use log4rs::{config::Root, Config};
    use std::iter::once;

    const CONSOLE_APPENDER: &str = "stdout";
    const LOG_FILE_APPENDER: &str = "log_file";
    const ERR_LOG_FILE_APPENDER: &str = "err_log_file";

    let level = LevelFilter::Info;
    let loggers = logger::Builder::new().root_level(level).parse_env(DEFAULT_LOGGER_ENV).parse_expression(filters).build();

    let mut stdout_appender = AppenderSpec::console(CONSOLE_APPENDER, None);
    let mut file_appender = log_dir.map(|x| AppenderSpec::roller(LOG_FILE_APPENDER, None, x, LOG_FILE_NAME));
    let mut err_file_appender =
        log_dir.map(|x| AppenderSpec::roller(ERR_LOG_FILE_APPENDER, Some(LevelFilter::Warn), x, ERR_LOG_FILE_NAME));
    let appenders = once(&mut stdout_appender).chain(&mut file_appender).chain(&mut err_file_appender).map(|x| x.appender());

    let config = Config::builder()
        .appenders(appenders)
        .loggers(loggers.items())
        .build(
            Root::builder()
                .appenders(once(&stdout_appender).chain(&file_appender).chain(&err_file_appender).map(|x| x.name))
                .build(loggers.root_level()),
        )
        .unwrap();

    let _ = log4rs::init_config(config);
}

/// Tries to init the global logger, but does not panic if it was already setup.
/// Intended for tests where several test binaries may race to install the logger.
pub fn try_init_logger(filters: &str) {
    use crate::log::appender::AppenderSpec;
    use log4rs::{config::Root, Config};

    const CONSOLE_APPENDER: &str = "stdout";

    let loggers = logger::Builder::new().root_level(LevelFilter::Info).parse_env(DEFAULT_LOGGER_ENV).parse_expression(filters).build();
    let mut stdout_appender = AppenderSpec::console(CONSOLE_APPENDER, None);
    let config = Config::builder()
        .appender(stdout_appender.appender())
        .loggers(loggers.items())
        .build(Root::builder().appender(CONSOLE_APPENDER).build(loggers.root_level()))
        .unwrap();
    let _ = log4rs::init_config(config);
}

#[macro_export]
macro_rules! trace {
    ($($t:tt)*) => { log::trace!($($t)*) }
}

#[macro_export]
macro_rules! debug {
    ($($t:tt)*) => { log::debug!($($t)*) }
}

#[macro_export]
macro_rules! info {
    ($($t:tt)*) => { log::info!($($t)*) }
}

#[macro_export]
macro_rules! warn {
    ($($t:tt)*) => { log::warn!($($t)*) }
}

#[macro_export]
macro_rules! error {
    ($($t:tt)*) => { log::error!($($t)*) }
}
