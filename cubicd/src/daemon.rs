use std::path::PathBuf;
use std::sync::Arc;

use cubic_consensus::ConsensusWorkflow;
use cubic_core::core::Core;
use cubic_database::prelude::ConnBuilder;
use cubic_ledger::Ledger;
use cubic_mempool::Mempool;
use cubic_notify::EventBus;

use crate::args::Args;
use crate::service::{InboundService, LedgerIngestService};

const DEFAULT_DATA_DIR: &str = "datadir";
const DB_SUBDIR: &str = "db";
const DEFAULT_LOG_DIR: &str = "logs";

fn get_home_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    return dirs::data_local_dir().unwrap();
    #[cfg(not(target_os = "windows"))]
    return dirs::home_dir().unwrap();
}

/// The default application directory, used when `--appdir` is not supplied.
pub fn get_app_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    return get_home_dir().join("cubic-ledger");
    #[cfg(not(target_os = "windows"))]
    return get_home_dir().join(".cubic-ledger");
}

pub fn get_app_dir_from_args(args: &Args) -> PathBuf {
    let app_dir = args
        .appdir
        .clone()
        .unwrap_or_else(|| get_app_dir().to_str().unwrap().to_string())
        .replace('~', get_home_dir().to_str().unwrap());
    if app_dir.is_empty() {
        get_app_dir()
    } else {
        PathBuf::from(app_dir)
    }
}

/// Runtime side-effects applied once, before any service is bound: logging and the
/// process-wide panic hook.
pub struct Runtime {
    #[allow(dead_code)]
    log_dir: Option<String>,
}

impl Runtime {
    pub fn from_args(args: &Args) -> Self {
        let app_dir = get_app_dir_from_args(args);
        let log_dir = if args.no_log_files { None } else { Some(app_dir.join(DEFAULT_LOG_DIR).to_string_lossy().to_string()) };

        cubic_core::log::init_logger(log_dir.as_deref(), &args.log_level);
        cubic_core::panic::configure_panic();

        Self { log_dir }
    }
}

/// Every long-lived handle the daemon needs after start-up: the bound [`Core`] plus
/// the two entry points callers actually submit work through.
pub struct Daemon {
    pub core: Arc<Core>,
    pub workflow: Arc<ConsensusWorkflow>,
    pub ledger: Arc<Ledger>,
}

/// Builds the database, mempool, consensus workflow and ledger, wires the ledger's
/// ingestion service to the consensus workflow's `TxFinalized` notifications, and
/// binds everything to a fresh [`Core`]. The caller still has to call `core.run()`.
pub fn create_core(args: &Args) -> Daemon {
    let _runtime = Runtime::from_args(args);

    let app_dir = get_app_dir_from_args(args);
    let db_path = app_dir.join(DEFAULT_DATA_DIR).join(DB_SUBDIR);
    std::fs::create_dir_all(&db_path).expect("failed to create data directory");
    let db = ConnBuilder::default().with_db_path(db_path).with_parallelism(num_cpus::get()).build().expect("failed to open database");

    let events = EventBus::new();
    let mempool = Mempool::new(db.clone());

    let workflow = Arc::new(ConsensusWorkflow::new(mempool, events.clone()).with_required_validations(args.required_validations));
    workflow.set_validator_set(args.validators.clone());

    let ledger = Arc::new(Ledger::new(db, events.clone()));

    let core = Arc::new(Core::new());
    core.bind(LedgerIngestService::new(workflow.clone(), ledger.clone(), events));
    core.bind(InboundService::new(workflow.clone()));

    Daemon { core, workflow, ledger }
}
