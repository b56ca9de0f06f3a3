use cubic_consensus::ConsensusWorkflow;
use cubic_ledger::Ledger;
use cubic_notify::{EventBus, Notification};
use futures::{select, FutureExt};
use std::sync::Arc;
use std::thread::JoinHandle;
use triggered::{Listener, Trigger};

use cubic_core::core::Core;
use cubic_core::service::Service;
use cubic_core::trace;

/// Drives the back half of the pipeline no external collaborator is in scope to
/// drive: promotes every `tx:processing` straight to `tx:finalized` (§6 leaves
/// `finalize` as an explicit call with no automatic trigger — a real deployment
/// would gate this on a finality collaborator instead), then feeds every
/// `tx:finalized` into the ledger's aggregation engine.
pub struct LedgerIngestService {
    workflow: Arc<ConsensusWorkflow>,
    ledger: Arc<Ledger>,
    events: EventBus,
    shutdown_trigger: Trigger,
    shutdown_listener: Listener,
}

impl LedgerIngestService {
    pub fn new(workflow: Arc<ConsensusWorkflow>, ledger: Arc<Ledger>, events: EventBus) -> Arc<Self> {
        let (shutdown_trigger, shutdown_listener) = triggered::trigger();
        Arc::new(Self { workflow, ledger, events, shutdown_trigger, shutdown_listener })
    }

    async fn run(&self) {
        let recv = self.events.subscribe(256);
        let shutdown_listener = self.shutdown_listener.clone();
        loop {
            select! {
                _shutdown_signal = shutdown_listener.clone().fuse() => break,
                notification = recv.recv().fuse() => match notification {
                    Ok(Notification::TxProcessing(processing)) => {
                        self.workflow.finalize(processing.validated_hash);
                    }
                    Ok(Notification::TxFinalized(finalized)) => {
                        if let Err(err) = self.ledger.admit(finalized.tx_data.clone()) {
                            log::error!("ledger rejected finalized transaction {}: {err}", finalized.validated_hash);
                        }
                    }
                    Ok(_) => {}
                    Err(_) => break,
                },
            };
        }
    }
}

impl Service for LedgerIngestService {
    fn ident(self: Arc<Self>) -> &'static str {
        "ledger-ingest"
    }

    fn start(self: Arc<Self>, _core: Arc<Core>) -> Vec<JoinHandle<()>> {
        let service = self;
        vec![std::thread::Builder::new()
            .name("ledger-ingest".to_string())
            .spawn(move || {
                let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().expect("failed to build tokio runtime");
                trace!("ledger-ingest service started");
                runtime.block_on(service.run());
                trace!("ledger-ingest service stopped");
            })
            .expect("failed to spawn ledger-ingest thread")]
    }

    fn stop(self: Arc<Self>) {
        self.shutdown_trigger.trigger();
    }
}

/// One request per line of stdin, tagged by `kind`. Stands in for the pluggable
/// transport collaborator (§6's `on(topic, handler)` / inbound validator-report
/// interface), neither of which has a concrete implementation in scope: a real
/// deployment would replace this with gossip subscriptions, not a second stdin reader.
pub struct InboundService {
    workflow: Arc<ConsensusWorkflow>,
}

#[derive(serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum InboundLine {
    Submit { leader_id: String, tx: serde_json::Value },
    Validate { raw_tx_id: String, task_name: String, timestamp_ns: u64, validator_id: String },
}

impl InboundService {
    pub fn new(workflow: Arc<ConsensusWorkflow>) -> Arc<Self> {
        Arc::new(Self { workflow })
    }
}

impl Service for InboundService {
    fn ident(self: Arc<Self>) -> &'static str {
        "inbound"
    }

    fn start(self: Arc<Self>, _core: Arc<Core>) -> Vec<JoinHandle<()>> {
        let service = self;
        vec![std::thread::Builder::new()
            .name("inbound".to_string())
            .spawn(move || {
                use std::io::BufRead;
                use std::str::FromStr;

                trace!("inbound service started, reading transactions from stdin");
                for line in std::io::stdin().lock().lines() {
                    let Ok(line) = line else { break };
                    if line.trim().is_empty() {
                        continue;
                    }
                    let inbound: InboundLine = match serde_json::from_str(&line) {
                        Ok(inbound) => inbound,
                        Err(err) => {
                            log::warn!("ignoring malformed inbound line: {err}");
                            continue;
                        }
                    };
                    match inbound {
                        InboundLine::Submit { leader_id, tx } => match service.workflow.submit(&leader_id, tx) {
                            Ok(raw_tx_id) => log::info!("submitted {raw_tx_id} for leader {leader_id}"),
                            Err(err) => log::warn!("rejected submission from leader {leader_id}: {err}"),
                        },
                        InboundLine::Validate { raw_tx_id, task_name, timestamp_ns, validator_id } => {
                            match cubic_hashes::Hash::from_str(&raw_tx_id) {
                                Ok(raw_tx_id) => service.workflow.complete_validation(raw_tx_id, &task_name, timestamp_ns, &validator_id),
                                Err(err) => log::warn!("ignoring validation report with malformed raw_tx_id: {err}"),
                            }
                        }
                    }
                }
                trace!("inbound service stopped (stdin closed)");
            })
            .expect("failed to spawn inbound thread")]
    }

    fn stop(self: Arc<Self>) {
        // stdin has no portable interrupt; the thread exits once stdin closes (EOF on shutdown).
    }
}
