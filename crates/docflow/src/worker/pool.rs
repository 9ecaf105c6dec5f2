use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, error, info};
use tokio::sync::broadcast;

use crate::error::WorkerError;
use crate::progress::{BroadcastProgress, NoopProgress, ProgressEvent, ProgressReporter,
    RunPhase, RunProgressEvent};
use crate::store::RunStore;
use crate::worker::job::{RunOutcome, RunRequest};
use crate::workflow::WorkflowEngine;

pub struct WorkerPool {
    request_sender: Sender<RunRequest>,
    outcome_receiver: Receiver<RunOutcome>,
    workers: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    /// Kept to hold the channel open for late subscribers; workers use
    /// cloned Arcs.
    #[allow(dead_code)]
    progress_sender: Option<Arc<broadcast::Sender<RunProgressEvent>>>,
}

impl WorkerPool {
    pub fn new(engine: WorkflowEngine, store: Arc<RunStore>, worker_count: usize) -> Self {
        Self::with_progress_sender(engine, store, worker_count, None)
    }

    /// Creates a worker pool with an optional run progress broadcaster.
    ///
    /// # Panics
    /// Panics if `worker_count` is 0.
    pub fn with_progress_sender(
        engine: WorkflowEngine,
        store: Arc<RunStore>,
        worker_count: usize,
        progress_sender: Option<Arc<broadcast::Sender<RunProgressEvent>>>,
    ) -> Self {
        assert!(worker_count > 0, "worker_count must be > 0");
        let (request_sender, request_receiver) = bounded::<RunRequest>(worker_count * 2);
        let (outcome_sender, outcome_receiver) = bounded::<RunOutcome>(worker_count * 2);
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(worker_count);

        for worker_id in 0..worker_count {
            let request_rx = request_receiver.clone();
            let outcome_tx = outcome_sender.clone();
            let shutdown_flag = Arc::clone(&shutdown);
            let worker_engine = engine.clone();
            let worker_store = Arc::clone(&store);
            let sender = progress_sender.clone();

            let handle = thread::spawn(move || {
                run_worker(
                    worker_id,
                    request_rx,
                    outcome_tx,
                    shutdown_flag,
                    worker_engine,
                    worker_store,
                    sender,
                );
            });

            workers.push(handle);
        }

        info!("Started {} workers", worker_count);

        Self {
            request_sender,
            outcome_receiver,
            workers,
            shutdown,
            progress_sender,
        }
    }

    /// Enqueues a run and records it in the store.
    pub fn submit(&self, store: &RunStore, request: RunRequest) -> Result<(), WorkerError> {
        if self.shutdown.load(Ordering::Relaxed) {
            return Err(WorkerError::ChannelClosed);
        }

        store.mark_queued(&request.doc_id, &request.filename());
        self.request_sender
            .send(request)
            .map_err(|_| WorkerError::ChannelClosed)
    }

    pub fn try_recv_outcome(&self) -> Option<RunOutcome> {
        self.outcome_receiver.try_recv().ok()
    }

    pub fn recv_outcome(&self) -> Option<RunOutcome> {
        self.outcome_receiver.recv().ok()
    }

    pub fn shutdown(&self) {
        info!("Shutting down worker pool...");
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Drops the submit side and joins every worker.
    pub fn wait(self) {
        drop(self.request_sender);

        for (i, worker) in self.workers.into_iter().enumerate() {
            if let Err(e) = worker.join() {
                error!("Worker {} panicked: {:?}", i, e);
            } else {
                debug!("Worker {} finished", i);
            }
        }

        info!("All workers have stopped");
    }
}

fn run_worker(
    worker_id: usize,
    request_receiver: Receiver<RunRequest>,
    outcome_sender: Sender<RunOutcome>,
    shutdown: Arc<AtomicBool>,
    engine: WorkflowEngine,
    store: Arc<RunStore>,
    progress_sender: Option<Arc<broadcast::Sender<RunProgressEvent>>>,
) {
    debug!("Worker {} started", worker_id);

    loop {
        if shutdown.load(Ordering::Relaxed) {
            debug!("Worker {} received shutdown signal", worker_id);
            break;
        }

        match request_receiver.recv_timeout(std::time::Duration::from_millis(100)) {
            Ok(request) => {
                debug!(
                    "Worker {} processing run: {:?}",
                    worker_id, request.source_path
                );
                store.mark_processing(&request.doc_id);

                let outcome = if let Some(ref sender) = progress_sender {
                    let progress = BroadcastProgress::new(
                        &request.doc_id,
                        &request.filename(),
                        Arc::clone(sender),
                    );
                    progress.report(ProgressEvent::Phase {
                        phase: RunPhase::Queued,
                        message: "Run queued for processing".to_string(),
                    });
                    execute(&engine, &request, &progress)
                } else {
                    execute(&engine, &request, &NoopProgress)
                };

                match &outcome {
                    RunOutcome {
                        success: true,
                        state: Some(state),
                        ..
                    } => store.complete(&request.doc_id, state.clone()),
                    RunOutcome {
                        error: Some(error), ..
                    } => store.fail(&request.doc_id, error),
                    _ => {}
                }

                if let Err(e) = outcome_sender.send(outcome) {
                    error!("Worker {} failed to send outcome: {}", worker_id, e);
                    break;
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                continue;
            }
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                debug!("Worker {} request channel disconnected", worker_id);
                break;
            }
        }
    }

    debug!("Worker {} stopped", worker_id);
}

fn execute(
    engine: &WorkflowEngine,
    request: &RunRequest,
    progress: &dyn ProgressReporter,
) -> RunOutcome {
    match engine.process(&request.doc_id, &request.source_path, progress) {
        Ok(state) => RunOutcome::success(request, state),
        Err(error) => {
            // The fatal misconfiguration class: surface it, don't mask it.
            error!("Run {} failed: {}", request.doc_id, error);
            progress.report(ProgressEvent::Failed {
                error: error.to_string(),
            });
            RunOutcome::failure(request, error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use crate::ai::KeywordAnalyst;

    fn test_engine() -> WorkflowEngine {
        let analyst = Arc::new(KeywordAnalyst::new());
        WorkflowEngine::new(analyst.clone(), analyst).unwrap()
    }

    fn write_doc(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", body).unwrap();
        path
    }

    #[test]
    fn pool_processes_submitted_runs() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(
            &dir,
            "invoice.txt",
            "INVOICE number INV-1\nBill to: X\nSubtotal: $80.00\nTax: $20.00\nTotal due: $100.00\nPayment due soon.",
        );

        let store = Arc::new(RunStore::new());
        let pool = WorkerPool::new(test_engine(), Arc::clone(&store), 2);

        let request = RunRequest::new(path);
        let doc_id = request.doc_id.clone();
        pool.submit(&store, request).unwrap();

        let outcome = pool.recv_outcome().expect("outcome");
        assert!(outcome.success);
        assert_eq!(outcome.doc_id, doc_id);

        let stored = store.get(&doc_id).unwrap();
        assert!(stored.final_state.is_some());

        pool.shutdown();
        pool.wait();
    }

    #[test]
    fn submit_after_shutdown_is_rejected() {
        let store = Arc::new(RunStore::new());
        let pool = WorkerPool::new(test_engine(), Arc::clone(&store), 1);
        pool.shutdown();

        let request = RunRequest::new(PathBuf::from("/tmp/whatever.txt"));
        assert!(matches!(
            pool.submit(&store, request),
            Err(WorkerError::ChannelClosed)
        ));
        pool.wait();
    }
}
