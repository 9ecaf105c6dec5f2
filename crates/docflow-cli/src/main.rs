//! docflow command line: run documents through the workflow and print the
//! final state records as JSON.
//!
//! Usage:
//!   docflow <config.json> [file ...]
//!
//! With explicit file arguments only those documents run; otherwise the
//! configured input directory is scanned once and every document in it runs.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use docflow::{
    ai, load_config, DirectoryScanner, DocflowError, RunRequest, RunStore, WorkerPool,
    WorkflowEngine,
};

fn main() -> ExitCode {
    // Bridge log-macro records from the library into tracing.
    let _ = tracing_log::LogTracer::init();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let Some(config_path) = args.next() else {
        eprintln!("usage: docflow <config.json> [file ...]");
        return ExitCode::FAILURE;
    };
    let files: Vec<PathBuf> = args.map(PathBuf::from).collect();

    match run(&config_path, files) {
        Ok(failures) if failures == 0 => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Runs every requested document and returns the count of fatally failed runs.
fn run(config_path: &str, files: Vec<PathBuf>) -> Result<usize, DocflowError> {
    let config = load_config(config_path)?;
    let (classifier, extractor) = ai::build_analyst(&config.analyst)?;
    let engine = WorkflowEngine::new(classifier, extractor)?;
    let store = Arc::new(RunStore::new());

    let requests: Vec<RunRequest> = if files.is_empty() {
        DirectoryScanner::new(&config.input_directory).scan()?
    } else {
        files.into_iter().map(RunRequest::new).collect()
    };

    if requests.is_empty() {
        warn!("nothing to process in {}", config.input_directory);
        return Ok(0);
    }

    info!(
        documents = requests.len(),
        workers = config.worker_count,
        "starting run"
    );

    let pool = WorkerPool::new(engine, Arc::clone(&store), config.worker_count);

    let total = requests.len();
    for request in requests {
        pool.submit(&store, request)?;
    }

    let mut reviewed = 0usize;
    let mut failed = 0usize;
    for _ in 0..total {
        let Some(outcome) = pool.recv_outcome() else {
            break;
        };
        if outcome.needs_review {
            reviewed += 1;
        }
        if !outcome.success {
            failed += 1;
        }

        if let Some(run) = store.get(&outcome.doc_id) {
            match serde_json::to_string_pretty(&run) {
                Ok(json) => println!("{}", json),
                Err(e) => warn!(doc_id = %outcome.doc_id, "could not serialize run: {}", e),
            }
        }
    }

    pool.shutdown();
    pool.wait();

    info!(
        processed = total,
        flagged_for_review = reviewed,
        failed, "run finished"
    );
    Ok(failed)
}
