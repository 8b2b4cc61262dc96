//! `notebook_server`: serves the notebook over JSON-RPC.

use log::{error, info};
use notebook_core::{init_logging, DocumentStore, FileNoteRepository, WikipediaLookup};
use notebook_rpc::{NotebookApi, RpcServer, ServerConfig, METHODS};
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("notebook_server: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config.log_level, config.log_dir.as_deref()) {
        eprintln!("notebook_server: {err}");
        return ExitCode::FAILURE;
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=server_exit module=main status=error error={err}");
            eprintln!("notebook_server: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &ServerConfig) -> Result<(), String> {
    let store = DocumentStore::open(&config.notebook_file).map_err(|err| err.to_string())?;
    info!(
        "event=store_ready module=main status=ok path={}",
        store.path().display()
    );

    let lookup = WikipediaLookup::new(config.lookup_endpoint.clone(), config.lookup_timeout)
        .map_err(|err| err.to_string())?;
    let repo = Arc::new(FileNoteRepository::new(Arc::new(store)));
    let api = Arc::new(NotebookApi::new(repo, Arc::new(lookup)));

    let server = RpcServer::start(config.bind_addr, config.workers, api)
        .map_err(|err| format!("failed to bind {}: {err}", config.bind_addr))?;
    info!("event=server_methods module=main methods={}", METHODS.join(","));
    println!(
        "notebook_server listening on {}",
        server
            .local_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| config.bind_addr.to_string())
    );
    server.join();
    Ok(())
}
