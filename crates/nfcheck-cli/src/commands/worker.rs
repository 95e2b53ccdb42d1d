//! Worker command - a pure message-passing host.
//!
//! Reads one inbound batch request from stdin and writes every outbound
//! message to stdout as one JSON object per line. Request failures are
//! reported in band as a `failed` message; the exit status stays zero.

use std::io::Write;

use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tracing::{debug, error};

use nfcheck_core::{BatchRequest, EngineMessage, NfcheckError, ReconcileEngine};

pub async fn run(config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::config::load(config_path)?;

    let mut input = String::new();
    tokio::io::stdin().read_to_string(&mut input).await?;
    debug!("Received {} bytes on stdin", input.len());

    let request = match BatchRequest::from_json(&input) {
        Ok(request) => request,
        Err(e) => {
            let message = NfcheckError::from(e).to_string();
            return emit(&EngineMessage::Failed { message });
        }
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<EngineMessage>();
    let engine = ReconcileEngine::new(config.reconcile);
    let handle = tokio::task::spawn_blocking(move || {
        engine.dispatch_request(&request, |message| {
            let _ = tx.send(message);
        });
    });

    let mut terminated = false;
    while let Some(message) = rx.recv().await {
        terminated |= message.is_terminal();
        emit(&message)?;
    }

    if let Err(e) = handle.await {
        error!("Worker aborted: {}", e);
        if !terminated {
            emit(&EngineMessage::Failed {
                message: format!("engine aborted: {}", e),
            })?;
        }
    }

    Ok(())
}

fn emit(message: &EngineMessage) -> anyhow::Result<()> {
    let line = serde_json::to_string(message)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", line)?;
    stdout.flush()?;
    Ok(())
}
