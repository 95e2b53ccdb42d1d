//! Reconcile command - check a batch of NF-e XML files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use nfcheck_core::models::report::Report;
use nfcheck_core::{Document, EngineMessage, NfcheckConfig, ProgressEvent, ReconcileEngine};

/// Arguments for the reconcile command.
#[derive(Args)]
pub struct ReconcileArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Write output to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    /// Emit every engine message (progress included) as JSON lines
    #[arg(long)]
    messages: bool,
}

pub async fn run(args: ReconcileArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::config::load(config_path)?;

    let files = gather_files(&args.input, &config)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to reconcile",
        style("ℹ").blue(),
        files.len()
    );
    if files.len() > config.input.large_batch_warning {
        warn!(
            "Batch of {} files exceeds {}; reconciliation may be slow",
            files.len(),
            config.input.large_batch_warning
        );
    }

    let documents = files
        .iter()
        .map(|path| read_document(path))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let pb = ProgressBar::new(documents.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    // Progress sinks must not block, so the engine forwards into an unbounded channel
    let (tx, mut rx) = mpsc::unbounded_channel::<EngineMessage>();
    let engine = ReconcileEngine::new(config.reconcile.clone());
    let handle = tokio::task::spawn_blocking(move || {
        let mut forward = |event: ProgressEvent| {
            let _ = tx.send(EngineMessage::Progress(event));
        };
        engine.run(&documents, &mut forward)
    });

    let mut messages = Vec::new();
    while let Some(message) = rx.recv().await {
        if let EngineMessage::Progress(event) = &message {
            pb.set_position(event.processed as u64);
            pb.set_message(format!("{}%", event.percent));
        }
        if args.messages {
            messages.push(message);
        }
    }

    let outcome = match handle.await {
        Ok(report) => Ok(report),
        Err(e) => {
            error!("Reconciliation aborted: {}", e);
            Err(format!("engine aborted: {}", e))
        }
    };
    pb.finish_and_clear();

    let pretty = config.output.pretty && !args.compact;
    let content = match &outcome {
        _ if args.messages => {
            messages.push(terminal_message(&outcome));
            render_lines(&messages)?
        }
        Ok(report) if pretty => serde_json::to_string_pretty(report)?,
        Ok(report) => serde_json::to_string(report)?,
        Err(_) => String::new(),
    };
    write_output(args.output.as_deref(), &content)?;

    match outcome {
        Ok(report) => {
            print_summary(&report, start);
            Ok(())
        }
        Err(message) => anyhow::bail!("Reconciliation failed: {}", message),
    }
}

fn terminal_message(outcome: &Result<Report, String>) -> EngineMessage {
    match outcome {
        Ok(report) => EngineMessage::Completed {
            report: Box::new(report.clone()),
        },
        Err(message) => EngineMessage::Failed {
            message: message.clone(),
        },
    }
}

/// Expand the pattern and keep regular files with an accepted extension.
fn gather_files(pattern: &str, config: &NfcheckConfig) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = glob(pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| config.accepts_extension(n))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Read a file as text; invalid UTF-8 is replaced rather than rejected.
fn read_document(path: &Path) -> anyhow::Result<Document> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    debug!("Read {} ({} bytes)", name, bytes.len());
    Ok(Document::new(name, String::from_utf8_lossy(&bytes).into_owned()))
}

fn render_lines(messages: &[EngineMessage]) -> anyhow::Result<String> {
    let mut out = String::new();
    for message in messages {
        out.push_str(&serde_json::to_string(message)?);
        out.push('\n');
    }
    Ok(out)
}

fn write_output(path: Option<&Path>, content: &str) -> anyhow::Result<()> {
    if content.is_empty() {
        return Ok(());
    }
    match path {
        Some(path) => {
            fs::write(path, content)?;
            eprintln!(
                "{} Report written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}

fn print_summary(report: &Report, start: Instant) {
    eprintln!();
    eprintln!(
        "{} Reconciled {} documents in {:?}",
        style("✓").green(),
        report.total_processed,
        start.elapsed()
    );
    eprintln!(
        "   declared {} / paid {} / difference {}",
        report.sum_net, report.sum_paid, report.total_difference
    );
    eprintln!(
        "   {} divergences, {} duplicate groups",
        style(report.divergences.len()).yellow(),
        style(report.duplicates.len()).yellow()
    );
    eprintln!(
        "   protocol: {} of {} authorized ({}%), {} missing, {} incomplete",
        report.protocol_status.with_protocol,
        report.protocol_status.total,
        report.percent_with_protocol,
        style(report.protocol_status.missing).red(),
        style(report.protocol_status.incomplete).yellow()
    );

    if report.missing_ranges.is_empty() {
        eprintln!("   no missing numbers");
    } else {
        eprintln!(
            "   missing numbers: {}",
            style(report.missing_ranges.join(", ")).red()
        );
    }

    if report.is_degraded() {
        eprintln!();
        eprintln!(
            "{} Completed with {} document errors:",
            style("⚠").yellow(),
            report.log.errors.len()
        );
        for line in &report.log.errors {
            eprintln!("  - {}", line);
        }
    }
}
