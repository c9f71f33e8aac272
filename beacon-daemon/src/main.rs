//! `beacond`: drives the beaconing analyzer pipeline end to end against
//! a JSON-lines pair-input file, emitting scored output as JSON lines.
//!
//! Log parsing/normalization and durable persistence are out of scope
//! (spec §1) — this binary's `PairSource`/`OutputSink` are thin
//! pass-throughs over a wire format this crate already owns, not a
//! Bro/Zeek log reader or a database writer. Its job is to prove out
//! the worker pool, config, logging, and metrics around the scoring
//! kernel.

mod config;
mod error;
mod io;
mod metrics;
mod pipeline;

use std::sync::Arc;

use clap::Parser;
use config::Args;
use io::{JsonLinesSink, JsonLinesSource, OutputSink, PairSource};
use metrics::BeaconMetrics;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => std::process::exit(exitcode::OK),
        Err(err) => {
            tracing::error!(error = %err, "beacond exiting");
            std::process::exit(exitcode::SOFTWARE);
        }
    }
}

async fn run(args: Args) -> Result<(), error::DaemonError> {
    let config = args.resolve_config()?;
    tracing::info!(
        default_connection_thresh = config.default_connection_thresh,
        worker_count = config.worker_count,
        "starting beacon analyzer pipeline"
    );

    let mut source = JsonLinesSource::open(&args.input).await?;
    let window = source.global_window().await?;

    let metrics = Arc::new(BeaconMetrics::new());
    if let Some(addr) = args.metrics_addr {
        spawn_metrics_server(addr, Arc::clone(&metrics));
    }

    let (analysis_tx, analysis_rx) = pipeline::analysis_channel();
    let (write_tx, write_rx) = pipeline::write_channel();

    let pool = pipeline::ScorerPool::spawn(
        config.worker_count,
        analysis_rx,
        write_tx,
        window,
        config.to_scorer_config(),
        Arc::clone(&metrics),
    );

    let sink_handle = tokio::spawn(drain_to_sink(args.output.clone(), write_rx));

    while let Some(pair) = source.recv().await? {
        if analysis_tx.send(pair).await.is_err() {
            tracing::warn!("scorer pool stopped accepting pairs before the grouper finished");
            break;
        }
    }
    drop(analysis_tx);

    pool.join().await;
    sink_handle.await.expect("sink task panicked")?;

    Ok(())
}

async fn drain_to_sink(
    output_path: Option<std::path::PathBuf>,
    mut write_rx: pipeline::WriteReceiver,
) -> Result<(), error::DaemonError> {
    let mut sink: Box<dyn OutputSink> = match output_path {
        Some(path) => Box::new(JsonLinesSink::create(&path).await?),
        None => Box::new(JsonLinesSink::stdout()),
    };

    while let Some(output) = write_rx.recv().await {
        sink.send(output).await?;
    }
    Ok(())
}

fn spawn_metrics_server(addr: std::net::SocketAddr, metrics: Arc<BeaconMetrics>) {
    tokio::spawn(async move {
        let listener = match tokio::net::TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(err) => {
                tracing::error!(%addr, error = %err, "failed to bind metrics listener");
                return;
            }
        };
        tracing::info!(%addr, "serving metrics");

        loop {
            let (mut stream, _) = match listener.accept().await {
                Ok(pair) => pair,
                Err(err) => {
                    tracing::warn!(error = %err, "metrics listener accept failed");
                    continue;
                }
            };
            let metrics = Arc::clone(&metrics);
            tokio::spawn(async move {
                use tokio::io::AsyncWriteExt;
                let body = metrics.encode().unwrap_or_default();
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: text/plain; version=0.0.4\r\ncontent-length: {}\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
            });
        }
    });
}
