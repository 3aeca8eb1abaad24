use anyhow::Result;
use clap::Parser;
use confab_core::logging::{init_logging_with_config, LogConfig, LogLevel};
use confab_core::shutdown::install_signal_handlers;
use confab_core::{Clock, PeerEvent, PeerRegistry, SharedLog, ShutdownCoordinator, SyncConfig};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "confab")]
#[command(author, version, about = "Peer-replicated chat log", long_about = None)]
struct Args {
    /// Name to author local messages as
    author: String,

    /// Address to accept peer connections on
    #[arg(short, long, default_value = "127.0.0.1:7341")]
    listen: String,

    /// Peer to dial at startup (repeatable, host:port)
    #[arg(short, long = "peer")]
    peers: Vec<String>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Enable JSON formatted logging
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = LogLevel::from_str(&args.log_level).unwrap_or_else(|| {
        eprintln!("Invalid log level '{}', using 'info'", args.log_level);
        LogLevel::Info
    });
    init_logging_with_config(LogConfig::new(log_level).json_format(args.json_logs))?;
    confab_core::metrics::init_metrics();

    let config = SyncConfig::from_env()?;
    let log = SharedLog::new();
    let (registry, events) = PeerRegistry::new(log.clone(), config.clone());
    let coordinator = ShutdownCoordinator::new();
    install_signal_handlers(coordinator.clone());

    let bound = registry.listen(&args.listen).await?;
    info!(addr = %bound, author = %args.author, "confab node up");

    for peer in &args.peers {
        if let Err(e) = registry.dial(peer).await {
            warn!(peer = %peer, error = %e, "could not reach peer");
        }
    }

    spawn_peer_event_logger(events);
    spawn_display(log.clone(), config.display_interval, coordinator.clone());

    read_input(&args.author, &log, &coordinator).await?;

    registry.shutdown().await;
    coordinator.mark_complete().await;
    Ok(())
}

/// Feed stdin lines into the log until EOF or shutdown. Blank lines are
/// dropped; everything else becomes an entry verbatim.
async fn read_input(
    author: &str,
    log: &SharedLog,
    coordinator: &ShutdownCoordinator,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shutdown_rx = coordinator.subscribe();

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    let text = line.trim();
                    if text.is_empty() {
                        continue;
                    }
                    let clock = log.append(author, text).await;
                    debug!(clock = %clock, "entry appended");
                }
                None => {
                    info!("input closed");
                    coordinator.shutdown().await;
                    return Ok(());
                }
            },
            _ = shutdown_rx.recv() => return Ok(()),
        }
    }
}

/// Print new entries as they become visible, own ones included. Stdout is
/// the conversation; diagnostics stay on stderr.
fn spawn_display(log: SharedLog, period: Duration, coordinator: ShutdownCoordinator) {
    tokio::spawn(async move {
        let mut shutdown_rx = coordinator.subscribe();
        let mut ticker = interval(period);
        let mut cursor = Clock::ZERO;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let fresh = log.since(cursor).await;
                    cursor = cursor.merge(fresh.last_message_at());
                    for entry in fresh.entries() {
                        println!("{} :: {}", entry.author, entry.text);
                    }
                }
                _ = shutdown_rx.recv() => break,
            }
        }
    });
}

fn spawn_peer_event_logger(mut events: mpsc::Receiver<PeerEvent>) {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                PeerEvent::Connected { conn_id, peer } => {
                    info!(conn_id, peer = %peer, "peer joined")
                }
                PeerEvent::Disconnected { conn_id, peer } => {
                    info!(conn_id, peer = %peer, "peer left")
                }
            }
        }
    });
}
