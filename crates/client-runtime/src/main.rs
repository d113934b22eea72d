//! # vidledger
//!
//! Command-line client for the FreeVideos on-chain catalog. Connects a
//! local key as the wallet, mirrors the catalog from the configured node,
//! and records new videos through the content store and the ledger
//! contract.
//!
//! ## Commands
//!
//! - `status` - session, balance, and recent notifications
//! - `list`   - the catalog, newest first, with playback links
//! - `upload` - store a file and record it on the ledger
//! - `watch`  - follow catalog and session events until interrupted
//!
//! Configuration comes from `VL_*` environment variables; see
//! [`RuntimeConfig::from_env`].

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_runtime::{ClientRuntime, RuntimeConfig};
use shared_bus::events::{ClientEvent, EventFilter, EventTopic};
use shared_evm::units::format_ether;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Containers the ledger is normally fed with. Anything else still
/// uploads; the pipeline is payload-agnostic.
const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "mkv", "ogg", "wmv"];

/// Command-line client for the FreeVideos on-chain catalog.
#[derive(Parser, Debug)]
#[command(name = "vidledger")]
#[command(about = "Wallet-connected client for the FreeVideos on-chain video catalog")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Connect and show the session, balance, and recent notifications
    Status,
    /// Load the catalog and list every video, newest first
    List,
    /// Store a video file and record it on the ledger
    Upload {
        /// Title recorded on chain
        #[arg(short, long)]
        title: String,
        /// Path of the video file
        file: PathBuf,
    },
    /// Follow the catalog live, printing appends as they land
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = RuntimeConfig::from_env()?;
    let runtime = ClientRuntime::new(config)?;

    let outcome = match args.command {
        Command::Status => status(&runtime).await,
        Command::List => list(&runtime).await,
        Command::Upload { title, file } => upload(&runtime, &title, &file).await,
        Command::Watch => watch(&runtime).await,
    };

    runtime.shutdown().await;
    outcome
}

/// Show the connected account, its balance, and the notification log.
async fn status(runtime: &ClientRuntime) -> Result<()> {
    let session = runtime.start().await?;
    let info = session.info();

    println!("account:  {:#x}", info.account);
    println!("network:  {} (chain {})", info.network_label, info.chain_id);
    println!("contract: {:#x}", info.contract_address);

    match runtime.sessions().refresh_balance().await? {
        Some(wei) => println!("balance:  {} ETH", format_ether(wei)),
        None => println!("balance:  unavailable"),
    }

    let notices = runtime.sessions().notifications();
    if !notices.is_empty() {
        println!("\nnotifications:");
        for notice in notices {
            println!("  [{}] {}", notice.code, notice.message);
        }
    }
    Ok(())
}

/// Print the catalog, newest first, with playback links.
async fn list(runtime: &ClientRuntime) -> Result<()> {
    runtime.start().await?;

    let videos = runtime.ledger().videos().await;
    if videos.is_empty() {
        println!("the catalog is empty");
        return Ok(());
    }

    let gateway = runtime.uploads().config().gateway_base.clone();
    for video in videos {
        println!("#{}  {}", video.id, video.title);
        println!("    author: {:#x}", video.author);
        println!("    watch:  {}", video.gateway_url(&gateway));
    }
    Ok(())
}

/// Store the file's bytes and record them on the ledger, reporting each
/// phase as it happens.
async fn upload(runtime: &ClientRuntime, title: &str, file: &PathBuf) -> Result<()> {
    runtime.start().await?;

    let extension = file
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    if !matches!(extension.as_deref(), Some(ext) if VIDEO_EXTENSIONS.contains(&ext)) {
        warn!("{} does not look like a video file, uploading anyway", file.display());
    }

    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    println!("uploading {} ({} bytes)", file.display(), bytes.len());

    let uploads = runtime.uploads();
    uploads.buffer_video(bytes).await;

    let mut sub = runtime
        .bus()
        .subscribe(EventFilter::topics(vec![EventTopic::Upload]));
    let progress = tokio::spawn(async move {
        while let Some(event) = sub.recv().await {
            match event {
                ClientEvent::UploadPhaseChanged { phase, .. } => println!("  {phase}..."),
                ClientEvent::UploadConfirmed { .. } | ClientEvent::UploadFailed { .. } => break,
                _ => {}
            }
        }
    });

    let video = uploads.submit(title).await?;
    let _ = progress.await;

    let gateway = uploads.config().gateway_base.clone();
    println!("recorded as video #{}", video.id);
    println!("  watch: {}", video.gateway_url(&gateway));
    Ok(())
}

/// Stream events until Ctrl+C.
async fn watch(runtime: &ClientRuntime) -> Result<()> {
    runtime.start().await?;
    println!(
        "watching {} videos, Ctrl+C to stop",
        runtime.ledger().video_count().await
    );

    let mut sub = runtime.bus().subscribe(EventFilter::all());
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = sub.recv() => match event {
                Some(event) => println!("{}", describe(&event)),
                None => break,
            },
        }
    }
    Ok(())
}

/// One human-readable line per event.
fn describe(event: &ClientEvent) -> String {
    match event {
        ClientEvent::SessionEstablished(info) => {
            format!("session established: {:#x} on {}", info.account, info.network_label)
        }
        ClientEvent::SessionClosed { account } => format!("session closed: {account:#x}"),
        ClientEvent::BalanceUpdated {
            balance_wei: Some(wei),
            ..
        } => format!("balance: {} ETH", format_ether(*wei)),
        ClientEvent::BalanceUpdated {
            balance_wei: None, ..
        } => "balance unavailable".to_string(),
        ClientEvent::LedgerLoaded {
            count,
            block_number,
        } => format!("catalog loaded: {count} videos at block {block_number}"),
        ClientEvent::VideoAppended {
            video,
            block_number,
        } => format!(
            "new video #{}: \"{}\" by {:#x} (block {block_number})",
            video.id, video.title, video.author
        ),
        ClientEvent::UploadPhaseChanged { phase, .. } => format!("upload phase: {phase}"),
        ClientEvent::UploadConfirmed { video, .. } => {
            format!("upload confirmed as video #{}", video.id)
        }
        ClientEvent::UploadFailed { error, .. } => format!("upload failed: {error}"),
        ClientEvent::NotificationRaised { notification, .. } => {
            format!("notice: {}", notification.message)
        }
        ClientEvent::CriticalError {
            subsystem_id,
            error,
        } => format!("subsystem {subsystem_id} reported: {error}"),
    }
}
