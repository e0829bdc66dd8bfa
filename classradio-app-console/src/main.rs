mod commands;
mod identity;

use crate::commands::{Command, USAGE};
use classradio_core::{
    spotify, CoreError, NowPlaying, QueueCoordinator, QueuedTrack, RadioConfig, StoreEvent,
    VoterId,
};
use classradio_store_sqlite::SqliteQueueStore;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match RadioConfig::load_or_create() {
        Ok(config) => config,
        Err(CoreError::ConfigNotFound { path }) => {
            println!(
                "Created a config template at {}. Edit it and start again.",
                path.display()
            );
            return;
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let store = match SqliteQueueStore::open(
        &config.database_path(),
        config.events.channel_capacity,
    )
    .await
    {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!("Failed to open queue database: {e}");
            std::process::exit(1);
        }
    };

    let voter = match identity::load_or_create() {
        Ok(voter) => voter,
        Err(e) => {
            error!("Failed to load voter identity: {e}");
            std::process::exit(1);
        }
    };

    let coordinator = Arc::new(QueueCoordinator::new(store.clone()));

    // Shared token so Ctrl+C stops both the console loop and the event
    // printer
    let cancel_token = CancellationToken::new();
    let ctrlc_token = cancel_token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C, shutting down gracefully...");
        ctrlc_token.cancel();
    }) {
        error!("Failed to set Ctrl+C handler: {e}");
    }

    tokio::spawn(print_store_events(
        coordinator.clone(),
        cancel_token.clone(),
    ));

    println!("{} console - type 'help' for commands", config.station.name);
    run_console(&coordinator, &voter, &cancel_token).await;

    if let Err(e) = store.checkpoint().await {
        warn!("WAL checkpoint failed on shutdown: {e}");
    }
}

/// Read commands from stdin until quit or cancellation.
async fn run_console(
    coordinator: &QueueCoordinator,
    voter: &VoterId,
    cancel_token: &CancellationToken,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            () = cancel_token.cancelled() => break,
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        let command = match Command::parse(&line) {
                            Ok(Some(command)) => command,
                            Ok(None) => continue,
                            Err(message) => {
                                println!("{message}");
                                continue;
                            }
                        };
                        if !execute(coordinator, voter, command).await {
                            break;
                        }
                    }
                    Ok(None) => break, // stdin closed
                    Err(e) => {
                        error!("Failed to read console input: {e}");
                        break;
                    }
                }
            }
        }
    }
}

/// Run one command. Returns `false` when the console should exit.
async fn execute(coordinator: &QueueCoordinator, voter: &VoterId, command: Command) -> bool {
    match command {
        Command::Help => println!("{USAGE}"),
        Command::Quit => return false,
        Command::Queue => match coordinator.list_queue().await {
            Ok(queue) => print_queue(&queue),
            Err(e) => println!("error: {e}"),
        },
        Command::Submit(args) => {
            if !spotify::is_track_url(&args.spotify_url) {
                println!("that doesn't look like a Spotify track link");
                return true;
            }
            match coordinator.submit_track(args.into()).await {
                Ok(track) => println!("queued: {} - {}", track.artist, track.title),
                Err(e) => println!("error: {e}"),
            }
        }
        Command::Vote { position } => match track_at_position(coordinator, position).await {
            Ok(track) => match coordinator.vote(&track.id, voter).await {
                Ok(votes) => println!("{} now has {votes} vote(s)", track.title),
                // Expected outcome, not an error: surface as feedback
                Err(CoreError::AlreadyVoted) => {
                    println!("you already voted for {}", track.title);
                }
                Err(e) => println!("error: {e}"),
            },
            Err(message) => println!("{message}"),
        },
        Command::Play { position } => match track_at_position(coordinator, position).await {
            Ok(track) => match coordinator.play(&track.id).await {
                Ok(entry) => print_now_playing(&entry),
                Err(e) => println!("error: {e}"),
            },
            Err(message) => println!("{message}"),
        },
        Command::Stop => match coordinator.stop().await {
            Ok(()) => println!("broadcast stopped"),
            Err(e) => println!("error: {e}"),
        },
        Command::NowPlaying => match coordinator.now_playing().await {
            Ok(Some(entry)) => print_now_playing(&entry),
            Ok(None) => println!("nothing is playing"),
            Err(e) => println!("error: {e}"),
        },
    }
    true
}

/// Resolve a 1-based queue position against a fresh queue snapshot.
async fn track_at_position(
    coordinator: &QueueCoordinator,
    position: usize,
) -> Result<QueuedTrack, String> {
    let queue = coordinator
        .list_queue()
        .await
        .map_err(|e| format!("error: {e}"))?;
    queue
        .get(position - 1)
        .cloned()
        .ok_or_else(|| format!("no queue entry #{position} ({} queued)", queue.len()))
}

fn print_queue(queue: &[QueuedTrack]) {
    if queue.is_empty() {
        println!("queue is empty");
        return;
    }
    for (index, track) in queue.iter().enumerate() {
        println!(
            "#{:<3} [{:>3} votes] {} - {} (submitted by {})",
            index + 1,
            track.votes,
            track.artist,
            track.title,
            track.submitted_by
        );
    }
}

fn print_now_playing(entry: &NowPlaying) {
    println!(
        "now playing: {} - {} (since {})",
        entry.artist,
        entry.title,
        entry.started_at.format("%H:%M:%S")
    );
    if let Some(embed) = spotify::embed_url(&entry.spotify_url) {
        println!("listen: {embed}");
    }
}

/// Print store change notifications as they arrive, so the console
/// reflects what other devices do without polling.
async fn print_store_events(coordinator: Arc<QueueCoordinator>, cancel_token: CancellationToken) {
    let mut rx = coordinator.subscribe();

    loop {
        tokio::select! {
            () = cancel_token.cancelled() => break,
            event = rx.recv() => {
                match event {
                    Ok(StoreEvent::TrackSubmitted { track }) => {
                        info!(
                            "Track queued: {} - {} (submitted by {})",
                            track.artist, track.title, track.submitted_by
                        );
                    }
                    Ok(StoreEvent::VoteRecorded { queue_id, votes }) => {
                        info!("Vote recorded for {queue_id}: now {votes}");
                    }
                    Ok(StoreEvent::NowPlayingChanged { entry }) => {
                        info!("Now playing: {} - {}", entry.artist, entry.title);
                    }
                    Ok(StoreEvent::NowPlayingCleared) => {
                        info!("Broadcast stopped");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        info!("Store event channel closed");
                        break;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        info!("Missed {n} store events");
                    }
                }
            }
        }
    }
}

/// Initialize tracing with console output
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
