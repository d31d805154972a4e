use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use ariaconfig::Config;
use ariamusic::Aria;
use ariaplayer::Mode;
use ariasource::Track;

const PLAYABLE_SCHEMES: &[&str] = &["http", "https", "rtmp", "rtsp"];

#[derive(Parser)]
#[command(name = "aria", about = "Multi-service music playback", version)]
struct Cli {
    /// Configuration directory (defaults to ~/.aria)
    #[arg(long, default_value = "")]
    config_dir: String,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Play a URL or a free-text search query
    Play {
        /// URL or search terms
        target: Vec<String>,
        /// Shuffle the resolved track list
        #[arg(long)]
        random: bool,
        /// Volume to apply before playback starts
        #[arg(long)]
        volume: Option<u32>,
    },
    /// Search the current (or a specific) service
    Search {
        /// Search terms
        query: Vec<String>,
        /// Service key: vk, yam or yt
        #[arg(long)]
        service: Option<String>,
        /// Number of results to print
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Download the tracks behind a URL
    Download {
        url: String,
        /// Target directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// List engine output devices
    Devices,
    /// List services and their status
    Services,
}

fn is_playable_url(target: &str) -> bool {
    Url::parse(target)
        .map(|url| PLAYABLE_SCHEMES.contains(&url.scheme()))
        .unwrap_or(false)
}

fn describe(track: &Track) -> String {
    let artists = track
        .artists
        .iter()
        .map(|artist| artist.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    if artists.is_empty() {
        track.title.clone()
    } else {
        format!("{artists} - {}", track.title)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Arc::new(Config::load_config(&cli.config_dir)?);
    let aria = Aria::new(config).await?;
    aria.initialize().await?;

    let outcome = dispatch(&aria, cli.command).await;
    aria.close().await?;
    outcome
}

async fn dispatch(aria: &Aria, command: CliCommand) -> Result<()> {
    match command {
        CliCommand::Play {
            target,
            random,
            volume,
        } => {
            aria.run().await?;
            let target = target.join(" ");
            let tracks = if is_playable_url(&target) {
                aria.get_tracks_from_url(&target).await?
            } else {
                aria.search(&target, None).await?
            };
            info!(count = tracks.len(), "Resolved tracks");

            if random {
                aria.player().set_mode(Mode::Random).await;
            }
            if let Some(volume) = volume {
                aria.player().set_volume(volume).await?;
            }
            aria.player().play(Some(tracks), None).await?;

            if let Some(track) = aria.player().current_track().await {
                println!("Playing: {}", describe(&track));
            }
            println!("Press Ctrl+C to stop");
            tokio::signal::ctrl_c().await?;
        }
        CliCommand::Search {
            query,
            service,
            limit,
        } => {
            let query = query.join(" ");
            let tracks = aria.search(&query, service.as_deref()).await?;
            for (i, track) in tracks.iter().take(limit).enumerate() {
                println!("{:2}. {}", i + 1, describe(track));
            }
        }
        CliCommand::Download { url, dir } => {
            let mut tracks = aria.get_tracks_from_url(&url).await?;
            for track in &mut tracks {
                let path = track.download(&dir).await?;
                println!("Saved {}", path.display());
            }
        }
        CliCommand::Devices => {
            for device in aria.player().get_output_devices().await? {
                println!("{}\t{}", device.id, device.description);
            }
        }
        CliCommand::Services => {
            for service in aria.services() {
                let status = if service.status().is_enabled() {
                    "enabled".to_string()
                } else {
                    "disabled".to_string()
                };
                let warning = service
                    .status()
                    .warning()
                    .map(|w| format!(" ({w})"))
                    .unwrap_or_default();
                println!("{}\t{}\t{}{}", service.key(), service.name(), status, warning);
            }
        }
    }
    Ok(())
}
