// ABOUTME: radiocast command-line player
// ABOUTME: Classifies, resolves and plays radio URLs through the playback controller

use clap::{Parser, Subcommand};
use radiocast::cli::PlayerArgs;
use radiocast::native::NativeSink;
use radiocast::session::LogMetadataSink;
use radiocast::{classify, PlaybackController};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Seconds moved by the rewind/forward keys
const SKIP_SECONDS: f64 = 10.0;

#[derive(Parser, Debug)]
#[command(name = "radiocast")]
#[command(about = "Play direct audio files, HLS streams and M3U radio playlists", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print how a URL would be played (direct, hls or m3u)
    Classify {
        /// Stream or playlist URL
        url: String,

        #[command(flatten)]
        player: PlayerArgs,
    },
    /// Fetch a playlist and list its playable entries
    Resolve {
        /// Playlist URL
        url: String,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        player: PlayerArgs,
    },
    /// Play a URL with keyboard controls on stdin
    Play {
        /// Stream, file or playlist URL
        url: String,

        #[command(flatten)]
        player: PlayerArgs,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Classify { url, player } => {
            player.init_tracing();
            let url = player.resolver().normalize(&url);
            println!("{}", classify(&url));
        }
        Command::Resolve { url, json, player } => {
            player.init_tracing();
            let entries = player.resolver().resolve(&url).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for (n, entry) in entries.iter().enumerate() {
                    println!("{:>3}. {}", n + 1, entry.title);
                    println!("     {}", entry.media_url);
                }
            }
        }
        Command::Play { url, player } => {
            player.init_tracing();
            play(&url, &player).await?;
        }
    }

    Ok(())
}

async fn play(url: &str, args: &PlayerArgs) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("radiocast v{}", env!("CARGO_PKG_VERSION"));

    let mut player = PlaybackController::builder(NativeSink::new())
        .config(args.config())
        .volume_store(args.volume_store())
        .metadata(Arc::new(LogMetadataSink))
        .build()
        .await;

    let _status = player.on_playback_status_change(|status| println!("[{}]", status));
    let _notices = player.on_error(|notice| eprintln!("! {}", notice));

    tokio::select! {
        result = player.play_src(url) => {
            if let Err(e) = result {
                player.destroy();
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            player.destroy();
            return Ok(());
        }
    }

    print_help();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if !run_command(&mut player, line.trim()).await {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Failed to read stdin: {}", e);
                    break;
                }
            },
            alive = player.handle_next_event() => {
                if !alive {
                    break;
                }
            }
        }
    }

    player.destroy();
    Ok(())
}

/// Apply one keyboard command; returns `false` to quit
async fn run_command(player: &mut PlaybackController, command: &str) -> bool {
    let result = match command {
        "" => Ok(()),
        "p" => player.toggle_pause(),
        "s" => {
            player.stop();
            Ok(())
        }
        "+" => {
            println!("volume {:.0}%", player.up_volume() * 100.0);
            Ok(())
        }
        "-" => {
            println!("volume {:.0}%", player.down_volume() * 100.0);
            Ok(())
        }
        "m" => {
            println!("{}", if player.mute() { "muted" } else { "unmuted" });
            Ok(())
        }
        "<" => {
            player.rewind(SKIP_SECONDS);
            Ok(())
        }
        ">" => {
            player.forward(SKIP_SECONDS);
            Ok(())
        }
        "n" => player.next_track().await.map(|_| ()),
        "b" => player.previous_track().await.map(|_| ()),
        "q" => return false,
        _ => {
            print_help();
            Ok(())
        }
    };

    // Observers already reported the failure
    if let Err(e) = result {
        tracing::debug!("Command {:?} failed: {}", command, e);
    }
    true
}

fn print_help() {
    println!(
        "Controls: p pause/resume, s stop, +/- volume, m mute, </> skip {}s, n/b next/previous track, q quit",
        SKIP_SECONDS
    );
}
