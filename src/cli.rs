// ABOUTME: Shared CLI argument parsing for the radiocast binary
// ABOUTME: Maps flags onto PlayerConfig, logging and the volume store

use crate::config::PlayerConfig;
use crate::persistence::{ConsentFlag, JsonFileStore, VolumeStore};
use crate::playlist::{HttpFetcher, PlaylistResolver};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// State file used when `--state-file` is not given
const DEFAULT_STATE_FILE: &str = ".radiocast.json";

/// Player arguments shared between subcommands
///
/// Use with `#[command(flatten)]` in a subcommand's Args struct:
/// ```ignore
/// #[derive(Args)]
/// struct PlayArgs {
///     #[command(flatten)]
///     player: PlayerArgs,
///
///     // Subcommand-specific args here
/// }
/// ```
#[derive(Args, Debug, Clone)]
pub struct PlayerArgs {
    /// Origin for relative URLs (e.g. http://localhost:8080)
    #[arg(long)]
    pub origin: Option<String>,

    /// Playlist fetch timeout in seconds
    #[arg(long, default_value = "10")]
    pub fetch_timeout: u64,

    /// Volume change per +/- keypress
    #[arg(long, default_value = "0.1")]
    pub volume_step: f64,

    /// Artist shown in now-playing metadata
    #[arg(long)]
    pub artist: Option<String>,

    /// Allow the volume to be saved to the state file
    #[arg(long)]
    pub remember: bool,

    /// State file for remembered settings (default: ~/.radiocast.json)
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl PlayerArgs {
    /// Initialize tracing based on verbosity flag
    pub fn init_tracing(&self) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let filter = if self.verbose {
            "radiocast=debug"
        } else {
            "radiocast=info"
        };

        // init() also bridges `log` records from the library
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| filter.into()),
            )
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    /// Controller configuration from the flags
    pub fn config(&self) -> PlayerConfig {
        let mut config = PlayerConfig::new()
            .fetch_timeout(Duration::from_secs(self.fetch_timeout))
            .volume_step(self.volume_step);
        if let Some(origin) = &self.origin {
            config = config.origin(origin.clone());
        }
        if let Some(artist) = &self.artist {
            config = config.artist(artist.clone());
        }
        config
    }

    /// Playlist resolver honouring `--origin` and `--fetch-timeout`
    pub fn resolver(&self) -> PlaylistResolver {
        let config = self.config();
        PlaylistResolver::new(Arc::new(HttpFetcher::new()))
            .with_origin(config.origin)
            .with_timeout(config.fetch_timeout)
    }

    /// Path of the state file
    pub fn state_file(&self) -> PathBuf {
        if let Some(path) = &self.state_file {
            return path.clone();
        }
        match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(DEFAULT_STATE_FILE),
            None => PathBuf::from(DEFAULT_STATE_FILE),
        }
    }

    /// Volume store over the state file; writes need `--remember`
    pub fn volume_store(&self) -> VolumeStore {
        let consent = if self.remember {
            ConsentFlag::granted()
        } else {
            ConsentFlag::denied()
        };
        let path = self.state_file();
        tracing::debug!(
            "State file: {} (remember: {})",
            path.display(),
            self.remember
        );
        VolumeStore::new(Arc::new(JsonFileStore::open(path)), Arc::new(consent))
    }
}
