//! # CLI Module
//!
//! User-facing commands. Each command loads the configuration, builds what it
//! needs from the lower layers and reports progress through the logging
//! macros; fatal failures go through `error!` and end the process with exit
//! code 1.
//!
//! ## Commands
//!
//! - [`run`] - The daily cycle: add new episodes for the daily shows, top up
//!   the long shows, delete played episodes.
//! - [`show`] - Reconcile and print the playlist as a table.
//! - [`auth`] - Authorize against Spotify and cache the token.
//!
//! ## Layering
//!
//! ```text
//! CLI Layer (commands, progress, fatal errors)
//!     ↓
//! Reconciler (snapshot, policies)
//!     ↓
//! Spotify port (SpotifyClient)
//!     ↓
//! Spotify Web API
//! ```
//!
//! ## Usage
//!
//! ```bash
//! podqueue auth      # once, opens the browser
//! podqueue           # daily cycle, same as `podqueue run`
//! podqueue show      # inspect the playlist
//! ```

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config::{self, DataFile},
    error,
    management::TokenManager,
    reconciler::{Reconciler, Session},
    spotify::SpotifyClient,
};

mod auth;
mod run;
mod show;

pub use auth::auth;
pub use run::run;
pub use show::show;

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}

pub(crate) async fn load_data_file() -> DataFile {
    match DataFile::load().await {
        Ok(data) => data,
        Err(e) => error!(
            "Cannot load {}: {}",
            config::data_file_path().display(),
            e
        ),
    }
}

/// Loads configuration and token, resolves the session and builds the
/// snapshot. Exits the process on any failure.
pub(crate) async fn open_reconciler() -> Reconciler<SpotifyClient> {
    let data = load_data_file().await;

    let tokens = match TokenManager::load(data.credentials.clone()).await {
        Ok(tokens) => tokens,
        Err(e) => error!(
            "Failed to load token. Please run podqueue auth\n Error: {}",
            e
        ),
    };

    let pb = spinner("Resolving shows...");
    let session = match Session::open(SpotifyClient::new(tokens), &data).await {
        Ok(session) => session,
        Err(e) => {
            pb.finish_and_clear();
            error!("Cannot open session: {}", e);
        }
    };

    pb.set_message("Loading playlist...");
    let reconciler = match Reconciler::load(session).await {
        Ok(reconciler) => reconciler,
        Err(e) => {
            pb.finish_and_clear();
            error!("Cannot load playlist: {}", e);
        }
    };

    pb.finish_and_clear();
    reconciler
}
