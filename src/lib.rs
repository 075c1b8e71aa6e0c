//! Podcast Playlist Curator Library
//!
//! This library keeps a single Spotify playlist stocked with unplayed podcast
//! episodes from a fixed set of shows and sweeps out episodes once they have
//! been fully played. The heart of it is the [`reconciler`], which mirrors the
//! remote playlist into a local snapshot and issues the minimal add/remove
//! calls needed to apply the curation policies.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the local OAuth callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Environment settings and the plain-text data file
//! - `management` - Token cache management
//! - `reconciler` - Local playlist snapshot and the curation policies
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API port and client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use podqueue::{config, cli};
//!
//! #[tokio::main]
//! async fn main() {
//!     config::load_env().await.ok();
//!     cli::run().await;
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod management;
pub mod reconciler;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Prints a progress line prefixed with a blue `o`.
///
/// Takes the same arguments as `println!`.
///
/// ```
/// info!("{}: finished adding new episodes.", show_name);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a line prefixed with a green `✓` for a change that landed
/// remotely, such as an added or deleted episode.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a red `!` line and exits with code 1.
///
/// The expansion diverges, so it can stand in any match arm:
///
/// ```
/// let data = match DataFile::load().await {
///     Ok(data) => data,
///     Err(e) => error!("Cannot load data file: {}", e),
/// };
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a yellow `!` line for a recoverable problem; the run goes on.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
