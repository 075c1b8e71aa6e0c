//! # Spotify Integration Module
//!
//! This module is the boundary between the playlist curator and the Spotify
//! Web API. Everything above it (the reconciler, the CLI) talks to Spotify
//! only through the [`PlaylistApi`] port trait; everything below it is HTTP.
//!
//! ```text
//! CLI Layer
//!     ↓
//! Reconciler (snapshot, policies)
//!     ↓
//! PlaylistApi port
//!     ├── SpotifyClient (reqwest, production)
//!     └── in-memory fakes (tests)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Submodules
//!
//! - [`auth`] - Authorization-code flow: local callback server, browser
//!   launch, code exchange and token refresh.
//! - [`client`] - [`SpotifyClient`], the reqwest implementation of the port.
//! - [`error`] - [`SpotifyError`], the error taxonomy of remote calls.
//!
//! ## API Coverage
//!
//! - `GET /me` - current user identity
//! - `GET /playlists/{id}` - playlist revision and items, following `next` pages
//! - `GET /episodes/{id}` - episode resume point
//! - `GET /search?type=show` - show lookup by name
//! - `GET /shows/{id}/episodes` - paginated show episodes, newest first
//! - `POST /playlists/{id}/tracks` - add items at a position
//! - `DELETE /playlists/{id}/tracks` - remove specific occurrences
//! - `DELETE /users/{user}/playlists/{id}/tracks` - remove by position with a snapshot id
//!
//! ## Error Handling
//!
//! Rate limiting (`429`) and gateway errors (`502`) are retried inside the
//! client. Everything else is surfaced as a [`SpotifyError`] and left to the
//! caller; stale snapshot ids get their own variant so mutations can be
//! retried against a fresh revision.

use async_trait::async_trait;

use crate::types::{Episode, Page, RemotePlaylist, Show, User};

pub mod auth;
pub mod client;
pub mod error;

pub use client::SpotifyClient;
pub use error::SpotifyError;

/// Port trait wrapping the Spotify API capabilities the reconciler uses.
///
/// Positions are zero-based indices into the full remote listing, ghost slots
/// included. Mutations return the playlist's new snapshot id.
#[async_trait]
pub trait PlaylistApi: Send + Sync {
    async fn current_user(&self) -> Result<User, SpotifyError>;

    /// Fetches the playlist revision and all of its items.
    async fn playlist(&self, playlist_id: &str) -> Result<RemotePlaylist, SpotifyError>;

    async fn episode(&self, uri: &str) -> Result<Episode, SpotifyError>;

    async fn search_shows(&self, query: &str) -> Result<Vec<Show>, SpotifyError>;

    /// One page of a show's episodes, newest first. Spotify may return
    /// `null` for episodes unavailable in the market.
    async fn show_episodes(
        &self,
        show_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Option<Episode>>, SpotifyError>;

    /// Inserts `uris` at `position`, or appends them when `position` is `None`.
    async fn add_items(
        &self,
        playlist_id: &str,
        uris: &[String],
        position: Option<usize>,
    ) -> Result<String, SpotifyError>;

    async fn remove_occurrence(
        &self,
        playlist_id: &str,
        uri: &str,
        position: usize,
        snapshot_id: Option<&str>,
    ) -> Result<String, SpotifyError>;

    async fn remove_positions(
        &self,
        user_id: &str,
        playlist_id: &str,
        positions: &[usize],
        snapshot_id: &str,
    ) -> Result<String, SpotifyError>;
}
