//! # Playlist Reconciler
//!
//! Holds a local snapshot of the curated playlist and keeps it in step with
//! the remote one while applying the curation policies:
//!
//! - **add**: append the newest unplayed episodes of each daily show next to
//!   that show's last episode in the playlist;
//! - **delete played**: remove fully played episodes as long as their show
//!   keeps at least one other episode in the playlist;
//! - **long shows**: keep a floor of unplayed episodes for shows being worked
//!   through from the back catalogue.
//!
//! Local positions count non-ghost items only; remote positions index the
//! full listing. Ghost slots that survive a failed removal are remembered so
//! insertions and removals can be mapped onto the remote listing.
//!
//! Every operation runs to completion before the next starts. Nothing is
//! rolled back: a pass that fails midway leaves the snapshot stale until the
//! next [`Reconciler::update`].

use std::collections::HashSet;

use crate::{
    config::DataFile,
    info, success,
    spotify::{PlaylistApi, SpotifyError},
    types::{Episode, ItemKind, PlayableItem, PlaylistItem, SnapshotTableRow},
    utils, warning,
};

pub mod guard;
pub mod registry;
pub mod snapshot;

pub use guard::{Applied, Mutation};
pub use registry::ShowRegistry;
pub use snapshot::LocalSnapshot;

/// Inserting this many new episodes of one show at once is treated as a
/// runaway and skipped.
pub const MAX_NEW_EPISODES: usize = 10;

/// Unplayed episodes kept in the playlist for every long show.
pub const LONG_SHOW_FLOOR: usize = 3;

/// Page size used when walking a show's episode listing.
pub const EPISODE_PAGE: u32 = 50;

/// Everything resolved once at startup and needed by every operation.
pub struct Session<A> {
    pub api: A,
    pub playlist_id: String,
    pub user_id: String,
    pub shows: ShowRegistry,
    pub daily_shows: Vec<String>,
    pub long_shows: Vec<String>,
}

impl<A: PlaylistApi> Session<A> {
    /// Resolves the current user and every tracked show.
    pub async fn open(api: A, data: &DataFile) -> Result<Self, SpotifyError> {
        let user = api.current_user().await?;
        let shows = ShowRegistry::resolve(&api, data.all_shows()).await?;
        if shows.is_empty() {
            warning!("No shows listed in the data file, nothing to curate.");
        }

        Ok(Self {
            api,
            playlist_id: data.playlist_id.clone(),
            user_id: user.id,
            shows,
            daily_shows: data.daily_shows.clone(),
            long_shows: data.long_shows.clone(),
        })
    }

    pub fn show_id(&self, show_name: &str) -> Result<&str, SpotifyError> {
        self.shows
            .id(show_name)
            .ok_or_else(|| SpotifyError::NotFound(format!("show \"{}\" is not tracked", show_name)))
    }
}

pub struct Reconciler<A> {
    session: Session<A>,
    snapshot: LocalSnapshot,
    ghosts: Vec<usize>,
    snapshot_id: Option<String>,
}

impl<A: PlaylistApi> Reconciler<A> {
    /// Wraps a session without touching the remote playlist.
    pub fn new(session: Session<A>) -> Self {
        Self {
            session,
            snapshot: LocalSnapshot::new(),
            ghosts: Vec::new(),
            snapshot_id: None,
        }
    }

    /// Removes ghost slots and builds the snapshot from a fresh fetch.
    ///
    /// A ghost removal that keeps hitting stale snapshots is only logged:
    /// the surviving ghosts are tracked and positions are mapped past them.
    pub async fn load(session: Session<A>) -> Result<Self, SpotifyError> {
        let mut reconciler = Self::new(session);
        match reconciler.delete_ghosts().await {
            Ok(_) => {}
            Err(e) if e.is_stale_snapshot() => {
                warning!("Ghost entries left in place: {}", e);
            }
            Err(e) => return Err(e),
        }
        reconciler.update().await?;
        info!("Playlist loaded.");
        Ok(reconciler)
    }

    pub fn session(&self) -> &Session<A> {
        &self.session
    }

    pub fn snapshot(&self) -> &LocalSnapshot {
        &self.snapshot
    }

    /// Remote positions of the ghost slots seen in the last fetch.
    pub fn ghosts(&self) -> &[usize] {
        &self.ghosts
    }

    pub fn rows(&self) -> Vec<SnapshotTableRow> {
        self.snapshot.rows()
    }

    /// Fetches the remote playlist and patches the snapshot to match it:
    /// known uris get their new position, unknown ones are resolved and
    /// inserted, and uris gone from the remote are pruned.
    pub async fn update(&mut self) -> Result<(), SpotifyError> {
        let remote = self.session.api.playlist(&self.session.playlist_id).await?;
        self.ghosts = remote.ghost_positions();
        self.snapshot_id = Some(remote.snapshot_id.clone());

        let mut seen = HashSet::new();
        let resolved = remote
            .items
            .iter()
            .filter_map(|item| Some((item.resolved_uri()?, item.track.as_ref()?)));

        for (position, (uri, track)) in resolved.enumerate() {
            seen.insert(uri.to_string());
            if !self.snapshot.set_position(uri, position) {
                let item = self.resolve_item(position, uri, track).await?;
                self.snapshot.insert(item);
            }
        }

        self.snapshot.resort();
        for gone in self.snapshot.retain_uris(&seen) {
            info!("No longer in playlist: \"{}\"", gone.name);
        }
        Ok(())
    }

    async fn resolve_item(
        &self,
        position: usize,
        uri: &str,
        track: &PlayableItem,
    ) -> Result<PlaylistItem, SpotifyError> {
        let mut item = PlaylistItem {
            position,
            name: track.name.clone().unwrap_or_default(),
            show_name: None,
            uri: uri.to_string(),
            played: None,
        };

        if track.kind == ItemKind::Episode {
            let episode = self.session.api.episode(uri).await?;
            item.played = Some(episode.fully_played());
            item.show_name = track
                .show
                .as_ref()
                .or(episode.show.as_ref())
                .map(|show| show.name.clone());
        }

        Ok(item)
    }

    /// Removes every ghost slot in one batched positional delete guarded by
    /// the playlist's snapshot id. Returns how many slots were removed.
    pub async fn delete_ghosts(&mut self) -> Result<usize, SpotifyError> {
        let mutation = Mutation::RemoveGhosts {
            user_id: &self.session.user_id,
        };
        let outcome = guard::guarded(&self.session.api, &self.session.playlist_id, mutation, None)
            .await
            .inspect_err(|e| warning!("Failed to delete ghost entries: {}", e))?;

        self.ghosts.clear();
        match outcome {
            Some(applied) => {
                info!("Deleted {} ghost entries.", applied.positions.len());
                self.snapshot_id = Some(applied.snapshot_id);
                Ok(applied.positions.len())
            }
            None => Ok(0),
        }
    }

    /// Unplayed episodes at the head of the show's listing, newest first,
    /// stopping at the first fully played one.
    pub async fn get_new_episodes(&self, show_name: &str) -> Result<Vec<Episode>, SpotifyError> {
        let show_id = self.session.show_id(show_name)?;
        let page = self
            .session
            .api
            .show_episodes(show_id, 0, EPISODE_PAGE)
            .await?;

        Ok(page
            .items
            .into_iter()
            .flatten()
            .take_while(|episode| !episode.fully_played())
            .collect())
    }

    /// Inserts the show's new episodes right after its last episode in the
    /// playlist. Batches of [`MAX_NEW_EPISODES`] or more are skipped.
    /// Returns the uris that were added.
    pub async fn add_new_episodes(&mut self, show_name: &str) -> Result<Vec<String>, SpotifyError> {
        self.update().await?;

        let discovered = self.get_new_episodes(show_name).await?;
        let new_episodes: Vec<Episode> = discovered
            .into_iter()
            .filter(|episode| !self.snapshot.contains(&episode.uri))
            .collect();

        if new_episodes.is_empty() || new_episodes.len() >= MAX_NEW_EPISODES {
            return Ok(Vec::new());
        }

        self.insert_episodes(show_name, &new_episodes).await
    }

    /// Removes played episodes one at a time, skipping any whose show would
    /// be left without an episode. Returns the removed records.
    ///
    /// Remote positions shift after each removal, so each one is corrected
    /// by the number of removals already made in this pass. Every removal is
    /// guarded by the snapshot id returned by the previous one; if a refetch
    /// was needed the snapshot is rebuilt and the correction starts over.
    pub async fn delete_played_items(&mut self) -> Result<Vec<PlaylistItem>, SpotifyError> {
        self.update().await?;

        let played: Vec<String> = self
            .snapshot
            .iter()
            .filter(|item| item.played == Some(true))
            .map(|item| item.uri.clone())
            .collect();

        let mut deleted = Vec::new();
        let mut n_deleted = 0;
        for uri in played {
            let Some(item) = self.snapshot.get(&uri).cloned() else {
                continue;
            };
            let Some(show_name) = item.show_name.as_deref() else {
                continue;
            };
            if self.snapshot.show_count(show_name) <= 1 {
                continue;
            }

            let local = item.position.saturating_sub(n_deleted);
            let mutation = Mutation::RemoveOccurrence {
                uri: &item.uri,
                position: utils::remote_position(local, &self.ghosts),
            };
            let outcome = guard::guarded(
                &self.session.api,
                &self.session.playlist_id,
                mutation,
                self.snapshot_id.clone(),
            )
            .await?;

            self.snapshot.remove(&item.uri);
            let Some(applied) = outcome else {
                warning!("\"{}\" was already removed from the playlist.", item.name);
                self.update().await?;
                n_deleted = 0;
                continue;
            };

            self.snapshot_id = Some(applied.snapshot_id);
            success!("Deleted: \"{} - {}\"", item.name, show_name);
            if applied.refetched {
                self.update().await?;
                n_deleted = 0;
            } else {
                n_deleted += 1;
                self.shift_ghosts_above(applied.positions[0]);
            }
            deleted.push(item);
        }

        self.update().await?;
        Ok(deleted)
    }

    /// Tops up every long show to [`LONG_SHOW_FLOOR`] unplayed episodes.
    pub async fn manage_long_shows(&mut self) -> Result<(), SpotifyError> {
        self.update().await?;
        for show_name in self.session.long_shows.clone() {
            self.rebalance_long_show(&show_name).await?;
        }
        Ok(())
    }

    /// Finds the show's last episode in its listing and queues the episodes
    /// published right after it, oldest first. Returns the uris added.
    pub async fn rebalance_long_show(&mut self, show_name: &str) -> Result<Vec<String>, SpotifyError> {
        let unplayed = self
            .snapshot
            .episodes_of(show_name)
            .filter(|item| item.played == Some(false))
            .count();
        if unplayed >= LONG_SHOW_FLOOR {
            info!("{} is up to date.", show_name);
            return Ok(Vec::new());
        }

        let Some(last) = self.snapshot.last_episode_of(show_name).cloned() else {
            warning!("{} has no episode in the playlist to continue from.", show_name);
            return Ok(Vec::new());
        };

        let show_id = self.session.show_id(show_name)?.to_string();
        let mut listing: Vec<Episode> = Vec::new();
        let mut offset = 0;
        let found = loop {
            let page = self
                .session
                .api
                .show_episodes(&show_id, offset, EPISODE_PAGE)
                .await?;
            let fetched = page.items.len() as u32;
            let start = listing.len();
            listing.extend(page.items.into_iter().flatten());

            if let Some(idx) = listing[start..].iter().position(|e| e.name == last.name) {
                break Some(start + idx);
            }
            if page.next.is_none() || fetched == 0 {
                break None;
            }
            offset += fetched;
        };

        let Some(index) = found else {
            warning!("Cannot find \"{}\" among the episodes of {}.", last.name, show_name);
            return Ok(Vec::new());
        };

        let candidates: Vec<Episode> = listing[index.saturating_sub(LONG_SHOW_FLOOR)..index]
            .iter()
            .rev()
            .filter(|episode| !self.snapshot.contains(&episode.uri))
            .cloned()
            .collect();

        if candidates.is_empty() {
            info!("{} is up to date.", show_name);
            return Ok(Vec::new());
        }

        self.insert_episodes(show_name, &candidates).await
    }

    /// Adds new episodes for the daily shows, tops up the long shows and
    /// sweeps played episodes.
    pub async fn run_daily(&mut self) -> Result<(), SpotifyError> {
        for show_name in self.session.daily_shows.clone() {
            self.add_new_episodes(&show_name).await?;
            info!("{}: finished adding new episodes.", show_name);
        }

        self.manage_long_shows().await?;
        info!("Finished managing long shows.");

        self.delete_played_items().await?;
        info!("Finished deleting played episodes.");
        Ok(())
    }

    /// Remote position right after the show's last episode, counting
    /// surviving ghosts. `None` appends to the end of the playlist.
    fn insertion_position(&self, show_name: &str) -> Option<usize> {
        self.snapshot
            .last_episode_of(show_name)
            .map(|last| utils::remote_position(last.position, &self.ghosts) + 1)
    }

    // ghosts after a removed slot move one index closer to the start
    fn shift_ghosts_above(&mut self, removed: usize) {
        for ghost in self.ghosts.iter_mut().filter(|g| **g > removed) {
            *ghost -= 1;
        }
    }

    async fn insert_episodes(
        &mut self,
        show_name: &str,
        episodes: &[Episode],
    ) -> Result<Vec<String>, SpotifyError> {
        let uris: Vec<String> = episodes.iter().map(|e| e.uri.clone()).collect();
        let position = self.insertion_position(show_name);

        let snapshot_id = self
            .session
            .api
            .add_items(&self.session.playlist_id, &uris, position)
            .await?;
        self.snapshot_id = Some(snapshot_id);

        for episode in episodes {
            success!("Added episode \"{}\"", episode.name);
        }

        self.update().await?;
        Ok(uris)
    }
}
