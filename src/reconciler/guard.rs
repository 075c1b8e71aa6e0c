//! Snapshot-guarded playlist mutations.
//!
//! Removals carry the playlist's snapshot id so Spotify can reject them when
//! another client changed the playlist in between. A rejected mutation is
//! retried against a freshly fetched revision, re-deriving its positions from
//! the new listing, at most [`MAX_ATTEMPTS`] times in total.

use crate::{
    spotify::{PlaylistApi, SpotifyError},
    types::RemotePlaylist,
    utils, warning,
};

pub const MAX_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy)]
pub enum Mutation<'a> {
    /// Batched positional delete of every ghost slot.
    RemoveGhosts { user_id: &'a str },
    /// Single occurrence delete of `uri`, expected at `position`.
    RemoveOccurrence { uri: &'a str, position: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub snapshot_id: String,
    pub positions: Vec<usize>,
    /// Whether a stale snapshot forced a refetch before the mutation landed.
    pub refetched: bool,
}

impl Mutation<'_> {
    fn needs_listing(&self) -> bool {
        matches!(self, Mutation::RemoveGhosts { .. })
    }

    /// Positions to send, derived from `fresh` when a listing is available.
    /// `None` means there is nothing left to remove.
    fn positions(&self, fresh: Option<&RemotePlaylist>) -> Option<Vec<usize>> {
        match (self, fresh) {
            (Mutation::RemoveGhosts { .. }, Some(remote)) => {
                Some(remote.ghost_positions()).filter(|p| !p.is_empty())
            }
            (Mutation::RemoveGhosts { .. }, None) => None,
            (Mutation::RemoveOccurrence { uri, position }, Some(remote)) => {
                utils::nearest_position(&remote.positions_of(uri), *position).map(|p| vec![p])
            }
            (Mutation::RemoveOccurrence { position, .. }, None) => Some(vec![*position]),
        }
    }
}

/// Applies `mutation`, starting from `snapshot_id` when the mutation does
/// not need a listing. Returns `Ok(None)` when a fresh listing shows there is
/// nothing to remove.
pub async fn guarded<A: PlaylistApi + ?Sized>(
    api: &A,
    playlist_id: &str,
    mutation: Mutation<'_>,
    mut snapshot_id: Option<String>,
) -> Result<Option<Applied>, SpotifyError> {
    let mut attempt = 0;
    loop {
        attempt += 1;

        let mut fresh = None;
        if attempt > 1 || mutation.needs_listing() {
            let remote = api.playlist(playlist_id).await?;
            snapshot_id = Some(remote.snapshot_id.clone());
            fresh = Some(remote);
        }

        let Some(positions) = mutation.positions(fresh.as_ref()) else {
            return Ok(None);
        };

        let result = match mutation {
            Mutation::RemoveGhosts { user_id } => {
                let snapshot = snapshot_id.as_deref().unwrap_or_default();
                api.remove_positions(user_id, playlist_id, &positions, snapshot)
                    .await
            }
            Mutation::RemoveOccurrence { uri, .. } => {
                api.remove_occurrence(playlist_id, uri, positions[0], snapshot_id.as_deref())
                    .await
            }
        };

        match result {
            Ok(snapshot_id) => {
                return Ok(Some(Applied {
                    snapshot_id,
                    positions,
                    refetched: attempt > 1,
                }));
            }
            Err(e) if e.is_stale_snapshot() && attempt < MAX_ATTEMPTS => {
                warning!(
                    "Playlist changed underneath us ({}), refetching (attempt {}/{}).",
                    e,
                    attempt + 1,
                    MAX_ATTEMPTS
                );
            }
            Err(e) => return Err(e),
        }
    }
}
