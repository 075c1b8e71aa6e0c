#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use podqueue::{
    config::{Credentials, DataFile},
    spotify::{PlaylistApi, SpotifyError},
    types::{
        Episode, ItemKind, Page, PlayableItem, PlaylistTrackItem, RemotePlaylist, ResumePoint,
        Show, User,
    },
    utils,
};

pub const USER_ID: &str = "tester";
pub const PLAYLIST_ID: &str = "playlist";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Playlist,
    Episode(String),
    Search(String),
    ShowEpisodes {
        show_id: String,
        offset: u32,
    },
    Add {
        uris: Vec<String>,
        position: Option<usize>,
    },
    RemoveOccurrence {
        uri: String,
        position: usize,
        snapshot_id: Option<String>,
    },
    RemovePositions {
        user_id: String,
        positions: Vec<usize>,
        snapshot_id: String,
    },
}

#[derive(Debug, Clone)]
struct Meta {
    name: String,
    kind: ItemKind,
    show: Option<Show>,
    played: bool,
}

#[derive(Default)]
struct FakeState {
    slots: Vec<Option<String>>,
    version: u32,
    catalog: HashMap<String, Meta>,
    shows: Vec<Show>,
    listings: HashMap<String, Vec<String>>,
    stale_rejections: usize,
    calls: Vec<Call>,
}

impl FakeState {
    fn snapshot_id(&self) -> String {
        format!("snap-{}", self.version)
    }

    /// Rejects the mutation if a rejection is pending or the token is old.
    fn check_snapshot(&mut self, snapshot_id: Option<&str>) -> Result<(), SpotifyError> {
        if self.stale_rejections > 0 {
            self.stale_rejections -= 1;
            // another client touched the playlist
            self.version += 1;
            return Err(SpotifyError::StaleSnapshot("snapshot id is outdated".into()));
        }
        match snapshot_id {
            Some(id) if id != self.snapshot_id() => {
                Err(SpotifyError::StaleSnapshot(format!("{} is outdated", id)))
            }
            _ => Ok(()),
        }
    }

    fn episode(&self, uri: &str) -> Option<Episode> {
        let meta = self.catalog.get(uri)?;
        if meta.kind != ItemKind::Episode {
            return None;
        }
        Some(Episode {
            id: utils::id_from_uri(uri).to_string(),
            uri: uri.to_string(),
            name: meta.name.clone(),
            release_date: None,
            resume_point: Some(ResumePoint {
                fully_played: meta.played,
                resume_position_ms: 0,
            }),
            show: meta.show.clone(),
        })
    }
}

/// In-memory stand-in for the Spotify Web API. Clones share state, so a
/// test can keep a handle after moving one into the reconciler.
#[derive(Clone, Default)]
pub struct FakeSpotify {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeSpotify {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.inner.lock().unwrap()
    }

    pub fn add_show(&self, id: &str, name: &str) -> &Self {
        self.state().shows.push(Show {
            id: id.to_string(),
            uri: format!("spotify:show:{}", id),
            name: name.to_string(),
        });
        self
    }

    /// Publishes episodes for a show, given newest first.
    pub fn publish(&self, show_id: &str, episodes: &[(&str, &str, bool)]) -> &Self {
        let mut state = self.state();
        let show = state
            .shows
            .iter()
            .find(|s| s.id == show_id)
            .cloned()
            .expect("show registered");
        for (uri, name, played) in episodes {
            state.catalog.insert(
                uri.to_string(),
                Meta {
                    name: name.to_string(),
                    kind: ItemKind::Episode,
                    show: Some(show.clone()),
                    played: *played,
                },
            );
            state
                .listings
                .entry(show_id.to_string())
                .or_default()
                .push(uri.to_string());
        }
        self
    }

    pub fn add_track(&self, uri: &str, name: &str) -> &Self {
        self.state().catalog.insert(
            uri.to_string(),
            Meta {
                name: name.to_string(),
                kind: ItemKind::Track,
                show: None,
                played: false,
            },
        );
        self
    }

    /// Sets the playlist contents; `None` is a ghost slot.
    pub fn set_slots(&self, slots: &[Option<&str>]) -> &Self {
        let mut state = self.state();
        state.slots = slots.iter().map(|s| s.map(str::to_string)).collect();
        state.version += 1;
        self
    }

    pub fn set_played(&self, uri: &str, played: bool) {
        if let Some(meta) = self.state().catalog.get_mut(uri) {
            meta.played = played;
        }
    }

    pub fn reject_next_mutations(&self, count: usize) {
        self.state().stale_rejections = count;
    }

    pub fn slots(&self) -> Vec<Option<String>> {
        self.state().slots.clone()
    }

    pub fn snapshot_id(&self) -> String {
        self.state().snapshot_id()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn adds(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Add { .. }))
            .collect()
    }

    pub fn removals(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::RemoveOccurrence { .. } | Call::RemovePositions { .. }))
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }
}

#[async_trait]
impl PlaylistApi for FakeSpotify {
    async fn current_user(&self) -> Result<User, SpotifyError> {
        Ok(User {
            id: USER_ID.to_string(),
        })
    }

    async fn playlist(&self, _playlist_id: &str) -> Result<RemotePlaylist, SpotifyError> {
        let mut state = self.state();
        state.calls.push(Call::Playlist);
        let items = state
            .slots
            .iter()
            .map(|slot| PlaylistTrackItem {
                track: slot.as_ref().map(|uri| {
                    let meta = state.catalog.get(uri);
                    PlayableItem {
                        kind: meta.map_or(ItemKind::Track, |m| m.kind),
                        name: meta.map(|m| m.name.clone()),
                        uri: Some(uri.clone()),
                        show: meta.and_then(|m| m.show.clone()),
                    }
                }),
            })
            .collect();
        Ok(RemotePlaylist {
            snapshot_id: state.snapshot_id(),
            items,
        })
    }

    async fn episode(&self, uri: &str) -> Result<Episode, SpotifyError> {
        let mut state = self.state();
        state.calls.push(Call::Episode(uri.to_string()));
        state
            .episode(uri)
            .ok_or_else(|| SpotifyError::NotFound(uri.to_string()))
    }

    async fn search_shows(&self, query: &str) -> Result<Vec<Show>, SpotifyError> {
        let mut state = self.state();
        state.calls.push(Call::Search(query.to_string()));
        Ok(state
            .shows
            .iter()
            .filter(|s| s.name.contains(query) || query.contains(&s.name))
            .cloned()
            .collect())
    }

    async fn show_episodes(
        &self,
        show_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Option<Episode>>, SpotifyError> {
        let mut state = self.state();
        state.calls.push(Call::ShowEpisodes {
            show_id: show_id.to_string(),
            offset,
        });
        let listing = state.listings.get(show_id).cloned().unwrap_or_default();
        let start = (offset as usize).min(listing.len());
        let end = (start + limit as usize).min(listing.len());
        let items = listing[start..end]
            .iter()
            .map(|uri| state.episode(uri))
            .collect();
        Ok(Page {
            items,
            next: (end < listing.len()).then(|| format!("offset={}", end)),
            total: listing.len() as u32,
            offset,
        })
    }

    async fn add_items(
        &self,
        _playlist_id: &str,
        uris: &[String],
        position: Option<usize>,
    ) -> Result<String, SpotifyError> {
        let mut state = self.state();
        state.calls.push(Call::Add {
            uris: uris.to_vec(),
            position,
        });
        let at = position.unwrap_or(state.slots.len()).min(state.slots.len());
        for (offset, uri) in uris.iter().enumerate() {
            state.slots.insert(at + offset, Some(uri.clone()));
        }
        state.version += 1;
        Ok(state.snapshot_id())
    }

    async fn remove_occurrence(
        &self,
        _playlist_id: &str,
        uri: &str,
        position: usize,
        snapshot_id: Option<&str>,
    ) -> Result<String, SpotifyError> {
        let mut state = self.state();
        state.calls.push(Call::RemoveOccurrence {
            uri: uri.to_string(),
            position,
            snapshot_id: snapshot_id.map(str::to_string),
        });
        state.check_snapshot(snapshot_id)?;
        if state.slots.get(position).and_then(|s| s.as_deref()) != Some(uri) {
            return Err(SpotifyError::Status {
                status: 400,
                message: format!("{} is not at position {}", uri, position),
            });
        }
        state.slots.remove(position);
        state.version += 1;
        Ok(state.snapshot_id())
    }

    async fn remove_positions(
        &self,
        user_id: &str,
        _playlist_id: &str,
        positions: &[usize],
        snapshot_id: &str,
    ) -> Result<String, SpotifyError> {
        let mut state = self.state();
        state.calls.push(Call::RemovePositions {
            user_id: user_id.to_string(),
            positions: positions.to_vec(),
            snapshot_id: snapshot_id.to_string(),
        });
        state.check_snapshot(Some(snapshot_id))?;
        let mut sorted = positions.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        for position in sorted {
            if position < state.slots.len() {
                state.slots.remove(position);
            }
        }
        state.version += 1;
        Ok(state.snapshot_id())
    }
}

pub fn data_file(daily: &[&str], long: &[&str]) -> DataFile {
    DataFile {
        username: "listener".to_string(),
        credentials: Credentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        },
        playlist_id: PLAYLIST_ID.to_string(),
        daily_shows: daily.iter().map(|s| s.to_string()).collect(),
        long_shows: long.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn uris(slots: &[Option<String>]) -> Vec<&str> {
    slots.iter().map(|s| s.as_deref().unwrap_or("<ghost>")).collect()
}
