use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::config::Credentials;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

/// State shared between the auth flow and the callback handler.
#[derive(Debug, Clone)]
pub struct AuthState {
    pub state: String,
    pub credentials: Credentials,
    pub token: Option<Token>,
}

/// One entry of the local playlist snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistItem {
    pub position: usize,
    pub name: String,
    pub show_name: Option<String>,
    pub uri: String,
    /// `None` for music tracks, fully-played flag for podcast episodes.
    pub played: Option<bool>,
}

impl PlaylistItem {
    pub fn is_episode(&self) -> bool {
        self.played.is_some()
    }
}

#[derive(Tabled)]
pub struct SnapshotTableRow {
    pub position: usize,
    pub name: String,
    pub show: String,
    pub played: String,
}

impl From<&PlaylistItem> for SnapshotTableRow {
    fn from(item: &PlaylistItem) -> Self {
        SnapshotTableRow {
            position: item.position,
            name: item.name.clone(),
            show: item.show_name.clone().unwrap_or_default(),
            played: match item.played {
                Some(true) => "yes".to_string(),
                Some(false) => "no".to_string(),
                None => "-".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub offset: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Track,
    Episode,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayableItem {
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub show: Option<Show>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTrackItem {
    pub track: Option<PlayableItem>,
}

impl PlaylistTrackItem {
    /// The item's uri, unless the slot is a ghost.
    pub fn resolved_uri(&self) -> Option<&str> {
        self.track
            .as_ref()
            .and_then(|t| t.uri.as_deref())
            .filter(|uri| !uri.is_empty())
    }

    pub fn is_ghost(&self) -> bool {
        self.resolved_uri().is_none()
    }
}

/// The full contents of a remote playlist at one revision.
#[derive(Debug, Clone)]
pub struct RemotePlaylist {
    pub snapshot_id: String,
    pub items: Vec<PlaylistTrackItem>,
}

impl RemotePlaylist {
    /// Remote positions of every slot whose track no longer resolves.
    pub fn ghost_positions(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_ghost())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Remote positions holding `uri`.
    pub fn positions_of(&self, uri: &str) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.resolved_uri() == Some(uri))
            .map(|(idx, _)| idx)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistResponse {
    pub snapshot_id: String,
    pub tracks: Page<PlaylistTrackItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Show {
    pub id: String,
    #[serde(default)]
    pub uri: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchShowsResponse {
    pub shows: Page<Option<Show>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumePoint {
    pub fully_played: bool,
    #[serde(default)]
    pub resume_position_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub resume_point: Option<ResumePoint>,
    #[serde(default)]
    pub show: Option<Show>,
}

impl Episode {
    pub fn fully_played(&self) -> bool {
        self.resume_point.is_some_and(|rp| rp.fully_played)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddItemsRequest {
    pub uris: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackOccurrence {
    pub uri: String,
    pub positions: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveOccurrencesRequest {
    pub tracks: Vec<TrackOccurrence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovePositionsRequest {
    pub positions: Vec<usize>,
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub snapshot_id: String,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}
