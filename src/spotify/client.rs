use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::{sync::Mutex, time::sleep};

use crate::{
    config,
    management::TokenManager,
    spotify::{PlaylistApi, SpotifyError},
    types::{
        AddItemsRequest, Episode, Page, PlaylistResponse, PlaylistTrackItem, RemotePlaylist,
        RemoveOccurrencesRequest, RemovePositionsRequest, SearchShowsResponse, Show, SnapshotResponse,
        TrackOccurrence, User,
    },
    utils, warning,
};

const MAX_ATTEMPTS: u32 = 5;
const MAX_RETRY_AFTER_SECS: u64 = 120;
const ADD_CHUNK: usize = 100;

/// Spotify Web API client backed by reqwest.
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    market: String,
    tokens: Mutex<TokenManager>,
}

impl SpotifyClient {
    pub fn new(tokens: TokenManager) -> Self {
        Self {
            http: Client::new(),
            api_url: config::spotify_apiurl(),
            market: config::spotify_market(),
            tokens: Mutex::new(tokens),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{base}/{path}", base = self.api_url, path = path)
    }

    /// Sends the request built by `build`, retrying on `429` (honoring
    /// `Retry-After`) and `502`, and maps every other failure status.
    async fn send<F>(&self, build: F) -> Result<Response, SpotifyError>
    where
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let token = self
                .tokens
                .lock()
                .await
                .get_valid_token()
                .await
                .map_err(SpotifyError::Auth)?;

            let response = build(&self.http).bearer_auth(token).send().await?;
            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            match status {
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = response
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                        .unwrap_or(1);
                    if retry_after > MAX_RETRY_AFTER_SECS || attempts >= MAX_ATTEMPTS {
                        warning!("Rate limited for {} seconds, giving up.", retry_after);
                        return Err(SpotifyError::RateLimited(retry_after));
                    }
                    sleep(Duration::from_secs(retry_after)).await;
                }
                StatusCode::BAD_GATEWAY if attempts < MAX_ATTEMPTS => {
                    sleep(Duration::from_secs(10)).await;
                }
                _ => return Err(status_error(status, response).await),
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SpotifyError> {
        let response = self.send(|http| http.get(url).query(query)).await?;
        Ok(response.json::<T>().await?)
    }

    async fn snapshot_of(response: Response) -> Result<String, SpotifyError> {
        let json = response.json::<SnapshotResponse>().await?;
        Ok(json.snapshot_id)
    }
}

async fn status_error(status: StatusCode, response: Response) -> SpotifyError {
    let body = response.text().await.unwrap_or_default();
    SpotifyError::from_body(status.as_u16(), body)
}

#[async_trait]
impl PlaylistApi for SpotifyClient {
    async fn current_user(&self) -> Result<User, SpotifyError> {
        self.get_json(&self.url("me"), &[]).await
    }

    async fn playlist(&self, playlist_id: &str) -> Result<RemotePlaylist, SpotifyError> {
        let first: PlaylistResponse = self
            .get_json(
                &self.url(&format!("playlists/{}", playlist_id)),
                &[
                    ("additional_types", "track,episode"),
                    ("market", self.market.as_str()),
                ],
            )
            .await?;

        let mut items = first.tracks.items;
        let mut next = first.tracks.next;
        while let Some(url) = next {
            let page: Page<PlaylistTrackItem> = self.get_json(&url, &[]).await?;
            items.extend(page.items);
            next = page.next;
        }

        Ok(RemotePlaylist {
            snapshot_id: first.snapshot_id,
            items,
        })
    }

    async fn episode(&self, uri: &str) -> Result<Episode, SpotifyError> {
        let url = self.url(&format!("episodes/{}", utils::id_from_uri(uri)));
        self.get_json(&url, &[("market", self.market.as_str())]).await
    }

    async fn search_shows(&self, query: &str) -> Result<Vec<Show>, SpotifyError> {
        let json: SearchShowsResponse = self
            .get_json(
                &self.url("search"),
                &[("q", query), ("type", "show"), ("market", self.market.as_str())],
            )
            .await?;
        Ok(json.shows.items.into_iter().flatten().collect())
    }

    async fn show_episodes(
        &self,
        show_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Option<Episode>>, SpotifyError> {
        let offset = offset.to_string();
        let limit = limit.min(50).to_string();
        self.get_json(
            &self.url(&format!("shows/{}/episodes", utils::id_from_uri(show_id))),
            &[
                ("market", self.market.as_str()),
                ("offset", offset.as_str()),
                ("limit", limit.as_str()),
            ],
        )
        .await
    }

    async fn add_items(
        &self,
        playlist_id: &str,
        uris: &[String],
        position: Option<usize>,
    ) -> Result<String, SpotifyError> {
        let url = self.url(&format!("playlists/{}/tracks", playlist_id));
        let mut snapshot_id = String::new();
        for (idx, chunk) in uris.chunks(ADD_CHUNK).enumerate() {
            let body = AddItemsRequest {
                uris: chunk.to_vec(),
                position: position.map(|p| p + idx * ADD_CHUNK),
            };
            let response = self.send(|http| http.post(&url).json(&body)).await?;
            snapshot_id = Self::snapshot_of(response).await?;
        }
        Ok(snapshot_id)
    }

    async fn remove_occurrence(
        &self,
        playlist_id: &str,
        uri: &str,
        position: usize,
        snapshot_id: Option<&str>,
    ) -> Result<String, SpotifyError> {
        let url = self.url(&format!("playlists/{}/tracks", playlist_id));
        let body = RemoveOccurrencesRequest {
            tracks: vec![TrackOccurrence {
                uri: uri.to_string(),
                positions: vec![position],
            }],
            snapshot_id: snapshot_id.map(str::to_string),
        };
        let response = self.send(|http| http.delete(&url).json(&body)).await?;
        Self::snapshot_of(response).await
    }

    async fn remove_positions(
        &self,
        user_id: &str,
        playlist_id: &str,
        positions: &[usize],
        snapshot_id: &str,
    ) -> Result<String, SpotifyError> {
        let url = self.url(&format!(
            "users/{}/playlists/{}/tracks",
            user_id, playlist_id
        ));
        let body = RemovePositionsRequest {
            positions: positions.to_vec(),
            snapshot_id: snapshot_id.to_string(),
        };
        let response = self.send(|http| http.delete(&url).json(&body)).await?;
        Self::snapshot_of(response).await
    }
}
