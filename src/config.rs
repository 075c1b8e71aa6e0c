//! Configuration management for the podcast playlist curator.
//!
//! Two sources feed the application:
//!
//! 1. The **data file**: a plain-text file holding the user's credentials, the
//!    target playlist and the tracked show names, one value per line.
//! 2. The **environment**: optional endpoint and server overrides, loaded from
//!    the process environment and from a `.env` file in the local data
//!    directory. Every setting here has a sensible default.
//!
//! Both live under `podqueue/` in the platform-specific local data directory:
//! - Linux: `~/.local/share/podqueue/`
//! - macOS: `~/Library/Application Support/podqueue/`
//! - Windows: `%LOCALAPPDATA%/podqueue/`

use std::{env, fmt, path::PathBuf};

/// Default Spotify market used when searching shows and reading playlists.
pub const DEFAULT_MARKET: &str = "IT";

const DEFAULT_SCOPE: &str = "playlist-modify-private playlist-read-private playlist-modify-public user-read-playback-position user-library-read user-follow-read";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the `podqueue` data directory if it doesn't exist. A missing `.env`
/// file is not an error: every setting read from the environment falls back
/// to a default.
///
/// # Errors
///
/// Returns an error string if the data directory cannot be created or if an
/// existing `.env` file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Returns the application directory inside the local data directory.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("podqueue");
    path
}

/// Returns the path of the plain-text data file.
///
/// `PODQUEUE_DATA_FILE` overrides the default `<data dir>/podqueue/data`.
pub fn data_file_path() -> PathBuf {
    match env::var("PODQUEUE_DATA_FILE") {
        Ok(path) => PathBuf::from(path),
        Err(_) => data_dir().join("data"),
    }
}

/// Returns the server address for the local OAuth callback server.
///
/// # Example
///
/// ```
/// let addr = server_addr(); // e.g., "127.0.0.1:8080"
/// ```
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").unwrap_or_else(|_| "127.0.0.1:8080".to_string())
}

/// Returns the Spotify OAuth redirect URI.
///
/// This must match the redirect URI registered in the Spotify application
/// settings and point at [`server_addr`].
pub fn spotify_redirect_uri() -> String {
    env::var("SPOTIFY_API_REDIRECT_URI")
        .unwrap_or_else(|_| "http://localhost:8080/callback".to_string())
}

/// Returns the Spotify API scope permissions requested during authorization.
pub fn spotify_scope() -> String {
    env::var("SPOTIFY_API_AUTH_SCOPE").unwrap_or_else(|_| DEFAULT_SCOPE.to_string())
}

/// Returns the Spotify OAuth authorization URL.
pub fn spotify_apiauth_url() -> String {
    env::var("SPOTIFY_API_AUTH_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/authorize".to_string())
}

/// Returns the Spotify Web API base URL.
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL").unwrap_or_else(|_| "https://api.spotify.com/v1".to_string())
}

/// Returns the Spotify OAuth token exchange URL.
pub fn spotify_apitoken_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/api/token".to_string())
}

/// Returns the market code sent with playlist, search and episode requests.
pub fn spotify_market() -> String {
    env::var("SPOTIFY_MARKET").unwrap_or_else(|_| DEFAULT_MARKET.to_string())
}

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    MissingField(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "cannot read data file: {}", e),
            ConfigError::MissingField(field) => write!(f, "data file is missing the {} line", field),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

/// Client credentials registered with the Spotify developer platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Contents of the plain-text data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFile {
    pub username: String,
    pub credentials: Credentials,
    pub playlist_id: String,
    pub daily_shows: Vec<String>,
    pub long_shows: Vec<String>,
}

const FIELDS: [&str; 6] = [
    "username",
    "client id",
    "client secret",
    "playlist id",
    "daily shows",
    "long shows",
];

impl DataFile {
    /// Parses the data file layout: username, client id, client secret,
    /// playlist id, comma-separated daily show names, comma-separated long
    /// show names, and a trailing line that is ignored.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let lines: Vec<&str> = content
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .collect();

        Ok(Self {
            username: field(&lines, 0)?.to_string(),
            credentials: Credentials {
                client_id: field(&lines, 1)?.to_string(),
                client_secret: field(&lines, 2)?.to_string(),
            },
            playlist_id: field(&lines, 3)?.to_string(),
            daily_shows: split_show_names(field(&lines, 4)?),
            long_shows: split_show_names(field(&lines, 5)?),
        })
    }

    pub async fn load() -> Result<Self, ConfigError> {
        let content = async_fs::read_to_string(data_file_path()).await?;
        Self::parse(&content)
    }

    /// Every tracked show, daily shows first.
    pub fn all_shows(&self) -> impl Iterator<Item = &String> {
        self.daily_shows.iter().chain(self.long_shows.iter())
    }
}

// show name lines may be empty, the identifying lines may not
fn field<'a>(lines: &[&'a str], index: usize) -> Result<&'a str, ConfigError> {
    lines
        .get(index)
        .copied()
        .filter(|l| index >= 4 || !l.is_empty())
        .ok_or(ConfigError::MissingField(FIELDS[index]))
}

fn split_show_names(line: &str) -> Vec<String> {
    line.split(',')
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
