use std::fmt;

#[derive(Debug)]
pub enum SpotifyError {
    /// Transport failure: connection, TLS, timeout.
    Http(reqwest::Error),
    /// Non-success status returned by the Web API.
    Status { status: u16, message: String },
    /// The snapshot id sent with a mutation no longer matches the playlist.
    StaleSnapshot(String),
    RateLimited(u64),
    Auth(String),
    Decode(String),
    NotFound(String),
}

impl SpotifyError {
    /// Classifies a failure status and the error message from its body.
    ///
    /// `409`, and `400` whose message mentions the snapshot, mean the
    /// snapshot id sent with a mutation was rejected.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => SpotifyError::Auth(message),
            404 => SpotifyError::NotFound(message),
            409 => SpotifyError::StaleSnapshot(message),
            400 if message.to_lowercase().contains("snapshot") => {
                SpotifyError::StaleSnapshot(message)
            }
            _ => SpotifyError::Status { status, message },
        }
    }

    /// Like [`from_status`](Self::from_status), reading the message from a
    /// Web API error body (`{"error": {"status", "message"}}`). Bodies in
    /// any other shape are kept whole.
    pub fn from_body(status: u16, body: String) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|json| json["error"]["message"].as_str().map(str::to_string))
            .unwrap_or(body);
        Self::from_status(status, message)
    }

    pub fn is_stale_snapshot(&self) -> bool {
        matches!(self, SpotifyError::StaleSnapshot(_))
    }
}

impl fmt::Display for SpotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpotifyError::Http(e) => write!(f, "request failed: {}", e),
            SpotifyError::Status { status, message } => {
                write!(f, "spotify returned {}: {}", status, message)
            }
            SpotifyError::StaleSnapshot(message) => {
                write!(f, "playlist snapshot is out of date: {}", message)
            }
            SpotifyError::RateLimited(secs) => {
                write!(f, "rate limited, retry after {} seconds", secs)
            }
            SpotifyError::Auth(message) => write!(f, "authorization failed: {}", message),
            SpotifyError::Decode(message) => write!(f, "unexpected response: {}", message),
            SpotifyError::NotFound(what) => write!(f, "not found: {}", what),
        }
    }
}

impl std::error::Error for SpotifyError {}

impl From<reqwest::Error> for SpotifyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SpotifyError::Decode(err.to_string())
        } else {
            SpotifyError::Http(err)
        }
    }
}
