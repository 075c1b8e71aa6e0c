use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::{Client, Url};
use tokio::sync::Mutex;

use crate::{
    config::{self, Credentials},
    error,
    management::TokenManager,
    server::start_api_server,
    success,
    types::{AuthState, Token, TokenResponse},
    utils, warning,
};

/// Runs the OAuth 2.0 authorization-code flow with Spotify.
///
/// 1. Generates a random `state` nonce and stores it with the client
///    credentials in the shared state
/// 2. Starts the local callback server
/// 3. Opens the authorization URL in the user's browser
/// 4. Waits for the callback handler to exchange the code for a token
/// 5. Persists the token for later runs
///
/// Browser launch failures fall back to printing the URL. Timeouts and token
/// persistence failures terminate the program.
pub async fn auth(credentials: Credentials) {
    let state = utils::generate_state();
    let shared_state = Arc::new(Mutex::new(Some(AuthState {
        state: state.clone(),
        credentials: credentials.clone(),
        token: None,
    })));

    let server_state = Arc::clone(&shared_state);
    tokio::spawn(async move {
        start_api_server(server_state).await;
    });

    let auth_url = match authorize_url(&credentials.client_id, &state) {
        Ok(url) => url,
        Err(e) => error!("Cannot build authorization URL: {}", e),
    };

    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    match wait_for_token(shared_state).await {
        Some(token) => {
            let token_manager = TokenManager::new(token, credentials);
            if let Err(e) = token_manager.persist().await {
                error!("Failed to save token to cache: {}", e);
            }

            success!("Authentication successful!");
        }
        None => {
            error!("Authentication failed or timed out.");
        }
    }
}

/// Builds the Spotify authorize URL for the configured redirect URI and scope.
pub fn authorize_url(client_id: &str, state: &str) -> Result<Url, String> {
    Url::parse_with_params(
        &config::spotify_apiauth_url(),
        &[
            ("client_id", client_id),
            ("response_type", "code"),
            ("redirect_uri", &config::spotify_redirect_uri()),
            ("scope", &config::spotify_scope()),
            ("state", state),
        ],
    )
    .map_err(|e| e.to_string())
}

/// Polls the shared state once per second for up to 60 seconds.
async fn wait_for_token(shared_state: Arc<Mutex<Option<AuthState>>>) -> Option<Token> {
    use std::time::Instant;

    let max_wait = Duration::from_secs(60);
    let start = Instant::now();

    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(token) = lock.as_ref().and_then(|s| s.token.as_ref()) {
            return Some(token.clone());
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Exchanges a refresh token for a fresh access token.
///
/// Spotify may omit the refresh token from the response, in which case the
/// current one stays valid and is carried over.
pub async fn refresh_token(refresh_token: &str, credentials: &Credentials) -> Result<Token, String> {
    let client = Client::new();
    let res = client
        .post(config::spotify_apitoken_url())
        .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .send()
        .await
        .map_err(|e| e.to_string())?
        .error_for_status()
        .map_err(|e| e.to_string())?;

    let json: TokenResponse = res.json().await.map_err(|e| e.to_string())?;
    Ok(into_token(json, Some(refresh_token)))
}

/// Exchanges the authorization code received on the callback for a token.
pub async fn exchange_code(code: &str, credentials: &Credentials) -> Result<Token, reqwest::Error> {
    let redirect_uri = config::spotify_redirect_uri();

    let client = Client::new();
    let res = client
        .post(config::spotify_apitoken_url())
        .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri.as_str()),
        ])
        .send()
        .await?
        .error_for_status()?;

    let json: TokenResponse = res.json().await?;
    Ok(into_token(json, None))
}

fn into_token(json: TokenResponse, previous_refresh: Option<&str>) -> Token {
    Token {
        access_token: json.access_token,
        refresh_token: json
            .refresh_token
            .or_else(|| previous_refresh.map(str::to_string))
            .unwrap_or_default(),
        scope: json.scope,
        expires_in: json.expires_in,
        obtained_at: Utc::now().timestamp() as u64,
    }
}
