use std::path::PathBuf;

use chrono::Utc;

use crate::{config, config::Credentials, spotify, types::Token};

pub struct TokenManager {
    token: Token,
    credentials: Credentials,
}

impl TokenManager {
    pub fn new(token: Token, credentials: Credentials) -> Self {
        TokenManager { token, credentials }
    }

    pub async fn load(credentials: Credentials) -> Result<Self, String> {
        let path = Self::token_path();
        let content = async_fs::read_to_string(&path)
            .await
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        let token: Token = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self { token, credentials })
    }

    pub async fn persist(&self) -> Result<(), String> {
        let path = Self::token_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.token).map_err(|e| e.to_string())?;
        async_fs::write(path, json).await.map_err(|e| e.to_string())
    }

    /// Returns an access token, refreshing and persisting it first when it
    /// expires within the next four minutes.
    pub async fn get_valid_token(&mut self) -> Result<String, String> {
        if self.is_expired() {
            let refreshed =
                spotify::auth::refresh_token(&self.token.refresh_token, &self.credentials).await?;
            self.token = refreshed;
            self.persist().await?;
        }

        Ok(self.token.access_token.clone())
    }

    fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        now + 240 >= self.token.obtained_at + self.token.expires_in
    }

    fn token_path() -> PathBuf {
        config::data_dir().join("cache/token.json")
    }
}
