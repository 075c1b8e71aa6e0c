use std::collections::HashMap;

use crate::{
    info,
    spotify::{PlaylistApi, SpotifyError},
};

/// Show display names mapped to Spotify show ids, resolved once.
#[derive(Debug, Clone, Default)]
pub struct ShowRegistry {
    shows: HashMap<String, String>,
}

impl ShowRegistry {
    /// Looks up every name through the search endpoint. A name without an
    /// exact match among the results fails the whole resolution.
    pub async fn resolve<A, I, S>(api: &A, names: I) -> Result<Self, SpotifyError>
    where
        A: PlaylistApi + ?Sized,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut shows = HashMap::new();
        for name in names {
            let name = name.as_ref();
            if shows.contains_key(name) {
                continue;
            }
            let id = find_show_id(api, name).await?;
            shows.insert(name.to_string(), id);
        }

        info!("Resolved {} shows.", shows.len());
        Ok(Self { shows })
    }

    pub fn id(&self, show_name: &str) -> Option<&str> {
        self.shows.get(show_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.shows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shows.is_empty()
    }
}

async fn find_show_id<A: PlaylistApi + ?Sized>(api: &A, name: &str) -> Result<String, SpotifyError> {
    api.search_shows(name)
        .await?
        .into_iter()
        .find(|show| show.name == name)
        .map(|show| show.id)
        .ok_or_else(|| SpotifyError::NotFound(format!("show \"{}\"", name)))
}
