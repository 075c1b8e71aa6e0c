use std::collections::{HashMap, HashSet};

use crate::types::{PlaylistItem, SnapshotTableRow};

/// Local view of the playlist: records keyed by uri plus the uris ordered
/// by position.
///
/// Inserted records join the end of the order until the next [`resort`];
/// callers patch positions first and resort once.
///
/// [`resort`]: LocalSnapshot::resort
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalSnapshot {
    items: HashMap<String, PlaylistItem>,
    order: Vec<String>,
}

impl LocalSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, uri: &str) -> Option<&PlaylistItem> {
        self.items.get(uri)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.items.contains_key(uri)
    }

    /// Adds a record, replacing any record with the same uri.
    pub fn insert(&mut self, item: PlaylistItem) {
        if self.items.insert(item.uri.clone(), item.clone()).is_none() {
            self.order.push(item.uri);
        }
    }

    /// Moves an existing record. Returns false if the uri is unknown.
    pub fn set_position(&mut self, uri: &str, position: usize) -> bool {
        match self.items.get_mut(uri) {
            Some(item) => {
                item.position = position;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, uri: &str) -> Option<PlaylistItem> {
        let removed = self.items.remove(uri)?;
        self.order.retain(|u| u != uri);
        Some(removed)
    }

    /// Re-derives the position order. Ties keep their current relative order.
    pub fn resort(&mut self) {
        let items = &self.items;
        self.order
            .sort_by_key(|uri| items.get(uri).map_or(usize::MAX, |item| item.position));
    }

    /// Drops every record whose uri is not in `keep`, returning the dropped
    /// records in position order.
    pub fn retain_uris(&mut self, keep: &HashSet<String>) -> Vec<PlaylistItem> {
        let (kept, dropped): (Vec<String>, Vec<String>) =
            self.order.drain(..).partition(|uri| keep.contains(uri));
        self.order = kept;
        dropped
            .into_iter()
            .filter_map(|uri| self.items.remove(&uri))
            .collect()
    }

    /// Records in position order.
    pub fn iter(&self) -> impl Iterator<Item = &PlaylistItem> {
        self.order.iter().filter_map(|uri| self.items.get(uri))
    }

    pub fn episodes_of<'a>(&'a self, show_name: &'a str) -> impl Iterator<Item = &'a PlaylistItem> {
        self.iter()
            .filter(move |item| item.show_name.as_deref() == Some(show_name))
    }

    pub fn last_episode_of<'a>(&'a self, show_name: &'a str) -> Option<&'a PlaylistItem> {
        self.episodes_of(show_name).last()
    }

    pub fn show_count(&self, show_name: &str) -> usize {
        self.episodes_of(show_name).count()
    }

    pub fn rows(&self) -> Vec<SnapshotTableRow> {
        self.iter().map(SnapshotTableRow::from).collect()
    }
}
