use podqueue::types::{Episode, ItemKind, PlaylistResponse, RemotePlaylist, SearchShowsResponse};

const PLAYLIST_JSON: &str = r#"{
    "snapshot_id": "MTAsZDVmZjMjJhZTVmZjcxOGNlMA==",
    "tracks": {
        "items": [
            { "track": { "type": "track", "name": "Song", "uri": "spotify:track:t1" } },
            { "track": null },
            { "track": {
                "type": "episode",
                "name": "Episode 12",
                "uri": "spotify:episode:e12",
                "show": { "id": "s1", "name": "Daily News" }
            } },
            { "track": { "type": "track", "name": "Local", "uri": "" } },
            { "track": { "type": "audiobook", "name": "Chapter", "uri": "spotify:chapter:c1" } }
        ],
        "next": null,
        "total": 5
    }
}"#;

fn remote() -> RemotePlaylist {
    let response: PlaylistResponse = serde_json::from_str(PLAYLIST_JSON).unwrap();
    RemotePlaylist {
        snapshot_id: response.snapshot_id,
        items: response.tracks.items,
    }
}

#[test]
fn test_playlist_response_deserializes_mixed_items() {
    let remote = remote();

    assert_eq!(remote.items.len(), 5);
    let kinds: Vec<Option<ItemKind>> = remote
        .items
        .iter()
        .map(|i| i.track.as_ref().map(|t| t.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            Some(ItemKind::Track),
            None,
            Some(ItemKind::Episode),
            Some(ItemKind::Track),
            Some(ItemKind::Other),
        ]
    );
    assert_eq!(
        remote.items[2].track.as_ref().unwrap().show.as_ref().unwrap().name,
        "Daily News"
    );
}

#[test]
fn test_ghost_positions_cover_null_and_empty_uris() {
    assert_eq!(remote().ghost_positions(), vec![1, 3]);
}

#[test]
fn test_positions_of_uri() {
    let remote = remote();

    assert_eq!(remote.positions_of("spotify:episode:e12"), vec![2]);
    assert!(remote.positions_of("spotify:episode:missing").is_empty());
}

#[test]
fn test_episode_played_state() {
    let played: Episode = serde_json::from_str(
        r#"{ "id": "e1", "uri": "spotify:episode:e1", "name": "One",
             "resume_point": { "fully_played": true, "resume_position_ms": 0 } }"#,
    )
    .unwrap();
    let partial: Episode = serde_json::from_str(
        r#"{ "id": "e2", "uri": "spotify:episode:e2", "name": "Two",
             "resume_point": { "fully_played": false, "resume_position_ms": 120000 } }"#,
    )
    .unwrap();
    let unknown: Episode =
        serde_json::from_str(r#"{ "id": "e3", "uri": "spotify:episode:e3", "name": "Three" }"#)
            .unwrap();

    assert!(played.fully_played());
    assert!(!partial.fully_played());

    // Without resume data the episode counts as not played
    assert!(!unknown.fully_played());
}

#[test]
fn test_search_results_may_contain_null_shows() {
    let response: SearchShowsResponse = serde_json::from_str(
        r#"{ "shows": { "items": [ null, { "id": "s1", "name": "Daily News" } ], "next": null } }"#,
    )
    .unwrap();

    let shows: Vec<_> = response.shows.items.into_iter().flatten().collect();
    assert_eq!(shows.len(), 1);
    assert_eq!(shows[0].id, "s1");
    assert_eq!(shows[0].uri, "");
}
