use podqueue::spotify::auth::authorize_url;
use podqueue::utils::*;

#[test]
fn test_generate_state() {
    let state = generate_state();

    // Should be exactly 32 characters
    assert_eq!(state.len(), 32);

    // Should contain only alphanumeric characters
    assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated states should be different
    let state2 = generate_state();
    assert_ne!(state, state2);
}

#[test]
fn test_id_from_uri() {
    assert_eq!(id_from_uri("spotify:episode:4rOoJ6Egrf8K2IrywzwOMk"), "4rOoJ6Egrf8K2IrywzwOMk");
    assert_eq!(id_from_uri("spotify:show:abc"), "abc");

    // Bare ids pass through unchanged
    assert_eq!(id_from_uri("abc"), "abc");
    assert_eq!(id_from_uri(""), "");
}

#[test]
fn test_remote_position_without_ghosts() {
    assert_eq!(remote_position(0, &[]), 0);
    assert_eq!(remote_position(7, &[]), 7);
}

#[test]
fn test_remote_position_skips_ghost_slots() {
    // Listing: G x0 x1 x2 G x3 x4 x5 x6 G x7 ...
    let ghosts = [0, 4, 9];

    assert_eq!(remote_position(0, &ghosts), 1);
    assert_eq!(remote_position(2, &ghosts), 3);
    assert_eq!(remote_position(3, &ghosts), 5);
    assert_eq!(remote_position(7, &ghosts), 10);
    assert_eq!(remote_position(20, &ghosts), 23);
}

#[test]
fn test_remote_position_with_leading_ghost_run() {
    // Listing: G G x0 x1
    let ghosts = [0, 1];

    assert_eq!(remote_position(0, &ghosts), 2);
    assert_eq!(remote_position(1, &ghosts), 3);
}

#[test]
fn test_nearest_position() {
    assert_eq!(nearest_position(&[], 3), None);
    assert_eq!(nearest_position(&[8], 3), Some(8));
    assert_eq!(nearest_position(&[1, 4, 10], 5), Some(4));
    assert_eq!(nearest_position(&[1, 4, 10], 9), Some(10));

    // Ties resolve to the first candidate
    assert_eq!(nearest_position(&[2, 6], 4), Some(2));
}

#[test]
fn test_authorize_url_carries_flow_parameters() {
    let url = authorize_url("my-client", "nonce123").unwrap();
    let params: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let get = |key: &str| {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };

    assert_eq!(get("client_id"), Some("my-client"));
    assert_eq!(get("response_type"), Some("code"));
    assert_eq!(get("state"), Some("nonce123"));
    assert!(get("redirect_uri").is_some());
    assert!(get("scope").unwrap().contains("playlist-modify-private"));
}
