use rand::{Rng, distr::Alphanumeric};

/// Random nonce sent as the OAuth `state` parameter and checked on callback.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Extracts the id from a `spotify:<kind>:<id>` uri. Bare ids pass through.
pub fn id_from_uri(uri: &str) -> &str {
    uri.rsplit(':').next().unwrap_or(uri)
}

/// Maps a ghost-free position onto the remote listing: the index of the
/// `position`-th non-ghost slot. `ghosts` must be ascending.
pub fn remote_position(position: usize, ghosts: &[usize]) -> usize {
    ghosts
        .iter()
        .fold(position, |remote, &g| if g <= remote { remote + 1 } else { remote })
}

/// Picks the entry of `positions` closest to `expected`.
pub fn nearest_position(positions: &[usize], expected: usize) -> Option<usize> {
    positions
        .iter()
        .copied()
        .min_by_key(|&p| p.abs_diff(expected))
}
