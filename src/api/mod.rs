//! # API Module
//!
//! HTTP handlers for the short-lived local server that receives Spotify's
//! OAuth redirect.
//!
//! - [`callback`] - Checks the `state` nonce and exchanges the authorization
//!   code for a token, handing it back to the waiting auth flow.
//! - [`health`] - Reports status and version, handy to check that the
//!   configured `SERVER_ADDRESS` is reachable before authorizing.

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
