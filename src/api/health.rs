use std::sync::Arc;

use axum::{Extension, response::Json};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::types::AuthState;

pub async fn health(Extension(shared_state): Extension<Arc<Mutex<Option<AuthState>>>>) -> Json<Value> {
    let authorized = shared_state
        .lock()
        .await
        .as_ref()
        .is_some_and(|s| s.token.is_some());

    Json(json!({
        "status": "ok",
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "authorized": authorized
    }))
}
