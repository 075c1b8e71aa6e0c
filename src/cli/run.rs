use crate::{cli::open_reconciler, error, success};

/// Runs the daily cycle against the configured playlist.
pub async fn run() {
    let mut reconciler = open_reconciler().await;

    if let Err(e) = reconciler.run_daily().await {
        error!("Daily run aborted: {}", e);
    }

    success!(
        "Playlist holds {} items after the daily run.",
        reconciler.snapshot().len()
    );
}
