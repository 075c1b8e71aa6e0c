use tabled::Table;

use crate::{cli::open_reconciler, info};

/// Prints the reconciled playlist as a table.
pub async fn show() {
    let reconciler = open_reconciler().await;

    let rows = reconciler.rows();
    let total = rows.len();
    println!("{}", Table::new(rows));
    info!("Total number of tracks and episodes: {}", total);

    let episodes = reconciler
        .snapshot()
        .iter()
        .filter(|item| item.is_episode())
        .count();
    info!("{} of them are podcast episodes.", episodes);

    let ghosts = reconciler.ghosts().len();
    if ghosts > 0 {
        info!("{} ghost entries remain in the playlist.", ghosts);
    }
}
