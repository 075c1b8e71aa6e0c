use crate::{cli::load_data_file, spotify};

pub async fn auth() {
    let data = load_data_file().await;
    spotify::auth::auth(data.credentials).await;
}
