use anyhow::Context;
use dotenv::dotenv;
use loan_advisor::{
    api::ApiClient, app::App, config::Config, conversation::Conversation,
    logging::init_logging, mirror::ChatMirror, session::IdentityProvider, storage::LocalStore,
    ui::run_ui,
};
use log::info;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::initialize().context("Failed to load configuration")?;
    let data_dir = config.data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
    let _logger = init_logging(&data_dir, &config.log_level)?;
    info!("Starting loan advisor client against {}", config.api_base_url);

    let store = LocalStore::open(config.store_path());
    let api = ApiClient::new(&config, store.clone())?;
    let mirror = config
        .mirror_enabled
        .then(|| ChatMirror::new(store.clone(), api.clone()));
    let conversation = Conversation::new(IdentityProvider::new(store), api, mirror.clone());

    let sync_interval =
        (config.sync_interval_secs > 0).then(|| Duration::from_secs(config.sync_interval_secs));
    run_ui(App::new(conversation, mirror), sync_interval).await?;
    Ok(())
}
