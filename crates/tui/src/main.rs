mod app;

use anyhow::Result;
use std::fs::{self, OpenOptions};

use tracing_subscriber::{prelude::*, EnvFilter};

use qkart_core::{
    api::ApiClient,
    cart::CartService,
    config::{self, AppConfig},
    session::SessionStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;

    let api = ApiClient::new(&config)?;
    let session_path = config
        .session_file
        .clone()
        .unwrap_or_else(SessionStore::default_path);
    let sessions = SessionStore::new(api.clone(), session_path);
    let cart = CartService::new(api.clone());

    let mut app = app::QkartApp::new(config, api, sessions, cart);
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("qkart.log");

    let env_filter = EnvFilter::from_default_env();

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
