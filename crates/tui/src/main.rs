mod app;

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};

use tracing_subscriber::{prelude::*, EnvFilter};
use valuesort_core::{
    config::{self, AppConfig},
    dataset::DatasetSource,
    persist::StateFile,
    store::SortState,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;

    // The one async operation: the dataset is acquired to completion
    // before any rendering. Failure here is fatal.
    let source = DatasetSource::from_config(&config);
    let dataset = source
        .load()
        .await
        .context("failed to acquire card dataset")?;

    let state_file = StateFile::new(config.data_root.clone());
    let persisted = state_file.load();
    let state = SortState::hydrate(dataset, persisted);

    let mut app = app::ValueSortApp::new(state, state_file);
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("valuesort.log");

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
