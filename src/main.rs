mod aggregate;
mod app;
mod config;
mod divar;
mod domain;
mod infrastructure;
mod pipeline;
mod report;
mod tasks;
#[cfg(test)]
mod testing;
mod token;

use anyhow::Result;
use infrastructure::{directories, logging};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_config()?;
    let paths = directories::ensure_directories(&config)?;
    logging::init_tracing(&config, &paths)?;

    let app = app::HarvestApp::initialize(config, paths)?;
    app.run().await
}
