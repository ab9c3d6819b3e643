use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Client;

use crate::{
    config::{AppConfig, RunMode},
    divar::SearchClient,
    domain::QuerySpec,
    infrastructure::directories::ResolvedPaths,
    pipeline::Pipeline,
    report,
    tasks::{fire::fire_and_forget, resolver::HttpRedirectLookup},
};

pub struct HarvestApp {
    config: AppConfig,
    paths: ResolvedPaths,
    search: SearchClient,
}

impl HarvestApp {
    pub fn initialize(config: AppConfig, paths: ResolvedPaths) -> Result<Self> {
        let http_client = Client::builder()
            .build()
            .context("failed to build search HTTP client")?;
        let search = SearchClient::new(http_client, &config.search)?;

        Ok(Self {
            config,
            paths,
            search,
        })
    }

    pub async fn run(self) -> Result<()> {
        let HarvestApp {
            config,
            paths,
            search,
        } = self;

        let started_at = Utc::now();
        let queries = report::read_queries(&paths.input_path, config.max_rows)?;
        tracing::info!(
            mode = ?config.mode,
            rows = queries.len(),
            started_at = %started_at.to_rfc3339(),
            "run started"
        );

        match config.mode {
            RunMode::Fire => {
                let search = search.with_timeout(config.search.fire_timeout);
                fire_and_forget(search, queries, config.dispatch.workers).await;
            }
            RunMode::Harvest => harvest(&config, &paths, search, queries).await?,
        }

        let elapsed = Utc::now() - started_at;
        tracing::info!(elapsed_ms = elapsed.num_milliseconds(), "run finished");
        Ok(())
    }
}

async fn harvest(
    config: &AppConfig,
    paths: &ResolvedPaths,
    search: SearchClient,
    queries: Vec<QuerySpec>,
) -> Result<()> {
    let lookup = HttpRedirectLookup::new(config.resolution.timeout)
        .context("failed to build redirect lookup client")?;
    let pipeline = Pipeline::new(
        Arc::new(search),
        config.dispatch.workers,
        Arc::new(lookup),
        &config.resolution,
        config.aggregation.clone(),
    );

    let (aggregation, stats) = pipeline.run(queries).await;
    if stats.resolved == 0 {
        tracing::warn!(
            dispatched = stats.dispatched,
            failed = stats.failed,
            extracted = stats.extracted,
            "no banner link resolved; the report will be empty"
        );
    }

    println!("{}", report::render_summary(&aggregation));
    report::write_csv(&aggregation, &paths.output_path)?;
    Ok(())
}
