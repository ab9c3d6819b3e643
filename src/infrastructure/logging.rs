use std::io;

use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{
    config::env::LoggingConfig,
    config::AppConfig,
    infrastructure::directories::ResolvedPaths,
};

pub const STAGE_TARGETS: [&str; 8] = [
    "input",
    "dispatch",
    "extract",
    "resolve",
    "aggregate",
    "pipeline",
    "report",
    "fire",
];

const LOG_FILE: &str = "harvest.log";
const QUIET_DEPENDENCIES: [&str; 4] = ["hyper=warn", "hyper_util=warn", "reqwest=warn", "rustls=warn"];

static INIT: OnceCell<()> = OnceCell::new();
static GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

pub fn init_tracing(config: &AppConfig, paths: &ResolvedPaths) -> Result<()> {
    INIT.get_or_try_init::<_, anyhow::Error>(|| {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(filter_directives(&config.logging))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        };

        let (file_writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::daily(&paths.logs_dir, LOG_FILE));
        let _ = GUARD.set(guard);

        let console_layer = fmt::layer()
            .compact()
            .with_writer(io::stderr)
            .with_target(true);

        let file_layer = fmt::layer()
            .with_writer(file_writer)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_target(true)
            .with_ansi(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()?;

        tracing::info!(
            logs = %paths.logs_dir.display(),
            stages = ?config.logging.stage_levels,
            "tracing initialized"
        );
        Ok(())
    })?;
    Ok(())
}

/// Base level, HTTP stack held at `warn`, then per-stage overrides last so they win.
fn filter_directives(logging: &LoggingConfig) -> String {
    let mut directives = vec![logging.level.clone()];
    directives.extend(QUIET_DEPENDENCIES.iter().map(|d| d.to_string()));
    directives.extend(
        logging
            .stage_levels
            .iter()
            .map(|(target, level)| format!("{target}={level}")),
    );
    directives.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_overrides_follow_base_level() {
        let logging = LoggingConfig {
            level: "warn".into(),
            stage_levels: vec![("resolve".into(), "debug".into())],
        };
        let directives = filter_directives(&logging);

        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("reqwest=warn"));
        assert!(directives.ends_with(",resolve=debug"));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }
}
