use std::{env, time::Duration};

use super::env::{
    AggregationConfig, AppConfig, ConfigError, DirectoryConfig, DispatchConfig, LoggingConfig,
    ResolutionConfig, ResolveStrategy, RunMode, SearchApiConfig,
};
use crate::{
    divar::request::{default_headers, SEARCH_ENDPOINT},
    infrastructure::logging::STAGE_TARGETS,
};

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env()
}

impl AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    pub(crate) fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mode = match var("RUN_MODE").as_deref().map(str::trim) {
            None | Some("harvest") => RunMode::Harvest,
            Some("fire") => RunMode::Fire,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "RUN_MODE",
                    value: other.to_string(),
                })
            }
        };

        let strategy = match var("RESOLVE_STRATEGY").as_deref().map(str::trim) {
            None | Some("token") => ResolveStrategy::Token,
            Some("redirect") => ResolveStrategy::Redirect,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "RESOLVE_STRATEGY",
                    value: other.to_string(),
                })
            }
        };

        let search = SearchApiConfig {
            endpoint: var("SEARCH_ENDPOINT").unwrap_or_else(|| SEARCH_ENDPOINT.to_string()),
            headers: default_headers(),
            timeout: Duration::from_millis(parse_num(&var, "SEARCH_TIMEOUT_MS", 15_000)?),
            fire_timeout: Duration::from_millis(parse_num(&var, "FIRE_TIMEOUT_MS", 1)?),
        };

        let dispatch = DispatchConfig {
            workers: non_zero(parse_num(&var, "DISPATCH_WORKERS", 35)?, "DISPATCH_WORKERS")?,
        };

        let resolution = ResolutionConfig {
            strategy,
            workers: non_zero(parse_num(&var, "RESOLVE_WORKERS", 35)?, "RESOLVE_WORKERS")?,
            token_param: var("TOKEN_PARAM").unwrap_or_else(|| "ext_link_data".to_string()),
            timeout: Duration::from_millis(parse_num(&var, "RESOLVE_TIMEOUT_MS", 10_000)?),
        };

        let impression_divisor = match var("IMPRESSION_DIVISOR").as_deref().map(str::trim) {
            None => Some(7),
            Some("off") | Some("0") => None,
            Some(raw) => Some(raw.parse::<u64>().map_err(|_| ConfigError::Invalid {
                key: "IMPRESSION_DIVISOR",
                value: raw.to_string(),
            })?),
        };

        let aggregation = AggregationConfig {
            impression_divisor,
            utm_case_sensitive: parse_bool(&var, "UTM_CASE_SENSITIVE", false)?,
        };

        Ok(Self {
            input_path: var("INPUT_CSV").unwrap_or_else(|| "data.csv".to_string()),
            output_path: var("OUTPUT_CSV").unwrap_or_else(|| "output_results.csv".to_string()),
            max_rows: parse_num(&var, "MAX_ROWS", 100)?,
            mode,
            search,
            dispatch,
            resolution,
            aggregation,
            directories: DirectoryConfig {
                logs_dir: var("LOGS_DIR").unwrap_or_else(|| "logs".to_string()),
            },
            logging: LoggingConfig {
                level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
                stage_levels: parse_stage_levels(var("LOG_STAGE_LEVELS").as_deref())?,
            },
        })
    }
}

fn parse_num<T, F>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

fn parse_bool<F>(var: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(value) => Err(ConfigError::Invalid { key, value }),
    }
}

fn parse_stage_levels(raw: Option<&str>) -> Result<Vec<(String, String)>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let invalid = || ConfigError::Invalid {
                key: "LOG_STAGE_LEVELS",
                value: part.to_string(),
            };
            let (target, level) = part.split_once('=').ok_or_else(invalid)?;
            let (target, level) = (target.trim(), level.trim().to_ascii_lowercase());
            if !STAGE_TARGETS.contains(&target) || !LEVELS.contains(&level.as_str()) {
                return Err(invalid());
            }
            Ok((target.to_string(), level))
        })
        .collect()
}

fn non_zero(value: usize, key: &'static str) -> Result<usize, ConfigError> {
    if value == 0 {
        Err(ConfigError::Zero(key))
    } else {
        Ok(value)
    }
}
