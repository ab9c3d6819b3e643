use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub input_path: String,
    pub output_path: String,
    pub max_rows: usize,
    pub mode: RunMode,
    pub search: SearchApiConfig,
    pub dispatch: DispatchConfig,
    pub resolution: ResolutionConfig,
    pub aggregation: AggregationConfig,
    pub directories: DirectoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Harvest,
    Fire,
}

#[derive(Debug, Clone)]
pub struct SearchApiConfig {
    pub endpoint: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
    pub fire_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub workers: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStrategy {
    Token,
    Redirect,
}

#[derive(Debug, Clone)]
pub struct ResolutionConfig {
    pub strategy: ResolveStrategy,
    pub workers: usize,
    pub token_param: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AggregationConfig {
    /// `None` turns impression weighting off.
    pub impression_divisor: Option<u64>,
    pub utm_case_sensitive: bool,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            impression_divisor: Some(7),
            utm_case_sensitive: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub logs_dir: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub stage_levels: Vec<(String, String)>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}
