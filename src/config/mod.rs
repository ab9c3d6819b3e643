pub mod env;
mod loader;

pub use env::{
    AggregationConfig, AppConfig, ResolutionConfig, ResolveStrategy, RunMode, SearchApiConfig,
};
pub use loader::load_config;
