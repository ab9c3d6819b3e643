use serde_json::Value;

use super::query::QuerySpec;

#[derive(Debug)]
pub enum RequestOutcome {
    Success { body: Value, query: QuerySpec },
    Failure { reason: String, query: QuerySpec },
}

impl RequestOutcome {
    pub fn query(&self) -> &QuerySpec {
        match self {
            RequestOutcome::Success { query, .. } | RequestOutcome::Failure { query, .. } => query,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    pub url: String,
    pub query: QuerySpec,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    pub url: String,
    pub query: QuerySpec,
}
