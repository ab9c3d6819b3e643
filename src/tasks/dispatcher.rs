use std::sync::Arc;

use async_trait::async_trait;
use futures::{stream, StreamExt};
use serde_json::Value;
use thiserror::Error;

use crate::{
    divar::widgets::inset_banner_link,
    domain::{ExtractedLink, QuerySpec, RequestOutcome},
};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("search API answered with status {0}")]
    Status(u16),
    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &QuerySpec) -> Result<Value, TransportError>;
}

pub struct RequestDispatcher<B> {
    backend: Arc<B>,
    workers: usize,
}

impl<B> RequestDispatcher<B>
where
    B: SearchBackend + 'static,
{
    pub fn new(backend: Arc<B>, workers: usize) -> Self {
        Self {
            backend,
            workers: workers.max(1),
        }
    }

    /// Runs every query exactly once. Outcomes come back in completion
    /// order, not submission order.
    pub async fn dispatch(&self, queries: Vec<QuerySpec>) -> Vec<RequestOutcome> {
        let total = queries.len();
        tracing::info!(target: "dispatch", total, workers = self.workers, "dispatching searches");

        let mut completed = 0usize;
        let mut outcomes = Vec::with_capacity(total);
        let mut pending = stream::iter(queries)
            .map(|query| {
                let backend = self.backend.clone();
                async move {
                    match backend.search(&query).await {
                        Ok(body) => RequestOutcome::Success { body, query },
                        Err(err) => RequestOutcome::Failure {
                            reason: err.to_string(),
                            query,
                        },
                    }
                }
            })
            .buffer_unordered(self.workers);

        while let Some(outcome) = pending.next().await {
            completed += 1;
            let row = outcome.query().index;
            match &outcome {
                RequestOutcome::Success { .. } => {
                    tracing::debug!(target: "dispatch", row, completed, total, "search completed");
                }
                RequestOutcome::Failure { reason, .. } => {
                    tracing::warn!(
                        target: "dispatch",
                        row,
                        completed,
                        total,
                        error = %reason,
                        "search failed; dropping row"
                    );
                }
            }
            outcomes.push(outcome);
        }

        outcomes
    }
}

pub fn extract_links(outcomes: Vec<RequestOutcome>) -> Vec<ExtractedLink> {
    outcomes
        .into_iter()
        .filter_map(|outcome| match outcome {
            RequestOutcome::Success { body, query } => match inset_banner_link(&body) {
                Some(link) => {
                    tracing::debug!(target: "extract", row = query.index, link, "banner link found");
                    Some(ExtractedLink {
                        url: link.to_string(),
                        query,
                    })
                }
                None => {
                    tracing::debug!(target: "extract", row = query.index, "no inset banner in response");
                    None
                }
            },
            RequestOutcome::Failure { .. } => None,
        })
        .collect()
}
