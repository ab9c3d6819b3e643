use std::sync::Arc;

use crate::{
    aggregate::{Aggregation, Aggregator},
    config::{AggregationConfig, ResolutionConfig},
    domain::{QuerySpec, RequestOutcome},
    tasks::{
        dispatcher::{extract_links, RequestDispatcher, SearchBackend},
        resolver::{RedirectLookup, Resolver},
    },
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub dispatched: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub extracted: usize,
    pub resolved: usize,
}

pub struct Pipeline<B, P> {
    dispatcher: RequestDispatcher<B>,
    resolver: Resolver<P>,
    aggregation: AggregationConfig,
}

impl<B, P> Pipeline<B, P>
where
    B: SearchBackend + 'static,
    P: RedirectLookup + 'static,
{
    pub fn new(
        backend: Arc<B>,
        dispatch_workers: usize,
        lookup: Arc<P>,
        resolution: &ResolutionConfig,
        aggregation: AggregationConfig,
    ) -> Self {
        Self {
            dispatcher: RequestDispatcher::new(backend, dispatch_workers),
            resolver: Resolver::new(resolution, lookup),
            aggregation,
        }
    }

    pub async fn run(&self, queries: Vec<QuerySpec>) -> (Aggregation, PipelineStats) {
        let mut stats = PipelineStats {
            dispatched: queries.len(),
            ..Default::default()
        };

        let outcomes = self.dispatcher.dispatch(queries).await;
        stats.succeeded = outcomes
            .iter()
            .filter(|o| matches!(o, RequestOutcome::Success { .. }))
            .count();
        stats.failed = outcomes.len() - stats.succeeded;

        let links = extract_links(outcomes);
        stats.extracted = links.len();

        let resolved = self.resolver.resolve_all(links).await;
        stats.resolved = resolved.len();

        let aggregation = Aggregator::new(&self.aggregation).aggregate(resolved);
        tracing::info!(
            target: "pipeline",
            dispatched = stats.dispatched,
            succeeded = stats.succeeded,
            failed = stats.failed,
            extracted = stats.extracted,
            resolved = stats.resolved,
            "pipeline finished"
        );
        (aggregation, stats)
    }
}
