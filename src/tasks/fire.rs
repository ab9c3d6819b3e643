//! Load generation only: responses are never read and delivery is not guaranteed.

use std::sync::Arc;

use tokio::{sync::Semaphore, task::JoinSet};

use crate::{divar::SearchClient, domain::QuerySpec};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FireSummary {
    pub sent: usize,
    pub expected_listings: u64,
}

pub async fn fire_and_forget(
    client: SearchClient,
    queries: Vec<QuerySpec>,
    workers: usize,
) -> FireSummary {
    let client = Arc::new(client);
    let permits = Arc::new(Semaphore::new(workers.max(1)));
    let mut tasks = JoinSet::new();
    let mut summary = FireSummary::default();

    for query in queries {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        summary.sent += 1;
        summary.expected_listings += query.expected_row_count;
        tracing::debug!(target: "fire", row = query.index, sent = summary.sent, "search fired");

        let client = client.clone();
        tasks.spawn(async move {
            client.send_detached(&query).await;
            drop(permit);
        });
    }

    // wait for the sends to leave, not for any answer
    while tasks.join_next().await.is_some() {}

    tracing::info!(
        target: "fire",
        sent = summary.sent,
        expected_listings = summary.expected_listings,
        "fire-and-forget run finished"
    );
    summary
}
