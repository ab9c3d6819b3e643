use std::collections::BTreeMap;

use url::Url;

use super::classifier::{Classifier, Publisher};
use crate::{config::AggregationConfig, domain::ResolvedUrl};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub cities: Vec<String>,
    pub neighborhoods: Vec<String>,
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainStats {
    pub ad_count: u64,
    pub impression_count: u64,
    pub placements: Vec<Placement>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublisherTotals {
    pub ad_count: u64,
    pub impression_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PublisherShare {
    pub publisher: Publisher,
    pub ad_percent: f64,
    pub impression_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub buckets: BTreeMap<Publisher, BTreeMap<String, DomainStats>>,
    pub totals: BTreeMap<Publisher, PublisherTotals>,
}

impl Default for Aggregation {
    fn default() -> Self {
        Self {
            buckets: Publisher::ALL.iter().map(|p| (*p, BTreeMap::new())).collect(),
            totals: Publisher::ALL
                .iter()
                .map(|p| (*p, PublisherTotals::default()))
                .collect(),
        }
    }
}

impl Aggregation {
    pub fn total_ads(&self) -> u64 {
        self.totals.values().map(|t| t.ad_count).sum()
    }

    pub fn total_impressions(&self) -> u64 {
        self.totals.values().map(|t| t.impression_count).sum()
    }

    #[cfg(test)]
    pub fn domain(&self, publisher: Publisher, domain: &str) -> Option<&DomainStats> {
        self.buckets.get(&publisher)?.get(domain)
    }

    pub fn shares(&self) -> Vec<PublisherShare> {
        let ads = self.total_ads();
        let impressions = self.total_impressions();
        self.totals
            .iter()
            .map(|(publisher, totals)| PublisherShare {
                publisher: *publisher,
                ad_percent: percent(totals.ad_count, ads),
                impression_percent: percent(totals.impression_count, impressions),
            })
            .collect()
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[derive(Debug, Clone)]
pub struct Aggregator {
    classifier: Classifier,
    impression_divisor: Option<u64>,
    aggregation: Aggregation,
}

impl Aggregator {
    pub fn new(config: &AggregationConfig) -> Self {
        Self {
            classifier: Classifier::new(config.utm_case_sensitive),
            impression_divisor: config.impression_divisor.filter(|d| *d > 0),
            aggregation: Aggregation::default(),
        }
    }

    pub fn record(&mut self, resolved: ResolvedUrl) -> Publisher {
        let publisher = self.classifier.classify(&resolved.url);
        let domain = domain_of(&resolved.url);
        let impressions = self
            .impression_divisor
            .map(|divisor| resolved.query.expected_row_count / divisor)
            .unwrap_or(0);

        let stats = self
            .aggregation
            .buckets
            .entry(publisher)
            .or_default()
            .entry(domain)
            .or_default();
        stats.ad_count += 1;
        stats.impression_count += impressions;
        stats.placements.push(Placement {
            cities: resolved.query.city_ids,
            neighborhoods: resolved.query.neighborhood_ids,
            category: resolved.query.category,
        });

        let totals = self.aggregation.totals.entry(publisher).or_default();
        totals.ad_count += 1;
        totals.impression_count += impressions;
        publisher
    }

    pub fn aggregate<I>(mut self, urls: I) -> Aggregation
    where
        I: IntoIterator<Item = ResolvedUrl>,
    {
        for url in urls {
            let publisher = self.record(url);
            tracing::trace!(target: "aggregate", %publisher, "url classified");
        }
        tracing::info!(
            target: "aggregate",
            ads = self.aggregation.total_ads(),
            impressions = self.aggregation.total_impressions(),
            "aggregation finished"
        );
        self.aggregation
    }
}

fn domain_of(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };
    match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}
