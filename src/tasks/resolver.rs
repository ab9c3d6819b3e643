use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::{stream, StreamExt};
use reqwest::{header::LOCATION, redirect, Client};
use url::{form_urlencoded, Url};

use crate::{
    config::{ResolutionConfig, ResolveStrategy},
    domain::{ExtractedLink, ResolvedUrl},
    token::{decode_token, external_url},
};

#[async_trait]
pub trait RedirectLookup: Send + Sync {
    async fn location(&self, link: &str) -> anyhow::Result<Option<String>>;
}

pub struct HttpRedirectLookup {
    client: Client,
    timeout: Duration,
}

impl HttpRedirectLookup {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .user_agent(format!("banner-harvest/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl RedirectLookup for HttpRedirectLookup {
    async fn location(&self, link: &str) -> anyhow::Result<Option<String>> {
        let response = self
            .client
            .get(link)
            .timeout(self.timeout)
            .send()
            .await?;

        let Some(location) = response.headers().get(LOCATION) else {
            return Ok(None);
        };
        let location = location.to_str()?;

        // absolute targets pass through untouched, relative ones are joined to the link
        match Url::parse(location) {
            Ok(_) => Ok(Some(location.to_string())),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Ok(Some(Url::parse(link)?.join(location)?.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

pub struct Resolver<P> {
    strategy: ResolveStrategy,
    token_param: String,
    workers: usize,
    lookup: Arc<P>,
}

impl<P> Resolver<P>
where
    P: RedirectLookup + 'static,
{
    pub fn new(config: &ResolutionConfig, lookup: Arc<P>) -> Self {
        Self {
            strategy: config.strategy,
            token_param: config.token_param.clone(),
            workers: config.workers.max(1),
            lookup,
        }
    }

    pub async fn resolve_all(&self, links: Vec<ExtractedLink>) -> Vec<ResolvedUrl> {
        tracing::info!(
            target: "resolve",
            total = links.len(),
            workers = self.workers,
            strategy = ?self.strategy,
            "resolving banner links"
        );

        stream::iter(links)
            .map(|link| self.resolve_one(link))
            .buffer_unordered(self.workers)
            .filter_map(|resolved| async move { resolved })
            .collect()
            .await
    }

    async fn resolve_one(&self, link: ExtractedLink) -> Option<ResolvedUrl> {
        let url = match self.strategy {
            ResolveStrategy::Token => self.from_token(&link)?,
            ResolveStrategy::Redirect => self.from_redirect(&link).await?,
        };
        tracing::debug!(target: "resolve", row = link.query.index, url = %url, "link resolved");
        Some(ResolvedUrl {
            url,
            query: link.query,
        })
    }

    fn from_token(&self, link: &ExtractedLink) -> Option<String> {
        let Some(token) = query_param(&link.url, &self.token_param) else {
            tracing::info!(
                target: "resolve",
                row = link.query.index,
                link = %link.url,
                param = %self.token_param,
                "no token parameter in link"
            );
            return None;
        };

        match decode_token(&token) {
            Ok(payload) => Some(external_url(&payload)),
            Err(err) => {
                tracing::warn!(target: "resolve", row = link.query.index, error = %err, "failed to decode link token");
                None
            }
        }
    }

    async fn from_redirect(&self, link: &ExtractedLink) -> Option<String> {
        match self.lookup.location(&link.url).await {
            Ok(Some(location)) => Some(location),
            Ok(None) => {
                tracing::info!(target: "resolve", row = link.query.index, link = %link.url, "no redirect location");
                None
            }
            Err(err) => {
                tracing::warn!(target: "resolve", row = link.query.index, link = %link.url, error = %err, "redirect lookup failed");
                None
            }
        }
    }
}

fn query_param(link: &str, name: &str) -> Option<String> {
    let (_, rest) = link.split_once('?')?;
    let query = rest.split_once('#').map_or(rest, |(query, _)| query);
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
