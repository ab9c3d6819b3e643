use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, COOKIE},
    Client,
};
use serde_json::Value;

use crate::{
    config::SearchApiConfig,
    domain::QuerySpec,
    tasks::dispatcher::{SearchBackend, TransportError},
};

use super::request::{build_request, session_cookie};

#[derive(Clone)]
pub struct SearchClient {
    http: Client,
    endpoint: String,
    headers: HeaderMap,
    timeout: Duration,
}

impl SearchClient {
    pub fn new(http: Client, config: &SearchApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::with_capacity(config.headers.len() + 1);
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("invalid header name {name:?}"))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("invalid value for header {name}"))?;
            headers.insert(name, value);
        }

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            headers,
            timeout: config.timeout,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn request_headers(&self) -> HeaderMap {
        let mut headers = self.headers.clone();
        if let Ok(cookie) = HeaderValue::from_str(&session_cookie()) {
            headers.insert(COOKIE, cookie);
        }
        headers
    }

    pub async fn send_detached(&self, query: &QuerySpec) {
        let _ = self
            .http
            .post(&self.endpoint)
            .headers(self.request_headers())
            .json(&build_request(query))
            .timeout(self.timeout)
            .send()
            .await;
    }
}

#[async_trait]
impl SearchBackend for SearchClient {
    async fn search(&self, query: &QuerySpec) -> Result<Value, TransportError> {
        let response = self
            .http
            .post(&self.endpoint)
            .headers(self.request_headers())
            .json(&build_request(query))
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        Ok(response.json::<Value>().await?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        divar::request::default_headers,
        tasks::dispatcher::tests::query,
        testing::{http_response, serve_once},
    };

    fn client_for(base: &str) -> SearchClient {
        let config = SearchApiConfig {
            endpoint: format!("{base}/v8/postlist/w/search"),
            headers: default_headers(),
            timeout: Duration::from_secs(5),
            fire_timeout: Duration::from_millis(1),
        };
        SearchClient::new(Client::new(), &config).unwrap()
    }

    #[tokio::test]
    async fn search_posts_form_with_session_cookie() {
        let (base, server) = serve_once(http_response(
            "200 OK",
            &[("content-type", "application/json")],
            r#"{"list_top_widgets":[]}"#,
        ))
        .await;

        let body = client_for(&base).search(&query(0, 70)).await.unwrap();
        assert_eq!(body, json!({ "list_top_widgets": [] }));

        let request = server.await.unwrap();
        let lowered = request.to_ascii_lowercase();
        assert!(request.starts_with("POST /v8/postlist/w/search "));
        assert!(lowered.contains("\r\ncookie: did="));
        assert!(lowered.contains("\r\nx-render-type: csr"));
        assert!(request.contains(r#""city_ids":["1"]"#));
        assert!(request.contains(r#""value":"real-estate""#));
    }

    #[tokio::test]
    async fn non_success_status_is_a_transport_error() {
        let (base, server) = serve_once(http_response("503 Service Unavailable", &[], "busy")).await;

        let err = client_for(&base).search(&query(1, 7)).await.unwrap_err();
        assert!(matches!(err, TransportError::Status(503)));
        server.await.unwrap();
    }

    #[test]
    fn each_request_gets_a_fresh_cookie() {
        let client = client_for("http://127.0.0.1:9");
        let first = client.request_headers();
        let second = client.request_headers();
        assert_ne!(first.get(COOKIE), second.get(COOKIE));
        assert_eq!(first.get("origin").unwrap(), "https://divar.ir");
    }
}
