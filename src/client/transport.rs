//! HTTP exchange used by the sample source.
//!
//! Kept behind a trait so the polling logic can be driven by canned
//! responses in tests.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use std::time::Duration;
use thiserror::Error;

/// The request never produced a response.
#[derive(Debug, Error)]
#[error("{method} {path} failed: {reason}")]
pub struct TransportError {
    pub method: &'static str,
    pub path: String,
    pub reason: String,
}

/// A completed exchange, whatever its status.
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(
        &self,
        path: &str,
        headers: &HeaderMap,
        body: &serde_json::Value,
    ) -> Result<Response, TransportError>;

    async fn get(&self, path: &str, headers: &HeaderMap) -> Result<Response, TransportError>;

    async fn delete(&self, path: &str, headers: &HeaderMap) -> Result<Response, TransportError>;
}

/// `reqwest` transport bound to one server.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(scheme: &str, host: &str, port: u16, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: format!("{}://{}:{}", scheme, host, port),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn send(
        &self,
        method: &'static str,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Response, TransportError> {
        let failed = |e: reqwest::Error| TransportError {
            method,
            path: path.to_string(),
            reason: e.to_string(),
        };

        let response = request.send().await.map_err(failed)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(failed)?;

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        path: &str,
        headers: &HeaderMap,
        body: &serde_json::Value,
    ) -> Result<Response, TransportError> {
        let request = self
            .client
            .post(self.url(path))
            .headers(headers.clone())
            .json(body);
        self.send("POST", path, request).await
    }

    async fn get(&self, path: &str, headers: &HeaderMap) -> Result<Response, TransportError> {
        let request = self.client.get(self.url(path)).headers(headers.clone());
        self.send("GET", path, request).await
    }

    async fn delete(&self, path: &str, headers: &HeaderMap) -> Result<Response, TransportError> {
        let request = self.client.delete(self.url(path)).headers(headers.clone());
        self.send("DELETE", path, request).await
    }
}
