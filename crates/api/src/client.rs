//! HTTP client for the catalog REST API

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

use smashly_common::{Envelope, HarnessConfig, HealthStatus, Racket, Result};

/// A decoded API response: status, content type and envelope
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Envelope<T>,
}

impl<T> ApiResponse<T> {
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.starts_with("application/json"))
            .unwrap_or(false)
    }
}

/// Query parameters of `GET /rackets`
#[derive(Debug, Clone, Copy, Default)]
pub struct ListQuery {
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

impl ListQuery {
    pub fn limit(limit: u32) -> Self {
        Self { limit: Some(limit), page: None }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        pairs
    }
}

/// Client for the catalog API rooted at `<base url>/api`
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base: String,
}

impl CatalogClient {
    /// Create a client for an API base that already includes the path prefix
    pub fn new(base: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base: base.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &HarnessConfig) -> Result<Self> {
        Self::new(config.api_base())
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn send(&self, path: &str, query: &[(&'static str, String)]) -> Result<reqwest::Response> {
        let url = self.url(path);
        debug!("GET {} {:?}", url, query);
        Ok(self.http.get(&url).query(query).send().await?)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<ApiResponse<T>> {
        let resp = self.send(path, query).await?;
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = resp.bytes().await?;
        let body = serde_json::from_slice(&bytes)?;

        Ok(ApiResponse { status, content_type, body })
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<ApiResponse<HealthStatus>> {
        self.get("/health", &[]).await
    }

    /// `GET /rackets?limit=&page=`
    pub async fn list(&self, query: ListQuery) -> Result<ApiResponse<Vec<Racket>>> {
        self.get("/rackets", &query.pairs()).await
    }

    /// `GET /rackets/{id}`
    pub async fn racket(&self, id: i64) -> Result<ApiResponse<Racket>> {
        self.get(&format!("/rackets/{}", id), &[]).await
    }

    /// `GET /rackets/search?q=`
    pub async fn search(&self, term: &str) -> Result<ApiResponse<Vec<Racket>>> {
        self.get("/rackets/search", &[("q", term.to_string())]).await
    }

    /// Status of `GET /rackets/search?q=` without decoding the body
    pub async fn search_status(&self, term: &str) -> Result<StatusCode> {
        Ok(self.send("/rackets/search", &[("q", term.to_string())]).await?.status())
    }

    /// `GET /rackets/bestsellers`
    pub async fn bestsellers(&self) -> Result<ApiResponse<Vec<Racket>>> {
        self.get("/rackets/bestsellers", &[]).await
    }
}
