//! The overlay REST API as a [`Backend`].

use crate::config::ClientConfig;
use crate::error::ClientError;
use ov_core::wire::{
    DrawingRecord, DrawingUpdate, NewDrawing, NewTextRegion, RegionUpdate, TextRegionRecord,
};
use ov_editor::backend::{Backend, BackendError, PageRef};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Resource paths, relative to the base URL.
pub mod paths {
    use ov_editor::backend::PageRef;

    pub fn regions(page: &PageRef) -> String {
        format!("/projects/{}/pages/{}/text-regions", page.project_id, page.page_number)
    }

    pub fn region(page: &PageRef, id: &str) -> String {
        format!("/projects/{}/pages/text-regions/{id}", page.project_id)
    }

    pub fn drawings(page: &PageRef) -> String {
        format!("/projects/{}/pages/{}/drawings", page.project_id, page.page_number)
    }

    pub fn drawing(page: &PageRef, id: &str) -> String {
        format!("/projects/{}/pages/drawings/{id}", page.project_id)
    }

    pub fn recompose(page: &PageRef, dpi: u32) -> String {
        format!(
            "/projects/{}/pages/{}/render-translated?dpi={dpi}",
            page.project_id, page.page_number
        )
    }
}

pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    render_dpi: u32,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidBaseUrl(base_url));
        }
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ClientError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            render_dpi: config.render_dpi,
            timeout: config.request_timeout,
        })
    }

    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(&ClientConfig::from_env())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = request.send().await.map_err(|e| self.transport(e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        log::warn!("backend answered {status}: {body}");
        Err(BackendError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let response = self.send(request).await?;
        let text = response.text().await.map_err(|e| self.transport(e))?;
        serde_json::from_str(&text).map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn transport(&self, error: reqwest::Error) -> BackendError {
        if error.is_timeout() {
            BackendError::Timeout(self.timeout)
        } else {
            BackendError::Transport(error.to_string())
        }
    }
}

impl Backend for HttpBackend {
    async fn list_regions(&self, page: &PageRef) -> Result<Vec<TextRegionRecord>, BackendError> {
        log::debug!("GET regions of {page}");
        self.json(self.http.get(self.url(&paths::regions(page)))).await
    }

    async fn create_region(
        &self,
        page: &PageRef,
        body: &NewTextRegion,
    ) -> Result<TextRegionRecord, BackendError> {
        self.json(self.http.post(self.url(&paths::regions(page))).json(body))
            .await
    }

    async fn update_region(
        &self,
        page: &PageRef,
        id: &str,
        body: &RegionUpdate,
    ) -> Result<TextRegionRecord, BackendError> {
        self.json(self.http.patch(self.url(&paths::region(page, id))).json(body))
            .await
    }

    async fn delete_region(&self, page: &PageRef, id: &str) -> Result<(), BackendError> {
        self.send(self.http.delete(self.url(&paths::region(page, id))))
            .await
            .map(drop)
    }

    async fn list_drawings(&self, page: &PageRef) -> Result<Vec<DrawingRecord>, BackendError> {
        log::debug!("GET drawings of {page}");
        self.json(self.http.get(self.url(&paths::drawings(page)))).await
    }

    async fn create_drawing(
        &self,
        page: &PageRef,
        body: &NewDrawing,
    ) -> Result<DrawingRecord, BackendError> {
        self.json(self.http.post(self.url(&paths::drawings(page))).json(body))
            .await
    }

    async fn update_drawing(
        &self,
        page: &PageRef,
        id: &str,
        body: &DrawingUpdate,
    ) -> Result<DrawingRecord, BackendError> {
        self.json(self.http.patch(self.url(&paths::drawing(page, id))).json(body))
            .await
    }

    async fn delete_drawing(&self, page: &PageRef, id: &str) -> Result<(), BackendError> {
        self.send(self.http.delete(self.url(&paths::drawing(page, id))))
            .await
            .map(drop)
    }

    async fn recompose(&self, page: &PageRef) -> Result<(), BackendError> {
        log::info!("recomposing {page} at {} dpi", self.render_dpi);
        self.send(self.http.post(self.url(&paths::recompose(page, self.render_dpi))))
            .await
            .map(drop)
    }
}
