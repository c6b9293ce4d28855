//! HTTP client for the draft, image, analysis and export services.
//!
//! All four services live behind one base URL and speak JSON over `POST`.

use async_trait::async_trait;

use super::{
    DraftService, DraftServiceRequest, DraftServiceResponse, ExportService, ExportServiceRequest,
    ExportServiceResponse, ImageService, ImageServiceRequest, ImageServiceResponse,
    LayoutService, LayoutServiceRequest, LayoutServiceResponse, ServiceError,
};

pub const DRAFT_PATH: &str = "/api/step1-draft";
pub const IMAGE_PATH: &str = "/api/step3-gen-image";
pub const ANALYZE_PATH: &str = "/api/step3-analyze-layout";
pub const EXPORT_PATH: &str = "/api/export";

/// HTTP client for the generation backend.
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    /// Create a client for a backend at `base_url`, e.g. `http://host:8000`,
    /// reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Ensure the response has a success status code.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ServiceError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ServiceError> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ServiceError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl DraftService for UpstreamClient {
    async fn generate_draft(
        &self,
        request: &DraftServiceRequest,
    ) -> Result<DraftServiceResponse, ServiceError> {
        tracing::info!(count = request.count, locked = request.is_locked, "Requesting draft");
        let response = self
            .client
            .post(self.url(DRAFT_PATH))
            .json(request)
            .send()
            .await?;
        Self::parse_response(response).await
    }
}

#[async_trait]
impl ImageService for UpstreamClient {
    async fn generate_image(&self, prompt: &str) -> Result<Option<String>, ServiceError> {
        let response = self
            .client
            .post(self.url(IMAGE_PATH))
            .json(&ImageServiceRequest { prompt })
            .send()
            .await?;
        let body: ImageServiceResponse = Self::parse_response(response).await?;
        Ok(body.image_base64)
    }
}

#[async_trait]
impl LayoutService for UpstreamClient {
    async fn analyze_layout(
        &self,
        image_base64: &str,
    ) -> Result<LayoutServiceResponse, ServiceError> {
        let response = self
            .client
            .post(self.url(ANALYZE_PATH))
            .json(&LayoutServiceRequest { image_base64 })
            .send()
            .await?;
        Self::parse_response(response).await
    }
}

#[async_trait]
impl ExportService for UpstreamClient {
    async fn export(
        &self,
        credential: &str,
        request: &ExportServiceRequest,
    ) -> Result<ExportServiceResponse, ServiceError> {
        tracing::info!(slides = request.slides.len(), "Exporting deck");
        let response = self
            .client
            .post(self.url(EXPORT_PATH))
            .bearer_auth(credential)
            .json(request)
            .send()
            .await?;
        Self::parse_response(response).await
    }
}
