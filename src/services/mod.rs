//! External collaborators of the pipeline.
//!
//! Each service is a trait so the workflow can run against the HTTP
//! implementations in production and in-process fakes in tests.

mod icons;
mod upstream;
mod wire;

#[cfg(test)]
pub(crate) mod fakes;

pub use icons::*;
pub use upstream::*;
pub use wire::*;

use std::sync::Arc;

use async_trait::async_trait;

use crate::icons::IconGlyph;

/// Errors from talking to a collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The HTTP request itself failed (network, DNS, TLS, body decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-2xx status code.
    #[error("service returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The reply did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// No reply within the bounded wait.
    #[error("request timed out")]
    TimedOut,
}

/// Turns a topic into slide text.
#[async_trait]
pub trait DraftService: Send + Sync {
    async fn generate_draft(
        &self,
        request: &DraftServiceRequest,
    ) -> Result<DraftServiceResponse, ServiceError>;
}

/// Produces one raster image per prompt.
#[async_trait]
pub trait ImageService: Send + Sync {
    /// `Ok(None)` means the service answered but produced no image.
    async fn generate_image(&self, prompt: &str) -> Result<Option<String>, ServiceError>;
}

/// Decomposes a raster slide into a vector scene.
#[async_trait]
pub trait LayoutService: Send + Sync {
    async fn analyze_layout(
        &self,
        image_base64: &str,
    ) -> Result<LayoutServiceResponse, ServiceError>;
}

/// Publishes the finished deck.
#[async_trait]
pub trait ExportService: Send + Sync {
    async fn export(
        &self,
        credential: &str,
        request: &ExportServiceRequest,
    ) -> Result<ExportServiceResponse, ServiceError>;
}

/// Resolves icon glyphs by name.
#[async_trait]
pub trait IconProvider: Send + Sync {
    /// `Ok(None)` when the provider has no icon of that name.
    async fn fetch_icon(&self, name: &str) -> Result<Option<IconGlyph>, ServiceError>;
}

/// Everything the workflow controller talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub draft: Arc<dyn DraftService>,
    pub images: Arc<dyn ImageService>,
    pub layout: Arc<dyn LayoutService>,
    pub export: Arc<dyn ExportService>,
    pub icons: Arc<dyn IconProvider>,
}

impl Collaborators {
    /// HTTP-backed collaborators for the given endpoints.
    pub fn over_http(upstream_url: &str, icon_base_url: &str) -> Self {
        let client = reqwest::Client::new();
        let upstream = Arc::new(UpstreamClient::with_client(
            client.clone(),
            upstream_url.to_string(),
        ));
        Self {
            draft: upstream.clone(),
            images: upstream.clone(),
            layout: upstream.clone(),
            export: upstream,
            icons: Arc::new(LucideIcons::with_client(client, icon_base_url.to_string())),
        }
    }
}
