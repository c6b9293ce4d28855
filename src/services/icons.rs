//! Icon provider backed by a static Lucide-style icon host.

use async_trait::async_trait;
use reqwest::StatusCode;

use super::{IconProvider, ServiceError};
use crate::icons::{is_valid_icon_name, parse_glyph, IconGlyph};

/// Fetches `{base_url}/{name}.svg` and parses it into a glyph.
pub struct LucideIcons {
    client: reqwest::Client,
    base_url: String,
}

impl LucideIcons {
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl IconProvider for LucideIcons {
    async fn fetch_icon(&self, name: &str) -> Result<Option<IconGlyph>, ServiceError> {
        if !is_valid_icon_name(name) {
            tracing::debug!(icon = name, "Icon name not requestable");
            return Ok(None);
        }

        let response = self
            .client
            .get(format!("{}/{}.svg", self.base_url, name))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ServiceError::Status {
                status: response.status().as_u16(),
                body: String::new(),
            });
        }

        let svg = response.text().await?;
        parse_glyph(name, &svg)
            .map(Some)
            .map_err(|e| ServiceError::Malformed(e.to_string()))
    }
}
