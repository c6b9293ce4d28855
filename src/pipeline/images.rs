//! Image generation stage: one concurrent request per slide, settle-all.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use futures::future::join_all;
use serde::Serialize;

use crate::models::SlideRecord;
use crate::services::{ImageService, ServiceError};

/// Per-slide result of the image stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AssetOutcome {
    Generated,
    Failed { reason: String },
}

impl AssetOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, AssetOutcome::Failed { .. })
    }
}

/// Output of [`generate_images`]: slides and outcomes share input order.
#[derive(Debug, Clone)]
pub struct ImageBatch {
    pub slides: Vec<SlideRecord>,
    pub outcomes: Vec<AssetOutcome>,
}

impl ImageBatch {
    pub fn failed_indices(&self) -> Vec<usize> {
        self.outcomes
            .iter()
            .enumerate()
            .filter(|(_, outcome)| outcome.is_failed())
            .map(|(index, _)| index)
            .collect()
    }

    /// True when there was at least one slide and none got an image.
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(AssetOutcome::is_failed)
    }
}

/// Prompt sent to the image service: the visual prompt plus text placement hints.
pub fn build_image_prompt(slide: &SlideRecord) -> String {
    let mut prompt = String::new();
    let visual = slide.visual_prompt.trim();
    if !visual.is_empty() {
        prompt.push_str(&format!("\"{}\"\n", visual));
    }
    prompt.push_str("====== Content to place on the slide ======\n");
    prompt.push_str(&format!(
        "- Title (large, top/center): \"{}\"\n",
        slide.title
    ));
    prompt.push_str(&format!("- Body (medium, readable): \"{}\"", slide.content));
    prompt
}

/// Generate a background for every slide.
///
/// Requests run concurrently and are never retried. A failed request only
/// clears that slide's image; the batch returns once every request settled.
pub async fn generate_images(
    service: &dyn ImageService,
    slides: &[Arc<SlideRecord>],
    timeout: Option<Duration>,
) -> ImageBatch {
    tracing::info!(count = slides.len(), "Generating slide images");

    let requests = slides.iter().enumerate().map(|(index, slide)| async move {
        let prompt = build_image_prompt(slide);
        let result = request_image(service, &prompt, timeout).await;
        if let Err(reason) = &result {
            tracing::warn!(slide = index, "Image generation failed: {}", reason);
        }
        result
    });
    let results = join_all(requests).await;

    let mut batch = ImageBatch {
        slides: Vec::with_capacity(slides.len()),
        outcomes: Vec::with_capacity(slides.len()),
    };
    for (slide, result) in slides.iter().zip(results) {
        match result {
            Ok(image) => {
                batch.slides.push(slide.with_background(Some(image)));
                batch.outcomes.push(AssetOutcome::Generated);
            }
            Err(reason) => {
                batch.slides.push(slide.with_background(None));
                batch.outcomes.push(AssetOutcome::Failed { reason });
            }
        }
    }

    tracing::info!(
        failed = batch.failed_indices().len(),
        total = batch.outcomes.len(),
        "Image generation settled"
    );
    batch
}

async fn request_image(
    service: &dyn ImageService,
    prompt: &str,
    timeout: Option<Duration>,
) -> Result<String, String> {
    let call = service.generate_image(prompt);
    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .unwrap_or(Err(ServiceError::TimedOut)),
        None => call.await,
    };

    let image = result
        .map_err(|e| e.to_string())?
        .filter(|data| !data.trim().is_empty())
        .ok_or_else(|| "service returned no image".to_string())?;

    base64::engine::general_purpose::STANDARD
        .decode(image.trim())
        .map_err(|e| format!("image is not valid base64: {}", e))?;

    Ok(image.trim().to_string())
}
