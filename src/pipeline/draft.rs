//! Draft stage: topic to text-only slide records.

use crate::errors::AppError;
use crate::models::{SlideRecord, MAX_SLIDE_COUNT};
use crate::services::{DraftService, DraftServiceRequest};

/// Ask the draft service for `count` slides about `topic`.
///
/// Returned records carry text only; layout, image and remake are absent.
pub async fn generate_draft(
    service: &dyn DraftService,
    topic: &str,
    count: u32,
    locked: bool,
) -> Result<Vec<SlideRecord>, AppError> {
    if topic.trim().is_empty() {
        return Err(AppError::Validation("Topic must not be empty".to_string()));
    }
    if !(1..=MAX_SLIDE_COUNT).contains(&count) {
        return Err(AppError::Validation(format!(
            "Slide count must be between 1 and {}",
            MAX_SLIDE_COUNT
        )));
    }

    tracing::info!(count, locked, "Requesting draft");
    let request = DraftServiceRequest {
        title: topic.to_string(),
        count,
        is_locked: locked,
    };
    let response = service.generate_draft(&request).await.map_err(|e| {
        tracing::error!("Draft service failed: {}", e);
        AppError::Generation(format!("Draft service failed: {}", e))
    })?;

    let slides = response
        .data
        .and_then(|data| data.slides)
        .ok_or_else(|| AppError::Generation("Draft reply has no slides".to_string()))?;

    if slides.len() != count as usize {
        tracing::error!(expected = count, got = slides.len(), "Draft length mismatch");
        return Err(AppError::Generation(format!(
            "Draft reply has {} slides, expected {}",
            slides.len(),
            count
        )));
    }

    Ok(slides
        .into_iter()
        .map(|s| SlideRecord::text_only(s.title, s.content, s.visual_prompt))
        .collect())
}
