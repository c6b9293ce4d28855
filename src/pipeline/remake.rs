//! Remake stage: decompose a slide's raster background into a vector scene.

use crate::errors::AppError;
use crate::models::{SlideRecord, VectorScene};
use crate::services::{LayoutService, LayoutServiceResponse};

/// Analyze the background of `slide`.
///
/// Fails before any request when the slide has no image. The slide itself
/// is never touched here; the caller attaches the scene on success.
pub async fn analyze_layout(
    service: &dyn LayoutService,
    slide: &SlideRecord,
) -> Result<VectorScene, AppError> {
    let image = slide.background_image.as_deref().ok_or_else(|| {
        AppError::Precondition("Slide has no background image to analyze".to_string())
    })?;

    let response = service.analyze_layout(image).await.map_err(|e| {
        tracing::error!("Layout analysis failed: {}", e);
        AppError::Analysis(format!("Layout analysis failed: {}", e))
    })?;

    parse_analysis(response)
}

/// Accept a reply only if it is a complete, well-formed scene.
pub fn parse_analysis(response: LayoutServiceResponse) -> Result<VectorScene, AppError> {
    if response.status != "success" {
        return Err(AppError::Analysis(format!(
            "Layout analysis returned status '{}'",
            response.status
        )));
    }
    let layout = response
        .layout
        .ok_or_else(|| AppError::Analysis("Layout analysis returned no layout".to_string()))?;

    let scene: VectorScene = serde_json::from_value(layout).map_err(|e| {
        tracing::warn!("Malformed scene from layout analysis: {}", e);
        AppError::Analysis(format!("Malformed scene: {}", e))
    })?;
    scene
        .validate()
        .map_err(|e| AppError::Analysis(format!("Malformed scene: {}", e)))?;
    if scene.elements.is_empty() {
        return Err(AppError::Analysis(
            "Layout analysis found no elements".to_string(),
        ));
    }

    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SceneElement;
    use crate::services::fakes::FakeLayout;
    use serde_json::json;
    use std::sync::atomic::Ordering;

    fn with_image() -> SlideRecord {
        SlideRecord::text_only("t", "c", "").with_background(Some("aW1n".to_string()))
    }

    #[tokio::test]
    async fn test_missing_image_is_precondition_without_call() {
        let service = FakeLayout::with_layout(FakeLayout::sample_layout());
        let err = analyze_layout(&service, &SlideRecord::text_only("t", "c", ""))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Precondition(_)));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_scene_keeps_element_order() {
        let service = FakeLayout::with_layout(FakeLayout::sample_layout());
        let scene = analyze_layout(&service, &with_image()).await.unwrap();

        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert!(matches!(scene.elements[0], SceneElement::Shape(_)));
        assert!(matches!(scene.elements[1], SceneElement::Text(_)));
        assert!(matches!(scene.elements[2], SceneElement::Icon(_)));
    }

    #[tokio::test]
    async fn test_service_failure_is_analysis_error() {
        let err = analyze_layout(&FakeLayout::failing(), &with_image())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Analysis(_)));
    }

    #[test]
    fn test_rejects_unsuccessful_or_malformed_replies() {
        let cases = vec![
            LayoutServiceResponse {
                status: "error".to_string(),
                layout: Some(FakeLayout::sample_layout()),
            },
            LayoutServiceResponse {
                status: "success".to_string(),
                layout: None,
            },
            LayoutServiceResponse {
                status: "success".to_string(),
                layout: Some(json!({ "elements": "nope" })),
            },
            LayoutServiceResponse {
                status: "success".to_string(),
                layout: Some(json!({ "elements": [] })),
            },
            LayoutServiceResponse {
                status: "success".to_string(),
                layout: Some(json!({
                    "elements": [{ "type": "text", "text": "x", "bbox": [0, 0, -5, 10] }]
                })),
            },
        ];

        for response in cases {
            let err = parse_analysis(response).unwrap_err();
            assert_eq!(err.error_code(), "ANALYSIS_FAILED");
        }
    }

    #[test]
    fn test_null_attributes_do_not_fail_the_remake() {
        let scene = parse_analysis(LayoutServiceResponse {
            status: "success".to_string(),
            layout: Some(json!({
                "background_color": "#FFFFFF",
                "elements": [
                    { "type": "shape", "color": null, "opacity": null, "bbox": [0, 0, 960, 90] },
                    { "type": "text", "text": "Roadmap", "fontSize": 0, "fontWeight": null, "bbox": [40, 20, 500, 50] },
                    { "type": "icon", "icon_name": "cloud", "color": null, "bbox": [880, 20, 48, 48] }
                ]
            })),
        })
        .unwrap();

        assert_eq!(scene.elements.len(), 3);
        match &scene.elements[1] {
            SceneElement::Text(text) => assert_eq!(text.font_size, 18.0),
            other => panic!("expected text, got {:?}", other),
        }
    }
}
