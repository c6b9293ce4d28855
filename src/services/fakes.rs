//! In-process collaborators for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use super::*;
use crate::icons::{parse_glyph, IconGlyph};

pub const CIRCLE_SVG: &str = r#"<svg viewBox="0 0 24 24" stroke-width="2"><circle cx="12" cy="12" r="10"/></svg>"#;

/// Draft service producing `count` numbered slides.
#[derive(Default)]
pub struct FakeDraft {
    pub calls: AtomicUsize,
    /// Reply with this many slides instead of the requested count.
    pub wrong_count: Option<usize>,
    pub unreachable: bool,
    pub last_request: Mutex<Option<DraftServiceRequest>>,
}

#[async_trait]
impl DraftService for FakeDraft {
    async fn generate_draft(
        &self,
        request: &DraftServiceRequest,
    ) -> Result<DraftServiceResponse, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        if self.unreachable {
            return Err(ServiceError::Status {
                status: 503,
                body: "down".to_string(),
            });
        }
        let count = self.wrong_count.unwrap_or(request.count as usize);
        let slides = (1..=count)
            .map(|i| DraftSlide {
                title: format!("{} #{}", request.title, i),
                content: format!("Point {}", i),
                visual_prompt: format!("flat infographic {}", i),
            })
            .collect();
        Ok(DraftServiceResponse {
            data: Some(DraftPayload {
                slides: Some(slides),
            }),
        })
    }
}

/// What the fake image service does for a given prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageReply {
    Image,
    NoImage,
    Garbage,
    Error,
    Hang,
}

/// Image service whose reply is chosen per prompt.
pub struct FakeImages {
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
    pub delay: Duration,
    script: Box<dyn Fn(&str) -> ImageReply + Send + Sync>,
}

impl FakeImages {
    pub fn succeeding() -> Self {
        Self::scripted(|_| ImageReply::Image)
    }

    pub fn scripted(script: impl Fn(&str) -> ImageReply + Send + Sync + 'static) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
            script: Box::new(script),
        }
    }

    /// Base64 the fake returns for a prompt.
    pub fn image_for(prompt: &str) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(format!("png:{}", prompt.len()))
    }
}

#[async_trait]
impl ImageService for FakeImages {
    async fn generate_image(&self, prompt: &str) -> Result<Option<String>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = (self.script)(prompt);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match reply {
            ImageReply::Image => Ok(Some(Self::image_for(prompt))),
            ImageReply::NoImage => Ok(None),
            ImageReply::Garbage => Ok(Some("%%% not base64 %%%".to_string())),
            ImageReply::Error => Err(ServiceError::Status {
                status: 500,
                body: "image generation failed".to_string(),
            }),
            ImageReply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(None)
            }
        }
    }
}

/// Layout service returning a fixed reply.
pub struct FakeLayout {
    pub calls: AtomicUsize,
    pub reply: Mutex<Result<LayoutServiceResponse, String>>,
    pub delay: Duration,
}

impl FakeLayout {
    pub fn with_layout(layout: serde_json::Value) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            reply: Mutex::new(Ok(LayoutServiceResponse {
                status: "success".to_string(),
                layout: Some(layout),
            })),
            delay: Duration::ZERO,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            reply: Mutex::new(Err("vision model unavailable".to_string())),
            delay: Duration::ZERO,
        }
    }

    /// Shape, text, icon: one of each.
    pub fn sample_layout() -> serde_json::Value {
        json!({
            "background_color": "#FFFFFF",
            "elements": [
                { "type": "shape", "shape_type": "ROUND_RECTANGLE", "color": "#82BE28", "bbox": [20, 20, 920, 100] },
                { "type": "text", "text": "Reconstructed", "fontSize": 36, "bbox": [40, 40, 600, 60] },
                { "type": "icon", "icon_name": "circle", "color": "#333333", "bbox": [860, 40, 48, 48] }
            ]
        })
    }
}

#[async_trait]
impl LayoutService for FakeLayout {
    async fn analyze_layout(
        &self,
        _image_base64: &str,
    ) -> Result<LayoutServiceResponse, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &*self.reply.lock().unwrap() {
            Ok(response) => Ok(response.clone()),
            Err(body) => Err(ServiceError::Status {
                status: 500,
                body: body.clone(),
            }),
        }
    }
}

/// Export service recording what it was given.
#[derive(Default)]
pub struct FakeExport {
    pub calls: AtomicUsize,
    pub fail: bool,
    pub last_credential: Mutex<Option<String>>,
    pub last_request: Mutex<Option<ExportServiceRequest>>,
}

#[async_trait]
impl ExportService for FakeExport {
    async fn export(
        &self,
        credential: &str,
        request: &ExportServiceRequest,
    ) -> Result<ExportServiceResponse, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_credential.lock().unwrap() = Some(credential.to_string());
        *self.last_request.lock().unwrap() = Some(request.clone());
        if self.fail {
            return Err(ServiceError::Status {
                status: 502,
                body: "slides api rejected the deck".to_string(),
            });
        }
        Ok(ExportServiceResponse {
            url: Some("https://docs.example.com/presentation/d/abc123/edit".to_string()),
        })
    }
}

/// Icon provider that knows only `circle`.
#[derive(Default)]
pub struct FakeIcons {
    pub calls: AtomicUsize,
    /// Answer every lookup with a server error.
    pub broken: bool,
}

#[async_trait]
impl IconProvider for FakeIcons {
    async fn fetch_icon(&self, name: &str) -> Result<Option<IconGlyph>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.broken {
            return Err(ServiceError::Status {
                status: 500,
                body: "icon host error".to_string(),
            });
        }
        if name == "circle" {
            Ok(parse_glyph(name, CIRCLE_SVG).ok())
        } else {
            Ok(None)
        }
    }
}

/// A full set of fakes plus handles to inspect them.
pub struct FakeBackend {
    pub draft: Arc<FakeDraft>,
    pub images: Arc<FakeImages>,
    pub layout: Arc<FakeLayout>,
    pub export: Arc<FakeExport>,
    pub icons: Arc<FakeIcons>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            draft: Arc::new(FakeDraft::default()),
            images: Arc::new(FakeImages::succeeding()),
            layout: Arc::new(FakeLayout::with_layout(FakeLayout::sample_layout())),
            export: Arc::new(FakeExport::default()),
            icons: Arc::new(FakeIcons::default()),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            draft: self.draft.clone(),
            images: self.images.clone(),
            layout: self.layout.clone(),
            export: self.export.clone(),
            icons: self.icons.clone(),
        }
    }
}
