//! The workflow controller owns the session and drives the pipeline stages.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::in_flight::{InFlight, Operation};
use crate::errors::AppError;
use crate::icons::IconSet;
use crate::models::{
    AdvanceResult, CreateDraftRequest, EditResult, ExportResult, ProjectState, SessionSnapshot,
    SlideRecord, SlideTextEdit, Stage, TextLayout, ViewMode,
};
use crate::pipeline;
use crate::render::{self, Scene};
use crate::services::{Collaborators, ExportServiceRequest};

/// Mutable session state. Only touched under the controller's lock.
#[derive(Debug)]
struct Session {
    stage: Stage,
    project: Option<ProjectState>,
    revision: i64,
    export_url: Option<String>,
}

impl Session {
    fn new() -> Self {
        Self {
            stage: Stage::Draft,
            project: None,
            revision: 0,
            export_url: None,
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            stage: self.stage,
            revision: self.revision,
            project: self.project.clone(),
            export_url: self.export_url.clone(),
        }
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    fn require_stage(&self, operation: &str, allowed: &[Stage]) -> Result<(), AppError> {
        if allowed.contains(&self.stage) {
            Ok(())
        } else {
            Err(AppError::invalid_stage(operation, self.stage))
        }
    }

    fn project(&self) -> Result<&ProjectState, AppError> {
        self.project
            .as_ref()
            .ok_or_else(|| AppError::invalid_stage("use a project", self.stage))
    }

    fn slide(&self, index: usize) -> Result<Arc<SlideRecord>, AppError> {
        self.project()?
            .slide(index)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Slide {} not found", index)))
    }

    /// The active project, provided it is still the one an operation started on.
    fn project_for(&mut self, id: Uuid, stage: Stage) -> Result<&mut ProjectState, AppError> {
        let current = self.stage;
        match self.project.as_mut() {
            Some(project) if project.id == id && current == stage => Ok(project),
            _ => {
                tracing::warn!(stage = %current, "Project changed while a call was running; result discarded");
                Err(AppError::InvalidStage {
                    message: "The project changed while the operation was running".to_string(),
                    stage: current,
                })
            }
        }
    }
}

/// Runs the Draft → Review → Edit → Exported state machine for one session.
///
/// Network calls are made without holding the session lock. Their results
/// are applied afterwards, and only if the same project is still active.
pub struct WorkflowController {
    session: RwLock<Session>,
    services: Collaborators,
    image_timeout: Option<Duration>,
    in_flight: InFlight,
}

impl WorkflowController {
    pub fn new(services: Collaborators, image_timeout: Option<Duration>) -> Self {
        Self {
            session: RwLock::new(Session::new()),
            services,
            image_timeout,
            in_flight: InFlight::default(),
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.read().await.snapshot()
    }

    pub async fn revision(&self) -> i64 {
        self.session.read().await.revision
    }

    /// Draft → Review. On failure the session is left in Draft.
    pub async fn submit(&self, request: &CreateDraftRequest) -> Result<SessionSnapshot, AppError> {
        self.session
            .read()
            .await
            .require_stage("submit a draft", &[Stage::Draft])?;
        let _guard = self.in_flight.begin(Operation::Draft)?;

        let slides = pipeline::generate_draft(
            self.services.draft.as_ref(),
            &request.topic,
            request.slide_count,
            request.is_locked,
        )
        .await?;

        let mut session = self.session.write().await;
        session.require_stage("submit a draft", &[Stage::Draft])?;
        let project = ProjectState::new(request.topic.clone(), request.is_locked, slides);
        tracing::info!(project = %project.id, slides = project.slides.len(), locked = project.is_locked, "Draft accepted");
        session.project = Some(project);
        session.export_url = None;
        session.stage = Stage::Review;
        session.bump();
        Ok(session.snapshot())
    }

    /// Review → Edit. Advances unless every image failed.
    pub async fn advance(&self) -> Result<AdvanceResult, AppError> {
        let (id, slides) = {
            let session = self.session.read().await;
            session.require_stage("generate images", &[Stage::Review])?;
            let project = session.project()?;
            (project.id, project.slides.clone())
        };
        let _guard = self.in_flight.begin(Operation::Advance)?;

        let batch =
            pipeline::generate_images(self.services.images.as_ref(), &slides, self.image_timeout)
                .await;
        if batch.all_failed() {
            tracing::warn!(slides = slides.len(), "Every image request failed; staying in review");
            return Err(AppError::Generation(
                "No slide image could be generated".to_string(),
            ));
        }
        let failed_slides = batch.failed_indices();

        let mut session = self.session.write().await;
        let project = session.project_for(id, Stage::Review)?;
        // Text edited during the call is kept; only the images come from the batch.
        let merged = project
            .slides
            .iter()
            .zip(batch.slides)
            .map(|(current, generated)| current.with_background(generated.background_image))
            .collect();
        if !project.replace_all(merged) {
            return Err(AppError::Internal("Slide count changed during image generation".to_string()));
        }
        session.stage = Stage::Edit;
        session.bump();
        tracing::info!(failed = failed_slides.len(), "Advanced to edit");

        Ok(AdvanceResult {
            session: session.snapshot(),
            failed_slides,
        })
    }

    /// Replace text fields of one slide. A locked project keeps its text.
    pub async fn edit_slide(
        &self,
        index: usize,
        edit: &SlideTextEdit,
    ) -> Result<EditResult, AppError> {
        if edit.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }

        let mut session = self.session.write().await;
        session.require_stage("edit slides", &[Stage::Review, Stage::Edit])?;
        let current = session.slide(index)?;

        if session.project()?.is_locked {
            tracing::warn!(slide = index, "Ignoring text edit on a locked project");
            return Ok(EditResult {
                slide: current,
                applied: false,
            });
        }

        let slide = session
            .project
            .as_mut()
            .and_then(|project| project.replace_slide(index, current.with_text_edit(edit)))
            .ok_or_else(|| AppError::NotFound(format!("Slide {} not found", index)))?;
        session.bump();
        Ok(EditResult {
            slide,
            applied: true,
        })
    }

    /// Set or clear the overlay placement used in image mode.
    pub async fn set_layout(
        &self,
        index: usize,
        layout: Option<TextLayout>,
    ) -> Result<Arc<SlideRecord>, AppError> {
        if let Some(layout) = &layout {
            layout.validate().map_err(AppError::Validation)?;
        }
        self.update_slide(index, "edit the layout", &[Stage::Review, Stage::Edit], |slide| {
            Ok(slide.with_layout(layout))
        })
        .await
    }

    /// Switch the active view. Vector needs a reconstruction.
    pub async fn set_view_mode(
        &self,
        index: usize,
        mode: ViewMode,
    ) -> Result<Arc<SlideRecord>, AppError> {
        self.update_slide(index, "switch views", &[Stage::Edit], |slide| {
            if mode == ViewMode::Vector && slide.remake_data.is_none() {
                return Err(AppError::Precondition(
                    "Slide has no vector reconstruction; remake it first".to_string(),
                ));
            }
            Ok(slide.with_view_mode(mode))
        })
        .await
    }

    /// Reconstruct one slide as vector elements and make that view active.
    pub async fn remake_slide(&self, index: usize) -> Result<Arc<SlideRecord>, AppError> {
        let (id, slide) = {
            let session = self.session.read().await;
            session.require_stage("remake slides", &[Stage::Edit])?;
            (session.project()?.id, session.slide(index)?)
        };
        let _guard = self.in_flight.begin(Operation::Remake(id, index))?;

        tracing::info!(slide = index, "Remaking slide");
        let scene = pipeline::analyze_layout(self.services.layout.as_ref(), &slide).await?;

        let mut session = self.session.write().await;
        let project = session.project_for(id, Stage::Edit)?;
        let current = project
            .slide(index)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Slide {} not found", index)))?;
        let updated = project
            .replace_slide(index, current.with_remake(scene))
            .ok_or_else(|| AppError::NotFound(format!("Slide {} not found", index)))?;
        session.bump();
        Ok(updated)
    }

    /// Scene for one slide; `mode` defaults to the slide's active view.
    pub async fn render_slide(
        &self,
        index: usize,
        mode: Option<ViewMode>,
    ) -> Result<Scene, AppError> {
        let slide = {
            let session = self.session.read().await;
            session.require_stage("render slides", &[Stage::Review, Stage::Edit])?;
            session.slide(index)?
        };
        let mode = mode.unwrap_or(slide.view_mode);

        let icons = match (&slide.remake_data, slide.effective_mode(mode)) {
            (Some(scene), ViewMode::Vector) => self.resolve_icons(&render::icon_names(scene)).await,
            _ => IconSet::new(),
        };
        Ok(render::render(&slide, mode, &icons))
    }

    pub async fn render_svg(&self, index: usize, mode: Option<ViewMode>) -> Result<String, AppError> {
        let scene = self.render_slide(index, mode).await?;
        Ok(render::to_svg(&scene))
    }

    /// Edit → Exported. The project is discarded once the deck is published.
    pub async fn export(&self, credential: Option<&str>) -> Result<ExportResult, AppError> {
        let (id, request) = {
            let session = self.session.read().await;
            session.require_stage("export", &[Stage::Edit])?;
            let project = session.project()?;
            (
                project.id,
                ExportServiceRequest {
                    title: project.topic.clone(),
                    slides: project.slides.clone(),
                },
            )
        };
        let credential = credential
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                AppError::AuthRequired("Sign in before exporting the presentation".to_string())
            })?;
        let _guard = self.in_flight.begin(Operation::Export)?;

        tracing::info!(slides = request.slides.len(), "Exporting presentation");
        let response = self
            .services
            .export
            .export(credential, &request)
            .await
            .map_err(|e| {
                tracing::error!("Export failed: {}", e);
                AppError::Generation(format!("Export failed: {}", e))
            })?;
        let url = response
            .url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| AppError::Generation("Export reply has no URL".to_string()))?;

        let mut session = self.session.write().await;
        session.project_for(id, Stage::Edit)?;
        session.project = None;
        session.export_url = Some(url.clone());
        session.stage = Stage::Exported;
        session.bump();
        tracing::info!(url = %url, "Presentation exported");
        Ok(ExportResult { url })
    }

    /// Back to Draft, discarding every slide. Must be confirmed.
    pub async fn reset(&self, confirm: bool) -> Result<SessionSnapshot, AppError> {
        if !confirm {
            return Err(AppError::Validation(
                "Resetting discards the project and must be confirmed".to_string(),
            ));
        }

        let mut session = self.session.write().await;
        if session.stage == Stage::Draft && session.project.is_none() {
            return Ok(session.snapshot());
        }
        tracing::info!(from = %session.stage, "Resetting to draft");
        session.stage = Stage::Draft;
        session.project = None;
        session.export_url = None;
        session.bump();
        Ok(session.snapshot())
    }

    async fn update_slide<F>(
        &self,
        index: usize,
        operation: &str,
        allowed: &[Stage],
        change: F,
    ) -> Result<Arc<SlideRecord>, AppError>
    where
        F: FnOnce(&SlideRecord) -> Result<SlideRecord, AppError>,
    {
        let mut session = self.session.write().await;
        session.require_stage(operation, allowed)?;
        let current = session.slide(index)?;
        let next = change(current.as_ref())?;
        let slide = session
            .project
            .as_mut()
            .and_then(|project| project.replace_slide(index, next))
            .ok_or_else(|| AppError::NotFound(format!("Slide {} not found", index)))?;
        session.bump();
        Ok(slide)
    }

    /// Fetch every named glyph concurrently; misses and failures are left out.
    async fn resolve_icons(&self, names: &[String]) -> IconSet {
        let lookups = names.iter().map(|name| async move {
            match self.services.icons.fetch_icon(name).await {
                Ok(Some(glyph)) => Some(glyph),
                Ok(None) => {
                    tracing::debug!(icon = %name, "Icon not found");
                    None
                }
                Err(e) => {
                    tracing::warn!(icon = %name, "Icon fetch failed: {}", e);
                    None
                }
            }
        });
        let glyphs: Vec<_> = join_all(lookups).await.into_iter().flatten().collect();
        tracing::debug!(requested = names.len(), resolved = glyphs.len(), "Icons resolved");
        glyphs.into_iter().collect()
    }
}
