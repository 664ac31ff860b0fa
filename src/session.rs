//! Per-invocation restyle session: holds the selected image, the selected
//! style, the resolved prompt and the results of each pipeline stage, and
//! enforces the transition rules between them.
//!
//! The session uses interior mutability so one handle can be shared between
//! an interactive front end and the worker running the pipeline. The
//! `in_progress` run guard is an atomic compare-and-set taken together with
//! the `Restyling` transition and released on every exit path.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::adapter::DescriptionAdapter;
use crate::catalog::StyleCatalog;
use crate::description;
use crate::error::RestyleError;
use crate::types::{now_ms, SessionSnapshot, Stage, StageEvent, StyleEngine, StyleRecord};

#[derive(Default)]
struct SessionInner {
    stage: Stage,
    image_path: Option<PathBuf>,
    selected_style: Option<StyleRecord>,
    resolved_prompt: Option<String>,
    description_enabled: bool,
    generated_description: Option<String>,
    intermediate_image_path: Option<PathBuf>,
    output_image_path: Option<PathBuf>,
    last_error: Option<String>,
    history: Vec<StageEvent>,
}

impl SessionInner {
    fn set_stage(&mut self, stage: Stage) {
        self.stage = stage.clone();
        self.history.push(StageEvent {
            stage,
            timestamp: now_ms(),
        });
    }
}

pub struct RestyleSession {
    inner: Mutex<SessionInner>,
    in_progress: AtomicBool,
    description_path: PathBuf,
}

/// Inputs resolved at the start of a pipeline run.
pub(crate) struct RunInputs {
    pub image_path: PathBuf,
    pub prompt: String,
    pub engine: StyleEngine,
}

/// Releases the run guard when dropped, so `in_progress` clears on success,
/// failure, cancellation and panic alike.
pub(crate) struct RunGuard<'a> {
    session: &'a RestyleSession,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.session.in_progress.store(false, Ordering::Release);
    }
}

impl RestyleSession {
    pub fn new(description_path: impl Into<PathBuf>) -> Self {
        let mut inner = SessionInner::default();
        inner.set_stage(Stage::Idle);
        Self {
            inner: Mutex::new(inner),
            in_progress: AtomicBool::new(false),
            description_path: description_path.into(),
        }
    }

    /// Session with the conventional description file location under `root`.
    pub fn with_default_paths(root: &Path) -> Self {
        Self::new(description::default_description_path(root))
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().expect("poisoned")
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    fn reject_while_running(&self) -> Result<(), RestyleError> {
        if self.in_progress() {
            return Err(RestyleError::Concurrency);
        }
        Ok(())
    }

    /// Starts (or restarts) the session on a new image. The path must decode
    /// as an image; everything derived from a previous selection is cleared.
    pub fn select_image(&self, path: impl AsRef<Path>) -> Result<(), RestyleError> {
        self.reject_while_running()?;
        let path = path.as_ref();
        image::image_dimensions(path)?;

        let mut inner = self.lock();
        inner.image_path = Some(path.to_path_buf());
        inner.selected_style = None;
        inner.resolved_prompt = None;
        inner.generated_description = None;
        inner.intermediate_image_path = None;
        inner.output_image_path = None;
        inner.last_error = None;
        inner.set_stage(Stage::ImageSelected);
        Ok(())
    }

    /// Toggles the optional description stage without changing the stage.
    pub fn enable_description(&self, enabled: bool) -> Result<(), RestyleError> {
        self.reject_while_running()?;
        self.lock().description_enabled = enabled;
        Ok(())
    }

    /// Resolves the prompt for `name` from the catalog. An unknown name
    /// leaves the session untouched.
    pub fn select_style(&self, catalog: &StyleCatalog, name: &str) -> Result<(), RestyleError> {
        self.reject_while_running()?;
        let record = catalog
            .find(name)
            .ok_or_else(|| RestyleError::NotFound(name.to_string()))?;
        self.select_style_record(record)
    }

    pub fn select_style_record(&self, record: StyleRecord) -> Result<(), RestyleError> {
        self.reject_while_running()?;
        let mut inner = self.lock();
        if inner.image_path.is_none() {
            return Err(RestyleError::Precondition("no image selected"));
        }
        inner.resolved_prompt = Some(record.description.clone());
        inner.selected_style = Some(record);
        inner.set_stage(Stage::StyleSelected);
        Ok(())
    }

    /// Invokes the external description source. Failure is non-fatal: the
    /// stage is unchanged and the call can simply be repeated.
    pub fn acquire_description(
        &self,
        adapter: &dyn DescriptionAdapter,
    ) -> Result<String, RestyleError> {
        self.reject_while_running()?;
        let image_path = {
            let inner = self.lock();
            if !inner.description_enabled {
                return Err(RestyleError::Precondition(
                    "description generation is not enabled",
                ));
            }
            inner
                .image_path
                .clone()
                .ok_or(RestyleError::Precondition("no image selected"))?
        };

        // Long-latency call, performed without holding the session lock.
        let text = description::acquire(adapter, &image_path)?;
        self.lock().generated_description = Some(text.clone());
        Ok(text)
    }

    /// Manual replacement of the description, allowed at any stage. The text
    /// is persisted to the fixed description file, overwriting it whole.
    pub fn override_description(&self, text: &str) -> Result<(), RestyleError> {
        description::save_description(&self.description_path, text)?;
        self.lock().generated_description = Some(text.to_string());
        Ok(())
    }

    /// Returns to `Idle`, clearing everything except the persisted catalog
    /// and description file.
    pub fn reset(&self) -> Result<(), RestyleError> {
        self.reject_while_running()?;
        let mut inner = self.lock();
        *inner = SessionInner::default();
        inner.set_stage(Stage::Idle);
        Ok(())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.lock();
        SessionSnapshot {
            stage: inner.stage.clone(),
            image_path: inner.image_path.clone(),
            selected_style: inner.selected_style.as_ref().map(|r| r.name.clone()),
            resolved_prompt: inner.resolved_prompt.clone(),
            description_enabled: inner.description_enabled,
            generated_description: inner.generated_description.clone(),
            intermediate_image_path: inner.intermediate_image_path.clone(),
            output_image_path: inner.output_image_path.clone(),
            last_error: inner.last_error.clone(),
            in_progress: self.in_progress(),
        }
    }

    pub fn history(&self) -> Vec<StageEvent> {
        self.lock().history.clone()
    }

    pub fn description_path(&self) -> &Path {
        &self.description_path
    }

    /// Claims the run guard. Exactly one caller wins until the returned
    /// guard drops.
    pub(crate) fn begin_run(&self) -> Result<RunGuard<'_>, RestyleError> {
        self.in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| RestyleError::Concurrency)?;
        Ok(RunGuard { session: self })
    }

    /// Resolves the pipeline inputs without transitioning. The prompt is the
    /// generated description when the toggle enabled one, the catalog prompt
    /// otherwise.
    pub(crate) fn run_inputs(&self) -> Result<RunInputs, RestyleError> {
        let inner = self.lock();
        let image_path = inner
            .image_path
            .clone()
            .ok_or(RestyleError::Precondition("no image selected"))?;
        let record = inner
            .selected_style
            .as_ref()
            .ok_or(RestyleError::Precondition("no style selected"))?;
        let prompt = match (&inner.generated_description, inner.description_enabled) {
            (Some(text), true) => text.clone(),
            _ => inner
                .resolved_prompt
                .clone()
                .ok_or(RestyleError::Precondition("no style selected"))?,
        };
        Ok(RunInputs {
            image_path,
            prompt,
            engine: record.effective_engine(),
        })
    }

    pub(crate) fn mark_restyling(&self) {
        self.lock().set_stage(Stage::Restyling);
    }

    pub(crate) fn mark_enhancing(&self) {
        self.lock().set_stage(Stage::Enhancing);
    }

    pub(crate) fn record_intermediate(&self, path: &Path) {
        self.lock().intermediate_image_path = Some(path.to_path_buf());
    }

    pub(crate) fn complete(&self, output: &Path) {
        let mut inner = self.lock();
        inner.output_image_path = Some(output.to_path_buf());
        inner.last_error = None;
        inner.set_stage(Stage::Done);
    }

    pub(crate) fn fail(&self, error: &RestyleError) {
        let mut inner = self.lock();
        inner.last_error = Some(error.to_string());
        inner.set_stage(Stage::Error);
    }
}
