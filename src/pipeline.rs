//! Orchestrates one restyle run: branch selection on the style's engine,
//! the remote restyle → download → enhance → download chain, and the local
//! sketch branch. The enhancement call only ever consumes the first call's
//! downloaded output, and the final image is the last successful stage's
//! output, never a blend.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::adapter::{EffectAdapter, TransformAdapter};
use crate::error::RestyleError;
use crate::session::{RestyleSession, RunInputs};
use crate::types::{now_ms, RunReport, StyleEngine};

pub const INTERMEDIATE_FILE_NAME: &str = "restyled_image.png";
pub const OUTPUT_FILE_NAME: &str = "edited_image.png";

/// Cooperative cancellation for a pipeline run, honored between stages. A
/// call already in flight is bounded by the HTTP client timeout; the run
/// guard is released on the cancel path like on any other exit.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    fn check(&self) -> Result<(), RestyleError> {
        if self.is_cancelled() {
            return Err(RestyleError::Cancelled);
        }
        Ok(())
    }
}

pub struct RestylePipeline {
    transform: Arc<dyn TransformAdapter>,
    effect: Arc<dyn EffectAdapter>,
    work_dir: PathBuf,
}

impl RestylePipeline {
    pub fn new(
        transform: Arc<dyn TransformAdapter>,
        effect: Arc<dyn EffectAdapter>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            transform,
            effect,
            work_dir: work_dir.into(),
        }
    }

    pub fn run(&self, session: &RestyleSession) -> Result<RunReport, RestyleError> {
        self.run_with_cancel(session, &CancelToken::new())
    }

    /// Runs the pipeline for `session`. Fails with `Concurrency` when a run
    /// is already in progress and with `Precondition` when the image or
    /// style is missing, in both cases without starting an external call or
    /// changing the stage.
    pub fn run_with_cancel(
        &self,
        session: &RestyleSession,
        cancel: &CancelToken,
    ) -> Result<RunReport, RestyleError> {
        let guard = session.begin_run()?;
        let inputs = session.run_inputs()?;
        session.mark_restyling();

        let result = self.execute(session, &inputs, cancel);
        match &result {
            Ok(report) => session.complete(&report.output_image_path),
            Err(err) => session.fail(err),
        }
        drop(guard);
        result
    }

    fn execute(
        &self,
        session: &RestyleSession,
        inputs: &RunInputs,
        cancel: &CancelToken,
    ) -> Result<RunReport, RestyleError> {
        fs::create_dir_all(&self.work_dir)?;
        let started_at = now_ms();
        cancel.check()?;

        match inputs.engine {
            StyleEngine::Local => {
                let mut aux = tempfile::NamedTempFile::new_in(&self.work_dir)?;
                aux.write_all(inputs.prompt.as_bytes())?;
                aux.flush()?;
                let output = self.effect.apply(&inputs.image_path, aux.path())?;
                Ok(RunReport {
                    output_image_path: output,
                    enhanced: false,
                    started_at,
                    ended_at: now_ms(),
                })
            }
            StyleEngine::Remote => {
                let url = self.transform.restyle(&inputs.image_path, &inputs.prompt)?;
                cancel.check()?;
                let intermediate = self.work_dir.join(INTERMEDIATE_FILE_NAME);
                self.transform.download(&url, &intermediate)?;
                // Survives a failed enhancement, so the artifact stays
                // inspectable and the prompt need not be re-sent blindly.
                session.record_intermediate(&intermediate);
                session.mark_enhancing();
                cancel.check()?;

                let enhanced_url = self.transform.enhance(&intermediate)?;
                cancel.check()?;
                let output = self.work_dir.join(OUTPUT_FILE_NAME);
                self.transform.download(&enhanced_url, &output)?;
                Ok(RunReport {
                    output_image_path: output,
                    enhanced: true,
                    started_at,
                    ended_at: now_ms(),
                })
            }
        }
    }
}
