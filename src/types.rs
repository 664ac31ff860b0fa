use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Catalog name that legacy files use for the local sketch branch. Records
/// carrying no explicit engine tag fall back to this name check so old
/// catalogs keep their routing.
pub const HAND_DRAWN_STYLE: &str = "Hand Drawn";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleEngine {
    #[default]
    Remote,
    Local,
}

fn engine_is_remote(engine: &StyleEngine) -> bool {
    *engine == StyleEngine::Remote
}

/// One named prompt in the style catalog. The persisted shape is
/// `{"name": ..., "description": ...}`; the engine tag is omitted for remote
/// records so legacy catalog files round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleRecord {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "engine_is_remote")]
    pub engine: StyleEngine,
}

impl StyleRecord {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            engine: StyleEngine::Remote,
        }
    }

    pub fn with_engine(mut self, engine: StyleEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Engine used for dispatch, honoring the legacy name-based routing for
    /// untagged records.
    pub fn effective_engine(&self) -> StyleEngine {
        if self.engine == StyleEngine::Remote && self.name == HAND_DRAWN_STYLE {
            StyleEngine::Local
        } else {
            self.engine
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    #[default]
    Idle,
    ImageSelected,
    StyleSelected,
    Restyling,
    Enhancing,
    Done,
    Error,
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done | Stage::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageEvent {
    pub stage: Stage,
    pub timestamp: i64, // unix ms
}

/// Read-only view of the session for front ends and tests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub stage: Stage,
    pub image_path: Option<PathBuf>,
    pub selected_style: Option<String>,
    pub resolved_prompt: Option<String>,
    pub description_enabled: bool,
    pub generated_description: Option<String>,
    pub intermediate_image_path: Option<PathBuf>,
    pub output_image_path: Option<PathBuf>,
    pub last_error: Option<String>,
    pub in_progress: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub output_image_path: PathBuf,
    pub enhanced: bool,
    pub started_at: i64,
    pub ended_at: i64,
}

pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
