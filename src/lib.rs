//! Photo Restyle Core
//!
//! Style-catalog storage and restyle orchestration shared by the catalog
//! editor and the restyler front end. The crate exposes plain operations
//! and observable session snapshots; windows, dialogs and progress bars
//! are the embedding shell's business.

pub mod adapter;
pub mod catalog;
pub mod config;
pub mod description;
pub mod editor;
pub mod effects;
pub mod error;
pub mod pipeline;
pub mod session;
pub mod types;

pub use adapter::{
    DescriptionAdapter, EffectAdapter, HttpTransformAdapter, MockDescriptionAdapter,
    MockTransformAdapter, TransformAdapter,
};
pub use catalog::{default_catalog_path, ensure_catalog_file, StyleCatalog};
pub use config::{default_credentials_path, ApiCredentials};
pub use description::default_description_path;
pub use editor::StyleCatalogEditor;
pub use effects::SketchEffect;
pub use error::RestyleError;
pub use pipeline::{CancelToken, RestylePipeline};
pub use session::RestyleSession;
pub use types::{
    RunReport, SessionSnapshot, Stage, StageEvent, StyleEngine, StyleRecord, HAND_DRAWN_STYLE,
};
