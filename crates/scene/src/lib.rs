//! Scenes and the frame-driven engine that runs them.
//!
//! A [`Scene`] bundles an entity registry, a transform hierarchy, a renderer
//! and a camera, and delegates its per-frame logic to a [`SceneBehavior`].
//! The [`Engine`] owns the GPU surface and drives up to [`MAX_SCENES`]
//! scenes through a host-supplied [`FrameContext`].
//!
//! # Invariants
//! - Within a frame every scene is updated before any scene is drawn.
//! - All drawing happens between one `begin_frame` / `end_frame` pair.
//! - Shutting a scene down is idempotent and happens at the latest when the
//!   engine is dropped.

pub mod config;
pub mod context;
pub mod engine;
pub mod sample;
pub mod scene;

pub use config::{AssetConfig, ConfigError, EngineConfig, WindowConfig};
pub use context::{FrameContext, HeadlessFrame};
pub use engine::{Engine, MAX_SCENES};
pub use sample::SampleScene;
pub use scene::{Scene, SceneBehavior, SceneCore, SceneHooks};

use finder_common::SlotError;
use finder_ecs::EntityError;
use finder_kernel::TransformError;
use finder_render::{GpuError, RenderError};

/// Errors raised while building or running scenes.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("entity error: {0}")]
    Entity(#[from] EntityError),
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Slot(#[from] SlotError),
}
