//! Backend-agnostic rendering: GPU command surface, fly camera, and the
//! textured-cube render objects a scene draws every frame.
//!
//! # Invariants
//! - All GPU work goes through [`GpuSurface`]; this crate owns no device.
//! - The renderer only reads transforms, never mutates them.
//! - A dirty renderer recreates every object's resources before drawing.
//! - Texture and shader failures are logged, not fatal.

pub mod camera;
pub mod gpu;
pub mod mesh;
pub mod object;
pub mod recording;
pub mod renderer;

pub use camera::Camera;
pub use gpu::{
    BufferHandle, BufferTarget, DrawCall, GpuError, GpuSurface, ProgramHandle, TextureHandle,
    Uniform,
};
pub use mesh::{CUBE_INDICES, CUBE_VERTEX_STRIDE, CUBE_VERTICES, CubeVertex};
pub use object::{Material, RenderObject, RenderState};
pub use recording::{GpuCommand, RecordingSurface};
pub use renderer::{DEFAULT_RENDER_CAPACITY, FrameStats, RenderError, Renderer};
