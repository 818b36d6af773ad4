//! wgpu backend for the finder renderer.
//!
//! Implements [`finder_render::GpuSurface`] on a wgpu device bound to a
//! window surface. Textures are decoded with `image`; shader programs are
//! WGSL vertex and fragment files with `vs_main` / `fs_main` entry points.
//!
//! # Invariants
//! - Draws are only accepted between `begin_frame` and `end_frame`.
//! - Shader validation errors surface as `GpuError::Shader`, never a panic.
//! - A draw without a texture samples a 1x1 white texture.

mod gpu;
mod texture;

pub use gpu::WgpuSurface;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
