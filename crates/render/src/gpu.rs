use glam::Mat4;
use std::path::{Path, PathBuf};

/// Opaque GPU buffer handle issued by a [`GpuSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u32);

/// Opaque texture handle issued by a [`GpuSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

/// Opaque linked shader program handle issued by a [`GpuSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramHandle(pub u32);

/// Binding point of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BufferTarget {
    Vertex,
    Index,
}

/// A value for a named program uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    Int(i32),
    Mat4(Mat4),
}

/// One indexed draw of triangles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub vertex_buffer: BufferHandle,
    pub index_buffer: BufferHandle,
    pub index_count: u32,
    pub program: ProgramHandle,
    pub texture: Option<TextureHandle>,
}

/// Errors reported by a GPU command surface.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("unknown buffer {0:?}")]
    UnknownBuffer(BufferHandle),
    #[error("unknown texture {0:?}")]
    UnknownTexture(TextureHandle),
    #[error("unknown program {0:?}")]
    UnknownProgram(ProgramHandle),
    #[error("no buffer bound to {0:?}")]
    NothingBound(BufferTarget),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to load texture {}: {reason}", path.display())]
    Texture { path: PathBuf, reason: String },
    #[error("shader program failed to build: {0}")]
    Shader(String),
    #[error("draw issued outside of a frame")]
    NotInFrame,
    #[error("surface error: {0}")]
    Surface(String),
    #[error("resource handles exhausted")]
    HandlesExhausted,
}

/// Synchronous GPU command surface the renderer issues its work through.
///
/// Commands take effect immediately from the caller's point of view. A
/// render object's lifecycle is always create (buffers, texture, program),
/// any number of draws, then delete.
pub trait GpuSurface {
    /// Start recording a frame. Draws are only valid between `begin_frame`
    /// and `end_frame`.
    fn begin_frame(&mut self) -> Result<(), GpuError> {
        Ok(())
    }

    /// Finish and present the frame.
    fn end_frame(&mut self) -> Result<(), GpuError> {
        Ok(())
    }

    /// The drawable area changed size.
    fn resize(&mut self, _width: u32, _height: u32) {}

    fn create_buffer(&mut self, target: BufferTarget) -> Result<BufferHandle, GpuError>;

    /// Bind `buffer` to `target`, or unbind with `None`.
    fn bind_buffer(
        &mut self,
        target: BufferTarget,
        buffer: Option<BufferHandle>,
    ) -> Result<(), GpuError>;

    /// Replace the contents of the buffer bound to `target`.
    fn upload_data(&mut self, target: BufferTarget, bytes: &[u8]) -> Result<(), GpuError>;

    /// Load and upload a 2D image.
    fn create_texture(&mut self, path: &Path) -> Result<TextureHandle, GpuError>;

    /// Compile and link a program from vertex and fragment shader files.
    fn create_program(&mut self, vertex: &Path, fragment: &Path)
    -> Result<ProgramHandle, GpuError>;

    fn set_uniform(
        &mut self,
        program: ProgramHandle,
        name: &str,
        value: Uniform,
    ) -> Result<(), GpuError>;

    fn draw_indexed(&mut self, call: &DrawCall) -> Result<(), GpuError>;

    fn delete_buffer(&mut self, buffer: BufferHandle);

    fn delete_texture(&mut self, texture: TextureHandle);

    fn delete_program(&mut self, program: ProgramHandle);
}
