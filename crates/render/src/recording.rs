use crate::gpu::{
    BufferHandle, BufferTarget, DrawCall, GpuError, GpuSurface, ProgramHandle, TextureHandle,
    Uniform,
};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// A command observed by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    BeginFrame,
    EndFrame,
    Resize(u32, u32),
    CreateBuffer(BufferHandle, BufferTarget),
    BindBuffer(BufferTarget, Option<BufferHandle>),
    UploadData(BufferHandle, usize),
    CreateTexture(TextureHandle, PathBuf),
    CreateProgram(ProgramHandle, PathBuf, PathBuf),
    SetUniform(ProgramHandle, String, Uniform),
    Draw(DrawCall),
    DeleteBuffer(BufferHandle),
    DeleteTexture(TextureHandle),
    DeleteProgram(ProgramHandle),
}

/// Headless [`GpuSurface`] that logs every command and tracks live resources.
///
/// Used by tests and the CLI host. Texture and shader paths can be marked as
/// failing to exercise the error paths of resource creation.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<GpuCommand>,
    next_handle: u32,
    buffers: BTreeMap<BufferHandle, usize>,
    textures: BTreeSet<TextureHandle>,
    programs: BTreeSet<ProgramHandle>,
    bound: BTreeMap<BufferTarget, BufferHandle>,
    failing_paths: HashSet<PathBuf>,
    in_frame: bool,
    frames: u64,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make any texture or shader load of `path` fail.
    pub fn fail_on(&mut self, path: impl Into<PathBuf>) {
        self.failing_paths.insert(path.into());
    }

    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    /// Drop the command log; live resources are kept.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    pub fn draws(&self) -> impl Iterator<Item = &DrawCall> + '_ {
        self.commands.iter().filter_map(|c| match c {
            GpuCommand::Draw(call) => Some(call),
            _ => None,
        })
    }

    pub fn count(&self, pred: impl Fn(&GpuCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    /// Bytes last uploaded into `buffer`.
    pub fn buffer_len(&self, buffer: BufferHandle) -> Option<usize> {
        self.buffers.get(&buffer).copied()
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    /// Next handle value. Values are never reused, so running out is an error.
    fn issue(&mut self) -> Result<u32, GpuError> {
        self.next_handle = self
            .next_handle
            .checked_add(1)
            .ok_or(GpuError::HandlesExhausted)?;
        Ok(self.next_handle)
    }

    fn check_path(&self, path: &Path) -> Result<(), GpuError> {
        if self.failing_paths.contains(path) {
            return Err(GpuError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "marked as failing"),
            });
        }
        Ok(())
    }
}

impl GpuSurface for RecordingSurface {
    fn begin_frame(&mut self) -> Result<(), GpuError> {
        self.in_frame = true;
        self.commands.push(GpuCommand::BeginFrame);
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), GpuError> {
        if !self.in_frame {
            return Err(GpuError::NotInFrame);
        }
        self.in_frame = false;
        self.frames += 1;
        self.commands.push(GpuCommand::EndFrame);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.commands.push(GpuCommand::Resize(width, height));
    }

    fn create_buffer(&mut self, target: BufferTarget) -> Result<BufferHandle, GpuError> {
        let handle = BufferHandle(self.issue()?);
        self.buffers.insert(handle, 0);
        self.commands.push(GpuCommand::CreateBuffer(handle, target));
        Ok(handle)
    }

    fn bind_buffer(
        &mut self,
        target: BufferTarget,
        buffer: Option<BufferHandle>,
    ) -> Result<(), GpuError> {
        match buffer {
            Some(handle) => {
                if !self.buffers.contains_key(&handle) {
                    return Err(GpuError::UnknownBuffer(handle));
                }
                self.bound.insert(target, handle);
            }
            None => {
                self.bound.remove(&target);
            }
        }
        self.commands.push(GpuCommand::BindBuffer(target, buffer));
        Ok(())
    }

    fn upload_data(&mut self, target: BufferTarget, bytes: &[u8]) -> Result<(), GpuError> {
        let handle = *self
            .bound
            .get(&target)
            .ok_or(GpuError::NothingBound(target))?;
        self.buffers.insert(handle, bytes.len());
        self.commands.push(GpuCommand::UploadData(handle, bytes.len()));
        Ok(())
    }

    fn create_texture(&mut self, path: &Path) -> Result<TextureHandle, GpuError> {
        if self.failing_paths.contains(path) {
            return Err(GpuError::Texture {
                path: path.to_path_buf(),
                reason: "marked as failing".into(),
            });
        }
        let handle = TextureHandle(self.issue()?);
        self.textures.insert(handle);
        self.commands
            .push(GpuCommand::CreateTexture(handle, path.to_path_buf()));
        Ok(handle)
    }

    fn create_program(
        &mut self,
        vertex: &Path,
        fragment: &Path,
    ) -> Result<ProgramHandle, GpuError> {
        self.check_path(vertex)?;
        self.check_path(fragment)?;
        let handle = ProgramHandle(self.issue()?);
        self.programs.insert(handle);
        self.commands.push(GpuCommand::CreateProgram(
            handle,
            vertex.to_path_buf(),
            fragment.to_path_buf(),
        ));
        Ok(handle)
    }

    fn set_uniform(
        &mut self,
        program: ProgramHandle,
        name: &str,
        value: Uniform,
    ) -> Result<(), GpuError> {
        if !self.programs.contains(&program) {
            return Err(GpuError::UnknownProgram(program));
        }
        self.commands
            .push(GpuCommand::SetUniform(program, name.to_owned(), value));
        Ok(())
    }

    fn draw_indexed(&mut self, call: &DrawCall) -> Result<(), GpuError> {
        if !self.in_frame {
            return Err(GpuError::NotInFrame);
        }
        for buffer in [call.vertex_buffer, call.index_buffer] {
            if !self.buffers.contains_key(&buffer) {
                return Err(GpuError::UnknownBuffer(buffer));
            }
        }
        if !self.programs.contains(&call.program) {
            return Err(GpuError::UnknownProgram(call.program));
        }
        if let Some(texture) = call.texture {
            if !self.textures.contains(&texture) {
                return Err(GpuError::UnknownTexture(texture));
            }
        }
        self.commands.push(GpuCommand::Draw(*call));
        Ok(())
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        self.buffers.remove(&buffer);
        self.bound.retain(|_, b| *b != buffer);
        self.commands.push(GpuCommand::DeleteBuffer(buffer));
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture);
        self.commands.push(GpuCommand::DeleteTexture(texture));
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program);
        self.commands.push(GpuCommand::DeleteProgram(program));
    }
}
