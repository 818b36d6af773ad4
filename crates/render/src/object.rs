use crate::gpu::{
    BufferHandle, BufferTarget, DrawCall, GpuError, GpuSurface, ProgramHandle, TextureHandle,
    Uniform,
};
use crate::mesh::{CUBE_INDICES, CUBE_VERTICES};
use finder_common::TransformId;
use glam::Mat4;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, error, warn};

/// Texture and shader sources of a render object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub texture: PathBuf,
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
}

/// GPU lifecycle of a render object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Uninitialized,
    Created,
    Destroyed,
}

#[derive(Debug, Default)]
struct GpuResources {
    vertex_buffer: Option<BufferHandle>,
    index_buffer: Option<BufferHandle>,
    texture: Option<TextureHandle>,
    program: Option<ProgramHandle>,
}

/// A textured cube drawn with the model matrix of one transform.
#[derive(Debug)]
pub struct RenderObject {
    transform: TransformId,
    material: Material,
    state: RenderState,
    resources: GpuResources,
}

impl RenderObject {
    pub fn new(transform: TransformId, material: Material) -> Self {
        Self {
            transform,
            material,
            state: RenderState::Uninitialized,
            resources: GpuResources::default(),
        }
    }

    pub fn transform(&self) -> TransformId {
        self.transform
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn has_texture(&self) -> bool {
        self.resources.texture.is_some()
    }

    pub fn has_program(&self) -> bool {
        self.resources.program.is_some()
    }

    /// Upload the cube mesh, load the texture and build the shader program.
    ///
    /// Texture and program failures are logged and leave that handle empty;
    /// buffer failures are returned. Any resources already held are
    /// released first.
    pub fn create(&mut self, gpu: &mut dyn GpuSurface) -> Result<(), GpuError> {
        if self.state == RenderState::Created {
            self.destroy(gpu);
        }

        let vbo = gpu.create_buffer(BufferTarget::Vertex)?;
        self.resources.vertex_buffer = Some(vbo);
        gpu.bind_buffer(BufferTarget::Vertex, Some(vbo))?;
        gpu.upload_data(BufferTarget::Vertex, bytemuck::cast_slice(&CUBE_VERTICES))?;

        let ibo = gpu.create_buffer(BufferTarget::Index)?;
        self.resources.index_buffer = Some(ibo);
        gpu.bind_buffer(BufferTarget::Index, Some(ibo))?;
        gpu.upload_data(BufferTarget::Index, bytemuck::cast_slice(&CUBE_INDICES))?;

        gpu.bind_buffer(BufferTarget::Vertex, None)?;
        gpu.bind_buffer(BufferTarget::Index, None)?;

        self.resources.texture = match gpu.create_texture(&self.material.texture) {
            Ok(texture) => Some(texture),
            Err(e) => {
                error!(transform = %self.transform, "texture load failed: {e}");
                None
            }
        };

        self.resources.program = match gpu
            .create_program(&self.material.vertex_shader, &self.material.fragment_shader)
        {
            Ok(program) => Some(program),
            Err(e) => {
                error!(transform = %self.transform, "shader program failed: {e}");
                None
            }
        };

        self.state = RenderState::Created;
        debug!(transform = %self.transform, "render object created");
        Ok(())
    }

    /// Issue one draw. Returns `false` when the object could not be drawn
    /// because it is not created or its program is missing.
    pub fn render(
        &self,
        gpu: &mut dyn GpuSurface,
        view: Mat4,
        projection: Mat4,
        model: Mat4,
    ) -> Result<bool, GpuError> {
        if self.state != RenderState::Created {
            return Ok(false);
        }
        let GpuResources {
            vertex_buffer: Some(vertex_buffer),
            index_buffer: Some(index_buffer),
            texture,
            program: Some(program),
        } = self.resources
        else {
            warn!(transform = %self.transform, "skipping draw: missing GPU resources");
            return Ok(false);
        };

        gpu.set_uniform(program, "projection", Uniform::Mat4(projection))?;
        gpu.set_uniform(program, "view", Uniform::Mat4(view))?;
        gpu.set_uniform(program, "model", Uniform::Mat4(model))?;
        gpu.set_uniform(program, "texture0", Uniform::Int(0))?;
        gpu.draw_indexed(&DrawCall {
            vertex_buffer,
            index_buffer,
            index_count: CUBE_INDICES.len() as u32,
            program,
            texture,
        })?;
        Ok(true)
    }

    /// Release every GPU resource held. Safe to call in any state.
    pub fn destroy(&mut self, gpu: &mut dyn GpuSurface) {
        let resources = std::mem::take(&mut self.resources);
        if let Some(b) = resources.vertex_buffer {
            gpu.delete_buffer(b);
        }
        if let Some(b) = resources.index_buffer {
            gpu.delete_buffer(b);
        }
        if let Some(t) = resources.texture {
            gpu.delete_texture(t);
        }
        if let Some(p) = resources.program {
            gpu.delete_program(p);
        }
        if self.state == RenderState::Created {
            self.state = RenderState::Destroyed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{GpuCommand, RecordingSurface};

    fn material() -> Material {
        Material {
            texture: "checker.ppm".into(),
            vertex_shader: "cube.vert.wgsl".into(),
            fragment_shader: "cube.frag.wgsl".into(),
        }
    }

    #[test]
    fn lifecycle_states() {
        let mut gpu = RecordingSurface::new();
        let mut obj = RenderObject::new(TransformId(1), material());
        assert_eq!(obj.state(), RenderState::Uninitialized);

        obj.destroy(&mut gpu);
        assert_eq!(obj.state(), RenderState::Uninitialized);

        obj.create(&mut gpu).unwrap();
        assert_eq!(obj.state(), RenderState::Created);
        assert_eq!(gpu.live_buffers(), 2);
        assert_eq!(gpu.live_textures(), 1);
        assert_eq!(gpu.live_programs(), 1);

        obj.destroy(&mut gpu);
        assert_eq!(obj.state(), RenderState::Destroyed);
        assert_eq!(gpu.live_buffers() + gpu.live_textures() + gpu.live_programs(), 0);

        obj.create(&mut gpu).unwrap();
        assert_eq!(obj.state(), RenderState::Created);
    }

    #[test]
    fn create_uploads_cube_mesh() {
        let mut gpu = RecordingSurface::new();
        let mut obj = RenderObject::new(TransformId(1), material());
        obj.create(&mut gpu).unwrap();
        let uploads: Vec<usize> = gpu
            .commands()
            .iter()
            .filter_map(|c| match c {
                GpuCommand::UploadData(_, n) => Some(*n),
                _ => None,
            })
            .collect();
        assert_eq!(uploads, vec![24 * 20, 36 * 4]);
    }

    #[test]
    fn recreate_releases_previous_resources() {
        let mut gpu = RecordingSurface::new();
        let mut obj = RenderObject::new(TransformId(1), material());
        obj.create(&mut gpu).unwrap();
        obj.create(&mut gpu).unwrap();
        assert_eq!(gpu.live_buffers(), 2);
        assert_eq!(gpu.live_programs(), 1);
    }

    #[test]
    fn missing_texture_still_draws_untextured() {
        let mut gpu = RecordingSurface::new();
        gpu.fail_on("checker.ppm");
        let mut obj = RenderObject::new(TransformId(1), material());
        obj.create(&mut gpu).unwrap();
        assert!(!obj.has_texture());
        assert!(obj.has_program());

        gpu.begin_frame().unwrap();
        let drawn = obj
            .render(&mut gpu, Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY)
            .unwrap();
        assert!(drawn);
        assert_eq!(gpu.draws().next().map(|d| d.texture), Some(None));
    }

    #[test]
    fn failed_program_skips_draw() {
        let mut gpu = RecordingSurface::new();
        gpu.fail_on("cube.frag.wgsl");
        let mut obj = RenderObject::new(TransformId(1), material());
        obj.create(&mut gpu).unwrap();
        assert_eq!(obj.state(), RenderState::Created);
        assert!(!obj.has_program());

        gpu.begin_frame().unwrap();
        let drawn = obj
            .render(&mut gpu, Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY)
            .unwrap();
        assert!(!drawn);
        assert_eq!(gpu.draws().count(), 0);
    }

    #[test]
    fn render_sets_matrices_then_draws() {
        let mut gpu = RecordingSurface::new();
        let mut obj = RenderObject::new(TransformId(1), material());
        obj.create(&mut gpu).unwrap();
        gpu.clear_commands();

        let model = Mat4::from_translation(glam::Vec3::X);
        gpu.begin_frame().unwrap();
        obj.render(&mut gpu, Mat4::IDENTITY, Mat4::IDENTITY, model)
            .unwrap();

        let names: Vec<&str> = gpu
            .commands()
            .iter()
            .filter_map(|c| match c {
                GpuCommand::SetUniform(_, name, _) => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, ["projection", "view", "model", "texture0"]);
        assert!(gpu.commands().iter().any(|c| matches!(
            c,
            GpuCommand::SetUniform(_, name, Uniform::Mat4(m)) if name == "model" && *m == model
        )));
        assert!(matches!(gpu.commands().last(), Some(GpuCommand::Draw(_))));
    }
}
