use crate::camera::Camera;
use crate::gpu::{GpuError, GpuSurface};
use crate::object::RenderObject;
use finder_common::{SlotArray, SlotError};
use finder_kernel::TransformSystem;
use tracing::{debug, info, warn};

pub const DEFAULT_RENDER_CAPACITY: usize = 999;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Gpu(#[from] GpuError),
    #[error(transparent)]
    Slot(#[from] SlotError),
}

/// What one call to [`Renderer::run`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub drawn: usize,
    pub skipped: usize,
    pub recreated: usize,
}

/// Owns the render objects of a scene and draws them once per frame.
///
/// Adding an object marks the set dirty; the next `run` tears down and
/// rebuilds the GPU resources of every object before drawing.
#[derive(Debug)]
pub struct Renderer {
    objects: SlotArray<RenderObject>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_RENDER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            objects: SlotArray::new(capacity),
        }
    }

    pub fn add(&mut self, object: RenderObject) -> Result<usize, RenderError> {
        let index = self.objects.add(object)?;
        debug!(index, "render object added");
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.objects.is_dirty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderObject> + '_ {
        self.objects.iter()
    }

    /// Recreate if dirty, then draw every object with its live model matrix.
    pub fn run(
        &mut self,
        gpu: &mut dyn GpuSurface,
        camera: &Camera,
        transforms: &TransformSystem,
    ) -> Result<FrameStats, RenderError> {
        let mut stats = FrameStats::default();

        if self.objects.is_dirty() {
            for object in self.objects.iter_mut() {
                object.destroy(gpu);
                object.create(gpu)?;
                stats.recreated += 1;
            }
            self.objects.clear_dirty();
            info!(objects = stats.recreated, "render objects recreated");
        }

        let view = camera.view_matrix();
        let projection = camera.projection_matrix();
        for object in self.objects.iter() {
            let model = match transforms.matrix(object.transform()) {
                Ok(m) => *m,
                Err(e) => {
                    warn!(transform = %object.transform(), "skipping draw: {e}");
                    stats.skipped += 1;
                    continue;
                }
            };
            if object.render(gpu, view, projection, model)? {
                stats.drawn += 1;
            } else {
                stats.skipped += 1;
            }
        }
        Ok(stats)
    }

    /// Release the GPU resources of every object. Transforms are untouched.
    pub fn destroy(&mut self, gpu: &mut dyn GpuSurface) {
        for object in self.objects.iter_mut() {
            object.destroy(gpu);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Material, RenderState};
    use crate::recording::{GpuCommand, RecordingSurface};
    use finder_common::TransformId;
    use finder_kernel::WorldSpaceInfo;
    use glam::Vec3;

    fn material() -> Material {
        Material {
            texture: "checker.ppm".into(),
            vertex_shader: "cube.vert.wgsl".into(),
            fragment_shader: "cube.frag.wgsl".into(),
        }
    }

    fn transforms(ids: &[u64]) -> TransformSystem {
        let mut system = TransformSystem::new(Some(WorldSpaceInfo::new(Vec3::splat(100.0))));
        for &id in ids {
            system
                .create_transform(Vec3::ONE, Vec3::ZERO, Vec3::ZERO, TransformId(id))
                .unwrap();
        }
        system
    }

    fn frame(
        renderer: &mut Renderer,
        gpu: &mut RecordingSurface,
        transforms: &TransformSystem,
    ) -> FrameStats {
        gpu.begin_frame().unwrap();
        let stats = renderer
            .run(gpu, &Camera::default(), transforms)
            .unwrap();
        gpu.end_frame().unwrap();
        stats
    }

    #[test]
    fn adding_marks_dirty_and_run_clears_it() {
        let mut renderer = Renderer::new();
        let mut gpu = RecordingSurface::new();
        let system = transforms(&[1]);
        assert!(!renderer.is_dirty());

        renderer
            .add(RenderObject::new(TransformId(1), material()))
            .unwrap();
        assert!(renderer.is_dirty());

        let stats = frame(&mut renderer, &mut gpu, &system);
        assert!(!renderer.is_dirty());
        assert_eq!(stats, FrameStats { drawn: 1, skipped: 0, recreated: 1 });
    }

    #[test]
    fn second_add_recreates_first_exactly_once() {
        let mut renderer = Renderer::new();
        let mut gpu = RecordingSurface::new();
        let system = transforms(&[1, 2]);

        renderer
            .add(RenderObject::new(TransformId(1), material()))
            .unwrap();
        frame(&mut renderer, &mut gpu, &system);
        gpu.clear_commands();

        renderer
            .add(RenderObject::new(TransformId(2), material()))
            .unwrap();
        let stats = frame(&mut renderer, &mut gpu, &system);
        assert_eq!(stats.recreated, 2);
        assert_eq!(stats.drawn, 2);
        assert_eq!(gpu.count(|c| matches!(c, GpuCommand::CreateProgram(..))), 2);
        // The first object's old program and texture went away once.
        assert_eq!(gpu.count(|c| matches!(c, GpuCommand::DeleteProgram(_))), 1);
        assert_eq!(gpu.live_programs(), 2);

        gpu.clear_commands();
        let stats = frame(&mut renderer, &mut gpu, &system);
        assert_eq!(stats.recreated, 0);
        assert_eq!(gpu.count(|c| matches!(c, GpuCommand::CreateProgram(..))), 0);
        assert_eq!(gpu.draws().count(), 2);
    }

    #[test]
    fn draw_uses_live_transform_matrix() {
        let mut renderer = Renderer::new();
        let mut gpu = RecordingSurface::new();
        let mut system = transforms(&[7]);
        renderer
            .add(RenderObject::new(TransformId(7), material()))
            .unwrap();
        frame(&mut renderer, &mut gpu, &system);

        system
            .set_position(TransformId(7), Vec3::new(1.0, 2.0, 3.0))
            .unwrap();
        gpu.clear_commands();
        frame(&mut renderer, &mut gpu, &system);

        let expected = *system.matrix(TransformId(7)).unwrap();
        assert!(gpu.commands().iter().any(|c| matches!(
            c,
            GpuCommand::SetUniform(_, name, crate::Uniform::Mat4(m)) if name == "model" && *m == expected
        )));
    }

    #[test]
    fn missing_transform_is_skipped() {
        let mut renderer = Renderer::new();
        let mut gpu = RecordingSurface::new();
        let system = transforms(&[1]);
        renderer
            .add(RenderObject::new(TransformId(1), material()))
            .unwrap();
        renderer
            .add(RenderObject::new(TransformId(99), material()))
            .unwrap();
        let stats = frame(&mut renderer, &mut gpu, &system);
        assert_eq!(stats.drawn, 1);
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn destroy_releases_everything_and_keeps_transforms() {
        let mut renderer = Renderer::new();
        let mut gpu = RecordingSurface::new();
        let system = transforms(&[1]);
        renderer
            .add(RenderObject::new(TransformId(1), material()))
            .unwrap();
        frame(&mut renderer, &mut gpu, &system);

        renderer.destroy(&mut gpu);
        assert_eq!(gpu.live_buffers() + gpu.live_textures() + gpu.live_programs(), 0);
        assert!(renderer.iter().all(|o| o.state() == RenderState::Destroyed));
        assert_eq!(system.len(), 1);
    }

    #[test]
    fn capacity_is_enforced() {
        let mut renderer = Renderer::with_capacity(1);
        renderer
            .add(RenderObject::new(TransformId(1), material()))
            .unwrap();
        let err = renderer
            .add(RenderObject::new(TransformId(2), material()))
            .unwrap_err();
        assert!(matches!(err, RenderError::Slot(SlotError::CapacityExceeded { .. })));
        assert_eq!(renderer.len(), 1);
    }
}
