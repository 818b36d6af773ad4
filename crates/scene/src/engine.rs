use crate::SceneError;
use crate::context::FrameContext;
use crate::scene::SceneHooks;
use finder_common::SlotArray;
use finder_render::{FrameStats, GpuSurface};
use tracing::{debug, info};

pub const MAX_SCENES: usize = 10;

/// Owns the GPU surface and the live scenes, and drives them one frame at
/// a time.
///
/// Every scene is shut down when the engine is dropped.
pub struct Engine<G: GpuSurface> {
    gpu: G,
    scenes: SlotArray<Box<dyn SceneHooks>>,
    frames: u64,
}

impl<G: GpuSurface> Engine<G> {
    pub fn new(gpu: G) -> Self {
        Self {
            gpu,
            scenes: SlotArray::new(MAX_SCENES),
            frames: 0,
        }
    }

    pub fn add_scene(&mut self, scene: impl SceneHooks + 'static) -> Result<usize, SceneError> {
        let name = scene.name().to_owned();
        let index = self.scenes.add(Box::new(scene))?;
        info!(scene = %name, index, "scene added");
        Ok(index)
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    pub fn scene_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.scenes.iter().map(|s| s.name())
    }

    pub fn gpu(&self) -> &G {
        &self.gpu
    }

    pub fn gpu_mut(&mut self) -> &mut G {
        &mut self.gpu
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run `on_update` on every scene in insertion order.
    pub fn update(&mut self, ctx: &mut dyn FrameContext) -> Result<(), SceneError> {
        for scene in self.scenes.iter_mut() {
            scene.on_update(ctx)?;
        }
        Ok(())
    }

    /// Draw every scene inside one GPU frame.
    pub fn late_update(&mut self, ctx: &mut dyn FrameContext) -> Result<FrameStats, SceneError> {
        self.gpu.begin_frame()?;
        let mut total = FrameStats::default();
        let mut result = Ok(());
        for scene in self.scenes.iter_mut() {
            match scene.on_late_update(ctx, &mut self.gpu) {
                Ok(stats) => {
                    total.drawn += stats.drawn;
                    total.skipped += stats.skipped;
                    total.recreated += stats.recreated;
                }
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        // The frame is closed even when a scene failed.
        let ended = self.gpu.end_frame();
        result?;
        ended?;
        self.frames += 1;
        debug!(frame = self.frames, drawn = total.drawn, "frame presented");
        Ok(total)
    }

    /// One full frame: update, then late update.
    pub fn frame(&mut self, ctx: &mut dyn FrameContext) -> Result<FrameStats, SceneError> {
        self.update(ctx)?;
        self.late_update(ctx)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        for scene in self.scenes.iter_mut() {
            scene.on_resize(width, height);
        }
    }

    /// Shut every scene down. Safe to call more than once.
    pub fn shutdown(&mut self) {
        for scene in self.scenes.iter_mut() {
            scene.shutdown(&mut self.gpu);
        }
    }
}

impl<G: GpuSurface> Drop for Engine<G> {
    fn drop(&mut self) {
        self.shutdown();
        info!(frames = self.frames, "engine stopped");
    }
}
