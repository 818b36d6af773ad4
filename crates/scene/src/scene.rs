use crate::SceneError;
use crate::context::FrameContext;
use finder_ecs::EntityRegistry;
use finder_kernel::{TransformSystem, WorldSpaceInfo};
use finder_render::{Camera, FrameStats, GpuSurface, Renderer};
use tracing::{debug, info};

/// Everything a scene owns: entities, their transforms, what draws them,
/// and the camera they are seen through.
#[derive(Debug)]
pub struct SceneCore {
    pub entities: EntityRegistry,
    pub transforms: TransformSystem,
    pub renderer: Renderer,
    pub camera: Camera,
}

impl SceneCore {
    pub fn new(info: WorldSpaceInfo, camera: Camera) -> Self {
        Self {
            entities: EntityRegistry::new(),
            transforms: TransformSystem::new(Some(info)),
            renderer: Renderer::new(),
            camera,
        }
    }
}

/// Scene-specific logic plugged into a [`Scene`].
///
/// `on_start` runs once when the scene is built. Each frame the engine
/// calls `on_update` on every scene, then `on_late_update` right before
/// that scene is drawn.
pub trait SceneBehavior {
    fn on_start(&mut self, _core: &mut SceneCore) -> Result<(), SceneError> {
        Ok(())
    }

    fn on_update(
        &mut self,
        _core: &mut SceneCore,
        _ctx: &mut dyn FrameContext,
    ) -> Result<(), SceneError> {
        Ok(())
    }

    fn on_late_update(
        &mut self,
        _core: &mut SceneCore,
        _ctx: &mut dyn FrameContext,
    ) -> Result<(), SceneError> {
        Ok(())
    }
}

/// Object-safe face of a scene, as held by the engine.
pub trait SceneHooks {
    fn name(&self) -> &str;

    fn on_update(&mut self, ctx: &mut dyn FrameContext) -> Result<(), SceneError>;

    fn on_late_update(
        &mut self,
        ctx: &mut dyn FrameContext,
        gpu: &mut dyn GpuSurface,
    ) -> Result<FrameStats, SceneError>;

    fn on_resize(&mut self, width: u32, height: u32);

    /// Release GPU resources, dispose transforms and clear entities.
    /// Calling it again has no effect.
    fn shutdown(&mut self, gpu: &mut dyn GpuSurface);

    fn is_shut_down(&self) -> bool;
}

/// A named scene: its core state driven by behavior `B`.
#[derive(Debug)]
pub struct Scene<B> {
    name: String,
    core: SceneCore,
    behavior: B,
    shut_down: bool,
}

impl<B: SceneBehavior> Scene<B> {
    /// Build the scene and run `B::on_start`.
    pub fn new(
        name: impl Into<String>,
        info: WorldSpaceInfo,
        camera: Camera,
        mut behavior: B,
    ) -> Result<Self, SceneError> {
        let name = name.into();
        let mut core = SceneCore::new(info, camera);
        behavior.on_start(&mut core)?;
        info!(
            scene = %name,
            entities = core.entities.len(),
            transforms = core.transforms.len(),
            render_objects = core.renderer.len(),
            "scene started"
        );
        Ok(Self {
            name,
            core,
            behavior,
            shut_down: false,
        })
    }

    pub fn core(&self) -> &SceneCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut SceneCore {
        &mut self.core
    }

    pub fn behavior(&self) -> &B {
        &self.behavior
    }
}

impl<B: SceneBehavior> SceneHooks for Scene<B> {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_update(&mut self, ctx: &mut dyn FrameContext) -> Result<(), SceneError> {
        if self.shut_down {
            return Ok(());
        }
        self.behavior.on_update(&mut self.core, ctx)
    }

    fn on_late_update(
        &mut self,
        ctx: &mut dyn FrameContext,
        gpu: &mut dyn GpuSurface,
    ) -> Result<FrameStats, SceneError> {
        if self.shut_down {
            return Ok(FrameStats::default());
        }
        self.behavior.on_late_update(&mut self.core, ctx)?;
        let core = &mut self.core;
        let stats = core.renderer.run(gpu, &core.camera, &core.transforms)?;
        Ok(stats)
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        self.core.camera.set_viewport(width, height);
    }

    fn shutdown(&mut self, gpu: &mut dyn GpuSurface) {
        if self.shut_down {
            return;
        }
        self.core.renderer.destroy(gpu);
        self.core.transforms.dispose();
        self.core.entities.clear();
        self.shut_down = true;
        debug!(scene = %self.name, "scene shut down");
    }

    fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}
