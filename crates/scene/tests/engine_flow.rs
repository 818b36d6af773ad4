use finder_common::TransformId;
use finder_input::Key;
use finder_kernel::WorldSpaceInfo;
use finder_render::{GpuCommand, Material, RecordingSurface, RenderObject};
use finder_scene::{
    Engine, EngineConfig, FrameContext, HeadlessFrame, SampleScene, Scene, SceneBehavior,
    SceneCore, SceneError, SceneHooks,
};
use glam::Vec3;

fn material() -> Material {
    EngineConfig::default().material()
}

fn sample_engine() -> Engine<RecordingSurface> {
    let config = EngineConfig::default();
    let scene = Scene::new(
        "sample",
        config.world_space(),
        config.camera(),
        SampleScene::new(config.material()),
    )
    .unwrap();
    let mut engine = Engine::new(RecordingSurface::new());
    engine.add_scene(scene).unwrap();
    engine
}

#[test]
fn sample_scene_draws_one_box_per_frame() {
    let mut engine = sample_engine();
    let mut ctx = HeadlessFrame::default();

    let first = engine.frame(&mut ctx).unwrap();
    assert_eq!((first.drawn, first.recreated), (1, 1));

    for _ in 0..5 {
        let stats = engine.frame(&mut ctx).unwrap();
        assert_eq!((stats.drawn, stats.recreated), (1, 0));
    }
    assert_eq!(engine.gpu().frames_presented(), 6);
    assert_eq!(engine.gpu().draws().count(), 6);
    assert_eq!(
        engine
            .gpu()
            .count(|c| matches!(c, GpuCommand::CreateProgram(..))),
        1
    );
}

#[test]
fn escape_ends_the_loop() {
    let mut engine = sample_engine();
    let mut ctx = HeadlessFrame::default();
    let mut frames = 0;
    while !ctx.exit_requested() && frames < 100 {
        if frames == 3 {
            ctx.input.press(Key::Escape);
        }
        engine.frame(&mut ctx).unwrap();
        ctx.end_frame();
        frames += 1;
    }
    assert_eq!(frames, 4);
}

#[test]
fn shutdown_releases_gpu_resources() {
    let mut engine = sample_engine();
    let mut ctx = HeadlessFrame::default();
    engine.frame(&mut ctx).unwrap();
    assert_eq!(engine.gpu().live_programs(), 1);

    engine.shutdown();
    let gpu = engine.gpu();
    assert_eq!(gpu.live_buffers() + gpu.live_textures() + gpu.live_programs(), 0);
}

/// Adds one more box on a chosen frame and moves a parent every frame.
struct Growing {
    frame: u32,
    add_on: u32,
}

const PARENT: TransformId = TransformId(1);
const CHILD: TransformId = TransformId(2);
const LATE: TransformId = TransformId(3);

impl SceneBehavior for Growing {
    fn on_start(&mut self, core: &mut SceneCore) -> Result<(), SceneError> {
        core.transforms
            .create_transform(Vec3::ONE, Vec3::ZERO, Vec3::ZERO, PARENT)?;
        core.transforms
            .create_transform(Vec3::ONE, Vec3::ZERO, Vec3::splat(5.0), CHILD)?;
        core.transforms.attach_child(PARENT, CHILD)?;
        core.renderer.add(RenderObject::new(PARENT, material()))?;
        core.renderer.add(RenderObject::new(CHILD, material()))?;
        Ok(())
    }

    fn on_update(
        &mut self,
        core: &mut SceneCore,
        _ctx: &mut dyn FrameContext,
    ) -> Result<(), SceneError> {
        self.frame += 1;
        core.transforms
            .set_position(PARENT, Vec3::new(self.frame as f32, 0.0, 0.0))?;
        if self.frame == self.add_on {
            core.transforms
                .create_transform(Vec3::ONE, Vec3::ZERO, Vec3::ZERO, LATE)?;
            core.renderer.add(RenderObject::new(LATE, material()))?;
        }
        Ok(())
    }
}

#[test]
fn adding_an_object_recreates_all_once() {
    let scene = Scene::new(
        "growing",
        WorldSpaceInfo::new(Vec3::splat(100.0)),
        Default::default(),
        Growing {
            frame: 0,
            add_on: 3,
        },
    )
    .unwrap();
    let mut engine = Engine::new(RecordingSurface::new());
    engine.add_scene(scene).unwrap();
    let mut ctx = HeadlessFrame::default();

    let recreated: Vec<usize> = (0..5)
        .map(|_| engine.frame(&mut ctx).unwrap().recreated)
        .collect();
    assert_eq!(recreated, [2, 0, 3, 0, 0]);
    assert_eq!(engine.gpu().live_programs(), 3);
}

#[test]
fn parent_moves_cascade_into_child() {
    let mut scene = Scene::new(
        "growing",
        WorldSpaceInfo::new(Vec3::splat(100.0)),
        Default::default(),
        Growing {
            frame: 0,
            add_on: u32::MAX,
        },
    )
    .unwrap();
    let mut ctx = HeadlessFrame::default();
    scene.on_update(&mut ctx).unwrap();

    let transforms = &scene.core().transforms;
    assert_eq!(transforms.position(PARENT).unwrap(), Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(transforms.position(CHILD).unwrap(), Vec3::new(6.0, 5.0, 5.0));
}
