use crate::SceneError;
use crate::context::FrameContext;
use crate::scene::{SceneBehavior, SceneCore};
use finder_common::TransformId;
use finder_input::Action;
use finder_render::{Material, RenderObject};
use glam::Vec3;
use tracing::info;

/// Degrees of camera turn per pixel of mouse motion per second.
pub const MOUSE_SENSITIVITY: f32 = 500.0;

pub const BOX_ENTITY: &str = "box";

/// One textured box and a fly camera driven by keyboard and mouse.
#[derive(Debug, Clone)]
pub struct SampleScene {
    material: Material,
    box_transform: Option<TransformId>,
}

impl SampleScene {
    pub fn new(material: Material) -> Self {
        Self {
            material,
            box_transform: None,
        }
    }

    /// Transform of the box, once the scene has started.
    pub fn box_transform(&self) -> Option<TransformId> {
        self.box_transform
    }
}

impl SceneBehavior for SampleScene {
    fn on_start(&mut self, core: &mut SceneCore) -> Result<(), SceneError> {
        let entity = core.entities.create_entity(BOX_ENTITY)?;
        let id = TransformId::from(entity.hash());
        core.transforms
            .create_transform(Vec3::ONE, Vec3::ZERO, Vec3::ZERO, id)?;
        core.renderer
            .add(RenderObject::new(id, self.material.clone()))?;
        self.box_transform = Some(id);
        info!(entity = %entity.name, transform = %id, "sample box created");
        Ok(())
    }

    fn on_update(
        &mut self,
        core: &mut SceneCore,
        ctx: &mut dyn FrameContext,
    ) -> Result<(), SceneError> {
        if !ctx.is_focused() {
            return Ok(());
        }
        if ctx.input().is_active(Action::Quit) {
            ctx.request_exit();
        }

        let input = ctx.input();
        let dt = ctx.delta_time();
        let step = if input.is_active(Action::Sprint) { 2.0 } else { 1.0 } * dt;
        let camera = &mut core.camera;

        if input.is_active(Action::MoveForward) {
            camera.move_forward(step);
        }
        if input.is_active(Action::MoveBackward) {
            camera.move_backward(step);
        }
        if input.is_active(Action::StrafeLeft) {
            camera.move_left(step);
        }
        if input.is_active(Action::StrafeRight) {
            camera.move_right(step);
        }
        if input.is_active(Action::Ascend) {
            camera.move_up(step);
        }
        if input.is_active(Action::Descend) {
            camera.move_down(step);
        }

        let delta = input.mouse().delta;
        camera.turn(
            delta.x * dt * MOUSE_SENSITIVITY,
            delta.y * dt * MOUSE_SENSITIVITY,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::HeadlessFrame;
    use crate::scene::{Scene, SceneHooks};
    use finder_common::EntityHash;
    use finder_input::Key;
    use finder_kernel::WorldSpaceInfo;
    use finder_render::Camera;

    fn sample() -> Scene<SampleScene> {
        let material = Material {
            texture: "checker.ppm".into(),
            vertex_shader: "cube.vert.wgsl".into(),
            fragment_shader: "cube.frag.wgsl".into(),
        };
        Scene::new(
            "sample",
            WorldSpaceInfo::new(Vec3::splat(100.0)),
            Camera::default(),
            SampleScene::new(material),
        )
        .unwrap()
    }

    #[test]
    fn start_creates_box_keyed_by_entity_hash() {
        let scene = sample();
        let core = scene.core();
        let entity = core.entities.get_entity_by_name("box").unwrap();
        let id = TransformId::from(EntityHash::of_name("box"));
        assert_eq!(entity.hash(), EntityHash::of_name("box"));
        assert_eq!(scene.behavior().box_transform(), Some(id));
        assert_eq!(core.transforms.scale(id).unwrap(), Vec3::ONE);
        assert_eq!(core.renderer.len(), 1);
    }

    #[test]
    fn escape_requests_exit() {
        let mut scene = sample();
        let mut ctx = HeadlessFrame::default();
        ctx.input.press(Key::Escape);
        scene.on_update(&mut ctx).unwrap();
        assert!(ctx.exit_requested());
    }

    #[test]
    fn unfocused_window_ignores_input() {
        let mut scene = sample();
        let mut ctx = HeadlessFrame::default();
        ctx.focused = false;
        ctx.input.press(Key::Escape);
        ctx.input.press(Key::W);
        scene.on_update(&mut ctx).unwrap();
        assert!(!ctx.exit_requested());
        assert_eq!(scene.core().camera.position, Camera::default().position);
    }

    #[test]
    fn sprint_doubles_movement() {
        let mut walk = sample();
        let mut run = sample();
        let mut ctx = HeadlessFrame::new(800, 600, 0.5);
        ctx.input.press(Key::W);
        walk.on_update(&mut ctx).unwrap();
        ctx.input.press(Key::LeftShift);
        run.on_update(&mut ctx).unwrap();

        let start = Camera::default().position;
        let walked = start.distance(walk.core().camera.position);
        let ran = start.distance(run.core().camera.position);
        assert!((walked - 0.75).abs() < 1e-5);
        assert!((ran - 1.5).abs() < 1e-5);
    }

    #[test]
    fn vertical_keys_move_along_world_up() {
        let mut scene = sample();
        let mut ctx = HeadlessFrame::new(800, 600, 1.0);
        ctx.input.press(Key::Space);
        scene.on_update(&mut ctx).unwrap();
        assert!((scene.core().camera.position.y - 1.5).abs() < 1e-5);

        ctx.input.release(Key::Space);
        ctx.input.press(Key::LeftControl);
        scene.on_update(&mut ctx).unwrap();
        assert!(scene.core().camera.position.y.abs() < 1e-5);
    }

    #[test]
    fn mouse_turns_camera_scaled_by_delta_time() {
        let mut scene = sample();
        let mut ctx = HeadlessFrame::new(800, 600, 0.01);
        ctx.input.add_mouse_motion(2.0, 1.0);
        scene.on_update(&mut ctx).unwrap();
        let camera = &scene.core().camera;
        assert!((camera.yaw() - (-90.0 + 10.0)).abs() < 1e-4);
        assert!((camera.pitch() - (-5.0)).abs() < 1e-4);
    }
}
