use anyhow::{Context, Result};
use glam::{Quat, Vec2, Vec3};
use playground_assets::{AssetSource, CharacterAsset};
use playground_character::{
    AnimationState, CharacterController, CharacterSettings, character_body,
};
use playground_common::{ObjectId, ObjectOptions, PlaygroundConfig};
use playground_input::{
    ControlEvent, InputIntent, JoystickIntentSource, JoystickReading, KeyboardIntentSource,
};
use playground_kernel::{ObjectRegistry, ObjectSpec};
use playground_physics::{BodyDescriptor, PhysicsBackend, PhysicsEngineHandle, PhysicsWorld};
use playground_render::{DebugTextRenderer, Renderer, resize_surface};
use playground_scene::{CameraRig, Material, PerspectiveCamera, Scene, VisualObject};
use serde::Serialize;

/// Everything one playground session owns.
///
/// Each frame steps the registry first and the character second, so the
/// controller always reads the pose produced by this frame's physics step.
pub struct Stage {
    config: PlaygroundConfig,
    registry: ObjectRegistry<PhysicsWorld>,
    rig: CameraRig,
    renderer: DebugTextRenderer,
    keyboard: KeyboardIntentSource,
    joystick: JoystickIntentSource,
    character: Option<CharacterController>,
    frame: u64,
    last_render: String,
}

/// Final pose of one object, for JSON output.
#[derive(Debug, Serialize)]
pub struct ObjectPose {
    pub name: String,
    pub position: Vec3,
    pub orientation: Quat,
}

impl Stage {
    pub async fn new(config: PlaygroundConfig) -> Result<Self> {
        let engine = PhysicsEngineHandle::initialize(config.physics.clone())
            .await
            .context("physics engine failed to initialize")?;
        let registry = ObjectRegistry::new(Scene::new(), engine.create_world());

        let camera = PerspectiveCamera::default().at(Vec3::new(0.0, 5.0, 10.0));
        let mut rig = CameraRig::new(camera);
        let mut renderer = DebugTextRenderer::new();
        let mut cameras = [rig.camera];
        resize_surface(
            &mut renderer,
            &mut cameras,
            config.viewport.width,
            config.viewport.height,
        );
        rig.camera = cameras[0];

        tracing::info!(backend = registry.physics().name(), "stage ready");
        let joystick = JoystickIntentSource::new(config.joystick.clone());
        Ok(Self {
            registry,
            rig,
            renderer,
            keyboard: KeyboardIntentSource::new(),
            joystick,
            config,
            character: None,
            frame: 0,
            last_render: String::new(),
        })
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn last_render(&self) -> &str {
        &self.last_render
    }

    /// Static ground slab whose top face is at y = 1.
    pub fn add_ground(&mut self) -> Result<ObjectId> {
        let options = ObjectOptions::at(Vec3::ZERO).with_size(Vec3::new(400.0, 2.0, 400.0));
        self.add_cuboid("plane", options, 0x556b2f)
    }

    /// Static wall to the left of the spawn point, standing on the ground.
    pub fn add_wall(&mut self) -> Result<ObjectId> {
        let options = ObjectOptions::at(Vec3::new(-5.0, 2.5, 0.0)).with_size(Vec3::new(1.0, 3.0, 10.0));
        self.add_cuboid("left-plane", options, 0xa0afa4)
    }

    pub fn add_cuboid(
        &mut self,
        name: &str,
        options: ObjectOptions,
        color: u32,
    ) -> Result<ObjectId> {
        let id = self.registry.add(
            ObjectSpec::new(name, options),
            |o| {
                VisualObject::cuboid(name, o.size_or_unit(), Material::color(color))
                    .at(o.position)
            },
            |o, _| BodyDescriptor::from_options(o),
        )?;
        Ok(id)
    }

    pub fn add_ball(&mut self, name: &str, options: ObjectOptions, color: u32) -> Result<ObjectId> {
        let radius = options.radius.unwrap_or(0.5);
        let options = ObjectOptions {
            size: None,
            ..options.with_radius(radius)
        };
        let id = self.registry.add(
            ObjectSpec::new(name, options),
            |o| VisualObject::sphere(name, radius, Material::color(color)).at(o.position),
            |o, _| BodyDescriptor::from_options(o),
        )?;
        Ok(id)
    }

    /// Load a character, register it at `position` and take control of it.
    pub async fn spawn_character<S: AssetSource>(
        &mut self,
        source: &S,
        position: Vec3,
    ) -> Result<ObjectId> {
        let asset: CharacterAsset = source
            .load()
            .await
            .context("character asset failed to load")?;
        let model = asset.model.clone();
        let options = ObjectOptions::at(position)
            .with_size(Vec3::new(0.6, 1.0, 0.6))
            .with_mass(1.0);
        let id = self.registry.add(
            ObjectSpec::new("character", options).without_rotation_sync(),
            move |o| model.at(o.position),
            character_body,
        )?;
        let settings = CharacterSettings::from(&self.config.character);
        self.character = Some(CharacterController::new(id, &asset, settings)?);
        self.rig.set_target(position);
        Ok(id)
    }

    fn dispatch(&mut self, event: ControlEvent) {
        if let Some(controller) = self.character.as_mut() {
            controller.handle_event(event, &mut self.registry);
        }
    }

    pub fn key_down(&mut self, key: &str) {
        if let Some(event) = self.keyboard.key_down(key) {
            self.dispatch(event);
        }
    }

    pub fn key_up(&mut self, key: &str) {
        if let Some(event) = self.keyboard.key_up(key) {
            self.dispatch(event);
        }
    }

    pub fn joystick_press(&mut self, point: Vec2) {
        self.joystick.press(point);
    }

    pub fn joystick_pressed(&self) -> bool {
        self.joystick.is_pressed()
    }

    /// Sample a joystick drag; a strong push turns running on, a weak one off.
    pub fn joystick_drag(&mut self, point: Vec2) -> Option<JoystickReading> {
        let reading = self.joystick.drag(point)?;
        self.dispatch(reading.run_event());
        Some(reading)
    }

    pub fn joystick_release(&mut self) {
        let event = self.joystick.release();
        self.dispatch(event);
    }

    pub fn joystick_jump(&mut self) {
        let event = self.joystick.jump_tap();
        self.dispatch(event);
    }

    /// Run one frame: physics and sync, then the character, then a draw.
    pub fn frame(&mut self, dt: f32) -> Option<AnimationState> {
        self.frame += 1;
        let _span = tracing::info_span!("frame", n = self.frame).entered();

        self.registry.update(dt);
        let intent: InputIntent = self.keyboard.intent().union(self.joystick.intent());
        let state = self
            .character
            .as_mut()
            .map(|c| c.update(dt, &intent, &mut self.registry, &mut self.rig));
        self.last_render = self.renderer.render(self.registry.scene(), &self.rig.camera);
        state
    }

    pub fn body_position(&self, id: ObjectId) -> Result<Vec3> {
        Ok(self.registry.body_transform(id)?.position)
    }

    pub fn poses(&self) -> Vec<ObjectPose> {
        self.registry
            .entries()
            .filter_map(|entry| {
                let pose = self.registry.body_transform(entry.id).ok()?;
                Some(ObjectPose {
                    name: entry.name.clone(),
                    position: pose.position,
                    orientation: pose.orientation,
                })
            })
            .collect()
    }

    pub fn teardown(&mut self) {
        self.character = None;
        self.registry.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playground_assets::ProceduralCharacter;
    use playground_common::BackendKind;

    const DT: f32 = 1.0 / 60.0;

    fn stage(backend: BackendKind) -> Stage {
        let mut config = PlaygroundConfig::default();
        config.physics.backend = backend;
        pollster::block_on(Stage::new(config)).unwrap()
    }

    #[test]
    fn drop_scenario_settles_on_both_backends() {
        for backend in [BackendKind::Simple, BackendKind::Rigid] {
            let mut stage = stage(backend);
            stage.add_ground().unwrap();
            let cube = stage
                .add_cuboid(
                    "box",
                    ObjectOptions::at(Vec3::new(1.0, 10.0, -3.0))
                        .with_size(Vec3::ONE)
                        .with_mass(1.0),
                    0xff0000,
                )
                .unwrap();
            for _ in 0..300 {
                stage.frame(DT);
            }
            let y = stage.body_position(cube).unwrap().y;
            assert!((y - 1.5).abs() < 0.05, "{backend:?}: y = {y}");
            assert!(stage.last_render().contains("box"));
        }
    }

    #[test]
    fn keyboard_drives_the_character() {
        let mut stage = stage(BackendKind::Simple);
        stage.add_ground().unwrap();
        pollster::block_on(stage.spawn_character(&ProceduralCharacter, Vec3::new(0.0, 1.5, 0.0)))
            .unwrap();

        assert_eq!(stage.frame(DT), Some(AnimationState::Idle));
        stage.key_down("w");
        assert_eq!(stage.frame(DT), Some(AnimationState::Walk));
        stage.key_down("Shift");
        assert_eq!(stage.frame(DT), Some(AnimationState::Run));
        stage.key_down(" ");
        assert_eq!(stage.frame(DT), Some(AnimationState::Jump));
        stage.key_up(" ");
        stage.key_up("Shift");
        stage.key_up("w");
        for _ in 0..60 {
            stage.frame(DT);
        }
        assert_eq!(stage.frame(DT), Some(AnimationState::Idle));
    }

    #[test]
    fn character_walks_on_both_backends() {
        for backend in [BackendKind::Simple, BackendKind::Rigid] {
            let mut stage = stage(backend);
            stage.add_ground().unwrap();
            let hero = pollster::block_on(
                stage.spawn_character(&ProceduralCharacter, Vec3::new(0.0, 1.5, 0.0)),
            )
            .unwrap();
            let start = stage.body_position(hero).unwrap();
            stage.key_down("w");
            for _ in 0..120 {
                stage.frame(DT);
            }
            let end = stage.body_position(hero).unwrap();
            let moved = (end - start).length();
            assert!(moved > 2.0, "{backend:?}: moved {moved}");
            assert!((end.y - start.y).abs() < 0.05, "{backend:?}: y = {}", end.y);
        }
    }

    #[test]
    fn joystick_drives_the_character() {
        let mut stage = stage(BackendKind::Simple);
        stage.add_ground().unwrap();
        let hero = pollster::block_on(
            stage.spawn_character(&ProceduralCharacter, Vec3::new(0.0, 1.5, 0.0)),
        )
        .unwrap();
        let start = stage.body_position(hero).unwrap();

        stage.joystick_press(Vec2::new(100.0, 100.0));
        let reading = stage.joystick_drag(Vec2::new(100.0, 90.0)).unwrap();
        assert!(reading.keys.forward && !reading.strong);
        assert_eq!(stage.frame(DT), Some(AnimationState::Walk));

        stage.joystick_drag(Vec2::new(100.0, 40.0)).unwrap();
        assert_eq!(stage.frame(DT), Some(AnimationState::Run));

        stage.joystick_jump();
        assert_eq!(stage.frame(DT), Some(AnimationState::Jump));

        stage.joystick_release();
        for _ in 0..60 {
            stage.frame(DT);
        }
        assert_eq!(stage.frame(DT), Some(AnimationState::Idle));
        assert!(stage.body_position(hero).unwrap().z < start.z);
    }

    #[test]
    fn wall_stands_on_the_ground() {
        let mut stage = stage(BackendKind::Rigid);
        stage.add_ground().unwrap();
        let wall = stage.add_wall().unwrap();
        for _ in 0..30 {
            stage.frame(DT);
        }
        let at = stage.body_position(wall).unwrap();
        assert!((at - Vec3::new(-5.0, 2.5, 0.0)).length() < 1e-5, "{at}");
    }

    #[test]
    fn duplicate_objects_are_reported() {
        let mut stage = stage(BackendKind::Simple);
        stage.add_ground().unwrap();
        assert!(stage.add_ground().is_err());
        assert_eq!(stage.poses().len(), 1);
    }
}
