use glam::Vec3;
use playground_assets::{AssetError, CharacterAsset};
use playground_common::{CharacterConfig, ObjectId, ObjectOptions};
use playground_input::{ControlEvent, InputIntent};
use playground_kernel::ObjectRegistry;
use playground_physics::{BodyDescriptor, PhysicsBackend};
use playground_scene::{CameraRig, VisualObject};

use crate::animation::{AnimationMixer, AnimationState, ClipId};
use crate::movement::{camera_yaw, direction_offset, facing, rotate_towards, walk_direction};

/// Errors from controller construction.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("no object named {0:?} in the registry")]
    UnknownObject(String),
    #[error("character asset is unusable: {0}")]
    Asset(#[from] AssetError),
}

/// Tuning for one controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterSettings {
    pub walk_velocity: f32,
    pub run_velocity: f32,
    pub fade_duration: f32,
    /// Largest turn per update, in radians.
    pub max_turn_step: f32,
    /// How long the jump state lasts, in seconds.
    pub jump_duration: f32,
    pub jump_impulse: f32,
}

impl Default for CharacterSettings {
    fn default() -> Self {
        Self::from(&CharacterConfig::default())
    }
}

impl From<&CharacterConfig> for CharacterSettings {
    fn from(config: &CharacterConfig) -> Self {
        Self {
            walk_velocity: config.walk_velocity,
            run_velocity: config.run_velocity,
            fade_duration: config.fade_duration,
            max_turn_step: config.max_turn_step,
            jump_duration: config.jump_duration,
            jump_impulse: config.jump_impulse,
        }
    }
}

/// Body builder for a controlled character, in the shape `ObjectRegistry::add` takes.
///
/// The body is frictionless and never rotates, so per-frame velocity deltas
/// carry it across the ground.
pub fn character_body(options: &ObjectOptions, _: &VisualObject) -> BodyDescriptor {
    BodyDescriptor::from_options(options)
        .with_friction(0.0)
        .with_locked_rotations()
}

/// Drives one registered object as a third-person character.
#[derive(Debug, Clone)]
pub struct CharacterController {
    object: ObjectId,
    settings: CharacterSettings,
    mixer: AnimationMixer,
    clips: [ClipId; 4],
    current: AnimationState,
    run_toggle: bool,
    jump_toggle: bool,
    jump_remaining: f32,
    last_body_position: Option<Vec3>,
}

impl CharacterController {
    /// Build the mixer from the asset's clips and start in Idle.
    ///
    /// The asset must carry a clip for every [`AnimationState`].
    pub fn new(
        object: ObjectId,
        asset: &CharacterAsset,
        settings: CharacterSettings,
    ) -> Result<Self, ControllerError> {
        let names = AnimationState::ALL.map(AnimationState::clip_name);
        asset.require_clips(&names)?;

        let mut mixer = AnimationMixer::from_clips(&asset.clips);
        let mut clips = [ClipId(0); 4];
        for (slot, name) in clips.iter_mut().zip(names) {
            *slot = mixer
                .clip_id(name)
                .ok_or_else(|| AssetError::MissingClip(name.to_owned()))?;
        }
        mixer.play(clips[AnimationState::Idle as usize]);

        Ok(Self {
            object,
            settings,
            mixer,
            clips,
            current: AnimationState::Idle,
            run_toggle: false,
            jump_toggle: false,
            jump_remaining: 0.0,
            last_body_position: None,
        })
    }

    /// Look the object up by name and build a controller for it.
    pub fn for_object<B: PhysicsBackend>(
        registry: &ObjectRegistry<B>,
        name: &str,
        asset: &CharacterAsset,
        settings: CharacterSettings,
    ) -> Result<Self, ControllerError> {
        let object = registry
            .object_id(name)
            .ok_or_else(|| ControllerError::UnknownObject(name.to_owned()))?;
        Self::new(object, asset, settings)
    }

    pub fn object(&self) -> ObjectId {
        self.object
    }

    pub fn current_animation(&self) -> AnimationState {
        self.current
    }

    pub fn is_running(&self) -> bool {
        self.run_toggle
    }

    pub fn is_jumping(&self) -> bool {
        self.jump_toggle
    }

    pub fn mixer(&self) -> &AnimationMixer {
        &self.mixer
    }

    pub fn clip(&self, state: AnimationState) -> ClipId {
        self.clips[state as usize]
    }

    pub fn set_run(&mut self, run: bool) {
        self.run_toggle = run;
    }

    pub fn toggle_run(&mut self) {
        self.run_toggle = !self.run_toggle;
    }

    /// Start a jump: push the body up and hold the Jump state for
    /// `jump_duration`. Returns `false` if a jump is already under way or the
    /// body cannot be pushed.
    pub fn request_jump<B: PhysicsBackend>(&mut self, registry: &mut ObjectRegistry<B>) -> bool {
        if self.jump_toggle {
            return false;
        }
        if let Err(err) = registry.apply_upward_impulse(self.object, self.settings.jump_impulse) {
            tracing::warn!(object = %self.object, %err, "jump ignored");
            return false;
        }
        self.jump_toggle = true;
        self.jump_remaining = self.settings.jump_duration;
        tracing::debug!(object = %self.object, "jump started");
        true
    }

    pub fn handle_event<B: PhysicsBackend>(
        &mut self,
        event: ControlEvent,
        registry: &mut ObjectRegistry<B>,
    ) {
        match event {
            ControlEvent::RunChanged(run) => self.set_run(run),
            ControlEvent::JumpPressed => {
                self.request_jump(registry);
            }
        }
    }

    fn target_state(&self, intent: &InputIntent) -> AnimationState {
        let moving = intent.any_direction();
        if self.jump_toggle {
            AnimationState::Jump
        } else if moving && self.run_toggle {
            AnimationState::Run
        } else if moving {
            AnimationState::Walk
        } else {
            AnimationState::Idle
        }
    }

    fn transition_to(&mut self, target: AnimationState) {
        let from = self.clip(self.current);
        let to = self.clip(target);
        let fade = self.settings.fade_duration;

        for clip in self.clips {
            if clip != from && clip != to && self.mixer.is_playing(clip) {
                self.mixer.stop(clip);
            }
        }
        self.mixer.fade_out(from, fade);
        self.mixer.reset(to);
        self.mixer.fade_in(to, fade);
        self.mixer.play(to);

        tracing::debug!(object = %self.object, from = %self.current, to = %target, "animation transition");
        self.current = target;
    }

    /// Advance the character by one frame and return the animation now playing.
    ///
    /// Call after the registry has stepped the world for this frame.
    pub fn update<B: PhysicsBackend>(
        &mut self,
        dt: f32,
        intent: &InputIntent,
        registry: &mut ObjectRegistry<B>,
        rig: &mut CameraRig,
    ) -> AnimationState {
        let _span = tracing::info_span!("character_update", object = %self.object).entered();

        if self.jump_toggle {
            self.jump_remaining -= dt.max(0.0);
            if self.jump_remaining <= 0.0 {
                self.jump_toggle = false;
                self.jump_remaining = 0.0;
                tracing::debug!(object = %self.object, "jump finished");
            }
        }

        let target = self.target_state(intent);
        if target != self.current {
            self.transition_to(target);
        }
        self.mixer.update(dt);

        let body = match registry.body_transform(self.object) {
            Ok(pose) => pose.position,
            Err(err) => {
                tracing::warn!(object = %self.object, %err, "character has no body, skipping");
                return self.current;
            }
        };
        let moved = body - self.last_body_position.unwrap_or(body);
        self.last_body_position = Some(body);

        if intent.any_direction() {
            let offset = direction_offset(intent);
            let yaw = camera_yaw(rig.camera.position, body);
            let goal = facing(yaw + offset);
            if let Some(visual) = registry.visual_mut(self.object) {
                let rotation = &mut visual.transform.rotation;
                *rotation = rotate_towards(*rotation, goal, self.settings.max_turn_step);
            }

            let direction = walk_direction(rig.camera.world_direction(), offset);
            let speed = if self.run_toggle {
                self.settings.run_velocity
            } else {
                self.settings.walk_velocity
            };
            let step = direction * speed * dt;
            if let Err(err) = registry.apply_horizontal_move(self.object, step.x, step.z) {
                tracing::warn!(object = %self.object, %err, "movement ignored");
            }

            let after = registry
                .body_transform(self.object)
                .map_or(body, |pose| pose.position);
            rig.translate(Vec3::new(moved.x, 0.0, moved.z));
            rig.set_target(after);
        } else if self.jump_toggle {
            rig.set_target(body);
        }

        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playground_assets::{AnimationClip, ProceduralCharacter};
    use playground_input::MovementKey;
    use playground_kernel::ObjectSpec;
    use playground_physics::{RigidWorld, SimpleWorld};
    use playground_scene::{Material, PerspectiveCamera, Scene};

    const DT: f32 = 1.0 / 60.0;

    fn gravity() -> Vec3 {
        Vec3::new(0.0, -15.82, 0.0)
    }

    struct Fixture<B: PhysicsBackend> {
        registry: ObjectRegistry<B>,
        rig: CameraRig,
        controller: CharacterController,
    }

    fn fixture<B: PhysicsBackend>(physics: B) -> Fixture<B> {
        let mut registry = ObjectRegistry::new(Scene::new(), physics);
        registry
            .add(
                ObjectSpec::new(
                    "ground",
                    ObjectOptions::at(Vec3::ZERO).with_size(Vec3::new(400.0, 2.0, 400.0)),
                ),
                |o| VisualObject::cuboid("ground", o.size_or_unit(), Material::default()),
                |o, _| BodyDescriptor::from_options(o),
            )
            .unwrap();
        let asset = ProceduralCharacter::build();
        let model = asset.model.clone();
        registry
            .add(
                ObjectSpec::new(
                    "hero",
                    ObjectOptions::at(Vec3::new(0.0, 1.5, 0.0))
                        .with_size(Vec3::ONE)
                        .with_mass(1.0),
                )
                .without_rotation_sync(),
                move |o| model.at(o.position),
                character_body,
            )
            .unwrap();
        let controller =
            CharacterController::for_object(&registry, "hero", &asset, CharacterSettings::default())
                .unwrap();
        let rig = CameraRig::new(PerspectiveCamera::default().at(Vec3::new(0.0, 3.5, 5.0)));
        Fixture {
            registry,
            rig,
            controller,
        }
    }

    fn simple() -> Fixture<SimpleWorld> {
        fixture(SimpleWorld::new(gravity()))
    }

    fn rigid() -> Fixture<RigidWorld> {
        fixture(RigidWorld::new(gravity()))
    }

    impl<B: PhysicsBackend> Fixture<B> {
        fn frame(&mut self, intent: &InputIntent) -> AnimationState {
            self.registry.update(DT);
            self.controller
                .update(DT, intent, &mut self.registry, &mut self.rig)
        }

        fn hero_position(&self) -> Vec3 {
            self.registry
                .body_transform(self.controller.object())
                .unwrap()
                .position
        }
    }

    fn weights_settled(controller: &CharacterController, state: AnimationState) -> bool {
        let mixer = controller.mixer();
        AnimationState::ALL.iter().all(|&s| {
            let w = mixer.weight(controller.clip(s));
            if s == state { w == 1.0 } else { w == 0.0 }
        })
    }

    #[test]
    fn starts_idle_at_full_weight() {
        let f = simple();
        assert_eq!(f.controller.current_animation(), AnimationState::Idle);
        assert!(weights_settled(&f.controller, AnimationState::Idle));
    }

    #[test]
    fn missing_clip_is_rejected() {
        let mut asset = ProceduralCharacter::build();
        asset.clips.retain(|c| c.name != "Run");
        let err = CharacterController::new(ObjectId(0), &asset, CharacterSettings::default())
            .unwrap_err();
        assert!(matches!(err, ControllerError::Asset(AssetError::MissingClip(n)) if n == "Run"));
    }

    #[test]
    fn unknown_object_name_is_rejected() {
        let f = simple();
        let asset = ProceduralCharacter::build();
        assert!(matches!(
            CharacterController::for_object(
                &f.registry,
                "ghost",
                &asset,
                CharacterSettings::default()
            ),
            Err(ControllerError::UnknownObject(_))
        ));
    }

    fn idle_walk_idle<B: PhysicsBackend>(mut f: Fixture<B>, min_travel: f32) {
        let forward = InputIntent::from_keys(&[MovementKey::Forward]);
        let start = f.hero_position();

        assert_eq!(f.frame(&forward), AnimationState::Walk);
        let walk = f.controller.clip(AnimationState::Walk);
        let idle = f.controller.clip(AnimationState::Idle);
        assert!(f.controller.mixer().is_fading(walk));
        assert!(f.controller.mixer().weight(idle) < 1.0);

        for _ in 0..29 {
            assert_eq!(f.frame(&forward), AnimationState::Walk);
        }
        assert!(weights_settled(&f.controller, AnimationState::Walk));
        let moved = f.hero_position() - start;
        assert!(
            moved.z < -min_travel,
            "hero should walk away from the camera, moved {moved}"
        );
        assert!(moved.x.abs() < 1e-3);

        assert_eq!(f.frame(&InputIntent::default()), AnimationState::Idle);
        for _ in 0..20 {
            f.frame(&InputIntent::default());
        }
        assert!(weights_settled(&f.controller, AnimationState::Idle));
    }

    #[test]
    fn idle_walk_idle_cross_fades() {
        idle_walk_idle(simple(), 0.5);
        // Velocity deltas build up speed over the walk instead of moving at once.
        idle_walk_idle(rigid(), 0.15);
    }

    fn jump_overrides_run<B: PhysicsBackend>(mut f: Fixture<B>) {
        let forward = InputIntent::from_keys(&[MovementKey::Forward]);
        f.controller
            .handle_event(ControlEvent::RunChanged(true), &mut f.registry);
        assert_eq!(f.frame(&forward), AnimationState::Run);

        f.controller
            .handle_event(ControlEvent::JumpPressed, &mut f.registry);
        assert!(f.controller.is_jumping());
        assert!(!f.controller.request_jump(&mut f.registry));
        assert_eq!(f.frame(&forward), AnimationState::Jump);

        let mut frames = 1;
        while f.controller.is_jumping() {
            let state = f.frame(&forward);
            let expected = if f.controller.is_jumping() {
                AnimationState::Jump
            } else {
                AnimationState::Run
            };
            assert_eq!(state, expected);
            frames += 1;
            assert!(frames < 120);
        }
        assert!((50..=56).contains(&frames), "jump lasted {frames} frames");
        assert_eq!(f.frame(&forward), AnimationState::Run);
    }

    #[test]
    fn jump_overrides_run_and_expires() {
        jump_overrides_run(simple());
        jump_overrides_run(rigid());
    }

    fn jump_lifts<B: PhysicsBackend>(mut f: Fixture<B>) {
        for _ in 0..5 {
            f.frame(&InputIntent::default());
        }
        let rest = f.hero_position().y;
        assert!(f.controller.request_jump(&mut f.registry));
        f.frame(&InputIntent::default());
        assert!(f.hero_position().y > rest);
    }

    #[test]
    fn jump_lifts_the_body() {
        jump_lifts(simple());
        jump_lifts(rigid());
    }

    #[test]
    fn at_most_one_transition_in_flight() {
        let mut f = simple();
        let forward = InputIntent::from_keys(&[MovementKey::Forward]);
        f.frame(&forward);
        f.controller.set_run(true);
        f.frame(&forward);
        let mixer = f.controller.mixer();
        let fading = AnimationState::ALL
            .iter()
            .filter(|&&s| mixer.is_fading(f.controller.clip(s)))
            .count();
        assert_eq!(fading, 2);
        assert!(!mixer.is_playing(f.controller.clip(AnimationState::Idle)));
    }

    #[test]
    fn turning_is_bounded_per_update() {
        let mut f = simple();
        let back = InputIntent::from_keys(&[MovementKey::Back]);
        let mut previous = f.registry.visual(f.controller.object()).unwrap().transform.rotation;
        for _ in 0..30 {
            f.frame(&back);
            let rotation = f.registry.visual(f.controller.object()).unwrap().transform.rotation;
            assert!(previous.angle_between(rotation) <= 0.2 + 1e-4);
            previous = rotation;
        }
    }

    fn camera_follows<B: PhysicsBackend>(mut f: Fixture<B>) {
        let left = InputIntent::from_keys(&[MovementKey::Left]);
        let camera_start = f.rig.camera.position;
        let body_start = f.hero_position();
        for _ in 0..60 {
            f.frame(&left);
        }
        let body_moved = f.hero_position() - body_start;
        let camera_moved = f.rig.camera.position - camera_start;
        assert!(body_moved.x < -0.5, "body moved {body_moved}");
        assert!((camera_moved.x - body_moved.x).abs() < 0.1);
        assert!((f.rig.target - f.hero_position()).length() < 0.05);
    }

    #[test]
    fn camera_follows_the_body() {
        camera_follows(simple());
        camera_follows(rigid());
    }

    #[test]
    fn rigid_body_character_keeps_its_footing() {
        let mut f = rigid();
        let forward = InputIntent::from_keys(&[MovementKey::Forward]);
        for _ in 0..120 {
            f.frame(&forward);
        }
        let pose = f.registry.body_transform(f.controller.object()).unwrap();
        assert!(pose.position.z < -2.0, "moved to {}", pose.position);
        assert!((pose.position.y - 1.5).abs() < 0.05);
        assert!(pose.orientation.angle_between(glam::Quat::IDENTITY) < 1e-4);
    }

    #[test]
    fn missing_body_is_a_no_op() {
        let mut f = simple();
        f.registry.teardown();
        let forward = InputIntent::from_keys(&[MovementKey::Forward]);
        let before = f.rig;
        assert_eq!(
            f.controller
                .update(DT, &forward, &mut f.registry, &mut f.rig),
            AnimationState::Walk
        );
        assert_eq!(f.rig, before);
        assert!(!f.controller.request_jump(&mut f.registry));
    }

    #[test]
    fn run_can_be_flipped() {
        let asset = playground_assets::CharacterAsset::new(
            VisualObject::sphere("ball", 0.5, Material::default()),
            ["Idle", "Walk", "Run", "Jump"]
                .into_iter()
                .map(|n| AnimationClip::new(n, 1.0))
                .collect(),
        )
        .unwrap();
        let mut c = CharacterController::new(ObjectId(0), &asset, CharacterSettings::default())
            .unwrap();
        c.toggle_run();
        assert!(c.is_running());
        c.toggle_run();
        assert!(!c.is_running());
    }
}
