use std::collections::BTreeMap;

use playground_common::{ObjectId, ObjectOptions};
use playground_physics::{
    BodyDescriptor, BodyHandle, BodyTransform, MotionModel, PhysicsBackend, PhysicsError,
    PhysicsWorld,
};
use playground_scene::{NodeId, Scene, VisualObject};

use crate::RegistryError;

/// What to register: a unique name, the shared descriptor, and whether the
/// body's orientation should be copied onto the visual.
#[derive(Debug, Clone)]
pub struct ObjectSpec {
    pub name: String,
    pub options: ObjectOptions,
    pub rotation_sync: bool,
}

impl ObjectSpec {
    pub fn new(name: impl Into<String>, options: ObjectOptions) -> Self {
        Self {
            name: name.into(),
            options,
            rotation_sync: true,
        }
    }

    /// Copy only position from the body; orientation stays with the caller.
    pub fn without_rotation_sync(mut self) -> Self {
        self.rotation_sync = false;
        self
    }
}

/// One visual/body pair.
#[derive(Debug, Clone)]
pub struct SceneObjectEntry {
    pub id: ObjectId,
    pub name: String,
    pub node: NodeId,
    pub body: BodyHandle,
    pub options: ObjectOptions,
    pub rotation_sync: bool,
}

/// Owns the scene and the physics world and keeps every registered visual
/// in step with its body.
pub struct ObjectRegistry<B: PhysicsBackend = PhysicsWorld> {
    scene: Scene,
    physics: B,
    entries: Vec<SceneObjectEntry>,
    names: BTreeMap<String, ObjectId>,
    torn_down: bool,
}

impl<B: PhysicsBackend> ObjectRegistry<B> {
    pub fn new(scene: Scene, physics: B) -> Self {
        Self {
            scene,
            physics,
            entries: Vec::new(),
            names: BTreeMap::new(),
            torn_down: false,
        }
    }

    /// Build and register a visual/body pair.
    ///
    /// On any failure the scene, the world and the registry are left as they were.
    pub fn add<V, P>(
        &mut self,
        spec: ObjectSpec,
        build_visual: V,
        build_body: P,
    ) -> Result<ObjectId, RegistryError>
    where
        V: FnOnce(&ObjectOptions) -> VisualObject,
        P: FnOnce(&ObjectOptions, &VisualObject) -> BodyDescriptor,
    {
        if self.torn_down {
            return Err(RegistryError::TornDown);
        }
        if self.names.contains_key(&spec.name) {
            return Err(RegistryError::DuplicateName(spec.name));
        }

        let visual = build_visual(&spec.options);
        let descriptor = build_body(&spec.options, &visual);
        let node = self.scene.attach(visual);

        let body = match self.insert_body(&descriptor) {
            Ok(body) => body,
            Err(err) => {
                self.scene.detach(node);
                tracing::warn!(name = %spec.name, %err, "object rejected by physics backend");
                return Err(err.into());
            }
        };

        let id = ObjectId(self.entries.len() as u32);
        tracing::debug!(%id, name = %spec.name, ?body, backend = self.physics.name(), "object added");
        self.names.insert(spec.name.clone(), id);
        self.entries.push(SceneObjectEntry {
            id,
            name: spec.name,
            node,
            body,
            options: spec.options,
            rotation_sync: spec.rotation_sync,
        });
        Ok(id)
    }

    fn insert_body(
        &mut self,
        descriptor: &BodyDescriptor,
    ) -> Result<BodyHandle, PhysicsError> {
        let body = self.physics.create_body(descriptor)?;
        if let Err(err) = self.physics.add_to_world(body) {
            self.physics.remove_from_world(body);
            return Err(err);
        }
        Ok(body)
    }

    pub fn get_object(&self, name: &str) -> Option<&SceneObjectEntry> {
        self.object_id(name).and_then(|id| self.entry(id))
    }

    pub fn object_id(&self, name: &str) -> Option<ObjectId> {
        self.names.get(name).copied()
    }

    pub fn entry(&self, id: ObjectId) -> Option<&SceneObjectEntry> {
        self.entries.get(id.index())
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &SceneObjectEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Step the world once by `dt`, then copy each body's pose onto its visual.
    ///
    /// Entries whose body cannot be read are skipped for this frame.
    pub fn update(&mut self, dt: f32) {
        if self.torn_down {
            return;
        }
        let _span = tracing::info_span!("registry_update", dt).entered();
        self.physics.step(dt);

        for entry in &self.entries {
            let pose = match self.physics.read_transform(entry.body) {
                Ok(pose) => pose,
                Err(err) => {
                    tracing::warn!(
                        id = %entry.id,
                        name = %entry.name,
                        %err,
                        "skipping object without readable body"
                    );
                    continue;
                }
            };
            let Some(visual) = self.scene.visual_mut(entry.node) else {
                tracing::warn!(id = %entry.id, name = %entry.name, "skipping object without visual");
                continue;
            };
            visual.transform.position = pose.position;
            if entry.rotation_sync {
                visual.transform.rotation = pose.orientation;
            }
        }
    }

    /// Detach every visual and remove every body. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        let mut released = 0;
        for entry in &self.entries {
            if self.scene.detach(entry.node) {
                released += 1;
            }
            self.physics.remove_from_world(entry.body);
        }
        self.torn_down = true;
        tracing::debug!(objects = self.entries.len(), released, "registry torn down");
    }

    fn live_entry(&self, id: ObjectId) -> Result<&SceneObjectEntry, RegistryError> {
        if self.torn_down {
            return Err(RegistryError::TornDown);
        }
        self.entry(id).ok_or(RegistryError::UnknownObject(id))
    }

    /// Pose of an object's body as of the last step.
    pub fn body_transform(&self, id: ObjectId) -> Result<BodyTransform, RegistryError> {
        let body = self.live_entry(id)?.body;
        self.physics
            .read_transform(body)
            .map_err(|err| RegistryError::MissingBody(id, err))
    }

    /// Move an object horizontally the way its backend expects: as a position
    /// increment or as an added velocity.
    pub fn apply_horizontal_move(
        &mut self,
        id: ObjectId,
        dx: f32,
        dz: f32,
    ) -> Result<(), RegistryError> {
        let body = self.live_entry(id)?.body;
        let result = match self.physics.motion_model() {
            MotionModel::PositionDelta => self.physics.apply_position_delta(body, dx, dz),
            MotionModel::VelocityDelta => self.physics.set_horizontal_velocity_delta(body, dx, dz),
        };
        result.map_err(|err| RegistryError::MissingBody(id, err))
    }

    pub fn apply_upward_impulse(
        &mut self,
        id: ObjectId,
        magnitude: f32,
    ) -> Result<(), RegistryError> {
        let body = self.live_entry(id)?.body;
        self.physics
            .apply_upward_impulse(body, magnitude)
            .map_err(|err| RegistryError::MissingBody(id, err))
    }

    /// Visual of a registered object, if it is still attached.
    pub fn visual(&self, id: ObjectId) -> Option<&VisualObject> {
        self.entry(id).and_then(|e| self.scene.visual(e.node))
    }

    pub fn visual_mut(&mut self, id: ObjectId) -> Option<&mut VisualObject> {
        let node = self.entry(id)?.node;
        self.scene.visual_mut(node)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn physics(&self) -> &B {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut B {
        &mut self.physics
    }
}

impl<B: PhysicsBackend> Drop for ObjectRegistry<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}
