//! Simple-body backend: bodies with directly mutable position, velocity, mass
//! and shape, integrated with the caller's `dt`.
//!
//! Collision handling is minimal: shapes are treated as axis-aligned
//! (orientation is carried but not integrated), overlaps are pushed apart along
//! the axis of least penetration and the approaching velocity is cancelled.
//! Locomotion is applied as position deltas.

use glam::{Quat, Vec3};
use playground_common::PhysicsConfig;

use crate::{
    BodyDescriptor, BodyHandle, BodyShape, BodyTransform, MotionModel, PhysicsBackend,
    PhysicsError,
};

/// Passes over all contact pairs per step.
const SOLVER_ITERATIONS: usize = 4;
/// Coulomb friction of bodies that do not set their own.
const DEFAULT_FRICTION: f32 = 0.3;

/// A body of the simple backend. All fields are public and may be written directly.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub orientation: Quat,
    pub mass: f32,
    pub shape: BodyShape,
    pub friction: f32,
}

impl SimpleBody {
    fn from_descriptor(descriptor: &BodyDescriptor) -> Self {
        Self {
            position: descriptor.position,
            velocity: Vec3::ZERO,
            orientation: descriptor.orientation,
            mass: descriptor.mass,
            shape: descriptor.shape,
            friction: descriptor.friction.unwrap_or(DEFAULT_FRICTION),
        }
    }

    pub fn is_static(&self) -> bool {
        self.mass <= 0.0
    }

    fn inverse_mass(&self) -> f32 {
        if self.is_static() { 0.0 } else { 1.0 / self.mass }
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Created(SimpleBody),
    Simulated(SimpleBody),
    Removed,
}

/// World of the simple-body backend.
#[derive(Debug, Clone)]
pub struct SimpleWorld {
    gravity: Vec3,
    linear_damping: f32,
    slots: Vec<Slot>,
}

impl SimpleWorld {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity,
            linear_damping: PhysicsConfig::default().linear_damping,
            slots: Vec::new(),
        }
    }

    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self {
            gravity: config.gravity,
            linear_damping: config.linear_damping,
            slots: Vec::new(),
        }
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// A simulated body.
    pub fn body(&self, handle: BodyHandle) -> Option<&SimpleBody> {
        match self.slots.get(handle.index()) {
            Some(Slot::Simulated(body)) => Some(body),
            _ => None,
        }
    }

    /// Mutable access to a simulated body.
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut SimpleBody> {
        match self.slots.get_mut(handle.index()) {
            Some(Slot::Simulated(body)) => Some(body),
            _ => None,
        }
    }

    fn simulated_mut(&mut self, handle: BodyHandle) -> Result<&mut SimpleBody, PhysicsError> {
        match self.slots.get_mut(handle.index()) {
            Some(Slot::Simulated(body)) => Ok(body),
            Some(_) => Err(PhysicsError::BodyNotInWorld(handle)),
            None => Err(PhysicsError::UnknownBody(handle)),
        }
    }

    fn integrate(&mut self, dt: f32) {
        let damping = (1.0 - self.linear_damping).powf(dt);
        for slot in &mut self.slots {
            let Slot::Simulated(body) = slot else {
                continue;
            };
            if body.is_static() {
                continue;
            }
            body.velocity += self.gravity * dt;
            body.velocity *= damping;
            body.position += body.velocity * dt;
        }
    }

    fn resolve_contacts(&mut self) {
        let live: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| matches!(slot, Slot::Simulated(_)))
            .map(|(i, _)| i)
            .collect();

        for _ in 0..SOLVER_ITERATIONS {
            let mut any = false;
            for (n, &i) in live.iter().enumerate() {
                for &j in &live[n + 1..] {
                    any |= self.resolve_pair(i, j);
                }
            }
            if !any {
                break;
            }
        }
    }

    /// Separate bodies `i` and `j` if they overlap. Returns whether they did.
    fn resolve_pair(&mut self, i: usize, j: usize) -> bool {
        let (head, tail) = self.slots.split_at_mut(j);
        let (Slot::Simulated(a), Slot::Simulated(b)) = (&mut head[i], &mut tail[0]) else {
            return false;
        };
        let (wa, wb) = (a.inverse_mass(), b.inverse_mass());
        let total = wa + wb;
        if total == 0.0 {
            return false;
        }
        let Some((normal, depth)) = contact(a, b) else {
            return false;
        };

        a.position += normal * depth * (wa / total);
        b.position -= normal * depth * (wb / total);

        let relative = a.velocity - b.velocity;
        let approach = relative.dot(normal);
        if approach < 0.0 {
            let impulse = -approach / total;
            a.velocity += normal * impulse * wa;
            b.velocity -= normal * impulse * wb;

            let tangent = relative - normal * approach;
            let slide = tangent.length();
            if slide > f32::EPSILON {
                let mu = a.friction.min(b.friction);
                let friction = (slide / total).min(mu * impulse);
                let dir = tangent / slide;
                a.velocity -= dir * friction * wa;
                b.velocity += dir * friction * wb;
            }
        }
        true
    }
}

/// Contact normal (pointing from `b` towards `a`) and penetration depth.
fn contact(a: &SimpleBody, b: &SimpleBody) -> Option<(Vec3, f32)> {
    match (a.shape, b.shape) {
        (BodyShape::Cuboid { half_extents: ha }, BodyShape::Cuboid { half_extents: hb }) => {
            box_box(a.position, ha, b.position, hb)
        }
        (BodyShape::Ball { radius: ra }, BodyShape::Ball { radius: rb }) => {
            ball_ball(a.position, ra, b.position, rb)
        }
        (BodyShape::Ball { radius }, BodyShape::Cuboid { half_extents }) => {
            ball_box(a.position, radius, b.position, half_extents)
        }
        (BodyShape::Cuboid { half_extents }, BodyShape::Ball { radius }) => {
            ball_box(b.position, radius, a.position, half_extents).map(|(n, d)| (-n, d))
        }
    }
}

fn box_box(pa: Vec3, ha: Vec3, pb: Vec3, hb: Vec3) -> Option<(Vec3, f32)> {
    let delta = pa - pb;
    let overlap = (ha + hb) - delta.abs();
    if overlap.min_element() <= 0.0 {
        return None;
    }
    Some(least_axis(delta, overlap))
}

fn ball_ball(pa: Vec3, ra: f32, pb: Vec3, rb: f32) -> Option<(Vec3, f32)> {
    let delta = pa - pb;
    let distance = delta.length();
    let depth = ra + rb - distance;
    if depth <= 0.0 {
        return None;
    }
    let normal = if distance > f32::EPSILON {
        delta / distance
    } else {
        Vec3::Y
    };
    Some((normal, depth))
}

/// Normal points from the box towards the ball.
fn ball_box(center: Vec3, radius: f32, box_center: Vec3, half: Vec3) -> Option<(Vec3, f32)> {
    let closest = center.clamp(box_center - half, box_center + half);
    let delta = center - closest;
    let distance = delta.length();
    if distance > f32::EPSILON {
        if distance >= radius {
            return None;
        }
        return Some((delta / distance, radius - distance));
    }
    // Center inside the box: push out through the nearest face.
    let offset = center - box_center;
    let overlap = half + Vec3::splat(radius) - offset.abs();
    Some(least_axis(offset, overlap))
}

fn least_axis(delta: Vec3, overlap: Vec3) -> (Vec3, f32) {
    let axis = if overlap.x <= overlap.y && overlap.x <= overlap.z {
        0
    } else if overlap.y <= overlap.z {
        1
    } else {
        2
    };
    let sign = if delta[axis] < 0.0 { -1.0 } else { 1.0 };
    let mut normal = Vec3::ZERO;
    normal[axis] = sign;
    (normal, overlap[axis])
}

impl PhysicsBackend for SimpleWorld {
    fn name(&self) -> &str {
        "simple-body"
    }

    fn create_body(&mut self, descriptor: &BodyDescriptor) -> Result<BodyHandle, PhysicsError> {
        descriptor.validate()?;
        let handle = BodyHandle(self.slots.len() as u32);
        self.slots
            .push(Slot::Created(SimpleBody::from_descriptor(descriptor)));
        Ok(handle)
    }

    fn add_to_world(&mut self, body: BodyHandle) -> Result<(), PhysicsError> {
        let slot = self
            .slots
            .get_mut(body.index())
            .ok_or(PhysicsError::UnknownBody(body))?;
        match std::mem::replace(slot, Slot::Removed) {
            Slot::Created(b) => {
                *slot = Slot::Simulated(b);
                tracing::trace!(?body, "body added to simple world");
                Ok(())
            }
            Slot::Simulated(b) => {
                *slot = Slot::Simulated(b);
                Err(PhysicsError::AlreadyInWorld(body))
            }
            Slot::Removed => Err(PhysicsError::UnknownBody(body)),
        }
    }

    fn remove_from_world(&mut self, body: BodyHandle) -> bool {
        let Some(slot) = self.slots.get_mut(body.index()) else {
            return false;
        };
        if matches!(slot, Slot::Removed) {
            return false;
        }
        *slot = Slot::Removed;
        true
    }

    fn step(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.integrate(dt);
        self.resolve_contacts();
    }

    fn read_transform(&self, body: BodyHandle) -> Result<BodyTransform, PhysicsError> {
        match self.slots.get(body.index()) {
            Some(Slot::Simulated(b)) => Ok(BodyTransform {
                position: b.position,
                orientation: b.orientation,
            }),
            Some(_) => Err(PhysicsError::BodyNotInWorld(body)),
            None => Err(PhysicsError::UnknownBody(body)),
        }
    }

    fn motion_model(&self) -> MotionModel {
        MotionModel::PositionDelta
    }

    fn apply_position_delta(
        &mut self,
        body: BodyHandle,
        dx: f32,
        dz: f32,
    ) -> Result<(), PhysicsError> {
        let b = self.simulated_mut(body)?;
        b.position.x += dx;
        b.position.z += dz;
        Ok(())
    }

    fn set_horizontal_velocity_delta(
        &mut self,
        body: BodyHandle,
        dx: f32,
        dz: f32,
    ) -> Result<(), PhysicsError> {
        let b = self.simulated_mut(body)?;
        b.velocity.x += dx;
        b.velocity.z += dz;
        Ok(())
    }

    fn apply_upward_impulse(
        &mut self,
        body: BodyHandle,
        magnitude: f32,
    ) -> Result<(), PhysicsError> {
        let b = self.simulated_mut(body)?;
        b.velocity.y += magnitude * b.inverse_mass();
        Ok(())
    }

    fn body_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Simulated(_)))
            .count()
    }
}
