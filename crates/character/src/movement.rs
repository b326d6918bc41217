//! Camera-relative movement math.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use glam::{Quat, Vec3};
use playground_input::InputIntent;

/// Heading offset from the camera direction for the pressed keys.
///
/// Forward wins over back, and either wins over a pure sideways press, so
/// opposite keys resolve by that order rather than cancelling.
pub fn direction_offset(intent: &InputIntent) -> f32 {
    if intent.forward {
        if intent.left {
            FRAC_PI_4
        } else if intent.right {
            -FRAC_PI_4
        } else {
            0.0
        }
    } else if intent.back {
        if intent.left {
            FRAC_PI_4 + FRAC_PI_2
        } else if intent.right {
            -FRAC_PI_4 - FRAC_PI_2
        } else {
            PI
        }
    } else if intent.left {
        FRAC_PI_2
    } else if intent.right {
        -FRAC_PI_2
    } else {
        0.0
    }
}

/// Yaw of the camera around the body, measured from +Z towards +X.
pub fn camera_yaw(camera: Vec3, body: Vec3) -> f32 {
    (camera.x - body.x).atan2(camera.z - body.z)
}

/// Facing for a yaw about the up axis.
pub fn facing(yaw: f32) -> Quat {
    Quat::from_axis_angle(Vec3::Y, yaw)
}

/// Step `from` toward `to` by at most `max_step` radians. Snaps to `to`
/// once it is within reach.
pub fn rotate_towards(from: Quat, to: Quat, max_step: f32) -> Quat {
    let angle = from.angle_between(to);
    if angle <= max_step {
        return to;
    }
    from.slerp(to, max_step / angle)
}

/// Horizontal unit direction to walk in: the camera's forward flattened onto
/// the ground and turned by `offset` about the up axis.
pub fn walk_direction(camera_forward: Vec3, offset: f32) -> Vec3 {
    let flat = Vec3::new(camera_forward.x, 0.0, camera_forward.z).normalize_or_zero();
    Quat::from_rotation_y(offset) * flat
}
