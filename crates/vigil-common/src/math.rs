//! Planar math helpers shared by steering and combat.

use glam::Vec2;
use std::f32::consts::{PI, TAU};

/// Unit vector for a heading angle in radians.
#[must_use]
pub fn heading_vector(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of a vector in radians, in `(-PI, PI]`.
#[must_use]
pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Angle from one point toward another.
#[must_use]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    angle_of(to - from)
}

/// Wraps an angle difference into `[-PI, PI]`.
#[must_use]
pub fn normalize_angle(mut angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    angle %= TAU;
    if angle > PI {
        angle -= TAU;
    } else if angle < -PI {
        angle += TAU;
    }
    angle
}

/// Rotates `current` toward `target` by at most `max_step` radians.
#[must_use]
pub fn turn_toward(current: f32, target: f32, max_step: f32) -> f32 {
    let diff = normalize_angle(target - current);
    current + diff.clamp(-max_step, max_step)
}
