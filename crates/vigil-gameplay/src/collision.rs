//! Overlap separation for circular bodies.
//!
//! One pass per tick. Every correction is computed from the positions as they
//! stood before the pass, so the result does not depend on iteration order.

use glam::Vec2;

/// Share of the penetration depth each body is pushed per contact.
pub const SEPARATION_SHARE: f32 = 0.5;

/// A circle taking part in separation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    /// Center
    pub position: Vec2,
    /// Collision radius
    pub radius: f32,
}

impl Body {
    /// Creates a body.
    #[must_use]
    pub const fn new(position: Vec2, radius: f32) -> Self {
        Self { position, radius }
    }
}

/// Push applied to `a` for its contact with `b`, if they overlap.
///
/// Coincident centers have no separating axis and are left alone.
#[must_use]
pub fn contact_push(a: Body, b: Body) -> Option<Vec2> {
    let offset = a.position - b.position;
    let dist = offset.length();
    let min_dist = a.radius + b.radius;
    if dist > 0.0 && dist < min_dist {
        Some(offset / dist * (min_dist - dist) * SEPARATION_SHARE)
    } else {
        None
    }
}

/// Resolves enemy-enemy and enemy-hero overlaps in place.
///
/// Enemy pairs are pushed apart symmetrically. The hero is treated as
/// immovable; only the enemy moves off it. Returns the number of contacts.
pub fn separate(hero: Body, bodies: &mut [Body]) -> usize {
    let before: Vec<Body> = bodies.to_vec();
    let mut pushes = vec![Vec2::ZERO; before.len()];
    let mut contacts = 0;

    for (i, body) in before.iter().enumerate() {
        if let Some(push) = contact_push(*body, hero) {
            pushes[i] += push;
            contacts += 1;
        }
        for (j, other) in before.iter().enumerate().skip(i + 1) {
            if let Some(push) = contact_push(*body, *other) {
                pushes[i] += push;
                pushes[j] -= push;
                contacts += 1;
            }
        }
    }

    for (body, push) in bodies.iter_mut().zip(pushes) {
        body.position += push;
    }
    contacts
}
