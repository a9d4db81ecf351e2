//! Movement decisions for the hero and enemies.

use glam::Vec2;
use vigil_common::math::{angle_of, heading_vector, turn_toward};

use crate::enemy::Enemy;

/// Ranged enemies back off when closer than this share of their range.
pub const KITE_RETREAT_FRACTION: f32 = 0.7;

/// Finds the closest enemy, ignoring range.
pub fn nearest_enemy<'a, I>(origin: Vec2, enemies: I) -> Option<&'a Enemy>
where
    I: IntoIterator<Item = &'a Enemy>,
{
    enemies
        .into_iter()
        .filter(|e| e.is_alive())
        .fold(None, |best: Option<(&Enemy, f32)>, enemy| {
            let dist = origin.distance(enemy.position());
            match best {
                Some((_, best_dist)) if best_dist <= dist => best,
                _ => Some((enemy, dist)),
            }
        })
        .map(|(enemy, _)| enemy)
}

/// Normalized push away from enemies within `2 * avoid_radius`.
///
/// Each neighbour contributes a unit vector weighted by
/// `1 - dist / (2 * avoid_radius)`. Returns zero when nothing is close.
#[must_use]
pub fn repulsion<I>(origin: Vec2, avoid_radius: f32, neighbours: I) -> Vec2
where
    I: IntoIterator<Item = Vec2>,
{
    let reach = avoid_radius * 2.0;
    let sum = neighbours.into_iter().fold(Vec2::ZERO, |acc, pos| {
        let away = origin - pos;
        let dist = away.length();
        if dist > 0.0 && dist < reach {
            acc + away / dist * (1.0 - dist / reach)
        } else {
            acc
        }
    });
    sum.normalize_or_zero()
}

/// Direction the hero wants to face this tick.
///
/// Blends the direction toward `target` with the repulsion vector; the
/// closer the target, the more avoidance dominates.
#[must_use]
pub fn blended_heading(origin: Vec2, target: Vec2, avoid_radius: f32, push: Vec2) -> f32 {
    let reach = avoid_radius * 2.0;
    let desired = heading_vector(angle_of(target - origin));
    let avoidance_weight = if reach > 0.0 {
        (1.0 - origin.distance(target) / reach).max(0.0)
    } else {
        0.0
    };
    let target_weight = 1.0 - avoidance_weight;
    angle_of(desired * target_weight + push * avoidance_weight)
}

/// Turn-rate-limited heading update.
#[must_use]
pub fn steer(heading: f32, desired: f32, turn_rate: f32, dt: f32) -> f32 {
    turn_toward(heading, desired, turn_rate * dt)
}

/// Integrates one step along a heading.
#[must_use]
pub fn advance(position: Vec2, heading: f32, speed: f32, dt: f32) -> Vec2 {
    position + heading_vector(heading) * speed * dt
}

/// What an enemy does with its legs this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyIntent {
    /// Close the distance
    Approach,
    /// Back away from the hero
    Retreat,
    /// Stay put
    Hold,
}

/// Chooses an enemy's movement from its distance to the hero.
#[must_use]
pub fn enemy_intent(enemy: &Enemy, dist_to_hero: f32) -> EnemyIntent {
    match enemy.attack_range() {
        Some(range) if dist_to_hero > range => EnemyIntent::Approach,
        Some(range) if dist_to_hero < range * KITE_RETREAT_FRACTION => EnemyIntent::Retreat,
        Some(_) => EnemyIntent::Hold,
        None if dist_to_hero > enemy.melee_range() => EnemyIntent::Approach,
        None => EnemyIntent::Hold,
    }
}

/// Tentative position after one straight-line step.
#[must_use]
pub fn enemy_step(enemy: &Enemy, hero_position: Vec2, intent: EnemyIntent, dt: f32) -> Vec2 {
    let position = enemy.position();
    let toward = heading_vector(angle_of(hero_position - position));
    let step = toward * enemy.move_speed() * dt;
    match intent {
        EnemyIntent::Approach => position + step,
        EnemyIntent::Retreat => position - step,
        EnemyIntent::Hold => position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::EnemyKind;
    use std::f32::consts::PI;
    use vigil_common::EntityId;

    fn enemy_at(id: u64, kind: EnemyKind, x: f32, y: f32) -> Enemy {
        Enemy::spawn(EntityId::from_raw(id), kind, Vec2::new(x, y), 1, 0.0)
    }

    #[test]
    fn test_nearest_skips_dead() {
        let mut close = enemy_at(1, EnemyKind::Weak, 10.0, 0.0);
        close.take_damage(1_000.0);
        let enemies = [close, enemy_at(2, EnemyKind::Weak, 50.0, 0.0), enemy_at(3, EnemyKind::Weak, 900.0, 0.0)];
        let nearest = nearest_enemy(Vec2::ZERO, &enemies).map(Enemy::id);
        assert_eq!(nearest, Some(EntityId::from_raw(2)));
        assert!(nearest_enemy(Vec2::ZERO, &enemies[..1]).is_none());
    }

    #[test]
    fn test_repulsion_points_away() {
        let push = repulsion(Vec2::ZERO, 40.0, [Vec2::new(10.0, 0.0)]);
        assert!((push - Vec2::new(-1.0, 0.0)).length() < 1e-5);

        let none = repulsion(Vec2::ZERO, 40.0, [Vec2::new(80.0, 0.0), Vec2::ZERO]);
        assert_eq!(none, Vec2::ZERO);
    }

    #[test]
    fn test_far_target_ignores_avoidance() {
        let heading = blended_heading(Vec2::ZERO, Vec2::new(0.0, 500.0), 40.0, Vec2::new(-1.0, 0.0));
        assert!((heading - PI / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_close_target_blends_avoidance() {
        // Target at distance 40 of reach 80 gives equal weights.
        let heading = blended_heading(Vec2::ZERO, Vec2::new(0.0, 40.0), 40.0, Vec2::new(1.0, 0.0));
        assert!((heading - PI / 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_steer_is_rate_limited() {
        let heading = steer(0.0, PI, 3.0, 0.1);
        assert!((heading.abs() - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_melee_intent() {
        let enemy = enemy_at(1, EnemyKind::Weak, 0.0, 0.0);
        assert_eq!(enemy_intent(&enemy, 100.0), EnemyIntent::Approach);
        assert_eq!(enemy_intent(&enemy, 20.0), EnemyIntent::Hold);
    }

    #[test]
    fn test_ranged_kites() {
        let enemy = enemy_at(1, EnemyKind::Ranged, 0.0, 0.0);
        assert_eq!(enemy_intent(&enemy, 200.0), EnemyIntent::Approach);
        assert_eq!(enemy_intent(&enemy, 120.0), EnemyIntent::Hold);
        assert_eq!(enemy_intent(&enemy, 50.0), EnemyIntent::Retreat);

        let next = enemy_step(&enemy, Vec2::new(50.0, 0.0), EnemyIntent::Retreat, 0.1);
        assert!((next.x + 7.0).abs() < 1e-4);
    }
}
