//! Combat resolution: damage formula, target selection and area damage.

use std::cmp::Ordering;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use vigil_common::EntityId;

use crate::enemy::Enemy;
use crate::entity::EnemyArena;

/// Distances closer than this count as a tie.
pub const DISTANCE_TOLERANCE: f32 = 0.1;

/// Health values closer than this count as a tie.
pub const HP_TOLERANCE: f32 = 0.1;

/// Smallest damage any hit can deal.
pub const MIN_DAMAGE: f32 = 1.0;

/// `max(1, amount - armor)`.
#[must_use]
pub fn mitigated_damage(amount: f32, armor: f32) -> f32 {
    (amount - armor).max(MIN_DAMAGE)
}

/// Damage landed on an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageEvent {
    /// Enemy hit
    pub target: EntityId,
    /// Damage after armor
    pub amount: f32,
    /// Enemy position at the time
    pub position: Vec2,
}

/// Priority order for hero attack targets: nearer, then weaker, then older.
///
/// Distance and health compare with a tolerance, so this is not a total
/// order; callers scan linearly rather than sort.
#[must_use]
pub fn target_priority(origin: Vec2, a: &Enemy, b: &Enemy) -> Ordering {
    let da = origin.distance(a.position());
    let db = origin.distance(b.position());
    if (da - db).abs() > DISTANCE_TOLERANCE {
        return da.total_cmp(&db);
    }
    if (a.hp() - b.hp()).abs() > HP_TOLERANCE {
        return a.hp().total_cmp(&b.hp());
    }
    a.spawn_time()
        .total_cmp(&b.spawn_time())
        .then_with(|| a.id().cmp(&b.id()))
}

/// Picks the hero's attack target among living enemies within `range`.
pub fn select_attack_target<'a, I>(origin: Vec2, range: f32, enemies: I) -> Option<&'a Enemy>
where
    I: IntoIterator<Item = &'a Enemy>,
{
    enemies
        .into_iter()
        .filter(|e| e.is_alive() && origin.distance(e.position()) <= range)
        .fold(None, |best, candidate| match best {
            Some(current) if target_priority(origin, candidate, current) != Ordering::Less => Some(current),
            _ => Some(candidate),
        })
}

/// Hits one enemy; returns the damage event.
pub fn strike(enemy: &mut Enemy, raw_damage: f32) -> DamageEvent {
    let amount = enemy.take_damage(raw_damage);
    DamageEvent {
        target: enemy.id(),
        amount,
        position: enemy.position(),
    }
}

/// Lets an enemy attack if the hero is within reach and its cooldown is up.
///
/// Returns the raw damage to apply to the hero and restarts the cooldown.
/// Ranged enemies hit instantly; there is no projectile flight.
pub fn enemy_attack(enemy: &mut Enemy, dist_to_hero: f32) -> Option<f32> {
    if !enemy.is_alive() || dist_to_hero > enemy.reach() || !enemy.ready_to_attack() {
        return None;
    }
    enemy.reset_cooldown();
    Some(enemy.attack_damage())
}

/// Damages every living enemy within `radius` of `center` once.
pub fn whirlwind(center: Vec2, radius: f32, raw_damage: f32, enemies: &mut EnemyArena) -> Vec<DamageEvent> {
    enemies
        .iter_mut()
        .filter(|e| e.is_alive() && center.distance(e.position()) <= radius)
        .map(|e| strike(e, raw_damage))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::EnemyKind;

    fn enemy(id: u64, pos: Vec2, spawn_time: f64) -> Enemy {
        Enemy::spawn(EntityId::from_raw(id), EnemyKind::Weak, pos, 1, spawn_time)
    }

    fn with_hp(mut e: Enemy, hp: f32) -> Enemy {
        let dealt = e.max_hp() - hp;
        e.take_damage(dealt);
        e
    }

    #[test]
    fn test_damage_floor() {
        assert!((mitigated_damage(10.0, 3.0) - 7.0).abs() < f32::EPSILON);
        assert!((mitigated_damage(2.0, 30.0) - 1.0).abs() < f32::EPSILON);
        assert!((mitigated_damage(-5.0, 0.0) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_nearest_in_range_wins() {
        let enemies = [enemy(1, Vec2::new(100.0, 0.0), 0.0), enemy(2, Vec2::new(50.0, 0.0), 1.0)];
        let target = select_attack_target(Vec2::ZERO, 120.0, &enemies).map(Enemy::id);
        assert_eq!(target, Some(EntityId::from_raw(2)));
    }

    #[test]
    fn test_out_of_range_ignored() {
        let enemies = [enemy(1, Vec2::new(200.0, 0.0), 0.0)];
        assert!(select_attack_target(Vec2::ZERO, 120.0, &enemies).is_none());
    }

    #[test]
    fn test_hp_breaks_distance_tie_before_age() {
        let older = with_hp(enemy(1, Vec2::new(50.0, 0.0), 1.0), 10.0);
        let newer = with_hp(enemy(2, Vec2::new(0.0, 50.05), 2.0), 5.0);
        let enemies = [older, newer];
        let target = select_attack_target(Vec2::ZERO, 120.0, &enemies).map(Enemy::id);
        assert_eq!(target, Some(EntityId::from_raw(2)));
    }

    #[test]
    fn test_age_breaks_full_tie() {
        let enemies = [
            enemy(3, Vec2::new(0.0, 60.0), 5.0),
            enemy(4, Vec2::new(60.0, 0.0), 2.0),
            enemy(5, Vec2::new(-60.0, 0.0), 2.0),
        ];
        let target = select_attack_target(Vec2::ZERO, 120.0, &enemies).map(Enemy::id);
        assert_eq!(target, Some(EntityId::from_raw(4)));
    }

    #[test]
    fn test_enemy_attack_cooldown_gate() {
        let mut e = enemy(1, Vec2::ZERO, 0.0);
        assert_eq!(enemy_attack(&mut e, 10.0), Some(5.0));
        assert_eq!(enemy_attack(&mut e, 10.0), None);
        e.tick_cooldown(2.0);
        assert_eq!(enemy_attack(&mut e, 40.0), None);
        assert_eq!(enemy_attack(&mut e, 25.0), Some(5.0));
    }

    #[test]
    fn test_whirlwind_hits_each_enemy_in_radius_once() {
        let mut arena = EnemyArena::new();
        for (id, x) in [(1, 100.0), (2, 149.0), (3, 151.0)] {
            arena.insert(enemy(id, Vec2::new(x, 0.0), 0.0)).expect("insert");
        }
        let hits = whirlwind(Vec2::ZERO, 150.0, 15.0, &mut arena);
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| (h.amount - 15.0).abs() < 1e-5));
        let untouched = arena.get(EntityId::from_raw(3)).expect("exists");
        assert!((untouched.hp() - untouched.max_hp()).abs() < f32::EPSILON);
    }
}
