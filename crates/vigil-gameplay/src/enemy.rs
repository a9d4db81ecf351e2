//! Enemy types and per-enemy state.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use vigil_common::EntityId;

use crate::entity::Health;
use crate::progression::{scale_stat, StageScaling};

/// Enemy archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    /// Fragile melee chaser
    Weak,
    /// Armored melee bruiser
    Strong,
    /// Kites the hero and hits from range
    Ranged,
}

/// Static per-type configuration, before stage scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyProfile {
    /// Maximum health
    pub hp: f32,
    /// Flat damage reduction
    pub armor: f32,
    /// Damage per hit
    pub attack_damage: f32,
    /// Attacks per second
    pub attack_speed: f32,
    /// Units per second
    pub move_speed: f32,
    /// Body size (collision radius is half of this)
    pub size: f32,
    /// Melee reach (0 for ranged)
    pub melee_range: f32,
    /// Ranged reach, if this type shoots
    pub attack_range: Option<f32>,
    /// Gold dropped at stage 1, hero level 1
    pub base_gold: u64,
    /// Experience granted at stage 1, hero level 1
    pub base_xp: u64,
}

impl EnemyKind {
    /// All kinds in weight-table order.
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Weak, EnemyKind::Strong, EnemyKind::Ranged];

    /// Returns the static profile for this kind.
    #[must_use]
    pub const fn profile(self) -> EnemyProfile {
        match self {
            Self::Weak => EnemyProfile {
                hp: 30.0,
                armor: 0.0,
                attack_damage: 5.0,
                attack_speed: 0.8,
                move_speed: 60.0,
                size: 15.0,
                melee_range: 25.0,
                attack_range: None,
                base_gold: 5,
                base_xp: 10,
            },
            Self::Strong => EnemyProfile {
                hp: 100.0,
                armor: 2.0,
                attack_damage: 15.0,
                attack_speed: 0.6,
                move_speed: 50.0,
                size: 20.0,
                melee_range: 30.0,
                attack_range: None,
                base_gold: 15,
                base_xp: 30,
            },
            Self::Ranged => EnemyProfile {
                hp: 50.0,
                armor: 1.0,
                attack_damage: 10.0,
                attack_speed: 0.5,
                move_speed: 70.0,
                size: 18.0,
                melee_range: 0.0,
                attack_range: Some(150.0),
                base_gold: 10,
                base_xp: 20,
            },
        }
    }

    /// Returns the lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::Strong => "strong",
            Self::Ranged => "ranged",
        }
    }
}

/// A live enemy.
///
/// Combat stats are the profile multiplied by the stage scaling captured at
/// spawn; later stage changes never touch an existing enemy.
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    id: EntityId,
    kind: EnemyKind,
    position: Vec2,
    spawn_time: f64,
    scaling: StageScaling,
    health: Health,
    armor: f32,
    attack_damage: f32,
    attack_speed: f32,
    move_speed: f32,
    size: f32,
    melee_range: f32,
    attack_range: Option<f32>,
    attack_cooldown: f32,
}

impl Enemy {
    /// Creates an enemy of `kind` scaled for `stage`.
    #[must_use]
    pub fn spawn(id: EntityId, kind: EnemyKind, position: Vec2, stage: u32, spawn_time: f64) -> Self {
        let profile = kind.profile();
        let scaling = StageScaling::for_stage(stage);
        Self {
            id,
            kind,
            position,
            spawn_time,
            scaling,
            health: Health::new(scale_stat(profile.hp, f64::from(scaling.hp))),
            armor: scale_stat(profile.armor, f64::from(scaling.armor)),
            attack_damage: scale_stat(profile.attack_damage, f64::from(scaling.damage)),
            attack_speed: scale_stat(profile.attack_speed, f64::from(scaling.attack_speed)),
            move_speed: scale_stat(profile.move_speed, f64::from(scaling.move_speed)),
            size: profile.size,
            melee_range: profile.melee_range,
            attack_range: profile.attack_range,
            attack_cooldown: 0.0,
        }
    }

    /// Returns the entity ID.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the archetype.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Returns the current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Moves the enemy.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Returns the simulation time this enemy spawned at.
    #[must_use]
    pub const fn spawn_time(&self) -> f64 {
        self.spawn_time
    }

    /// Returns the stage multipliers frozen at spawn.
    #[must_use]
    pub const fn scaling(&self) -> &StageScaling {
        &self.scaling
    }

    /// Returns current health.
    #[must_use]
    pub const fn hp(&self) -> f32 {
        self.health.current()
    }

    /// Returns maximum health.
    #[must_use]
    pub const fn max_hp(&self) -> f32 {
        self.health.max()
    }

    /// Returns health as a fraction.
    #[must_use]
    pub fn hp_fraction(&self) -> f32 {
        self.health.fraction()
    }

    /// Returns armor.
    #[must_use]
    pub const fn armor(&self) -> f32 {
        self.armor
    }

    /// Returns damage per hit.
    #[must_use]
    pub const fn attack_damage(&self) -> f32 {
        self.attack_damage
    }

    /// Returns attacks per second.
    #[must_use]
    pub const fn attack_speed(&self) -> f32 {
        self.attack_speed
    }

    /// Returns movement speed.
    #[must_use]
    pub const fn move_speed(&self) -> f32 {
        self.move_speed
    }

    /// Returns body size.
    #[must_use]
    pub const fn size(&self) -> f32 {
        self.size
    }

    /// Returns the collision radius.
    #[must_use]
    pub fn collision_radius(&self) -> f32 {
        self.size / 2.0
    }

    /// Returns the melee reach.
    #[must_use]
    pub const fn melee_range(&self) -> f32 {
        self.melee_range
    }

    /// Returns the ranged reach, if any.
    #[must_use]
    pub const fn attack_range(&self) -> Option<f32> {
        self.attack_range
    }

    /// Returns true for kiting, ranged enemies.
    #[must_use]
    pub const fn is_ranged(&self) -> bool {
        self.attack_range.is_some()
    }

    /// Distance at which this enemy can hit the hero.
    #[must_use]
    pub fn reach(&self) -> f32 {
        self.attack_range.unwrap_or(self.melee_range)
    }

    /// Returns true while health remains.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.health.is_depleted()
    }

    /// Returns seconds until the next attack is allowed.
    #[must_use]
    pub const fn attack_cooldown(&self) -> f32 {
        self.attack_cooldown
    }

    /// Counts the attack cooldown down.
    pub fn tick_cooldown(&mut self, dt: f32) {
        if self.attack_cooldown > 0.0 {
            self.attack_cooldown -= dt;
        }
    }

    /// Returns true when the cooldown allows an attack.
    #[must_use]
    pub fn ready_to_attack(&self) -> bool {
        self.attack_cooldown <= 0.0
    }

    /// Restarts the attack cooldown at `1 / attack_speed`.
    pub fn reset_cooldown(&mut self) {
        self.attack_cooldown = if self.attack_speed > 0.0 {
            1.0 / self.attack_speed
        } else {
            f32::INFINITY
        };
    }

    /// Applies raw damage through armor and returns the damage dealt.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        self.health.take_hit(amount, self.armor)
    }
}
