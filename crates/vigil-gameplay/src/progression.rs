//! Stage progression, difficulty scaling, spawning odds and rewards.
//!
//! All curves here are pure functions of stage and hero level:
//! - Enemy stats grow by 10% per stage (`1.1^(stage-1)`)
//! - Rewards grow with the same stage factor and 5% per hero level
//! - Kill quota grows by 2 every 10 stages
//! - Spawn interval shrinks with stage and hero level

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::enemy::EnemyKind;

/// Kills needed to clear stages 1-10.
pub const BASE_KILLS_PER_STAGE: u32 = 10;

/// Spawn interval before any reductions, in seconds.
pub const BASE_SPAWN_INTERVAL: f32 = 2.0;

/// Floor for the spawn interval, in seconds.
pub const MIN_SPAWN_INTERVAL: f32 = 0.3;

/// Experience needed to finish level 1.
pub const BASE_XP_REQUIRED: u64 = 100;

/// Extra experience needed per level after the first.
pub const XP_REQUIRED_PER_LEVEL: u64 = 50;

/// `1.1^(stage-1)`, the shared difficulty and reward factor.
#[must_use]
pub fn stage_multiplier(stage: u32) -> f64 {
    1.1f64.powf(f64::from(stage.max(1) - 1))
}

/// Multiplies in f64 and saturates at `f32::MAX`, so scaled stats stay finite.
#[must_use]
pub fn scale_stat(base: f32, factor: f64) -> f32 {
    if base == 0.0 {
        return 0.0;
    }
    (f64::from(base) * factor).min(f64::from(f32::MAX)) as f32
}

/// `1 + 0.05 * (level-1)`, the hero-level reward factor.
#[must_use]
pub fn level_multiplier(hero_level: u32) -> f64 {
    1.0 + f64::from(hero_level.max(1) - 1) * 0.05
}

/// `10 + 2 * floor((stage-1) / 10)`.
#[must_use]
pub const fn required_kills(stage: u32) -> u32 {
    let stage = if stage == 0 { 1 } else { stage };
    BASE_KILLS_PER_STAGE + 2 * ((stage - 1) / 10)
}

/// Spawn interval recomputed after every periodic spawn.
#[must_use]
pub fn periodic_spawn_interval(hero_level: u32, stage: u32) -> f32 {
    let level_reduction = hero_level as f32 * 0.1;
    let stage_reduction = (stage.max(1) - 1) as f32 * 0.05;
    (BASE_SPAWN_INTERVAL - level_reduction - stage_reduction).max(MIN_SPAWN_INTERVAL)
}

/// Spawn interval set when a stage is cleared.
///
/// Ignores hero level, unlike [`periodic_spawn_interval`].
#[must_use]
pub fn stage_advance_spawn_interval(stage: u32) -> f32 {
    let stage_reduction = (stage.max(1) - 1) as f32 * 0.05;
    (BASE_SPAWN_INTERVAL - stage_reduction).max(MIN_SPAWN_INTERVAL)
}

/// Multipliers applied to an enemy profile at spawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageScaling {
    /// Health multiplier
    pub hp: f32,
    /// Damage multiplier
    pub damage: f32,
    /// Armor multiplier
    pub armor: f32,
    /// Attack speed multiplier
    pub attack_speed: f32,
    /// Movement speed multiplier
    pub move_speed: f32,
}

impl StageScaling {
    /// Computes the multipliers for a stage.
    #[must_use]
    pub fn for_stage(stage: u32) -> Self {
        let stage = stage.max(1);
        let base = stage_multiplier(stage);
        Self {
            hp: scale_stat(1.2, base),
            damage: scale_stat(1.0, base),
            armor: scale_stat(0.8, base),
            attack_speed: 1.0,
            move_speed: 1.0 + (stage - 1) as f32 * 0.02,
        }
    }
}

/// Spawn odds for each enemy kind, in [`EnemyKind::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnWeights {
    weights: [f64; 3],
}

impl SpawnWeights {
    /// Returns the weight table for a stage.
    #[must_use]
    pub fn for_stage(stage: u32) -> Self {
        let weights = match stage {
            0..=3 => [1.0, 0.0, 0.0],
            4..=5 => [0.7, 0.3, 0.0],
            6..=7 => [0.5, 0.3, 0.2],
            _ => {
                let steps = f64::from(stage - 8);
                let strong = (0.2 + steps * 0.02).min(0.4);
                let ranged = (0.15 + steps * 0.015).min(0.3);
                [1.0 - strong - ranged, strong, ranged]
            },
        };
        Self { weights }
    }

    /// Returns the weight of one kind.
    #[must_use]
    pub fn weight(&self, kind: EnemyKind) -> f64 {
        EnemyKind::ALL
            .iter()
            .position(|&k| k == kind)
            .map_or(0.0, |i| self.weights[i])
    }

    /// Picks a kind with one uniform draw in `[0, 1)`.
    ///
    /// Walks the cumulative weights; falls back to the first kind if the draw
    /// lands past the total.
    #[must_use]
    pub fn pick(&self, roll: f64) -> EnemyKind {
        let mut cumulative = 0.0;
        for (kind, weight) in EnemyKind::ALL.iter().zip(self.weights) {
            cumulative += weight;
            if roll < cumulative {
                return *kind;
            }
        }
        EnemyKind::ALL[0]
    }
}

/// Random point on the spawn annulus around `center`.
#[must_use]
pub fn spawn_point(center: Vec2, rng: &mut fastrand::Rng, min_radius: f32, max_radius: f32) -> Vec2 {
    let angle = rng.f32() * TAU;
    let distance = min_radius + rng.f32() * (max_radius - min_radius).max(0.0);
    center + Vec2::new(angle.cos(), angle.sin()) * distance
}

/// Gold and experience granted for one kill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillReward {
    /// Gold granted
    pub gold: u64,
    /// Experience granted
    pub xp: u64,
}

impl KillReward {
    /// Computes the reward for killing `kind` at the given hero level and stage.
    #[must_use]
    pub fn for_kill(kind: EnemyKind, hero_level: u32, stage: u32) -> Self {
        let profile = kind.profile();
        let factor = level_multiplier(hero_level) * stage_multiplier(stage);
        Self {
            gold: (profile.base_gold as f64 * factor).floor() as u64,
            xp: (profile.base_xp as f64 * factor).floor() as u64,
        }
    }
}

/// Experience needed to finish `level`: `100 + 50 * (level-1)`.
#[must_use]
pub const fn xp_required(level: u32) -> u64 {
    let level = if level == 0 { 1 } else { level };
    BASE_XP_REQUIRED + XP_REQUIRED_PER_LEVEL * (level as u64 - 1)
}

/// Stat gains for reaching `level`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelGains {
    /// Maximum health gained
    pub max_hp: f32,
    /// Attack damage gained
    pub attack_damage: f32,
}

impl LevelGains {
    /// Gains for reaching `level`: `10 + floor(level/5)` hp and `2 + floor(level/10)` damage.
    #[must_use]
    pub fn at_level(level: u32) -> Self {
        Self {
            max_hp: (10 + level / 5) as f32,
            attack_damage: (2 + level / 10) as f32,
        }
    }

    /// Sum of gains for every level from 2 through `level`, in constant time.
    #[must_use]
    pub fn cumulative(level: u32) -> Self {
        if level < 2 {
            return Self::default();
        }
        let levels = u64::from(level - 1);
        Self {
            max_hp: (10 * levels + floor_sum(level, 5)) as f32,
            attack_damage: (2 * levels + floor_sum(level, 10)) as f32,
        }
    }
}

/// `floor(1/k) + floor(2/k) + ... + floor(n/k)`.
fn floor_sum(n: u32, k: u32) -> u64 {
    let (q, r) = (u64::from(n / k), u64::from(n % k));
    u64::from(k) * q * q.saturating_sub(1) / 2 + q * (r + 1)
}

/// Hero level and banked experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    level: u32,
    xp: u64,
}

impl Default for Experience {
    fn default() -> Self {
        Self { level: 1, xp: 0 }
    }
}

impl Experience {
    /// Creates a record at `level` (at least 1) with `xp` banked.
    #[must_use]
    pub fn new(level: u32, xp: u64) -> Self {
        Self {
            level: level.max(1),
            xp,
        }
    }

    /// Returns the current level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Returns the banked experience.
    #[must_use]
    pub const fn xp(&self) -> u64 {
        self.xp
    }

    /// Returns the requirement for the current level.
    #[must_use]
    pub const fn required(&self) -> u64 {
        xp_required(self.level)
    }

    /// Returns progress through the current level in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        (self.xp as f64 / self.required() as f64).min(1.0) as f32
    }

    /// Banks experience and returns how many levels were gained.
    ///
    /// Excess over each threshold carries into the next level.
    pub fn add(&mut self, amount: u64) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        let mut gained = 0;
        while self.xp >= self.required() {
            self.xp -= self.required();
            self.level += 1;
            gained += 1;
        }
        gained
    }

    /// Grants one level outright.
    ///
    /// Banked experience pays toward the threshold; anything short of it is
    /// forfeited rather than owed.
    pub fn force_level_up(&mut self) {
        self.xp = self.xp.saturating_sub(self.required());
        self.level = self.level.saturating_add(1);
    }

    /// Grants `count` levels outright, with the same banking as
    /// [`Self::force_level_up`].
    pub fn force_levels(&mut self, count: u32) {
        let mut remaining = count;
        while remaining > 0 && self.xp > 0 {
            self.force_level_up();
            remaining -= 1;
        }
        self.level = self.level.saturating_add(remaining);
    }
}

/// Progress through the current stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    level: u32,
    kills: u32,
    required: u32,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Stage {
    /// Creates a fresh stage at `level` (at least 1).
    #[must_use]
    pub fn new(level: u32) -> Self {
        let level = level.max(1);
        Self {
            level,
            kills: 0,
            required: required_kills(level),
        }
    }

    /// Restores saved progress; `required` of 0 falls back to the formula.
    #[must_use]
    pub fn restore(level: u32, kills: u32, required: u32) -> Self {
        let level = level.max(1);
        let required = if required == 0 { required_kills(level) } else { required };
        Self {
            level,
            kills,
            required,
        }
    }

    /// Returns the stage number.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Returns kills this stage.
    #[must_use]
    pub const fn kills(&self) -> u32 {
        self.kills
    }

    /// Returns the kills needed to advance.
    #[must_use]
    pub const fn required(&self) -> u32 {
        self.required
    }

    /// Counts a kill; returns true once the quota is met.
    pub fn record_kill(&mut self) -> bool {
        self.kills = self.kills.saturating_add(1);
        self.kills >= self.required
    }

    /// Moves to the next stage with a fresh counter.
    pub fn advance(&mut self) {
        *self = Self::new(self.level.saturating_add(1));
    }
}
