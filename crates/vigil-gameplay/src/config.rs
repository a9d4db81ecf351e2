//! Simulation tuning.
//!
//! Every knob the simulation reads lives here so a host can override it from
//! a config file. Missing fields fall back to the shipped values.

use serde::{Deserialize, Serialize};

/// Upper bound applied to every tick delta, in seconds.
pub const DEFAULT_MAX_TICK_DELTA: f32 = 0.1;

/// Per-tick chance of an opportunistic snapshot.
pub const DEFAULT_AUTOSAVE_CHANCE: f64 = 0.01;

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed (None = seeded from entropy)
    pub seed: Option<u64>,
    /// Largest delta time a single tick will integrate
    pub max_tick_delta: f32,
    /// Chance per tick of writing a snapshot (0.0 disables)
    pub autosave_chance: f64,
    /// Hero base values
    pub hero: HeroTuning,
    /// Ability cooldowns, durations and multipliers
    pub abilities: AbilityTuning,
    /// Enemy spawn placement
    pub spawning: SpawnTuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_tick_delta: DEFAULT_MAX_TICK_DELTA,
            autosave_chance: DEFAULT_AUTOSAVE_CHANCE,
            hero: HeroTuning::default(),
            abilities: AbilityTuning::default(),
            spawning: SpawnTuning::default(),
        }
    }
}

impl SimConfig {
    /// Returns a copy with a fixed RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Returns the tick delta cap, kept within `(0, DEFAULT_MAX_TICK_DELTA]`.
    ///
    /// Zero, negative and non-finite values fall back to the default.
    #[must_use]
    pub fn tick_delta_cap(&self) -> f32 {
        if self.max_tick_delta.is_finite() && self.max_tick_delta > 0.0 {
            self.max_tick_delta.min(DEFAULT_MAX_TICK_DELTA)
        } else {
            DEFAULT_MAX_TICK_DELTA
        }
    }

    /// Returns a copy with autosave disabled.
    #[must_use]
    pub fn without_autosave(mut self) -> Self {
        self.autosave_chance = 0.0;
        self
    }
}

/// Hero base values before gear, levels and buffs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroTuning {
    /// Base maximum health
    pub max_hp: f32,
    /// Base armor
    pub armor: f32,
    /// Base attack damage
    pub attack_damage: f32,
    /// Base attacks per second
    pub attack_speed: f32,
    /// Base movement speed (units per second)
    pub move_speed: f32,
    /// Base body size (collision radius is half of this)
    pub size: f32,
    /// Reach of the auto-attack
    pub melee_range: f32,
    /// Base turn rate (radians per second)
    pub turn_rate: f32,
    /// Extra radius around the body used for enemy avoidance
    pub avoidance_padding: f32,
}

impl Default for HeroTuning {
    fn default() -> Self {
        Self {
            max_hp: 100.0,
            armor: 0.0,
            attack_damage: 10.0,
            attack_speed: 1.0,
            move_speed: 100.0,
            size: 20.0,
            melee_range: 120.0,
            turn_rate: 3.0,
            avoidance_padding: 30.0,
        }
    }
}

/// Ability tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityTuning {
    /// Charges each ability holds when full
    pub max_charges: u32,
    /// Seconds shaved off a regenerating charge by the hasten affordance
    pub hasten_seconds: f32,
    /// Charge regeneration time for the Charge ability
    pub charge_cooldown: f32,
    /// Charge regeneration time for the Enlarge ability
    pub enlarge_cooldown: f32,
    /// Charge regeneration time for the Whirlwind ability
    pub whirlwind_cooldown: f32,
    /// Lifetime of one Charge stack
    pub charge_duration: f32,
    /// Movement speed multiplier base, raised to the stack count
    pub charge_speed_base: f32,
    /// Length of the attack speed boost after the last Charge stack expires
    pub attack_speed_boost_duration: f32,
    /// Attack speed multiplier while boosted
    pub attack_speed_boost_multiplier: f32,
    /// Interval between trail markers while Charge is running
    pub trail_interval: f32,
    /// Lifetime of one Enlarge stack
    pub enlarge_duration: f32,
    /// Size multiplier base, raised to the stack count
    pub enlarge_size_base: f32,
    /// Turn rate factor per Enlarge stack
    pub enlarge_turn_factor: f32,
    /// Whirlwind reach
    pub whirlwind_radius: f32,
    /// Whirlwind damage as a multiple of hero attack damage
    pub whirlwind_damage_multiplier: f32,
}

impl Default for AbilityTuning {
    fn default() -> Self {
        Self {
            max_charges: 2,
            hasten_seconds: 1.0,
            charge_cooldown: 8.0,
            enlarge_cooldown: 15.0,
            whirlwind_cooldown: 12.0,
            charge_duration: 1.5,
            charge_speed_base: 2.0,
            attack_speed_boost_duration: 3.0,
            attack_speed_boost_multiplier: 3.0,
            trail_interval: 0.05,
            enlarge_duration: 5.0,
            enlarge_size_base: 1.5,
            enlarge_turn_factor: 2.5,
            whirlwind_radius: 150.0,
            whirlwind_damage_multiplier: 1.5,
        }
    }
}

/// Where new enemies appear relative to the hero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Inner radius of the spawn annulus
    pub min_radius: f32,
    /// Outer radius of the spawn annulus
    pub max_radius: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            min_radius: 300.0,
            max_radius: 500.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{"seed": 9, "hero": {"melee_range": 80.0}}"#)
                .expect("partial config should parse");
        assert_eq!(config.seed, Some(9));
        assert!((config.hero.melee_range - 80.0).abs() < f32::EPSILON);
        assert!((config.hero.move_speed - 100.0).abs() < f32::EPSILON);
        assert_eq!(config.abilities.max_charges, 2);
    }

    #[test]
    fn test_builders() {
        let config = SimConfig::default().with_seed(3).without_autosave();
        assert_eq!(config.seed, Some(3));
        assert!(config.autosave_chance <= 0.0);
    }
}
