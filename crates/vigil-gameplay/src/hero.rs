//! The hero: position, health, progression, gear and buffs.
//!
//! Combat stats are never set directly. [`HeroStats`] is derived from base
//! tuning, gear, level and active buffs, and refreshed after every change to
//! any of them.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vigil_common::EntityId;

use crate::buffs::{ChargeBuff, ChargeTick, EnlargeBuff};
use crate::config::{AbilityTuning, HeroTuning, SimConfig};
use crate::economy::{purchase_upgrade, EconomyResult, Wallet};
use crate::entity::Health;
use crate::progression::{Experience, LevelGains};
use crate::stats::{GearSlot, Loadout};

/// Combat stats after gear, levels and buffs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeroStats {
    /// Maximum health
    pub max_hp: f32,
    /// Flat damage reduction
    pub armor: f32,
    /// Damage per hit
    pub attack_damage: f32,
    /// Attacks per second
    pub attack_speed: f32,
    /// Units per second
    pub move_speed: f32,
    /// Body size
    pub size: f32,
    /// Radians per second
    pub turn_rate: f32,
    /// Auto-attack reach
    pub melee_range: f32,
}

impl HeroStats {
    /// Derives stats from every input that can affect them.
    #[must_use]
    pub fn derive(
        base: &HeroTuning,
        abilities: &AbilityTuning,
        loadout: &Loadout,
        level: u32,
        charge: &ChargeBuff,
        enlarge: &EnlargeBuff,
    ) -> Self {
        let gear = loadout.total_stats();
        let gains = LevelGains::cumulative(level);
        Self {
            max_hp: base.max_hp + gear.max_hp + gains.max_hp,
            armor: base.armor + gear.armor,
            attack_damage: base.attack_damage + gear.attack_damage + gains.attack_damage,
            attack_speed: (base.attack_speed + gear.attack_speed) * charge.attack_speed_multiplier(abilities),
            move_speed: (base.move_speed + gear.move_speed) * charge.move_speed_multiplier(abilities),
            size: base.size * enlarge.size_multiplier(abilities),
            turn_rate: base.turn_rate * enlarge.turn_rate_multiplier(abilities),
            melee_range: base.melee_range,
        }
    }
}

/// The player-side entity.
#[derive(Debug, Clone)]
pub struct Hero {
    tuning: HeroTuning,
    abilities: AbilityTuning,
    position: Vec2,
    heading: f32,
    health: Health,
    experience: Experience,
    wallet: Wallet,
    loadout: Loadout,
    charge: ChargeBuff,
    enlarge: EnlargeBuff,
    attack_cooldown: f32,
    target: Option<EntityId>,
    stats: HeroStats,
}

impl Hero {
    /// Creates a level 1 hero at the origin with starter gear.
    #[must_use]
    pub fn new(config: &SimConfig) -> Self {
        let loadout = Loadout::default();
        let charge = ChargeBuff::default();
        let enlarge = EnlargeBuff::default();
        let stats = HeroStats::derive(&config.hero, &config.abilities, &loadout, 1, &charge, &enlarge);
        Self {
            tuning: config.hero.clone(),
            abilities: config.abilities.clone(),
            position: Vec2::ZERO,
            heading: 0.0,
            health: Health::new(stats.max_hp),
            experience: Experience::default(),
            wallet: Wallet::default(),
            loadout,
            charge,
            enlarge,
            attack_cooldown: 0.0,
            target: None,
            stats,
        }
    }

    /// Rebuilds a hero from saved progress at full health.
    #[must_use]
    pub fn restore(config: &SimConfig, position: Vec2, experience: Experience, gold: u64, loadout: Loadout) -> Self {
        let mut hero = Self::new(config);
        hero.position = position;
        hero.experience = experience;
        hero.wallet = Wallet::new(gold);
        hero.loadout = loadout;
        hero.refresh_stats();
        hero.health.refill();
        hero
    }

    fn refresh_stats(&mut self) {
        self.stats = HeroStats::derive(
            &self.tuning,
            &self.abilities,
            &self.loadout,
            self.experience.level(),
            &self.charge,
            &self.enlarge,
        );
        self.health.set_max(self.stats.max_hp);
    }

    /// Returns the derived stats.
    #[must_use]
    pub const fn stats(&self) -> &HeroStats {
        &self.stats
    }

    /// Returns the position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Moves the hero.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Returns the heading in radians.
    #[must_use]
    pub const fn heading(&self) -> f32 {
        self.heading
    }

    /// Sets the heading.
    pub fn set_heading(&mut self, heading: f32) {
        self.heading = heading;
    }

    /// Half the current size.
    #[must_use]
    pub fn collision_radius(&self) -> f32 {
        self.stats.size / 2.0
    }

    /// Collision radius plus the avoidance padding.
    #[must_use]
    pub fn avoidance_radius(&self) -> f32 {
        self.collision_radius() + self.tuning.avoidance_padding
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

    /// Returns true once health is gone.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health.is_depleted()
    }

    /// Applies an enemy hit through armor; returns the damage taken.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        self.health.take_hit(amount, self.stats.armor)
    }

    /// Restores full health.
    pub fn revive(&mut self) {
        self.health.refill();
    }

    /// Returns the level and banked experience.
    #[must_use]
    pub const fn experience(&self) -> &Experience {
        &self.experience
    }

    /// Returns the current level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.experience.level()
    }

    /// Banks experience; returns the number of levels gained.
    ///
    /// Any level gained refreshes stats and fully heals.
    pub fn add_xp(&mut self, amount: u64) -> u32 {
        let gained = self.experience.add(amount);
        if gained > 0 {
            self.on_level_up();
        }
        gained
    }

    /// Grants one level regardless of banked experience.
    pub fn force_level_up(&mut self) {
        self.experience.force_level_up();
        self.on_level_up();
    }

    /// Grants `count` levels at once, refreshing stats a single time.
    pub fn force_levels(&mut self, count: u32) {
        if count == 0 {
            return;
        }
        self.experience.force_levels(count);
        self.on_level_up();
    }

    fn on_level_up(&mut self) {
        self.refresh_stats();
        self.health.refill();
        debug!(level = self.level(), max_hp = self.stats.max_hp, "Hero levelled up");
    }

    /// Returns the gold purse.
    #[must_use]
    pub const fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    /// Returns the gold balance.
    #[must_use]
    pub const fn gold(&self) -> u64 {
        self.wallet.balance()
    }

    /// Credits gold.
    pub fn earn_gold(&mut self, amount: u64) {
        self.wallet.earn(amount);
    }

    /// Returns the equipped gear.
    #[must_use]
    pub const fn loadout(&self) -> &Loadout {
        &self.loadout
    }

    /// Buys one level for a gear slot; returns the gold spent.
    pub fn upgrade_gear(&mut self, slot: GearSlot) -> EconomyResult<u64> {
        let spent = purchase_upgrade(&mut self.wallet, &mut self.loadout, slot)?;
        self.refresh_stats();
        Ok(spent)
    }

    /// Returns the Charge buff.
    #[must_use]
    pub const fn charge(&self) -> &ChargeBuff {
        &self.charge
    }

    /// Returns the Enlarge buff.
    #[must_use]
    pub const fn enlarge(&self) -> &EnlargeBuff {
        &self.enlarge
    }

    /// Adds a Charge stack.
    pub fn apply_charge(&mut self) {
        self.charge.apply(&self.abilities);
        self.refresh_stats();
    }

    /// Adds an Enlarge stack.
    pub fn apply_enlarge(&mut self) {
        self.enlarge.apply(&self.abilities);
        self.refresh_stats();
    }

    /// Advances buff countdowns and the attack cooldown.
    pub fn tick_timers(&mut self, dt: f32) -> ChargeTick {
        let charge = self.charge.tick(dt, &self.abilities);
        self.enlarge.tick(dt, &self.abilities);
        if self.attack_cooldown > 0.0 {
            self.attack_cooldown -= dt;
        }
        self.refresh_stats();
        charge
    }

    /// Returns the current attack target.
    #[must_use]
    pub const fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Sets the attack target.
    pub fn set_target(&mut self, target: Option<EntityId>) {
        self.target = target;
    }

    /// Returns seconds until the next attack.
    #[must_use]
    pub const fn attack_cooldown(&self) -> f32 {
        self.attack_cooldown
    }

    /// Returns true when an attack is allowed.
    #[must_use]
    pub fn ready_to_attack(&self) -> bool {
        self.attack_cooldown <= 0.0
    }

    /// Restarts the attack cooldown at `1 / attack_speed`.
    pub fn reset_attack_cooldown(&mut self) {
        self.attack_cooldown = if self.stats.attack_speed > 0.0 {
            1.0 / self.stats.attack_speed
        } else {
            f32::INFINITY
        };
    }
}
