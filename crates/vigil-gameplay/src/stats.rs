//! Gear and the stat model.
//!
//! A gear item carries a fixed base stat block chosen by its slot. Each level
//! adds 20% of the base, linearly, so totals are a pure function of level.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Bonus fraction of base stats granted per gear level.
pub const GEAR_BONUS_PER_LEVEL: f32 = 0.2;

/// Cost of the first upgrade.
pub const UPGRADE_BASE_COST: f64 = 50.0;

/// Growth factor of the upgrade cost per level.
pub const UPGRADE_COST_GROWTH: f64 = 1.5;

/// Equipment slot on the hero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GearSlot {
    /// Attack damage and attack speed
    Weapon,
    /// Health and armor
    Armor,
    /// Movement speed
    Boots,
}

impl GearSlot {
    /// All slots in display order.
    pub const ALL: [GearSlot; 3] = [GearSlot::Weapon, GearSlot::Armor, GearSlot::Boots];

    /// Returns the lowercase slot name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::Boots => "boots",
        }
    }

    /// Returns the base stat block for items in this slot.
    #[must_use]
    pub const fn base_stats(self) -> StatBlock {
        match self {
            Self::Weapon => StatBlock {
                attack_damage: 10.0,
                attack_speed: 0.5,
                ..StatBlock::ZERO
            },
            Self::Armor => StatBlock {
                max_hp: 50.0,
                armor: 5.0,
                ..StatBlock::ZERO
            },
            Self::Boots => StatBlock {
                move_speed: 50.0,
                ..StatBlock::ZERO
            },
        }
    }
}

/// A bundle of additive combat stats.
///
/// Absent stats are zero, so arithmetic over blocks treats every key the same.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
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
}

impl StatBlock {
    /// All-zero block.
    pub const ZERO: Self = Self {
        max_hp: 0.0,
        armor: 0.0,
        attack_damage: 0.0,
        attack_speed: 0.0,
        move_speed: 0.0,
    };

    /// Multiplies every stat by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            max_hp: self.max_hp * factor,
            armor: self.armor * factor,
            attack_damage: self.attack_damage * factor,
            attack_speed: self.attack_speed * factor,
            move_speed: self.move_speed * factor,
        }
    }
}

impl Add for StatBlock {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            max_hp: self.max_hp + rhs.max_hp,
            armor: self.armor + rhs.armor,
            attack_damage: self.attack_damage + rhs.attack_damage,
            attack_speed: self.attack_speed + rhs.attack_speed,
            move_speed: self.move_speed + rhs.move_speed,
        }
    }
}

impl AddAssign for StatBlock {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// An upgradeable gear item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gear {
    slot: GearSlot,
    level: u32,
    base: StatBlock,
}

impl Gear {
    /// Creates a level 1 item for the slot.
    #[must_use]
    pub fn new(slot: GearSlot) -> Self {
        Self::with_level(slot, 1)
    }

    /// Creates an item at a given level (clamped to at least 1).
    #[must_use]
    pub fn with_level(slot: GearSlot, level: u32) -> Self {
        Self {
            slot,
            level: level.max(1),
            base: slot.base_stats(),
        }
    }

    /// Returns the slot this item occupies.
    #[must_use]
    pub const fn slot(&self) -> GearSlot {
        self.slot
    }

    /// Returns the current level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Returns the stats fixed at creation.
    #[must_use]
    pub const fn base_stats(&self) -> StatBlock {
        self.base
    }

    /// Returns the level-scaled bonus: `base * level * 0.2`.
    #[must_use]
    pub fn bonus_stats(&self) -> StatBlock {
        self.base.scaled(self.level as f32 * GEAR_BONUS_PER_LEVEL)
    }

    /// Returns `base + bonus`.
    #[must_use]
    pub fn total_stats(&self) -> StatBlock {
        self.base + self.bonus_stats()
    }

    /// Returns the gold needed to reach the next level.
    #[must_use]
    pub fn upgrade_cost(&self) -> u64 {
        upgrade_cost_for_level(self.level)
    }

    /// Raises the level by one.
    pub fn level_up(&mut self) {
        self.level = self.level.saturating_add(1);
    }
}

/// First gear level whose upgrade cost no longer fits in a `u64`.
pub const UPGRADE_COST_SATURATION_LEVEL: u32 = 101;

/// `floor(50 * 1.5^(level - 1))`.
///
/// Strictly increasing up to level 100. From
/// [`UPGRADE_COST_SATURATION_LEVEL`] on the cost saturates at `u64::MAX`.
#[must_use]
pub fn upgrade_cost_for_level(level: u32) -> u64 {
    let exponent = f64::from(level.max(1) - 1);
    (UPGRADE_BASE_COST * UPGRADE_COST_GROWTH.powf(exponent)).floor() as u64
}

/// The hero's three equipped items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loadout {
    /// Weapon slot
    pub weapon: Gear,
    /// Armor slot
    pub armor: Gear,
    /// Boots slot
    pub boots: Gear,
}

impl Default for Loadout {
    fn default() -> Self {
        Self {
            weapon: Gear::new(GearSlot::Weapon),
            armor: Gear::new(GearSlot::Armor),
            boots: Gear::new(GearSlot::Boots),
        }
    }
}

impl Loadout {
    /// Builds a loadout from per-slot levels.
    #[must_use]
    pub fn with_levels(weapon: u32, armor: u32, boots: u32) -> Self {
        Self {
            weapon: Gear::with_level(GearSlot::Weapon, weapon),
            armor: Gear::with_level(GearSlot::Armor, armor),
            boots: Gear::with_level(GearSlot::Boots, boots),
        }
    }

    /// Returns the item in a slot.
    #[must_use]
    pub const fn get(&self, slot: GearSlot) -> &Gear {
        match slot {
            GearSlot::Weapon => &self.weapon,
            GearSlot::Armor => &self.armor,
            GearSlot::Boots => &self.boots,
        }
    }

    /// Returns the item in a slot mutably.
    pub fn get_mut(&mut self, slot: GearSlot) -> &mut Gear {
        match slot {
            GearSlot::Weapon => &mut self.weapon,
            GearSlot::Armor => &mut self.armor,
            GearSlot::Boots => &mut self.boots,
        }
    }

    /// Sum of all items' total stats.
    #[must_use]
    pub fn total_stats(&self) -> StatBlock {
        GearSlot::ALL
            .iter()
            .fold(StatBlock::ZERO, |acc, &slot| acc + self.get(slot).total_stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1e-3 * a.abs().max(1.0)
    }

    #[test]
    fn test_level_one_weapon() {
        let weapon = Gear::new(GearSlot::Weapon);
        let total = weapon.total_stats();
        assert!(close(total.attack_damage, 12.0));
        assert!(close(total.attack_speed, 0.6));
        assert!(close(total.max_hp, 0.0));
    }

    #[test]
    fn test_upgrade_costs() {
        assert_eq!(upgrade_cost_for_level(1), 50);
        assert_eq!(upgrade_cost_for_level(2), 75);
        assert_eq!(upgrade_cost_for_level(3), 112);
        assert_eq!(upgrade_cost_for_level(4), 168);
    }

    #[test]
    fn test_with_level_clamps_to_one() {
        let gear = Gear::with_level(GearSlot::Boots, 0);
        assert_eq!(gear.level(), 1);
    }

    #[test]
    fn test_loadout_totals() {
        let loadout = Loadout::default();
        let total = loadout.total_stats();
        assert!(close(total.max_hp, 60.0));
        assert!(close(total.armor, 6.0));
        assert!(close(total.move_speed, 60.0));
    }

    proptest! {
        #[test]
        fn prop_total_is_base_plus_scaled_base(level in 1u32..200, slot_index in 0usize..3) {
            let gear = Gear::with_level(GearSlot::ALL[slot_index], level);
            let base = gear.base_stats();
            let total = gear.total_stats();
            let factor = level as f32 * GEAR_BONUS_PER_LEVEL;
            prop_assert!(close(total.max_hp, base.max_hp + base.max_hp * factor));
            prop_assert!(close(total.armor, base.armor + base.armor * factor));
            prop_assert!(close(total.attack_damage, base.attack_damage + base.attack_damage * factor));
            prop_assert!(close(total.attack_speed, base.attack_speed + base.attack_speed * factor));
            prop_assert!(close(total.move_speed, base.move_speed + base.move_speed * factor));
        }

        #[test]
        fn prop_upgrade_cost_strictly_increasing(level in 1u32..UPGRADE_COST_SATURATION_LEVEL - 1) {
            prop_assert!(upgrade_cost_for_level(level + 1) > upgrade_cost_for_level(level));
        }

        #[test]
        fn prop_upgrade_cost_saturates(level in UPGRADE_COST_SATURATION_LEVEL..u32::MAX) {
            prop_assert_eq!(upgrade_cost_for_level(level), u64::MAX);
        }
    }

    #[test]
    fn test_upgrade_cost_saturation_boundary() {
        let last = upgrade_cost_for_level(UPGRADE_COST_SATURATION_LEVEL - 1);
        assert!(last < u64::MAX);
        assert!(last > upgrade_cost_for_level(UPGRADE_COST_SATURATION_LEVEL - 2));
        assert_eq!(upgrade_cost_for_level(UPGRADE_COST_SATURATION_LEVEL), u64::MAX);
    }
}
