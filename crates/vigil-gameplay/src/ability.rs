//! Charge-based abilities.
//!
//! Each ability holds up to `max_charges` casts. Spent charges come back one
//! at a time through a single regeneration countdown.

use serde::{Deserialize, Serialize};

use crate::combat::{whirlwind, DamageEvent};
use crate::config::AbilityTuning;
use crate::entity::EnemyArena;
use crate::hero::Hero;

/// The three hero abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbilityKind {
    /// Stacking movement burst, then an attack speed boost
    Charge,
    /// Stacking size and turn rate increase
    Enlarge,
    /// Instant area damage around the hero
    Whirlwind,
}

impl AbilityKind {
    /// All abilities in slot order.
    pub const ALL: [AbilityKind; 3] = [AbilityKind::Charge, AbilityKind::Enlarge, AbilityKind::Whirlwind];

    /// Returns the display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Charge => "Charge",
            Self::Enlarge => "Enlarge",
            Self::Whirlwind => "Whirlwind",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Charge => 0,
            Self::Enlarge => 1,
            Self::Whirlwind => 2,
        }
    }

    /// Returns the regeneration time configured for this ability.
    #[must_use]
    pub fn cooldown(self, tuning: &AbilityTuning) -> f32 {
        match self {
            Self::Charge => tuning.charge_cooldown,
            Self::Enlarge => tuning.enlarge_cooldown,
            Self::Whirlwind => tuning.whirlwind_cooldown,
        }
    }

    /// Runs the ability's effect.
    ///
    /// Buff abilities return no hits; Whirlwind returns one entry per enemy
    /// struck.
    pub fn apply(self, hero: &mut Hero, enemies: &mut EnemyArena, tuning: &AbilityTuning) -> Vec<DamageEvent> {
        match self {
            Self::Charge => {
                hero.apply_charge();
                Vec::new()
            },
            Self::Enlarge => {
                hero.apply_enlarge();
                Vec::new()
            },
            Self::Whirlwind => {
                let damage = hero.stats().attack_damage * tuning.whirlwind_damage_multiplier;
                whirlwind(hero.position(), tuning.whirlwind_radius, damage, enemies)
            },
        }
    }
}

/// Charge pool and regeneration countdown for one ability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    kind: AbilityKind,
    cooldown: f32,
    max_charges: u32,
    charges: u32,
    timer: f32,
}

impl Ability {
    /// Creates an ability with a full charge pool.
    #[must_use]
    pub fn new(kind: AbilityKind, cooldown: f32, max_charges: u32) -> Self {
        Self {
            kind,
            cooldown: cooldown.max(0.0),
            max_charges,
            charges: max_charges,
            timer: 0.0,
        }
    }

    /// Returns which ability this is.
    #[must_use]
    pub const fn kind(&self) -> AbilityKind {
        self.kind
    }

    /// Returns charges ready to cast.
    #[must_use]
    pub const fn charges(&self) -> u32 {
        self.charges
    }

    /// Returns the pool size.
    #[must_use]
    pub const fn max_charges(&self) -> u32 {
        self.max_charges
    }

    /// Returns the full regeneration time.
    #[must_use]
    pub const fn cooldown(&self) -> f32 {
        self.cooldown
    }

    /// Returns the time left until the next charge.
    #[must_use]
    pub const fn timer(&self) -> f32 {
        self.timer
    }

    /// Returns true while a charge is regenerating.
    #[must_use]
    pub fn is_regenerating(&self) -> bool {
        self.charges < self.max_charges && self.timer > 0.0
    }

    /// Remaining regeneration as a fraction of the full cooldown.
    #[must_use]
    pub fn cooldown_fraction(&self) -> f32 {
        if self.is_regenerating() && self.cooldown > 0.0 {
            (self.timer / self.cooldown).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Whole seconds left, shown only when no charge is ready.
    #[must_use]
    pub fn display_seconds(&self) -> Option<u32> {
        (self.charges == 0 && self.timer > 0.0).then(|| self.timer.ceil() as u32)
    }

    /// Spends a charge. Returns false, changing nothing, when empty.
    pub fn try_cast(&mut self) -> bool {
        if self.charges == 0 {
            return false;
        }
        self.charges -= 1;
        if self.charges < self.max_charges && self.timer <= 0.0 {
            self.timer = self.cooldown;
        }
        true
    }

    /// Counts regeneration down; returns true when a charge came back.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.charges >= self.max_charges {
            return false;
        }
        self.timer -= dt;
        self.finish_if_elapsed()
    }

    /// Shaves `seconds` off a running regeneration.
    ///
    /// Returns true when this completes a charge. Does nothing if no charge
    /// is regenerating.
    pub fn hasten(&mut self, seconds: f32) -> bool {
        if !self.is_regenerating() {
            return false;
        }
        self.timer = (self.timer - seconds).max(0.0);
        self.finish_if_elapsed()
    }

    fn finish_if_elapsed(&mut self) -> bool {
        if self.timer > 0.0 {
            return false;
        }
        self.charges += 1;
        self.timer = if self.charges < self.max_charges {
            self.cooldown
        } else {
            0.0
        };
        true
    }
}

/// The hero's abilities, indexed by [`AbilityKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilitySet {
    slots: [Ability; 3],
}

impl AbilitySet {
    /// Creates a full set from tuning.
    #[must_use]
    pub fn new(tuning: &AbilityTuning) -> Self {
        let make = |kind: AbilityKind| Ability::new(kind, kind.cooldown(tuning), tuning.max_charges);
        Self {
            slots: AbilityKind::ALL.map(make),
        }
    }

    /// Returns one ability.
    #[must_use]
    pub fn get(&self, kind: AbilityKind) -> &Ability {
        &self.slots[kind.index()]
    }

    /// Returns one ability mutably.
    pub fn get_mut(&mut self, kind: AbilityKind) -> &mut Ability {
        &mut self.slots[kind.index()]
    }

    /// Iterates abilities in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Ability> {
        self.slots.iter()
    }

    /// Advances every regeneration countdown.
    pub fn tick(&mut self, dt: f32) {
        for ability in &mut self.slots {
            ability.tick(dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drained(cooldown: f32) -> Ability {
        let mut ability = Ability::new(AbilityKind::Charge, cooldown, 2);
        assert!(ability.try_cast());
        assert!(ability.try_cast());
        ability
    }

    #[test]
    fn test_cast_spends_one_charge() {
        let mut ability = Ability::new(AbilityKind::Enlarge, 15.0, 2);
        assert!(ability.try_cast());
        assert_eq!(ability.charges(), 1);
        assert!((ability.timer() - 15.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_cast_at_zero_is_rejected_without_change() {
        let mut ability = drained(8.0);
        let before = ability.clone();
        assert!(!ability.try_cast());
        assert_eq!(ability, before);
    }

    #[test]
    fn test_second_cast_does_not_restart_timer() {
        let mut ability = Ability::new(AbilityKind::Charge, 8.0, 2);
        ability.try_cast();
        ability.tick(3.0);
        ability.try_cast();
        assert!((ability.timer() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_charges_regenerate_one_at_a_time() {
        let mut ability = drained(8.0);
        assert_eq!(ability.charges(), 0);

        // 7.9 seconds: nothing yet.
        for _ in 0..79 {
            ability.tick(0.1);
        }
        assert_eq!(ability.charges(), 0);

        for _ in 0..2 {
            ability.tick(0.1);
        }
        assert_eq!(ability.charges(), 1);
        assert!(ability.timer() > 7.5);

        for _ in 0..78 {
            ability.tick(0.1);
        }
        assert_eq!(ability.charges(), 1);

        for _ in 0..3 {
            ability.tick(0.1);
        }
        assert_eq!(ability.charges(), 2);
        assert!(ability.timer().abs() < f32::EPSILON);
        assert!(!ability.tick(10.0));
    }

    #[test]
    fn test_hasten_completes_charge() {
        let mut ability = drained(8.0);
        ability.tick(7.5);
        assert!(ability.hasten(1.0));
        assert_eq!(ability.charges(), 1);
        assert!((ability.timer() - 8.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_hasten_partial() {
        let mut ability = drained(8.0);
        assert!(!ability.hasten(1.0));
        assert_eq!(ability.charges(), 0);
        assert!((ability.timer() - 7.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_hasten_when_full_is_noop() {
        let mut ability = Ability::new(AbilityKind::Whirlwind, 12.0, 2);
        assert!(!ability.hasten(1.0));
        assert_eq!(ability.charges(), 2);
    }

    #[test]
    fn test_cooldown_display() {
        let mut ability = drained(8.0);
        ability.tick(0.5);
        assert_eq!(ability.display_seconds(), Some(8));
        assert!((ability.cooldown_fraction() - 7.5 / 8.0).abs() < 1e-5);

        let full = Ability::new(AbilityKind::Charge, 8.0, 2);
        assert_eq!(full.display_seconds(), None);
        assert!(full.cooldown_fraction().abs() < f32::EPSILON);
    }

    #[test]
    fn test_set_uses_tuned_cooldowns() {
        let set = AbilitySet::new(&AbilityTuning::default());
        assert!((set.get(AbilityKind::Charge).cooldown() - 8.0).abs() < f32::EPSILON);
        assert!((set.get(AbilityKind::Enlarge).cooldown() - 15.0).abs() < f32::EPSILON);
        assert!((set.get(AbilityKind::Whirlwind).cooldown() - 12.0).abs() < f32::EPSILON);
        assert!(set.iter().all(|a| a.charges() == 2));
    }
}
