//! Read-only snapshot of simulation state for rendering and UI.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use vigil_common::math::angle_between;
use vigil_common::EntityId;

use crate::ability::{Ability, AbilityKind};
use crate::enemy::{Enemy, EnemyKind};
use crate::hero::{Hero, HeroStats};
use crate::progression::Stage;
use crate::stats::{Gear, GearSlot, StatBlock};

/// Hero as seen by the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroView {
    /// Position
    pub position: Vec2,
    /// Heading in radians
    pub heading: f32,
    /// Current size
    pub size: f32,
    /// Health fraction
    pub hp_fraction: f32,
    /// Current health
    pub hp: f32,
    /// Level
    pub level: u32,
    /// Progress through the level
    pub xp_fraction: f32,
    /// Gold balance
    pub gold: u64,
    /// Derived stats
    pub stats: HeroStats,
    /// Active Charge stacks
    pub charge_stacks: u32,
    /// Active Enlarge stacks
    pub enlarge_stacks: u32,
    /// Attack speed boost running
    pub boosted: bool,
    /// Current attack target
    pub target: Option<EntityId>,
}

impl HeroView {
    /// Captures the hero.
    #[must_use]
    pub fn capture(hero: &Hero) -> Self {
        Self {
            position: hero.position(),
            heading: hero.heading(),
            size: hero.stats().size,
            hp_fraction: hero.hp_fraction(),
            hp: hero.hp(),
            level: hero.level(),
            xp_fraction: hero.experience().fraction(),
            gold: hero.gold(),
            stats: *hero.stats(),
            charge_stacks: hero.charge().stacks(),
            enlarge_stacks: hero.enlarge().stacks(),
            boosted: hero.charge().is_boosting(),
            target: hero.target(),
        }
    }
}

/// Enemy as seen by the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    /// Entity ID
    pub id: EntityId,
    /// Archetype
    pub kind: EnemyKind,
    /// Position
    pub position: Vec2,
    /// Body size
    pub size: f32,
    /// Facing, always toward the hero
    pub heading: f32,
    /// Health fraction
    pub hp_fraction: f32,
}

impl EnemyView {
    /// Captures an enemy facing `hero_position`.
    #[must_use]
    pub fn capture(enemy: &Enemy, hero_position: Vec2) -> Self {
        Self {
            id: enemy.id(),
            kind: enemy.kind(),
            position: enemy.position(),
            size: enemy.size(),
            heading: angle_between(enemy.position(), hero_position),
            hp_fraction: enemy.hp_fraction(),
        }
    }
}

/// Ability button state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityView {
    /// Which ability
    pub kind: AbilityKind,
    /// Charges ready
    pub charges: u32,
    /// Pool size
    pub max_charges: u32,
    /// Remaining regeneration fraction
    pub cooldown_fraction: f32,
    /// Whole seconds left, when empty
    pub seconds_left: Option<u32>,
}

impl From<&Ability> for AbilityView {
    fn from(ability: &Ability) -> Self {
        Self {
            kind: ability.kind(),
            charges: ability.charges(),
            max_charges: ability.max_charges(),
            cooldown_fraction: ability.cooldown_fraction(),
            seconds_left: ability.display_seconds(),
        }
    }
}

/// Gear shop entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearView {
    /// Slot
    pub slot: GearSlot,
    /// Level
    pub level: u32,
    /// Total stats granted
    pub total: StatBlock,
    /// Gold for the next level
    pub upgrade_cost: u64,
}

impl From<&Gear> for GearView {
    fn from(gear: &Gear) -> Self {
        Self {
            slot: gear.slot(),
            level: gear.level(),
            total: gear.total_stats(),
            upgrade_cost: gear.upgrade_cost(),
        }
    }
}

/// Everything a frame needs to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimView {
    /// Simulation seconds elapsed
    pub time: f64,
    /// Hero
    pub hero: HeroView,
    /// Living enemies
    pub enemies: Vec<EnemyView>,
    /// Ability buttons
    pub abilities: Vec<AbilityView>,
    /// Gear slots
    pub gear: Vec<GearView>,
    /// Stage number
    pub stage: u32,
    /// Kills this stage
    pub stage_kills: u32,
    /// Kills needed to advance
    pub stage_required: u32,
}

impl SimView {
    /// Assembles a view from simulation parts.
    #[must_use]
    pub fn capture<'a, E, A>(time: f64, hero: &Hero, enemies: E, abilities: A, stage: &Stage) -> Self
    where
        E: IntoIterator<Item = &'a Enemy>,
        A: IntoIterator<Item = &'a Ability>,
    {
        let hero_position = hero.position();
        Self {
            time,
            hero: HeroView::capture(hero),
            enemies: enemies
                .into_iter()
                .filter(|e| e.is_alive())
                .map(|e| EnemyView::capture(e, hero_position))
                .collect(),
            abilities: abilities.into_iter().map(AbilityView::from).collect(),
            gear: GearSlot::ALL
                .iter()
                .map(|&slot| GearView::from(hero.loadout().get(slot)))
                .collect(),
            stage: stage.level(),
            stage_kills: stage.kills(),
            stage_required: stage.required(),
        }
    }
}
