//! Persisted progress snapshot and the store it is written to.
//!
//! The document is a small JSON object under one fixed key:
//!
//! ```json
//! {"hero": {"x": 0, "y": 0, "level": 1, "xp": 0, "gold": 0,
//!           "maxHp": 160, "hp": 160, "armor": 6, "ad": 22, "as": 1.6, "ms": 160},
//!  "gear": {"weapon": {"level": 1}, "armor": {"level": 1}, "boots": {"level": 1}},
//!  "stage": {"level": 1, "enemiesKilled": 0, "enemiesRequired": 10}}
//! ```
//!
//! Reading never fails: every missing or malformed field falls back to its
//! default on its own.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::progression::{required_kills, Stage};
use crate::stats::{GearSlot, Loadout};

/// Key the snapshot is stored under.
pub const SNAPSHOT_KEY: &str = "vigil.snapshot";

/// Errors from a snapshot store.
#[derive(Debug, Error)]
pub enum SaveError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend-specific failure
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for save operations.
pub type SaveResult<T> = Result<T, SaveError>;

/// Key-value document store.
pub trait SnapshotStore {
    /// Reads a document; `Ok(None)` when nothing is stored.
    fn load(&mut self, key: &str) -> SaveResult<Option<String>>;

    /// Writes a document, replacing any previous one.
    fn save(&mut self, key: &str, document: &str) -> SaveResult<()>;

    /// Deletes a document. Deleting a missing key is not an error.
    fn clear(&mut self, key: &str) -> SaveResult<()>;
}

/// In-memory store, for tests and hosts without disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: HashMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored document for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.documents.get(key).map(String::as_str)
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&mut self, key: &str) -> SaveResult<Option<String>> {
        Ok(self.documents.get(key).cloned())
    }

    fn save(&mut self, key: &str, document: &str) -> SaveResult<()> {
        self.documents.insert(key.to_string(), document.to_string());
        Ok(())
    }

    fn clear(&mut self, key: &str) -> SaveResult<()> {
        self.documents.remove(key);
        Ok(())
    }
}

/// Hero fields of the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroRecord {
    /// X position
    pub x: f32,
    /// Y position
    pub y: f32,
    /// Level
    pub level: u32,
    /// Banked experience
    pub xp: u64,
    /// Gold balance
    pub gold: u64,
    /// Maximum health (informational; recomputed on load)
    #[serde(rename = "maxHp")]
    pub max_hp: f32,
    /// Current health (informational; reset to max on load)
    pub hp: f32,
    /// Armor (informational)
    pub armor: f32,
    /// Attack damage (informational)
    pub ad: f32,
    /// Attack speed (informational)
    #[serde(rename = "as")]
    pub attack_speed: f32,
    /// Movement speed (informational)
    pub ms: f32,
}

impl Default for HeroRecord {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            level: 1,
            xp: 0,
            gold: 0,
            max_hp: 0.0,
            hp: 0.0,
            armor: 0.0,
            ad: 0.0,
            attack_speed: 0.0,
            ms: 0.0,
        }
    }
}

/// One gear slot's saved level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GearLevel {
    /// Level, at least 1
    pub level: u32,
}

impl Default for GearLevel {
    fn default() -> Self {
        Self { level: 1 }
    }
}

/// Gear fields of the snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GearRecord {
    /// Weapon slot
    pub weapon: GearLevel,
    /// Armor slot
    pub armor: GearLevel,
    /// Boots slot
    pub boots: GearLevel,
}

impl GearRecord {
    /// Captures a loadout's levels.
    #[must_use]
    pub fn from_loadout(loadout: &Loadout) -> Self {
        Self {
            weapon: GearLevel { level: loadout.weapon.level() },
            armor: GearLevel { level: loadout.armor.level() },
            boots: GearLevel { level: loadout.boots.level() },
        }
    }

    /// Rebuilds the loadout.
    #[must_use]
    pub fn to_loadout(&self) -> Loadout {
        Loadout::with_levels(self.weapon.level, self.armor.level, self.boots.level)
    }
}

/// Stage fields of the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    /// Stage number
    pub level: u32,
    /// Kills this stage
    #[serde(rename = "enemiesKilled")]
    pub kills: u32,
    /// Kills needed to advance
    #[serde(rename = "enemiesRequired")]
    pub required: u32,
}

impl Default for StageRecord {
    fn default() -> Self {
        Self::from_stage(&Stage::default())
    }
}

impl StageRecord {
    /// Captures stage progress.
    #[must_use]
    pub const fn from_stage(stage: &Stage) -> Self {
        Self {
            level: stage.level(),
            kills: stage.kills(),
            required: stage.required(),
        }
    }

    /// Rebuilds stage progress.
    #[must_use]
    pub fn to_stage(&self) -> Stage {
        Stage::restore(self.level, self.kills, self.required)
    }
}

/// Complete saved progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Hero fields
    pub hero: HeroRecord,
    /// Gear levels
    pub gear: GearRecord,
    /// Stage progress
    pub stage: StageRecord,
}

impl Snapshot {
    /// Encodes as JSON.
    pub fn to_json(&self) -> SaveResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes leniently; unparseable input yields the default snapshot.
    #[must_use]
    pub fn from_json(document: &str) -> Self {
        match serde_json::from_str::<Value>(document) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                warn!("Snapshot is not valid JSON, using defaults: {}", e);
                Self::default()
            },
        }
    }

    /// Decodes field by field from a parsed document.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        let empty = Map::new();
        let root = value.as_object().unwrap_or(&empty);
        let hero = section(root, "hero", &empty);
        let gear = section(root, "gear", &empty);
        let stage = section(root, "stage", &empty);

        let h = &defaults.hero;
        let hero = HeroRecord {
            x: float(hero, "x", h.x),
            y: float(hero, "y", h.y),
            level: count(hero, "level", h.level).max(1),
            xp: amount(hero, "xp", h.xp),
            gold: amount(hero, "gold", h.gold),
            max_hp: float(hero, "maxHp", h.max_hp),
            hp: float(hero, "hp", h.hp),
            armor: float(hero, "armor", h.armor),
            ad: float(hero, "ad", h.ad),
            attack_speed: float(hero, "as", h.attack_speed),
            ms: float(hero, "ms", h.ms),
        };

        let gear_level = |slot: GearSlot| {
            let entry = section(gear, slot.name(), &empty);
            GearLevel {
                level: count(entry, "level", 1).max(1),
            }
        };
        let gear = GearRecord {
            weapon: gear_level(GearSlot::Weapon),
            armor: gear_level(GearSlot::Armor),
            boots: gear_level(GearSlot::Boots),
        };

        let level = count(stage, "level", defaults.stage.level).max(1);
        let required = match count(stage, "enemiesRequired", 0) {
            0 => required_kills(level),
            n => n,
        };
        let stage = StageRecord {
            level,
            kills: count(stage, "enemiesKilled", 0),
            required,
        };

        Self { hero, gear, stage }
    }
}

fn section<'a>(parent: &'a Map<String, Value>, key: &str, empty: &'a Map<String, Value>) -> &'a Map<String, Value> {
    match parent.get(key) {
        Some(Value::Object(map)) => map,
        Some(_) => {
            warn!(field = key, "Malformed snapshot section, using defaults");
            empty
        },
        None => empty,
    }
}

fn number(map: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = map.get(key)?;
    match value.as_f64().filter(|v| v.is_finite()) {
        Some(v) => Some(v),
        None => {
            warn!(field = key, "Malformed snapshot field, using default");
            None
        },
    }
}

fn float(map: &Map<String, Value>, key: &str, default: f32) -> f32 {
    number(map, key).map_or(default, |v| v as f32)
}

fn amount(map: &Map<String, Value>, key: &str, default: u64) -> u64 {
    number(map, key)
        .filter(|v| *v >= 0.0)
        .map_or(default, |v| v.floor() as u64)
}

fn count(map: &Map<String, Value>, key: &str, default: u32) -> u32 {
    number(map, key)
        .filter(|v| *v >= 0.0 && *v <= f64::from(u32::MAX))
        .map_or(default, |v| v.floor() as u32)
}
