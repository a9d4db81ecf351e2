//! Health component and arena-based enemy storage.

use std::collections::HashMap;

use thiserror::Error;
use vigil_common::EntityId;

use crate::combat::mitigated_damage;
use crate::enemy::Enemy;

/// Error types for entity operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    /// Entity not found
    #[error("Entity not found: {0}")]
    NotFound(EntityId),
    /// Entity with this ID is already stored
    #[error("Entity already present: {0}")]
    Duplicate(EntityId),
}

/// Result type for entity operations.
pub type EntityResult<T> = Result<T, EntityError>;

/// Health pool clamped to `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    current: f32,
    max: f32,
}

impl Health {
    /// Creates a full health pool.
    #[must_use]
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self { current: max, max }
    }

    /// Returns current health.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Returns maximum health.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Returns health as a fraction in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            (self.current / self.max).clamp(0.0, 1.0)
        }
    }

    /// Applies an armored hit and returns the damage actually dealt.
    ///
    /// Dealt damage is `max(1, amount - armor)`; health never drops below 0.
    pub fn take_hit(&mut self, amount: f32, armor: f32) -> f32 {
        let dealt = mitigated_damage(amount, armor);
        self.current = (self.current - dealt).max(0.0);
        dealt
    }

    /// Changes the maximum, clamping current health into range.
    pub fn set_max(&mut self, max: f32) {
        self.max = max.max(0.0);
        self.current = self.current.min(self.max);
    }

    /// Sets current health, clamped into `[0, max]`.
    pub fn set_current(&mut self, current: f32) {
        self.current = current.clamp(0.0, self.max);
    }

    /// Restores health to maximum.
    pub fn refill(&mut self) {
        self.current = self.max;
    }

    /// Checks if dead.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }
}

/// Arena storage for live enemies.
///
/// Slots are reused through a free list. Dead enemies stay in place until
/// [`EnemyArena::prune_dead`] runs, so a whole tick can read their final
/// health before removal.
#[derive(Debug, Default)]
pub struct EnemyArena {
    /// Storage slots
    slots: Vec<Option<Enemy>>,
    /// Free slot indices for reuse
    free_list: Vec<usize>,
    /// Map from EntityId to slot index for fast lookup
    id_to_index: HashMap<EntityId, usize>,
}

impl EnemyArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored enemies, dead or alive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.id_to_index.len()
    }

    /// Returns true if there are no stored enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id_to_index.is_empty()
    }

    /// Returns the number of enemies with health left.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.iter().filter(|e| e.is_alive()).count()
    }

    /// Inserts an enemy.
    pub fn insert(&mut self, enemy: Enemy) -> EntityResult<EntityId> {
        let id = enemy.id();
        if self.id_to_index.contains_key(&id) {
            return Err(EntityError::Duplicate(id));
        }

        let index = if let Some(free_index) = self.free_list.pop() {
            self.slots[free_index] = Some(enemy);
            free_index
        } else {
            self.slots.push(Some(enemy));
            self.slots.len() - 1
        };

        self.id_to_index.insert(id, index);
        Ok(id)
    }

    /// Removes an enemy by ID.
    pub fn remove(&mut self, id: EntityId) -> EntityResult<Enemy> {
        let index = self.id_to_index.remove(&id).ok_or(EntityError::NotFound(id))?;
        let enemy = self.slots[index].take().ok_or(EntityError::NotFound(id))?;
        self.free_list.push(index);
        Ok(enemy)
    }

    /// Gets an enemy by ID.
    pub fn get(&self, id: EntityId) -> EntityResult<&Enemy> {
        let index = self.id_to_index.get(&id).ok_or(EntityError::NotFound(id))?;
        self.slots[*index].as_ref().ok_or(EntityError::NotFound(id))
    }

    /// Gets an enemy mutably by ID.
    pub fn get_mut(&mut self, id: EntityId) -> EntityResult<&mut Enemy> {
        let index = self.id_to_index.get(&id).ok_or(EntityError::NotFound(id))?;
        self.slots[*index].as_mut().ok_or(EntityError::NotFound(id))
    }

    /// Checks if an enemy with the given ID is stored.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.id_to_index.contains_key(&id)
    }

    /// Iterates over stored enemies in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Iterates mutably over stored enemies in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Enemy> {
        self.slots.iter_mut().filter_map(Option::as_mut)
    }

    /// Iterates over enemies that can still act or be targeted.
    pub fn alive(&self) -> impl Iterator<Item = &Enemy> {
        self.iter().filter(|e| e.is_alive())
    }

    /// Removes every dead enemy and returns them in slot order.
    pub fn prune_dead(&mut self) -> Vec<Enemy> {
        let mut removed = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.as_ref().is_some_and(|e| !e.is_alive()) {
                if let Some(enemy) = slot.take() {
                    self.id_to_index.remove(&enemy.id());
                    self.free_list.push(index);
                    removed.push(enemy);
                }
            }
        }
        removed
    }

    /// Removes all enemies.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.id_to_index.clear();
    }
}
