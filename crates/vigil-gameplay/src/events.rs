//! Event feed for visual and audio collaborators.
//!
//! The core publishes what happened each tick; damage numbers, gold orbs,
//! trails and rings are owned entirely by whoever drains the bus.

use crossbeam_channel::{bounded, Receiver, Sender};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use vigil_common::EntityId;

use crate::ability::AbilityKind;
use crate::enemy::EnemyKind;

/// Events published by the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// Enemy entered the arena
    EnemySpawned {
        /// Entity ID
        id: EntityId,
        /// Archetype
        kind: EnemyKind,
        /// Spawn point
        position: Vec2,
    },
    /// Enemy took damage
    EnemyDamaged {
        /// Entity ID
        id: EntityId,
        /// Damage after armor
        amount: f32,
        /// Where to draw the number
        position: Vec2,
    },
    /// Hero took damage
    HeroDamaged {
        /// Attacking enemy
        source: EntityId,
        /// Damage after armor
        amount: f32,
        /// Hero position
        position: Vec2,
    },
    /// A hit landed between two points
    AttackLine {
        /// Attacker position
        from: Vec2,
        /// Target position
        to: Vec2,
        /// True for enemy shots from range
        ranged: bool,
    },
    /// Enemy died and paid out
    EnemyKilled {
        /// Entity ID
        id: EntityId,
        /// Archetype
        kind: EnemyKind,
        /// Gold credited
        gold: u64,
        /// Experience granted
        xp: u64,
        /// Death position
        position: Vec2,
    },
    /// Cosmetic gold pickup; already credited
    GoldDropped {
        /// Amount shown
        amount: u64,
        /// Drop position
        position: Vec2,
    },
    /// Hero gained a level
    LevelUp {
        /// New level
        level: u32,
    },
    /// Stage changed by clearing it or by command
    StageAdvanced {
        /// New stage
        stage: u32,
    },
    /// Ability consumed a charge
    AbilityCast {
        /// Which ability
        ability: AbilityKind,
    },
    /// Regeneration was sped up by a cast at zero charges
    ChargeHastened {
        /// Which ability
        ability: AbilityKind,
        /// Charges after the hasten
        charges: u32,
    },
    /// Charge trail marker
    Trail {
        /// Hero position
        position: Vec2,
        /// Hero size at the time
        size: f32,
    },
    /// Whirlwind ring
    Whirlwind {
        /// Hero position
        center: Vec2,
        /// Ring radius
        radius: f32,
    },
    /// Hero was restored after dropping to zero health
    HeroRevived,
    /// Snapshot written to the store
    SnapshotSaved,
}

/// Bounded channel carrying [`SimEvent`]s out of the core.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<SimEvent>,
    /// Receiver for collecting events
    receiver: Receiver<SimEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self {
            sender,
            receiver,
            capacity: capacity.max(1),
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: SimEvent) {
        // Non-blocking send - if full, event is dropped
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<SimEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns a receiver handle for consumers on other threads.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<SimEvent> {
        self.receiver.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_drain() {
        let bus = EventBus::new(8);
        bus.publish(SimEvent::LevelUp { level: 2 });
        bus.publish(SimEvent::HeroRevived);
        assert_eq!(bus.pending_count(), 2);

        let events = bus.drain();
        assert_eq!(events, vec![SimEvent::LevelUp { level: 2 }, SimEvent::HeroRevived]);
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn test_full_bus_drops_instead_of_blocking() {
        let bus = EventBus::new(2);
        for stage in 0..5 {
            bus.publish(SimEvent::StageAdvanced { stage });
        }
        assert_eq!(bus.drain().len(), 2);
    }

    #[test]
    fn test_subscriber_sees_events() {
        let bus = EventBus::default();
        let rx = bus.subscribe();
        bus.publish(SimEvent::SnapshotSaved);
        assert_eq!(rx.try_recv().ok(), Some(SimEvent::SnapshotSaved));
    }
}
