//! # Vigil Gameplay
//!
//! Deterministic core of the Vigil auto-battler.
//!
//! One hero steers and fights on its own while enemies spawn around it.
//! This crate owns everything that happens inside a tick:
//! - Hero stats derived from base, gear, level and buffs
//! - Enemy archetypes and stage scaling
//! - Steering, targeting and overlap separation
//! - Charge-based abilities and their timed buffs
//! - Rewards, levelling and stage progression
//! - Gear upgrades and the gold wallet
//! - Snapshot persistence behind a key-value store trait
//! - Commands from input and a read-only view for rendering
//! - Event bus for presentation effects

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod ability;
pub mod buffs;
pub mod collision;
pub mod combat;
pub mod command;
pub mod config;
pub mod economy;
pub mod enemy;
pub mod entity;
pub mod events;
pub mod hero;
pub mod progression;
pub mod simulation;
pub mod snapshot;
pub mod stats;
pub mod steering;
pub mod view;


/// Prelude for convenient imports
pub mod prelude {
    pub use crate::ability::*;
    pub use crate::buffs::*;
    pub use crate::collision::*;
    pub use crate::combat::*;
    pub use crate::command::*;
    pub use crate::config::*;
    pub use crate::economy::*;
    pub use crate::enemy::*;
    pub use crate::entity::*;
    pub use crate::events::*;
    pub use crate::hero::*;
    pub use crate::progression::*;
    pub use crate::simulation::*;
    pub use crate::snapshot::*;
    pub use crate::stats::*;
    pub use crate::steering::*;
    pub use crate::view::*;
}

pub use prelude::*;
