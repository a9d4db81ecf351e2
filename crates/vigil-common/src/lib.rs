//! # Vigil Common
//!
//! Common types, utilities, and shared abstractions for Vigil.
//!
//! This crate provides foundational types used across all Vigil crates:
//! - ID types and the per-session ID allocator
//! - Planar math helpers over `glam::Vec2`
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod math;

pub use glam::Vec2;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::math::*;
    pub use glam::Vec2;
}

pub use prelude::*;
