//! Manager subsystems
//!
//! Managers hold per-session bookkeeping shared by the generators.

/// Collision detection between sanitised names
pub mod collisions;

pub use collisions::CollisionTracker;
