//! Core types for Grapplefall: geometry, tagged entities, and the entity store.
//!
//! This crate holds the data model the simulation advances each frame. It
//! knows nothing about ticking; you can build a level programmatically or
//! parse one from the `key=value` level text.

/// Typed per-kind state (player, enemy, platform, hook, ...).
pub mod component;
/// Entity handles, kinds, and the base entity record.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// Footprint lookup used to derive hitboxes from origins.
pub mod footprint;
/// Vectors and axis-aligned rectangles.
pub mod geometry;
/// Level text loading and saving.
pub mod level;
/// The `key=value` entity persistence contract.
pub mod persist;
/// Query builder for filtering entities.
pub mod query;
/// Generational arena holding every entity in a level.
pub mod store;
/// Capability tags.
pub mod tags;

/// Re-export core entity types.
pub use entity::{Entity, EntityId, EntityKind, Facing};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export footprint types.
pub use footprint::{DefaultFootprints, FootprintProvider};
/// Re-export geometry types.
pub use geometry::{Rect, Vec2};
/// Re-export level types.
pub use level::{Level, LevelMeta, LoadReport};
/// Re-export the entity store.
pub use store::EntityStore;
/// Re-export capability tags.
pub use tags::Tags;
