//! Per-frame platformer simulation for Grapplefall.
//!
//! A [`Simulation`] owns a level's [`gf_core::EntityStore`] and advances it
//! one frame at a time through a fixed list of systems: moving platforms,
//! enemies, grappling hooks, the player and finally the camera. Ground
//! detection and collision resolution are shared helpers the systems call
//! into rather than systems of their own.

/// Camera follow and instant re-centering.
pub mod camera;
/// Tick counter and injectable time sources.
pub mod clock;
/// Overlap classification and contact resolution.
pub mod collision;
/// Tuning tables and simulation configuration.
pub mod config;
/// Mutable context passed to systems each tick.
pub mod context;
/// Placement, selection, removal and moves against the live store.
pub mod editor;
/// Enemy patrol and fall behavior.
pub mod enemy;
/// Error types for the simulation crate.
pub mod error;
/// Simulation event types and the event log.
pub mod event;
/// Ground detection beneath a moving actor.
pub mod ground;
/// Grappling hook extension and pendulum swing.
pub mod hook;
/// Per-tick input snapshot.
pub mod input;
/// Moving platforms shuttling between their anchors.
pub mod platform;
/// The player state machine.
pub mod player;
/// Top-level tick orchestrator.
pub mod simulation;
/// The trait that all simulation systems implement.
pub mod system;

/// Re-exports of [`clock::SimClock`], [`clock::ManualClock`] and [`clock::WallClock`].
pub use clock::{ManualClock, SimClock, WallClock};
/// Re-export of [`config::SimConfig`].
pub use config::SimConfig;
/// Re-exports of [`context::LevelStatus`] and [`context::SimContext`].
pub use context::{LevelStatus, SimContext};
/// Re-exports of [`editor::Editor`], [`editor::EditorAction`] and [`editor::Selection`].
pub use editor::{Editor, EditorAction, Selection};
/// Re-exports of [`error::SimError`] and [`error::SimResult`].
pub use error::{SimError, SimResult};
/// Re-exports of [`event::EventLog`], [`event::SimEvent`], and [`event::SimEventKind`].
pub use event::{EventLog, SimEvent, SimEventKind};
/// Re-exports of [`input::HorizontalIntent`] and [`input::InputSnapshot`].
pub use input::{HorizontalIntent, InputSnapshot};
/// Re-export of [`simulation::Simulation`].
pub use simulation::Simulation;
/// Re-export of [`system::System`].
pub use system::System;
