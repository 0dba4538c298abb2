use gf_core::entity::EntityId;
use gf_core::footprint::FootprintProvider;
use gf_core::level::LevelMeta;
use gf_core::store::EntityStore;

use crate::clock::SimClock;
use crate::config::SimConfig;
use crate::editor::Selection;
use crate::event::{EventLog, SimEvent, SimEventKind};
use crate::input::InputSnapshot;

/// Whether entity ticks run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LevelStatus {
    /// Entities tick normally.
    #[default]
    Playing,
    /// The exit was reached; ticks are suppressed until restart.
    Completed,
}

/// Per-level state that is not an entity.
#[derive(Debug, Clone, Default)]
pub struct LevelState {
    /// Header settings of the loaded level.
    pub meta: LevelMeta,
    /// Playing or completed.
    pub status: LevelStatus,
}

impl LevelState {
    /// A level that is being played.
    pub fn new(meta: LevelMeta) -> Self {
        Self {
            meta,
            status: LevelStatus::Playing,
        }
    }
}

/// Mutable context passed to each system during a tick.
pub struct SimContext<'a> {
    /// Every entity in the level.
    pub store: &'a mut EntityStore,
    /// Tick counter and time source.
    pub clock: &'a SimClock,
    /// Tuning for this run.
    pub config: &'a SimConfig,
    /// Input for this tick.
    pub input: &'a InputSnapshot,
    /// Destination for emitted events.
    pub events: &'a mut EventLog,
    /// Level status and metadata.
    pub level: &'a mut LevelState,
    /// Editor selection, pruned when entities are removed.
    pub selection: &'a mut Selection,
    /// Sizes for entities spawned mid-tick.
    pub footprints: &'a dyn FootprintProvider,
}

impl SimContext<'_> {
    /// Emit a simulation event at the current tick.
    pub fn emit(&mut self, kind: SimEventKind, description: impl Into<String>) {
        self.events
            .push(SimEvent::new(self.clock.tick(), kind, description));
    }

    /// Current tick number.
    pub fn tick(&self) -> u64 {
        self.clock.tick()
    }

    /// The player, logging an error when the level has none.
    pub fn require_player(&self, who: &str) -> Option<EntityId> {
        let player = self.store.player_id();
        if player.is_none() {
            log::error!("{who}: no player in level \"{}\"", self.level.meta.name);
        }
        player
    }
}
