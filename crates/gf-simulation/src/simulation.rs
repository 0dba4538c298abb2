use gf_core::component::{EnemyState, PlayerComponent};
use gf_core::entity::{Entity, EntityId};
use gf_core::footprint::{DefaultFootprints, FootprintProvider};
use gf_core::level::Level;
use gf_core::store::EntityStore;
use gf_core::tags::Tags;

use crate::camera::{self, CameraSystem};
use crate::clock::{SimClock, TimeSource};
use crate::config::SimConfig;
use crate::context::{LevelState, LevelStatus, SimContext};
use crate::editor::{Editor, Selection};
use crate::enemy::EnemySystem;
use crate::error::{SimError, SimResult};
use crate::event::EventLog;
use crate::hook::HookSystem;
use crate::input::InputSnapshot;
use crate::platform::PlatformSystem;
use crate::player::PlayerSystem;
use crate::system::System;

/// The top-level tick orchestrator.
///
/// Owns the level's entities, clock, input and event log, and drives the
/// registered systems once per frame in registration order.
pub struct Simulation {
    store: EntityStore,
    level: LevelState,
    clock: SimClock,
    config: SimConfig,
    input: InputSnapshot,
    events: EventLog,
    selection: Selection,
    footprints: Box<dyn FootprintProvider>,
    systems: Vec<Box<dyn System>>,
    initialized: bool,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("level", &self.level.meta.name)
            .field("tick", &self.clock.tick())
            .field("entities", &self.store.len())
            .field("systems", &self.systems.len())
            .field("events", &self.events.len())
            .finish()
    }
}

impl Simulation {
    /// Create a simulation with no systems registered.
    pub fn new(level: Level, config: SimConfig) -> Self {
        let clock = SimClock::new(config.frame_rate);
        let events = EventLog::new(config.max_events);
        Self {
            store: level.store,
            level: LevelState::new(level.meta),
            clock,
            config,
            input: InputSnapshot::idle(),
            events,
            selection: Selection::new(),
            footprints: Box::new(DefaultFootprints::new()),
            systems: Vec::new(),
            initialized: false,
        }
    }

    /// Create a simulation with the gameplay systems in their required order:
    /// platforms, enemies, hooks, the player, then the camera.
    pub fn standard(level: Level, config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        if level.store.player_id().is_none() {
            return Err(SimError::MissingSingleton("player"));
        }
        let mut sim = Self::new(level, config);
        sim.add_system(PlatformSystem::new());
        sim.add_system(EnemySystem::new());
        sim.add_system(HookSystem::new());
        sim.add_system(PlayerSystem::new());
        sim.add_system(CameraSystem::new());
        Ok(sim)
    }

    /// Replace the time source used for input timestamps.
    pub fn with_clock(mut self, source: Box<dyn TimeSource>) -> Self {
        self.clock = SimClock::with_source(self.config.frame_rate, source);
        self
    }

    /// Use `footprints` for entities created at runtime and in the editor.
    pub fn with_footprints(mut self, footprints: Box<dyn FootprintProvider>) -> Self {
        self.footprints = footprints;
        self
    }

    /// Register a system. Systems are ticked in registration order.
    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        self.systems.push(Box::new(system));
    }

    /// Initialize all registered systems.
    pub fn init(&mut self) -> SimResult<()> {
        if self.initialized {
            return Ok(());
        }
        for i in 0..self.systems.len() {
            let mut system = std::mem::replace(&mut self.systems[i], Box::new(NoopSystem));
            let result = system.init(&mut self.context());
            self.systems[i] = system;
            result?;
        }
        self.initialized = true;
        Ok(())
    }

    fn context(&mut self) -> SimContext<'_> {
        SimContext {
            store: &mut self.store,
            clock: &self.clock,
            config: &self.config,
            input: &self.input,
            events: &mut self.events,
            level: &mut self.level,
            selection: &mut self.selection,
            footprints: self.footprints.as_ref(),
        }
    }

    /// Input for the next tick.
    pub fn set_input(&mut self, input: InputSnapshot) {
        self.input = input;
    }

    /// Advance the simulation by one tick.
    ///
    /// Once the level is completed the clock keeps running but no system
    /// ticks until [`Simulation::restart_level`].
    pub fn tick(&mut self) -> SimResult<()> {
        if !self.initialized {
            self.init()?;
        }

        self.clock.advance();
        if self.level.status != LevelStatus::Playing {
            return Ok(());
        }

        for i in 0..self.systems.len() {
            let mut system = std::mem::replace(&mut self.systems[i], Box::new(NoopSystem));
            let result = system.tick(&mut self.context());
            self.systems[i] = system;
            result?;
        }
        Ok(())
    }

    /// Advance the simulation by `n` ticks.
    pub fn run(&mut self, n: u64) -> SimResult<()> {
        for _ in 0..n {
            self.tick()?;
        }
        Ok(())
    }

    /// Put every entity back where the level placed it and resume play.
    ///
    /// Hooks are destroyed, enemies fall back onto their ground and the
    /// player loses its checkpoint and glide ability.
    pub fn restart_level(&mut self) {
        let hooks: Vec<EntityId> = self.store.with_tags(Tags::HOOK).map(|e| e.id).collect();
        for hook in hooks {
            let _ = self.store.destroy(hook);
        }
        self.store.reset_all();
        for id in self.store.live_ids() {
            let Some(entity) = self.store.get_mut(id) else {
                continue;
            };
            if let Some(enemy) = entity.components.enemy.as_mut() {
                enemy.state = EnemyState::Falling;
                enemy.ground = None;
            }
            if let Some(player) = entity.components.player.as_mut() {
                *player = PlayerComponent::default();
            }
        }
        if let Some(center) = self.player().map(|p| p.hitbox.center()) {
            camera::recenter(&mut self.store, center);
        }
        self.level.status = LevelStatus::Playing;
        log::info!("restarted level \"{}\"", self.level.meta.name);
    }

    /// Editing view over the live entities.
    pub fn editor(&mut self) -> Editor<'_> {
        Editor::new(
            &mut self.store,
            &mut self.selection,
            self.footprints.as_ref(),
            &self.config,
        )
    }

    /// The live entity store.
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Mutable store access, for tests and tools.
    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    /// The player entity, if the level has one.
    pub fn player(&self) -> Option<&Entity> {
        self.store.player_id().and_then(|id| self.store.get(id))
    }

    /// The player's movement state.
    pub fn player_state(&self) -> Option<&PlayerComponent> {
        self.player().and_then(|p| p.components.player.as_ref())
    }

    /// Level metadata and status.
    pub fn level(&self) -> &LevelState {
        &self.level
    }

    /// Playing or completed.
    pub fn status(&self) -> LevelStatus {
        self.level.status
    }

    /// Configuration in use.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Input applied on the next tick.
    pub fn input(&self) -> &InputSnapshot {
        &self.input
    }

    /// The simulation clock.
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Events emitted so far.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Current editor selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Access a system by downcasting to a concrete type.
    pub fn get_system<T: System + 'static>(&self) -> Option<&T> {
        self.systems
            .iter()
            .find_map(|s| s.as_any().downcast_ref::<T>())
    }

    /// Access a system mutably by downcasting to a concrete type.
    pub fn get_system_mut<T: System + 'static>(&mut self) -> Option<&mut T> {
        self.systems
            .iter_mut()
            .find_map(|s| s.as_any_mut().downcast_mut::<T>())
    }

    /// Names of the registered systems, in tick order.
    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    /// Ticks advanced so far.
    pub fn current_tick(&self) -> u64 {
        self.clock.tick()
    }

    /// Extract the level, consuming the simulation.
    pub fn into_level(self) -> Level {
        Level {
            meta: self.level.meta,
            store: self.store,
        }
    }
}

/// Placeholder system used during the swap-and-tick pattern.
#[derive(Debug)]
struct NoopSystem;

impl System for NoopSystem {
    fn name(&self) -> &str {
        "noop"
    }
    fn tick(&mut self, _ctx: &mut SimContext<'_>) -> SimResult<()> {
        Ok(())
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
