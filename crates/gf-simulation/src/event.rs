use gf_core::entity::EntityId;

/// What kind of simulation event occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEventKind {
    // Player
    /// The player died.
    PlayerDied {
        /// The player entity.
        player: EntityId,
        /// What killed it.
        cause: String,
    },
    /// The player continued at its checkpoint or origin.
    PlayerRespawned {
        /// The player entity.
        player: EntityId,
    },
    /// A buffered jump fired.
    Jumped {
        /// The jumping entity.
        player: EntityId,
        /// The enemy stomped by this jump, if any.
        stomped: Option<EntityId>,
    },
    /// An actor came to rest on ground.
    Landed {
        /// The entity that landed.
        entity: EntityId,
        /// The ground it landed on.
        on: EntityId,
    },
    /// A checkpoint was collected.
    CheckpointCollected {
        /// The player entity.
        player: EntityId,
        /// The collected checkpoint.
        checkpoint: EntityId,
    },
    /// A glide pickup switched the player into glide mode.
    GlideUnlocked {
        /// The player entity.
        player: EntityId,
    },
    /// The player started overlapping a textbox.
    TextboxEntered {
        /// The player entity.
        player: EntityId,
        /// The textbox.
        textbox: EntityId,
    },
    /// The player stopped overlapping a textbox.
    TextboxExited {
        /// The player entity.
        player: EntityId,
        /// The textbox.
        textbox: EntityId,
    },
    /// The player reached an exit.
    LevelCompleted {
        /// The player entity.
        player: EntityId,
        /// The exit touched.
        exit: EntityId,
    },

    // Enemies
    /// An enemy was killed.
    EnemyKilled {
        /// The enemy.
        enemy: EntityId,
        /// How it died.
        cause: String,
    },

    // Hook
    /// The player threw a grappling hook.
    HookFired {
        /// The new hook entity.
        hook: EntityId,
        /// Its owner.
        owner: EntityId,
    },
    /// A hook attached to a hookable entity.
    HookAttached {
        /// The hook entity.
        hook: EntityId,
        /// What it attached to.
        to: EntityId,
    },
    /// A hook reached its maximum length without attaching.
    HookMissed {
        /// The hook entity.
        hook: EntityId,
    },
    /// A hook was released and destroyed.
    HookReleased {
        /// The hook entity.
        hook: EntityId,
        /// Its owner.
        owner: EntityId,
    },

    // Platforms
    /// A moving platform reached an anchor and turned around.
    PlatformReversed {
        /// The platform entity.
        platform: EntityId,
    },
}

impl SimEventKind {
    /// Check whether a given entity is involved in this event.
    pub fn involves(&self, id: EntityId) -> bool {
        match self {
            Self::PlayerDied { player, .. }
            | Self::PlayerRespawned { player }
            | Self::GlideUnlocked { player } => *player == id,
            Self::Jumped { player, stomped } => *player == id || *stomped == Some(id),
            Self::Landed { entity, on } => *entity == id || *on == id,
            Self::CheckpointCollected { player, checkpoint } => {
                *player == id || *checkpoint == id
            }
            Self::TextboxEntered { player, textbox } | Self::TextboxExited { player, textbox } => {
                *player == id || *textbox == id
            }
            Self::LevelCompleted { player, exit } => *player == id || *exit == id,
            Self::EnemyKilled { enemy, .. } => *enemy == id,
            Self::HookFired { hook, owner } | Self::HookReleased { hook, owner } => {
                *hook == id || *owner == id
            }
            Self::HookAttached { hook, to } => *hook == id || *to == id,
            Self::HookMissed { hook } => *hook == id,
            Self::PlatformReversed { platform } => *platform == id,
        }
    }

    /// Short label used in logs and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PlayerDied { .. } => "player-died",
            Self::PlayerRespawned { .. } => "player-respawned",
            Self::Jumped { .. } => "jumped",
            Self::Landed { .. } => "landed",
            Self::CheckpointCollected { .. } => "checkpoint",
            Self::GlideUnlocked { .. } => "glide-unlocked",
            Self::TextboxEntered { .. } => "textbox-entered",
            Self::TextboxExited { .. } => "textbox-exited",
            Self::LevelCompleted { .. } => "level-completed",
            Self::EnemyKilled { .. } => "enemy-killed",
            Self::HookFired { .. } => "hook-fired",
            Self::HookAttached { .. } => "hook-attached",
            Self::HookMissed { .. } => "hook-missed",
            Self::HookReleased { .. } => "hook-released",
            Self::PlatformReversed { .. } => "platform-reversed",
        }
    }
}

/// A record of something that happened during simulation.
#[derive(Debug, Clone)]
pub struct SimEvent {
    /// The simulation tick when this event occurred.
    pub tick: u64,
    /// The specific kind of event that occurred.
    pub kind: SimEventKind,
    /// A human-readable description of the event.
    pub description: String,
}

impl SimEvent {
    /// Create a new simulation event with the given tick, kind, and description.
    pub fn new(tick: u64, kind: SimEventKind, description: impl Into<String>) -> Self {
        Self {
            tick,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates events during a simulation run.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<SimEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest events if the log exceeds its capacity.
    pub fn push(&mut self, event: SimEvent) {
        log::debug!("tick {}: {}", event.tick, event.description);
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// Every retained event, oldest first.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Events emitted during `tick`.
    pub fn events_at_tick(&self, tick: u64) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.tick == tick).collect()
    }

    /// Events that mention `id`.
    pub fn events_for_entity(&self, id: EntityId) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// Number of events whose kind matches `pred`.
    pub fn count_where(&self, pred: impl Fn(&SimEventKind) -> bool) -> usize {
        self.events.iter().filter(|e| pred(&e.kind)).count()
    }

    /// Number of retained events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// No events retained.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop every event.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
