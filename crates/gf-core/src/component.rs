use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityKind};
use crate::geometry::Vec2;

/// The typed state attached to an entity.
/// Most entities carry none; specialised kinds carry exactly one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentSet {
    /// Present on the player.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<PlayerComponent>,
    /// Present on enemies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enemy: Option<EnemyComponent>,
    /// Present on moving platforms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<PlatformComponent>,
    /// Present on the two track anchors of a moving platform.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<AnchorComponent>,
    /// Present on an active grappling hook.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hook: Option<HookComponent>,
    /// Present on textboxes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub textbox: Option<TextboxComponent>,
    /// Present on the camera.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraComponent>,
}

impl ComponentSet {
    /// Default components for a freshly created entity of `kind`.
    ///
    /// Platforms and anchors need their counterpart ids and are filled in by
    /// the caller that creates the trio.
    pub fn for_kind(kind: EntityKind) -> Self {
        let mut set = Self::default();
        match kind {
            EntityKind::Player => set.player = Some(PlayerComponent::default()),
            EntityKind::Enemy => set.enemy = Some(EnemyComponent::default()),
            EntityKind::Textbox => set.textbox = Some(TextboxComponent::default()),
            EntityKind::Camera => set.camera = Some(CameraComponent::default()),
            _ => {}
        }
        set
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// Whether glide pickups have been collected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementMode {
    /// Jumps and falls only.
    #[default]
    Default,
    /// Holding run while falling caps the fall speed.
    Glide,
}

/// Coarse movement state, derived from the player's flags for display and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerMotion {
    /// Standing on ground.
    Grounded,
    /// Rising after a jump.
    Ascending,
    /// Falling.
    Descending,
    /// Falling slowly while holding jump.
    Gliding,
    /// Hanging from an attached hook.
    Hooked,
}

/// Movement state of the player entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerComponent {
    /// Per-tick displacement. Positive `y` is downward.
    pub velocity: Vec2,
    /// Velocity the player eases toward.
    pub velocity_target: Vec2,
    /// In the rising part of a jump.
    pub ascending: bool,
    /// Gliding this tick.
    pub gliding: bool,
    /// Reversing direction faster than walking.
    pub skidding: bool,
    /// Unlocked movement abilities.
    pub mode: MovementMode,
    /// Run button held this tick.
    pub running: bool,
    /// Clock time of the last jump press, cleared once consumed or expired.
    pub last_pressed_jump: Option<Duration>,
    /// Clock time at which ground was last seen underfoot.
    pub last_ground_beneath: Option<Duration>,
    /// Clock time of the last landing.
    pub last_landed: Option<Duration>,
    /// Ground found beneath the player at the end of the last tick.
    pub ground: Option<EntityId>,
    /// Last checkpoint reached, used as the respawn point.
    pub checkpoint: Option<EntityId>,
    /// Active grappling hook, owned by this player.
    pub hook: Option<EntityId>,
    /// Textbox overlapped last tick, for enter/exit edges.
    pub textbox: Option<EntityId>,
}

impl PlayerComponent {
    /// Clear every transient velocity, flag and timestamp. Mode and checkpoint survive.
    pub fn clear_transient(&mut self) {
        self.velocity = Vec2::ZERO;
        self.velocity_target = Vec2::ZERO;
        self.ascending = false;
        self.gliding = false;
        self.skidding = false;
        self.running = false;
        self.last_pressed_jump = None;
        self.last_ground_beneath = None;
        self.last_landed = None;
        self.ground = None;
        self.textbox = None;
    }

    /// On the ground and not rising.
    pub fn is_grounded(&self) -> bool {
        self.ground.is_some() && !self.ascending
    }

    /// Summarise the flags as one [`PlayerMotion`].
    pub fn motion(&self, hooked: bool) -> PlayerMotion {
        if hooked {
            PlayerMotion::Hooked
        } else if self.ascending {
            PlayerMotion::Ascending
        } else if self.is_grounded() {
            PlayerMotion::Grounded
        } else if self.gliding {
            PlayerMotion::Gliding
        } else {
            PlayerMotion::Descending
        }
    }
}

// ---------------------------------------------------------------------------
// Enemy
// ---------------------------------------------------------------------------

/// Enemy lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyState {
    /// Dropping until ground is found.
    #[default]
    Falling,
    /// Walking back and forth on a ground entity.
    Patrolling,
    /// Killed; removed at the end of the tick.
    Dead,
}

/// Movement state of an enemy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnemyComponent {
    /// Current lifecycle stage.
    pub state: EnemyState,
    /// Entity the enemy is walking on.
    pub ground: Option<EntityId>,
}

// ---------------------------------------------------------------------------
// Moving platform
// ---------------------------------------------------------------------------

/// Track and progress of a moving platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformComponent {
    /// Anchor at the start of the track.
    pub start_anchor: EntityId,
    /// Anchor at the end of the track.
    pub end_anchor: EntityId,
    /// Top-left of the platform along its track.
    pub current_pos: Vec2,
    /// Footprint multiplier.
    pub size: f32,
    /// Track direction in radians, start anchor toward end anchor.
    pub angle: f32,
    /// Scene units per tick.
    pub speed: f32,
    /// Travelling from start toward end.
    pub forward: bool,
    /// This tick's displacement, adopted by riders.
    pub last_frame_trajectory: Vec2,
}

/// Which end of a track an anchor marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorRole {
    /// Where the platform starts.
    Start,
    /// Where the platform turns around.
    End,
}

/// Back-reference from an anchor to its platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorComponent {
    /// Platform this anchor belongs to.
    pub platform: EntityId,
    /// Which end of the track this is.
    pub role: AnchorRole,
}

// ---------------------------------------------------------------------------
// Grappling hook
// ---------------------------------------------------------------------------

/// Projectile-then-pendulum state.
///
/// `start` is the swinging end (the owner's hand), `end` the tip. Angles are
/// measured counter-clockwise from +x with y pointing up, so a hook hanging
/// straight down has `current_angle == -PI/2`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookComponent {
    /// Player that fired the hook.
    pub owner: EntityId,
    /// Swinging end.
    pub start: Vec2,
    /// Tip.
    pub end: Vec2,
    /// Direction the hook was fired in, in radians.
    pub launch_angle: f32,
    /// Tip speed while extending, scene units per tick.
    pub speed: f32,
    /// Current rope length.
    pub current_length: f32,
    /// Rope angle, measured from the tip.
    pub current_angle: f32,
    /// Radians per second.
    pub angular_velocity: f32,
    /// Angle before the latest pendulum step, restored when a swing is blocked.
    pub previous_angle: f32,
    /// `None` while extending.
    pub attached_to: Option<EntityId>,
    /// Tip offset from the hooked entity's top-left, so the pivot rides with it.
    pub attach_offset: Vec2,
}

impl HookComponent {
    /// The tip has hooked something.
    pub fn is_attached(&self) -> bool {
        self.attached_to.is_some()
    }
}

// ---------------------------------------------------------------------------
// Textbox and camera
// ---------------------------------------------------------------------------

/// Tutorial text shown while the player overlaps it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextboxComponent {
    /// Displayed text. May contain any character.
    pub text: String,
}

/// Viewport following the player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraComponent {
    /// Point the viewport is centered on.
    pub center: Vec2,
    /// Viewport width and height.
    pub viewport: Vec2,
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            viewport: Vec2::new(640.0, 360.0),
        }
    }
}
