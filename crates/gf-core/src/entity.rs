use std::fmt;

use serde::{Deserialize, Serialize};

use crate::component::ComponentSet;
use crate::footprint::FootprintProvider;
use crate::geometry::{Rect, Vec2};
use crate::tags::Tags;

/// Generational handle to an entity slot.
///
/// A slot's generation is bumped whenever its entity is destroyed, so a handle
/// held across a destroy never resolves to whatever later reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    /// A handle that never resolves.
    pub const NULL: EntityId = EntityId {
        index: u32::MAX,
        generation: 0,
    };

    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Slot generation at the time the handle was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// The null handle never resolves.
    pub fn is_null(&self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "#null")
        } else {
            write!(f, "#{}v{}", self.index, self.generation)
        }
    }
}

/// Horizontal facing. Drives the ground tie-break and patrol direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    /// Toward negative `x`.
    Left,
    /// Toward positive `x`.
    #[default]
    Right,
}

impl Facing {
    /// `-1.0` for left, `1.0` for right.
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// The opposite direction.
    pub fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Parse `left` or `right`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// The persisted type of an entity. Used for level files, footprints and
/// default tags; simulation behavior keys off [`Tags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// The controllable character.
    Player,
    /// A patrolling walker, killed by stomping.
    Enemy,
    /// Solid, standable tile.
    Block,
    /// Lethal tile.
    Spike,
    /// Solid tile the grappling hook can attach to.
    HookPoint,
    /// Platform travelling between two anchors.
    MovingPlatform,
    /// End of a moving platform's track.
    Anchor,
    /// Unlocks gliding when touched.
    GlidePickup,
    /// Completes the level.
    Exit,
    /// Sets the respawn point.
    Checkpoint,
    /// Shows text while overlapped.
    Textbox,
    /// A fired grappling hook. Never persisted.
    Hook,
    /// The follow camera. Never persisted.
    Camera,
}

impl EntityKind {
    /// Every kind, in the order they are listed to users.
    pub const ALL: [EntityKind; 13] = [
        Self::Player,
        Self::Enemy,
        Self::Block,
        Self::Spike,
        Self::HookPoint,
        Self::MovingPlatform,
        Self::Anchor,
        Self::GlidePickup,
        Self::Exit,
        Self::Checkpoint,
        Self::Textbox,
        Self::Hook,
        Self::Camera,
    ];

    /// Capability tags a freshly created entity of this kind carries.
    pub fn default_tags(self) -> Tags {
        match self {
            Self::Player => Tags::PLAYER | Tags::PERSISTABLE,
            Self::Enemy => Tags::ENEMY | Tags::GROUND | Tags::HOOKABLE | Tags::PERSISTABLE,
            Self::Block => Tags::GEOMETRY | Tags::GROUND | Tags::PERSISTABLE,
            Self::Spike => Tags::GEOMETRY | Tags::GROUND | Tags::HAZARD | Tags::PERSISTABLE,
            Self::HookPoint => {
                Tags::GEOMETRY | Tags::GROUND | Tags::HOOKABLE | Tags::PERSISTABLE
            }
            Self::MovingPlatform => {
                Tags::GEOMETRY
                    | Tags::GROUND
                    | Tags::HOOKABLE
                    | Tags::MOVING_PLATFORM
                    | Tags::PERSISTABLE
            }
            Self::Anchor => Tags::ANCHOR,
            Self::GlidePickup => Tags::GLIDE_PICKUP | Tags::PERSISTABLE,
            Self::Exit => Tags::EXIT | Tags::PERSISTABLE,
            Self::Checkpoint => Tags::CHECKPOINT | Tags::PERSISTABLE,
            Self::Textbox => Tags::TEXTBOX | Tags::PERSISTABLE,
            Self::Hook => Tags::HOOK,
            Self::Camera => Tags::CAMERA,
        }
    }

    /// Pick the kind an editor placement with the given tags should create.
    ///
    /// The most specific capability wins; anything else becomes a plain block.
    pub fn from_tags(tags: Tags) -> Self {
        const PRIORITY: [(Tags, EntityKind); 9] = [
            (Tags::PLAYER, EntityKind::Player),
            (Tags::ENEMY, EntityKind::Enemy),
            (Tags::MOVING_PLATFORM, EntityKind::MovingPlatform),
            (Tags::HAZARD, EntityKind::Spike),
            (Tags::HOOKABLE, EntityKind::HookPoint),
            (Tags::GLIDE_PICKUP, EntityKind::GlidePickup),
            (Tags::EXIT, EntityKind::Exit),
            (Tags::CHECKPOINT, EntityKind::Checkpoint),
            (Tags::TEXTBOX, EntityKind::Textbox),
        ];
        PRIORITY
            .iter()
            .find(|(t, _)| tags.contains(*t))
            .map(|(_, k)| *k)
            .unwrap_or(EntityKind::Block)
    }

    /// Parse the snake_case name used in level files.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// The snake_case name used in level files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Enemy => "enemy",
            Self::Block => "block",
            Self::Spike => "spike",
            Self::HookPoint => "hook_point",
            Self::MovingPlatform => "moving_platform",
            Self::Anchor => "anchor",
            Self::GlidePickup => "glide_pickup",
            Self::Exit => "exit",
            Self::Checkpoint => "checkpoint",
            Self::Textbox => "textbox",
            Self::Hook => "hook",
            Self::Camera => "camera",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Base unit of simulation.
///
/// `hitbox` is always `origin` plus whatever movement accumulated since the
/// last [`Entity::reset`]; it is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Assigned by the store on insertion.
    pub id: EntityId,
    /// Persisted type.
    pub kind: EntityKind,
    /// Capabilities, seeded from the kind.
    pub tags: Tags,
    /// Design-time placement. Survives death and respawn.
    pub origin: Vec2,
    /// Footprint used to derive the hitbox from `origin`.
    pub size: Vec2,
    /// Live bounding box, mutated every tick.
    pub hitbox: Rect,
    /// Facing at the end of the last tick.
    pub facing: Facing,
    /// Killed and waiting to respawn or be removed.
    pub dead: bool,
    /// Soft-removed: skipped by collision and ground queries but still addressable.
    pub disabled: bool,
    /// Typed per-kind state.
    pub components: ComponentSet,
}

impl Entity {
    /// Create an entity of `kind` with its default tags, placed at `origin`.
    pub fn new(kind: EntityKind, origin: Vec2, size: Vec2) -> Self {
        Self {
            id: EntityId::NULL,
            kind,
            tags: kind.default_tags(),
            origin,
            size,
            hitbox: Rect::from_origin(origin, size),
            facing: Facing::Right,
            dead: false,
            disabled: false,
            components: ComponentSet::for_kind(kind),
        }
    }

    /// Create an entity sized by the footprint provider, falling back to one 32x32 tile.
    pub fn spawn(kind: EntityKind, origin: Vec2, footprints: &dyn FootprintProvider) -> Self {
        let size = footprints.footprint(kind).unwrap_or(Vec2::new(32.0, 32.0));
        Self::new(kind, origin, size)
    }

    /// Replace the default tags.
    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    /// Set the initial facing.
    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    /// Replace the default components.
    pub fn with_components(mut self, components: ComponentSet) -> Self {
        self.components = components;
        self
    }

    /// Carries every tag in `tags`.
    pub fn has(&self, tags: Tags) -> bool {
        self.tags.contains(tags)
    }

    /// Participates in collision and ground queries.
    pub fn is_active(&self) -> bool {
        !self.disabled && !self.dead
    }

    /// Protected entities cannot be destroyed.
    pub fn is_protected(&self) -> bool {
        self.tags.intersects(Tags::PROTECTED)
    }

    /// Put the hitbox back on the origin and clear death and soft-removal.
    pub fn reset(&mut self) {
        self.hitbox = Rect::from_origin(self.origin, self.size);
        self.dead = false;
        self.disabled = false;
        if let Some(platform) = self.components.platform.as_mut() {
            platform.current_pos = self.origin;
            platform.last_frame_trajectory = Vec2::ZERO;
            platform.forward = true;
        }
    }

    /// Editor move: change the design-time placement and re-derive the hitbox.
    pub fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
        self.hitbox = Rect::from_origin(origin, self.size);
        if let Some(platform) = self.components.platform.as_mut() {
            platform.current_pos = origin;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entity_hitbox_matches_origin() {
        let e = Entity::new(EntityKind::Block, Vec2::new(10.0, 20.0), Vec2::new(32.0, 16.0));
        assert_eq!(e.hitbox, Rect::new(10.0, 20.0, 32.0, 16.0));
        assert!(e.has(Tags::GEOMETRY | Tags::GROUND));
        assert!(e.id.is_null());
    }

    #[test]
    fn reset_restores_origin_and_clears_death() {
        let mut e = Entity::new(EntityKind::Enemy, Vec2::new(0.0, 0.0), Vec2::new(32.0, 32.0));
        e.hitbox = e.hitbox.translated(Vec2::new(40.0, 5.0));
        e.dead = true;
        e.disabled = true;
        e.reset();
        assert_eq!(e.hitbox.position(), Vec2::new(0.0, 0.0));
        assert!(e.is_active());
    }

    #[test]
    fn kind_from_tags_prefers_specific_capability() {
        assert_eq!(EntityKind::from_tags(Tags::ENEMY | Tags::GROUND), EntityKind::Enemy);
        assert_eq!(EntityKind::from_tags(Tags::GEOMETRY | Tags::HAZARD), EntityKind::Spike);
        assert_eq!(EntityKind::from_tags(Tags::GEOMETRY), EntityKind::Block);
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn facing_sign_and_flip() {
        assert_eq!(Facing::Left.sign(), -1.0);
        assert_eq!(Facing::Right.flipped(), Facing::Left);
    }
}
