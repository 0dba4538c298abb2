//! Contact classification and resolution for a moving actor.
//!
//! Each obstacle overlapping the actor is checked on its own and yields a
//! [`Contact`]; the caller-facing [`CollisionResolver::resolve`] walks the
//! obstacles in list order and applies them. A hazard ends the walk at once.

use gf_core::entity::{Entity, EntityId};
use gf_core::geometry::{Rect, Vec2};
use gf_core::store::EntityStore;
use gf_core::tags::Tags;

use crate::config::CollisionTuning;

/// The shape of an overlap rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapShape {
    /// Tall or square overlap: a side was struck.
    Wall,
    /// Wide overlap with the obstacle's top above the actor's top.
    Ceiling,
    /// Wide overlap from above.
    Floor,
}

/// Classify an overlap between `actor` and `obstacle`.
///
/// Wall is checked first, so a square overlap is always a wall.
pub fn classify_overlap(intersection: &Rect, actor: &Rect, obstacle: &Rect) -> OverlapShape {
    if intersection.w <= intersection.h {
        OverlapShape::Wall
    } else if obstacle.top() < actor.top() {
        OverlapShape::Ceiling
    } else {
        OverlapShape::Floor
    }
}

/// Which side of an obstacle was struck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallSide {
    /// Actor moving right hit the obstacle's left face.
    Left,
    /// Actor moving left hit the obstacle's right face.
    Right,
}

/// Who is being resolved. Enemies ignore hazards, other enemies and triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRole {
    /// The player: dies to hazards and enemies, touches triggers.
    Player,
    /// An enemy: only solid geometry matters.
    Enemy,
}

/// Non-solid things the player can touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Level exit.
    Exit,
    /// Glide unlock.
    GlidePickup,
    /// Respawn point.
    Checkpoint,
    /// Tutorial text.
    Textbox,
}

impl Trigger {
    fn of(entity: &Entity) -> Option<Trigger> {
        if entity.has(Tags::EXIT) {
            Some(Trigger::Exit)
        } else if entity.has(Tags::GLIDE_PICKUP) {
            Some(Trigger::GlidePickup)
        } else if entity.has(Tags::CHECKPOINT) {
            Some(Trigger::Checkpoint)
        } else if entity.has(Tags::TEXTBOX) {
            Some(Trigger::Textbox)
        } else {
            None
        }
    }
}

/// Outcome of checking one obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contact {
    /// No overlap, or nothing to do.
    None,
    /// Touched something lethal.
    Hazard(EntityId),
    /// Touched an enemy other than by landing on it.
    Enemy(EntityId),
    /// Pushed out sideways.
    Wall(EntityId, WallSide),
    /// Pushed down out of something above.
    Ceiling(EntityId),
    /// Pushed up onto something below.
    Floor(EntityId),
    /// Overlapped a non-solid trigger.
    Trigger(EntityId, Trigger),
}

/// How the actor moved this tick.
#[derive(Debug, Clone, Copy)]
pub struct Motion {
    /// Hitbox before this tick's movement.
    pub previous: Rect,
    /// Displacement applied this tick.
    pub delta: Vec2,
    /// Rising at the start of the tick.
    pub ascending: bool,
}

impl Motion {
    /// Motion from `previous` to `current`.
    pub fn new(previous: Rect, current: &Rect, ascending: bool) -> Self {
        Self {
            previous,
            delta: current.position() - previous.position(),
            ascending,
        }
    }
}

/// Everything that happened while resolving one actor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// Set when a hazard or enemy killed the actor; resolution stopped there.
    pub killed_by: Option<EntityId>,
    /// Last wall the actor was pushed out of.
    pub wall: Option<(EntityId, WallSide)>,
    /// Ceiling the actor bumped.
    pub ceiling: Option<EntityId>,
    /// Floor the actor was pushed onto.
    pub floor: Option<EntityId>,
    /// Triggers overlapped, in list order.
    pub triggers: Vec<(EntityId, Trigger)>,
}

impl CollisionReport {
    /// A hazard or enemy killed the actor.
    pub fn died(&self) -> bool {
        self.killed_by.is_some()
    }
}

/// Resolves contact between one moving actor and everything it overlaps.
#[derive(Debug, Clone)]
pub struct CollisionResolver<'t> {
    tuning: &'t CollisionTuning,
}

impl<'t> CollisionResolver<'t> {
    /// A resolver using `tuning`.
    pub fn new(tuning: &'t CollisionTuning) -> Self {
        Self { tuning }
    }

    /// Check a single obstacle against the actor's current hitbox.
    pub fn check(
        &self,
        role: ActorRole,
        hitbox: &Rect,
        motion: &Motion,
        obstacle: &Entity,
        ground: Option<EntityId>,
    ) -> Contact {
        let is_ground = ground == Some(obstacle.id);
        let Some(overlap) = hitbox.intersection(&obstacle.hitbox) else {
            if role == ActorRole::Player && is_ground && obstacle.has(Tags::HAZARD) {
                return Contact::Hazard(obstacle.id);
            }
            return Contact::None;
        };

        if role == ActorRole::Player && obstacle.has(Tags::HAZARD) {
            return Contact::Hazard(obstacle.id);
        }

        let shape = classify_overlap(&overlap, hitbox, &obstacle.hitbox);

        if obstacle.has(Tags::ENEMY) {
            if role == ActorRole::Enemy {
                return Contact::None;
            }
            if shape == OverlapShape::Floor && !motion.ascending {
                return Contact::Floor(obstacle.id);
            }
            if is_ground || !self.tuning.enemy_contact_kills {
                return Contact::None;
            }
            return Contact::Enemy(obstacle.id);
        }

        if obstacle.has(Tags::GEOMETRY) {
            return match shape {
                OverlapShape::Wall => match wall_side(hitbox, &obstacle.hitbox, motion.delta.x) {
                    Some(side) => Contact::Wall(obstacle.id, side),
                    None => Contact::None,
                },
                OverlapShape::Ceiling if motion.ascending => Contact::Ceiling(obstacle.id),
                OverlapShape::Ceiling => Contact::None,
                OverlapShape::Floor if !motion.ascending && obstacle.has(Tags::GROUND) => {
                    Contact::Floor(obstacle.id)
                }
                OverlapShape::Floor => Contact::None,
            };
        }

        if obstacle.has(Tags::GROUND) && shape == OverlapShape::Floor && !motion.ascending {
            return Contact::Floor(obstacle.id);
        }

        match (role, Trigger::of(obstacle)) {
            (ActorRole::Player, Some(trigger)) => Contact::Trigger(obstacle.id, trigger),
            _ => Contact::None,
        }
    }

    /// Resolve every contact for `actor`, adjusting `hitbox` in place.
    pub fn resolve(
        &self,
        store: &EntityStore,
        actor: EntityId,
        role: ActorRole,
        hitbox: &mut Rect,
        motion: &Motion,
        ground: Option<EntityId>,
    ) -> CollisionReport {
        let mut report = CollisionReport::default();
        for obstacle in store.query().active().excluding(actor).iter() {
            if obstacle
                .tags
                .intersects(Tags::PLAYER | Tags::CAMERA | Tags::HOOK | Tags::ANCHOR)
            {
                continue;
            }
            match self.check(role, hitbox, motion, obstacle, ground) {
                Contact::None => continue,
                Contact::Hazard(id) | Contact::Enemy(id) => {
                    report.killed_by = Some(id);
                    return report;
                }
                Contact::Wall(id, side) => {
                    hitbox.x = motion.previous.x;
                    report.wall = Some((id, side));
                }
                Contact::Ceiling(id) => {
                    hitbox.y = motion.previous.y;
                    report.ceiling = Some(id);
                }
                Contact::Floor(id) => {
                    hitbox.y = obstacle.hitbox.top() - hitbox.h;
                    report.floor = Some(id);
                }
                Contact::Trigger(id, trigger) => report.triggers.push((id, trigger)),
            }
        }
        report
    }
}

/// Side struck, given this tick's horizontal movement. An actor moving left
/// can only strike a right-hand face, and vice versa.
fn wall_side(actor: &Rect, obstacle: &Rect, dx: f32) -> Option<WallSide> {
    let obstacle_center = obstacle.center().x;
    let actor_center = actor.center().x;
    if dx > 0.0 && obstacle_center > actor_center {
        Some(WallSide::Left)
    } else if dx < 0.0 && obstacle_center < actor_center {
        Some(WallSide::Right)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gf_core::entity::EntityKind;
    use proptest::prelude::*;

    fn tuning() -> CollisionTuning {
        CollisionTuning::default()
    }

    fn add(store: &mut EntityStore, kind: EntityKind, x: f32, y: f32, w: f32, h: f32) -> EntityId {
        store.insert(Entity::new(kind, Vec2::new(x, y), Vec2::new(w, h)))
    }

    #[test]
    fn moving_right_into_wall_rolls_back_x() {
        let mut store = EntityStore::new();
        let wall = add(&mut store, EntityKind::Block, 40.0, 0.0, 32.0, 64.0);
        let previous = Rect::new(6.0, 10.0, 32.0, 32.0);
        let mut hitbox = previous.translated(Vec2::new(4.0, 0.0));
        let motion = Motion::new(previous, &hitbox, false);
        let t = tuning();
        let report = CollisionResolver::new(&t).resolve(
            &store,
            EntityId::NULL,
            ActorRole::Player,
            &mut hitbox,
            &motion,
            None,
        );
        assert_eq!(report.wall, Some((wall, WallSide::Left)));
        assert_eq!(hitbox.x, 6.0);
    }

    #[test]
    fn moving_left_cannot_strike_left_face() {
        let mut store = EntityStore::new();
        add(&mut store, EntityKind::Block, 40.0, 0.0, 32.0, 64.0);
        let previous = Rect::new(12.0, 10.0, 32.0, 32.0);
        let mut hitbox = previous.translated(Vec2::new(-2.0, 0.0));
        let motion = Motion::new(previous, &hitbox, false);
        let t = tuning();
        let report = CollisionResolver::new(&t).resolve(
            &store,
            EntityId::NULL,
            ActorRole::Player,
            &mut hitbox,
            &motion,
            None,
        );
        assert_eq!(report.wall, None);
        assert_eq!(hitbox.x, 10.0);
    }

    #[test]
    fn ceiling_only_while_ascending() {
        let mut store = EntityStore::new();
        let roof = add(&mut store, EntityKind::Block, 0.0, 0.0, 96.0, 32.0);
        let previous = Rect::new(20.0, 36.0, 32.0, 32.0);
        let hitbox = previous.translated(Vec2::new(0.0, -6.0));
        let t = tuning();
        let resolver = CollisionResolver::new(&t);

        let mut rising = hitbox;
        let motion = Motion::new(previous, &rising, true);
        let report =
            resolver.resolve(&store, EntityId::NULL, ActorRole::Player, &mut rising, &motion, None);
        assert_eq!(report.ceiling, Some(roof));
        assert_eq!(rising.y, 36.0);

        let mut drifting = hitbox;
        let motion = Motion::new(previous, &drifting, false);
        let report = resolver.resolve(
            &store,
            EntityId::NULL,
            ActorRole::Player,
            &mut drifting,
            &motion,
            None,
        );
        assert_eq!(report.ceiling, None);
    }

    #[test]
    fn falling_onto_block_snaps_to_top() {
        let mut store = EntityStore::new();
        let floor = add(&mut store, EntityKind::Block, 0.0, 100.0, 200.0, 32.0);
        let previous = Rect::new(50.0, 60.0, 32.0, 32.0);
        let mut hitbox = previous.translated(Vec2::new(0.0, 9.0));
        let motion = Motion::new(previous, &hitbox, false);
        let t = tuning();
        let report = CollisionResolver::new(&t).resolve(
            &store,
            EntityId::NULL,
            ActorRole::Player,
            &mut hitbox,
            &motion,
            None,
        );
        assert_eq!(report.floor, Some(floor));
        assert_eq!(hitbox.bottom(), 100.0);
    }

    #[test]
    fn hazard_wins_over_everything() {
        let mut store = EntityStore::new();
        add(&mut store, EntityKind::Block, 40.0, 0.0, 32.0, 64.0);
        let spike = add(&mut store, EntityKind::Spike, 0.0, 40.0, 32.0, 32.0);
        let previous = Rect::new(6.0, 10.0, 32.0, 32.0);
        let mut hitbox = previous.translated(Vec2::new(4.0, 0.0));
        let motion = Motion::new(previous, &hitbox, false);
        let t = tuning();
        let report = CollisionResolver::new(&t).resolve(
            &store,
            EntityId::NULL,
            ActorRole::Player,
            &mut hitbox,
            &motion,
            None,
        );
        assert_eq!(report.killed_by, Some(spike));
    }

    #[test]
    fn standing_on_hazard_kills() {
        let mut store = EntityStore::new();
        let spike = add(&mut store, EntityKind::Spike, 0.0, 32.0, 32.0, 32.0);
        let mut hitbox = Rect::new(0.0, 0.0, 32.0, 32.0);
        let motion = Motion::new(hitbox, &hitbox, false);
        let t = tuning();
        let report = CollisionResolver::new(&t).resolve(
            &store,
            EntityId::NULL,
            ActorRole::Player,
            &mut hitbox,
            &motion,
            Some(spike),
        );
        assert_eq!(report.killed_by, Some(spike));
    }

    #[test]
    fn enemy_side_contact_kills_but_landing_does_not() {
        let mut store = EntityStore::new();
        let enemy = add(&mut store, EntityKind::Enemy, 40.0, 0.0, 32.0, 32.0);
        let t = tuning();
        let resolver = CollisionResolver::new(&t);

        let previous = Rect::new(6.0, 0.0, 32.0, 32.0);
        let mut side = previous.translated(Vec2::new(4.0, 0.0));
        let motion = Motion::new(previous, &side, false);
        let report =
            resolver.resolve(&store, EntityId::NULL, ActorRole::Player, &mut side, &motion, None);
        assert_eq!(report.killed_by, Some(enemy));

        let previous = Rect::new(40.0, -36.0, 32.0, 32.0);
        let mut landing = previous.translated(Vec2::new(0.0, 6.0));
        let motion = Motion::new(previous, &landing, false);
        let report = resolver.resolve(
            &store,
            EntityId::NULL,
            ActorRole::Player,
            &mut landing,
            &motion,
            None,
        );
        assert!(!report.died());
        assert_eq!(report.floor, Some(enemy));
        assert_eq!(landing.bottom(), 0.0);

        // Enemies pass through one another.
        let mut other = previous.translated(Vec2::new(0.0, 30.0));
        let report =
            resolver.resolve(&store, EntityId::NULL, ActorRole::Enemy, &mut other, &motion, None);
        assert_eq!(report, CollisionReport::default());
    }

    #[test]
    fn triggers_are_reported_for_player_only() {
        let mut store = EntityStore::new();
        let exit = add(&mut store, EntityKind::Exit, 0.0, 0.0, 32.0, 64.0);
        let mut hitbox = Rect::new(10.0, 10.0, 32.0, 32.0);
        let motion = Motion::new(hitbox, &hitbox, false);
        let t = tuning();
        let resolver = CollisionResolver::new(&t);
        let report =
            resolver.resolve(&store, EntityId::NULL, ActorRole::Player, &mut hitbox, &motion, None);
        assert_eq!(report.triggers, vec![(exit, Trigger::Exit)]);
        let report =
            resolver.resolve(&store, EntityId::NULL, ActorRole::Enemy, &mut hitbox, &motion, None);
        assert!(report.triggers.is_empty());
    }

    proptest! {
        // A 10-tall, 2-wide overlap is a wall; 2-tall, 10-wide is ceiling or floor.
        #[test]
        fn overlap_shape_is_deterministic(
            ax in -300i32..300,
            ay in -300i32..300,
            aw in 12i32..100,
            ah in 12i32..100,
            dy in 0i32..2,
            ow in 2i32..50,
        ) {
            let (ax, ay, aw, ah) = (ax as f32, ay as f32, aw as f32, ah as f32);
            let actor = Rect::new(ax, ay, aw, ah);

            // Obstacle pokes 2 units into the actor's right side, 10 units tall.
            let tall = Rect::new(ax + aw - 2.0, ay + dy as f32, ow as f32 + 2.0, 10.0);
            let i = actor.intersection(&tall).unwrap();
            prop_assert_eq!((i.w, i.h), (2.0, 10.0));
            prop_assert_eq!(classify_overlap(&i, &actor, &tall), OverlapShape::Wall);

            // Obstacle pokes 2 units into the actor's top, 10 units wide.
            let above = Rect::new(ax + dy as f32, ay - ow as f32, 10.0, ow as f32 + 2.0);
            let i = actor.intersection(&above).unwrap();
            prop_assert_eq!((i.w, i.h), (10.0, 2.0));
            prop_assert_eq!(classify_overlap(&i, &actor, &above), OverlapShape::Ceiling);

            // Same shape from below.
            let below = Rect::new(ax + dy as f32, ay + ah - 2.0, 10.0, ow as f32 + 2.0);
            let i = actor.intersection(&below).unwrap();
            prop_assert_eq!((i.w, i.h), (10.0, 2.0));
            prop_assert_eq!(classify_overlap(&i, &actor, &below), OverlapShape::Floor);
        }
    }
}
