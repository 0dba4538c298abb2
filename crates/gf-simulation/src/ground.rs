//! "What am I standing on?"

use gf_core::entity::{EntityId, Facing};
use gf_core::geometry::Rect;
use gf_core::store::EntityStore;
use gf_core::tags::Tags;

/// Finds the best supporting surface beneath a rectangle.
#[derive(Debug, Clone, Copy)]
pub struct GroundDetector {
    tolerance: f32,
}

impl GroundDetector {
    /// A detector reaching `tolerance` units below the actor.
    pub fn new(tolerance: f32) -> Self {
        Self { tolerance }
    }

    /// Vertical reach.
    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Whether `candidate` could support `actor`.
    pub fn supports(&self, actor: &Rect, candidate: &Rect) -> bool {
        actor.overlaps_horizontally(candidate)
            && (candidate.top() - actor.bottom()).abs() <= self.tolerance
    }

    /// The ground beneath `hitbox`, ignoring `actor` itself.
    ///
    /// Among several qualifying surfaces the one furthest in the facing
    /// direction wins, so at a seam or ledge the actor is considered to be on
    /// the surface it is walking onto. On equal positions the earliest in
    /// list order wins.
    pub fn detect(
        &self,
        store: &EntityStore,
        actor: EntityId,
        hitbox: &Rect,
        facing: Facing,
    ) -> Option<EntityId> {
        let mut best: Option<(EntityId, f32)> = None;
        for candidate in store.query().tags(Tags::GROUND).active().excluding(actor).iter() {
            if !self.supports(hitbox, &candidate.hitbox) {
                continue;
            }
            let x = candidate.hitbox.x;
            let better = match best {
                None => true,
                Some((_, best_x)) => match facing {
                    Facing::Right => x > best_x,
                    Facing::Left => x < best_x,
                },
            };
            if better {
                best = Some((candidate.id, x));
            }
        }
        best.map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gf_core::entity::{Entity, EntityKind};
    use gf_core::geometry::Vec2;
    use proptest::prelude::*;

    fn block(store: &mut EntityStore, x: f32, y: f32, w: f32, h: f32) -> EntityId {
        store.insert(Entity::new(EntityKind::Block, Vec2::new(x, y), Vec2::new(w, h)))
    }

    fn actor(store: &mut EntityStore, x: f32, y: f32) -> (EntityId, Rect) {
        let id = store.insert(Entity::new(
            EntityKind::Enemy,
            Vec2::new(x, y),
            Vec2::new(32.0, 32.0),
        ));
        (id, store.get(id).unwrap().hitbox)
    }

    #[test]
    fn finds_block_directly_below() {
        let mut store = EntityStore::new();
        let ground = block(&mut store, 0.0, 32.0, 64.0, 32.0);
        let (me, hitbox) = actor(&mut store, 10.0, 0.0);
        let detector = GroundDetector::new(5.0);
        assert_eq!(detector.detect(&store, me, &hitbox, Facing::Right), Some(ground));
    }

    #[test]
    fn ignores_surfaces_out_of_reach_or_disabled() {
        let mut store = EntityStore::new();
        block(&mut store, 0.0, 40.0, 64.0, 32.0);
        let disabled = block(&mut store, 0.0, 32.0, 64.0, 32.0);
        store.get_mut(disabled).unwrap().disabled = true;
        let (me, hitbox) = actor(&mut store, 10.0, 0.0);
        assert_eq!(GroundDetector::new(5.0).detect(&store, me, &hitbox, Facing::Right), None);
    }

    #[test]
    fn actor_is_not_its_own_ground() {
        let mut store = EntityStore::new();
        let (me, _) = actor(&mut store, 0.0, 0.0);
        let below_floor = Rect::new(0.0, -32.0, 32.0, 32.0);
        assert_eq!(GroundDetector::new(5.0).detect(&store, me, &below_floor, Facing::Right), None);
    }

    #[test]
    fn tie_break_follows_facing() {
        let mut store = EntityStore::new();
        let left = block(&mut store, 0.0, 32.0, 32.0, 32.0);
        let right = block(&mut store, 32.0, 32.0, 32.0, 32.0);
        let (me, hitbox) = actor(&mut store, 16.0, 0.0);
        let detector = GroundDetector::new(5.0);
        assert_eq!(detector.detect(&store, me, &hitbox, Facing::Right), Some(right));
        assert_eq!(detector.detect(&store, me, &hitbox, Facing::Left), Some(left));
    }

    proptest! {
        #[test]
        fn atop_within_tolerance_is_found(
            bx in -400i32..400,
            by in -400i32..400,
            bw in 8i32..200,
            offset in 0i32..190,
            gap in -5i32..=5,
        ) {
            let mut store = EntityStore::new();
            let (bx, by, bw) = (bx as f32, by as f32, bw as f32);
            let b = block(&mut store, bx, by, bw, 16.0);
            // Actor starts somewhere over the block and ends within tolerance of its top.
            let ax = bx + (offset as f32).min(bw - 1.0) - 16.0;
            let a = Rect::new(ax, by - 32.0 + gap as f32, 32.0, 32.0);
            let detector = GroundDetector::new(5.0);
            prop_assert_eq!(detector.detect(&store, EntityId::NULL, &a, Facing::Right), Some(b));

            // A second qualifying surface further to the right takes over.
            let c = block(&mut store, bx + 1.0, by, bw, 16.0);
            prop_assert_eq!(detector.detect(&store, EntityId::NULL, &a, Facing::Right), Some(c));
            prop_assert_eq!(detector.detect(&store, EntityId::NULL, &a, Facing::Left), Some(b));
        }
    }
}
