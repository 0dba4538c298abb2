use crate::entity::{Entity, EntityId};
use crate::geometry::{Rect, Vec2};
use crate::store::EntityStore;
use crate::tags::Tags;

/// A builder for filtering entities in a store. Results keep list order.
pub struct Query<'s> {
    store: &'s EntityStore,
    all_tags: Tags,
    any_tags: Option<Tags>,
    active_only: bool,
    overlapping: Option<Rect>,
    containing: Option<Vec2>,
    excluding: Vec<EntityId>,
}

impl<'s> Query<'s> {
    /// Match every live entity.
    pub fn new(store: &'s EntityStore) -> Self {
        Self {
            store,
            all_tags: Tags::empty(),
            any_tags: None,
            active_only: false,
            overlapping: None,
            containing: None,
            excluding: Vec::new(),
        }
    }

    /// Require every tag in `tags`.
    pub fn tags(mut self, tags: Tags) -> Self {
        self.all_tags |= tags;
        self
    }

    /// Require at least one tag in `tags`.
    pub fn any_tags(mut self, tags: Tags) -> Self {
        self.any_tags = Some(tags);
        self
    }

    /// Skip disabled and dead entities.
    pub fn active(mut self) -> Self {
        self.active_only = true;
        self
    }

    /// Only entities whose hitbox strictly intersects `rect`.
    pub fn overlapping(mut self, rect: Rect) -> Self {
        self.overlapping = Some(rect);
        self
    }

    /// Only entities whose hitbox contains `point`.
    pub fn containing(mut self, point: Vec2) -> Self {
        self.containing = Some(point);
        self
    }

    /// Skip one entity. Can be called repeatedly.
    pub fn excluding(mut self, id: EntityId) -> Self {
        self.excluding.push(id);
        self
    }

    /// Matches in list order.
    pub fn iter(self) -> impl Iterator<Item = &'s Entity> {
        let store = self.store;
        store.iter().filter(move |e| self.matches(e))
    }

    /// Collect every match.
    pub fn execute(self) -> Vec<&'s Entity> {
        self.iter().collect()
    }

    /// The first match in list order.
    pub fn first(self) -> Option<&'s Entity> {
        self.iter().next()
    }

    /// The last match in list order, i.e. the topmost when drawn.
    pub fn last(self) -> Option<&'s Entity> {
        self.iter().last()
    }

    /// Number of matches.
    pub fn count(self) -> usize {
        self.iter().count()
    }

    fn matches(&self, entity: &Entity) -> bool {
        if !entity.tags.contains(self.all_tags) {
            return false;
        }
        if let Some(any) = self.any_tags {
            if !entity.tags.intersects(any) {
                return false;
            }
        }
        if self.active_only && !entity.is_active() {
            return false;
        }
        if self.excluding.contains(&entity.id) {
            return false;
        }
        if let Some(rect) = self.overlapping {
            if !entity.hitbox.intersects(&rect) {
                return false;
            }
        }
        if let Some(point) = self.containing {
            if !entity.hitbox.contains(point) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;

    fn test_store() -> (EntityStore, EntityId, EntityId, EntityId) {
        let mut store = EntityStore::new();
        let tile = Vec2::new(32.0, 32.0);
        let a = store.insert(Entity::new(EntityKind::Block, Vec2::new(0.0, 0.0), tile));
        let b = store.insert(Entity::new(EntityKind::Spike, Vec2::new(32.0, 0.0), tile));
        let c = store.insert(Entity::new(EntityKind::Enemy, Vec2::new(64.0, 0.0), tile));
        (store, a, b, c)
    }

    #[test]
    fn query_by_tags() {
        let (store, a, b, _) = test_store();
        let ids: Vec<_> = store.query().tags(Tags::GEOMETRY).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(store.query().tags(Tags::HAZARD).count(), 1);
    }

    #[test]
    fn query_active_skips_disabled() {
        let (mut store, _, _, c) = test_store();
        store.get_mut(c).unwrap().disabled = true;
        assert_eq!(store.query().tags(Tags::ENEMY).active().count(), 0);
        assert_eq!(store.query().tags(Tags::ENEMY).count(), 1);
    }

    #[test]
    fn query_overlapping_and_excluding() {
        let (store, a, b, _) = test_store();
        let strip = Rect::new(20.0, 10.0, 20.0, 4.0);
        let hits: Vec<_> = store.query().overlapping(strip).iter().map(|e| e.id).collect();
        assert_eq!(hits, vec![a, b]);
        let hits: Vec<_> = store
            .query()
            .overlapping(strip)
            .excluding(a)
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(hits, vec![b]);
    }

    #[test]
    fn query_containing_last_is_topmost() {
        let (mut store, _, _, _) = test_store();
        let top = store.insert(Entity::new(
            EntityKind::Textbox,
            Vec2::new(0.0, 0.0),
            Vec2::new(64.0, 64.0),
        ));
        let hit = store.query().containing(Vec2::new(5.0, 5.0)).last().unwrap();
        assert_eq!(hit.id, top);
    }
}
