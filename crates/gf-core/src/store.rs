//! Arena of entities addressed by generational handles.
//!
//! Destroying an entity frees its slot and bumps the slot's generation; stale
//! handles simply stop resolving. Iteration follows insertion order, which is
//! tracked separately from slot order so reused slots do not jump the queue.

use crate::component::AnchorRole;
use crate::entity::{Entity, EntityId};
use crate::error::{CoreError, CoreResult};
use crate::geometry::Vec2;
use crate::query::Query;
use crate::tags::Tags;

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    entity: Option<Entity>,
}

/// Ordered collection of every entity in a level.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    order: Vec<EntityId>,
}

impl EntityStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Insertion and lookup
    // -----------------------------------------------------------------------

    /// Append an entity at the tail of the list. Returns its handle.
    pub fn insert(&mut self, mut entity: Entity) -> EntityId {
        let id = match self.free.pop() {
            Some(index) => EntityId::new(index, self.slots[index as usize].generation),
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot::default());
                EntityId::new(index, 0)
            }
        };
        entity.id = id;
        self.slots[id.index() as usize].entity = Some(entity);
        self.order.push(id);
        id
    }

    /// Whether `id` still refers to a live entity.
    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Look up a live entity. Stale handles return `None`.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.entity.as_ref()
    }

    /// Mutable lookup.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.entity.as_mut()
    }

    /// Like [`EntityStore::get`] but reports a missing entity as an error.
    pub fn require(&self, id: EntityId) -> CoreResult<&Entity> {
        self.get(id).ok_or(CoreError::EntityNotFound(id))
    }

    /// Overwrite a live entity with an edited copy of itself.
    pub fn commit(&mut self, entity: Entity) -> CoreResult<()> {
        let id = entity.id;
        let slot = self.get_mut(id).ok_or(CoreError::EntityNotFound(id))?;
        *slot = entity;
        Ok(())
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// No live entities.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // -----------------------------------------------------------------------
    // Iteration
    // -----------------------------------------------------------------------

    /// Snapshot of live handles in list order.
    ///
    /// Callers that may destroy entities while walking the list iterate this
    /// snapshot and skip handles that no longer resolve.
    pub fn live_ids(&self) -> Vec<EntityId> {
        self.order.clone()
    }

    /// Live entities in list order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|id| self.get(*id))
    }

    /// Live entities carrying every tag in `tags`, in list order.
    pub fn with_tags(&self, tags: Tags) -> impl Iterator<Item = &Entity> {
        self.iter().filter(move |e| e.has(tags))
    }

    /// First live entity carrying every tag in `tags`.
    pub fn first_with(&self, tags: Tags) -> Option<&Entity> {
        self.with_tags(tags).next()
    }

    /// The first player, if any.
    pub fn player_id(&self) -> Option<EntityId> {
        self.first_with(Tags::PLAYER).map(|e| e.id)
    }

    /// The first camera, if any.
    pub fn camera_id(&self) -> Option<EntityId> {
        self.first_with(Tags::CAMERA).map(|e| e.id)
    }

    /// Start a filtered query over the live entities.
    pub fn query(&self) -> Query<'_> {
        Query::new(self)
    }

    // -----------------------------------------------------------------------
    // Destruction
    // -----------------------------------------------------------------------

    /// Destroy an entity.
    ///
    /// Protected entities are refused. A moving platform takes its anchors
    /// with it, and any grappling hook attached to the destroyed entity is
    /// destroyed as well, clearing its owner's reference.
    pub fn destroy(&mut self, id: EntityId) -> CoreResult<Entity> {
        let entity = self.require(id)?;
        if entity.is_protected() {
            return Err(CoreError::Protected(id));
        }
        let anchors = entity
            .components
            .platform
            .as_ref()
            .map(|p| [p.start_anchor, p.end_anchor]);

        let removed = self.remove_slot(id)?;
        if let Some(anchors) = anchors {
            for anchor in anchors {
                // Anchors are protected from direct destruction only.
                let _ = self.remove_slot(anchor);
            }
        }
        self.release_hooks_attached_to(id);
        if let Some(hook) = &removed.components.hook {
            self.clear_hook_reference(hook.owner, id);
        }
        Ok(removed)
    }

    /// Remove every entity, invalidating all outstanding handles.
    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.entity.take().is_some() {
                slot.generation += 1;
                self.free.push(index as u32);
            }
        }
        self.order.clear();
    }

    fn remove_slot(&mut self, id: EntityId) -> CoreResult<Entity> {
        let slot = self
            .slots
            .get_mut(id.index() as usize)
            .filter(|s| s.generation == id.generation())
            .ok_or(CoreError::EntityNotFound(id))?;
        let entity = slot.entity.take().ok_or(CoreError::EntityNotFound(id))?;
        slot.generation += 1;
        self.free.push(id.index());
        self.order.retain(|o| *o != id);
        Ok(entity)
    }

    fn release_hooks_attached_to(&mut self, target: EntityId) {
        let hooks: Vec<(EntityId, EntityId)> = self
            .with_tags(Tags::HOOK)
            .filter_map(|e| {
                let hook = e.components.hook.as_ref()?;
                (hook.attached_to == Some(target)).then_some((e.id, hook.owner))
            })
            .collect();
        for (hook_id, owner) in hooks {
            let _ = self.remove_slot(hook_id);
            self.clear_hook_reference(owner, hook_id);
        }
    }

    fn clear_hook_reference(&mut self, owner: EntityId, hook_id: EntityId) {
        if let Some(player) = self
            .get_mut(owner)
            .and_then(|e| e.components.player.as_mut())
        {
            if player.hook == Some(hook_id) {
                player.hook = None;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Level-wide operations
    // -----------------------------------------------------------------------

    /// Reset every entity back to its origin (level restart).
    pub fn reset_all(&mut self) {
        for slot in &mut self.slots {
            if let Some(entity) = slot.entity.as_mut() {
                entity.reset();
            }
        }
    }

    /// Current track endpoints of a platform, read from its anchors.
    pub fn platform_track(&self, platform: EntityId) -> Option<(Vec2, Vec2)> {
        let p = self.get(platform)?.components.platform.as_ref()?;
        let start = self.get(p.start_anchor)?;
        let end = self.get(p.end_anchor)?;
        Some((anchor_point(start), anchor_point(end)))
    }

    /// The platform an anchor belongs to, and which end it is.
    pub fn anchor_owner(&self, anchor: EntityId) -> Option<(EntityId, AnchorRole)> {
        let a = self.get(anchor)?.components.anchor.as_ref()?;
        Some((a.platform, a.role))
    }
}

/// The track point an anchor marks: the center of its small hitbox.
fn anchor_point(anchor: &Entity) -> Vec2 {
    Vec2::new(
        anchor.origin.x + anchor.size.x / 2.0,
        anchor.origin.y + anchor.size.y / 2.0,
    )
}
