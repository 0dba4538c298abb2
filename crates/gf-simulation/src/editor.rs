//! Level editing against the live entity store.
//!
//! Every placement is snapped to the editor grid and refused when it would
//! overlap active geometry, the same rule gameplay relies on for solid tiles.

use gf_core::component::AnchorRole;
use gf_core::entity::{Entity, EntityId, EntityKind};
use gf_core::error::{CoreError, CoreResult};
use gf_core::footprint::FootprintProvider;
use gf_core::geometry::{Rect, Vec2};
use gf_core::level::insert_platform;
use gf_core::persist::platform_entity;
use gf_core::store::EntityStore;
use gf_core::tags::Tags;

use crate::config::SimConfig;

/// Entities picked in the editor, in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<EntityId>,
}

impl Selection {
    /// An empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` is selected.
    pub fn contains(&self, id: EntityId) -> bool {
        self.ids.contains(&id)
    }

    /// Returns `false` if `id` was already selected.
    pub fn insert(&mut self, id: EntityId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Deselect `id`. Returns whether it was selected.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|s| *s != id);
        self.ids.len() != before
    }

    /// Flip membership. Returns whether `id` is selected afterwards.
    pub fn toggle(&mut self, id: EntityId) -> bool {
        if self.remove(id) {
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    /// Selected ids, oldest first.
    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    /// Drop ids whose entities no longer exist.
    pub fn retain_live(&mut self, store: &EntityStore) {
        self.ids.retain(|id| store.contains(*id));
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Number of selected ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Nothing selected.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

fn push_unique(list: &mut Vec<EntityId>, id: EntityId) {
    if !list.contains(&id) {
        list.push(id);
    }
}

/// What [`Editor::add_or_interact`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    /// An existing entity was added to the selection.
    Selected(EntityId),
    /// An existing entity was removed from the selection.
    Deselected(EntityId),
    /// A new entity was placed.
    Added(EntityId),
}

/// Borrowed view of a simulation for editing.
pub struct Editor<'a> {
    store: &'a mut EntityStore,
    selection: &'a mut Selection,
    footprints: &'a dyn FootprintProvider,
    grid: f32,
    platform_speed: f32,
}

impl<'a> Editor<'a> {
    /// Edit `store` with the grid and platform speed from `config`.
    pub fn new(
        store: &'a mut EntityStore,
        selection: &'a mut Selection,
        footprints: &'a dyn FootprintProvider,
        config: &SimConfig,
    ) -> Self {
        Self {
            store,
            selection,
            footprints,
            grid: config.editor.grid,
            platform_speed: config.platform.default_speed,
        }
    }

    /// Top-left corner of the grid cell containing `point`.
    pub fn snap(&self, point: Vec2) -> Vec2 {
        if self.grid <= 0.0 {
            return point;
        }
        Vec2::new(
            (point.x / self.grid).floor() * self.grid,
            (point.y / self.grid).floor() * self.grid,
        )
    }

    fn snap_delta(&self, delta: Vec2) -> Vec2 {
        if self.grid <= 0.0 {
            return delta;
        }
        Vec2::new(
            (delta.x / self.grid).round() * self.grid,
            (delta.y / self.grid).round() * self.grid,
        )
    }

    fn footprint(&self, kind: EntityKind) -> Vec2 {
        self.footprints
            .footprint(kind)
            .unwrap_or(Vec2::new(self.grid, self.grid))
    }

    /// First active geometry overlapping `rect`, ignoring `except`.
    fn blocker(&self, rect: Rect, except: &[EntityId]) -> Option<EntityId> {
        self.store
            .query()
            .tags(Tags::GEOMETRY)
            .active()
            .overlapping(rect)
            .iter()
            .find(|e| !except.contains(&e.id))
            .map(|e| e.id)
    }

    /// Place a new entity of `kind` at the grid cell under `position`.
    ///
    /// The player is a singleton: placing it again moves the existing one.
    pub fn check_and_add(&mut self, position: Vec2, kind: EntityKind) -> CoreResult<EntityId> {
        if matches!(kind, EntityKind::Camera | EntityKind::Anchor | EntityKind::Hook) {
            return Err(CoreError::NotPlaceable(kind));
        }
        let origin = self.snap(position);
        let size = self.footprint(kind);
        let existing_player = match kind {
            EntityKind::Player => self.store.player_id(),
            _ => None,
        };
        let except: Vec<EntityId> = existing_player.into_iter().collect();
        if self.blocker(Rect::from_origin(origin, size), &except).is_some() {
            return Err(CoreError::Occupied {
                x: origin.x,
                y: origin.y,
            });
        }

        if let Some(player) = existing_player.and_then(|id| self.store.get_mut(id)) {
            player.set_origin(origin);
            log::debug!("moved player {} to ({}, {})", player.id, origin.x, origin.y);
            return Ok(player.id);
        }

        let id = match kind {
            EntityKind::MovingPlatform => {
                let end = origin + Vec2::new(3.0 * self.grid, 0.0);
                let platform = platform_entity(origin, end, 1.0, self.platform_speed, self.footprints);
                insert_platform(self.store, platform, end, self.footprints)
            }
            _ => self.store.insert(Entity::spawn(kind, origin, self.footprints)),
        };
        log::debug!("placed {kind} {id} at ({}, {})", origin.x, origin.y);
        Ok(id)
    }

    /// Select or deselect whatever is under `position`, or place something
    /// chosen by `tags` if the cell is empty.
    pub fn add_or_interact(&mut self, position: Vec2, tags: Tags) -> CoreResult<EditorAction> {
        let point = self.snap(position);
        let hit = self
            .store
            .query()
            .active()
            .containing(point)
            .iter()
            .filter(|e| !e.tags.intersects(Tags::CAMERA | Tags::HOOK))
            .last()
            .map(|e| e.id);

        match hit {
            Some(id) if self.selection.toggle(id) => Ok(EditorAction::Selected(id)),
            Some(id) => Ok(EditorAction::Deselected(id)),
            None => {
                let kind = EntityKind::from_tags(tags);
                self.check_and_add(point, kind).map(EditorAction::Added)
            }
        }
    }

    /// Destroy the most recently added entity under `position`.
    pub fn remove_at(&mut self, position: Vec2) -> CoreResult<Option<Entity>> {
        let hit = self
            .store
            .query()
            .containing(position)
            .iter()
            .filter(|e| !e.has(Tags::CAMERA))
            .last()
            .map(|e| e.id);
        let Some(id) = hit else {
            return Ok(None);
        };
        let removed = self.store.destroy(id)?;
        self.selection.retain_live(self.store);
        log::debug!("removed {} {id}", removed.kind);
        Ok(Some(removed))
    }

    /// Move every selected entity by `delta`, snapped to whole grid cells.
    ///
    /// A selected platform drags its anchors, and a moved start anchor drags
    /// its platform. Nothing moves if any moved entity would overlap geometry.
    /// Returns how many entities moved.
    pub fn move_selected(&mut self, delta: Vec2) -> CoreResult<usize> {
        let step = self.snap_delta(delta);
        if step == Vec2::ZERO {
            return Ok(0);
        }
        self.selection.retain_live(self.store);

        let mut moving: Vec<EntityId> = Vec::new();
        let mut platforms: Vec<EntityId> = Vec::new();
        for &id in self.selection.ids() {
            let Some(entity) = self.store.get(id) else {
                continue;
            };
            push_unique(&mut moving, id);
            if let Some(platform) = entity.components.platform.as_ref() {
                push_unique(&mut moving, platform.start_anchor);
                push_unique(&mut moving, platform.end_anchor);
                push_unique(&mut platforms, id);
            }
            if let Some((platform, role)) = self.store.anchor_owner(id) {
                if role == AnchorRole::Start {
                    push_unique(&mut moving, platform);
                }
                push_unique(&mut platforms, platform);
            }
        }

        for &id in &moving {
            let Some(entity) = self.store.get(id) else {
                continue;
            };
            if entity.has(Tags::ANCHOR) {
                continue;
            }
            let target = Rect::from_origin(entity.origin + step, entity.size);
            if self.blocker(target, &moving).is_some() {
                return Err(CoreError::Occupied {
                    x: target.x,
                    y: target.y,
                });
            }
        }

        for &id in &moving {
            if let Some(entity) = self.store.get_mut(id) {
                let origin = entity.origin + step;
                entity.set_origin(origin);
            }
        }
        for &id in &platforms {
            let Some((start, end)) = self.store.platform_track(id) else {
                continue;
            };
            if let Some(platform) = self
                .store
                .get_mut(id)
                .and_then(|e| e.components.platform.as_mut())
            {
                let track = end - start;
                platform.angle = (-track.y).atan2(track.x);
            }
        }
        log::debug!("moved {} entities by ({}, {})", moving.len(), step.x, step.y);
        Ok(moving.len())
    }
}
