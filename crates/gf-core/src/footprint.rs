use std::collections::HashMap;

use crate::entity::EntityKind;
use crate::geometry::Vec2;

/// Supplies the `(width, height)` of each entity kind.
///
/// The simulation never needs pixel data, only the box an origin point expands into.
pub trait FootprintProvider {
    /// Footprint for `kind`, or `None` if the provider has no entry for it.
    fn footprint(&self, kind: EntityKind) -> Option<Vec2>;
}

/// Built-in footprint table matching the stock sprite sheet.
#[derive(Debug, Clone)]
pub struct DefaultFootprints {
    sizes: HashMap<EntityKind, Vec2>,
}

impl DefaultFootprints {
    /// Edge length of one level tile.
    pub const TILE: f32 = 32.0;

    /// Footprints for every kind, in scene units.
    pub fn new() -> Self {
        let tile = Vec2::new(Self::TILE, Self::TILE);
        let sizes = HashMap::from([
            (EntityKind::Player, Vec2::new(32.0, 48.0)),
            (EntityKind::Enemy, tile),
            (EntityKind::Block, tile),
            (EntityKind::Spike, tile),
            (EntityKind::HookPoint, tile),
            (EntityKind::MovingPlatform, Vec2::new(96.0, 16.0)),
            (EntityKind::Anchor, Vec2::new(8.0, 8.0)),
            (EntityKind::GlidePickup, Vec2::new(24.0, 24.0)),
            (EntityKind::Exit, Vec2::new(32.0, 64.0)),
            (EntityKind::Checkpoint, Vec2::new(32.0, 64.0)),
            (EntityKind::Textbox, Vec2::new(64.0, 64.0)),
            (EntityKind::Hook, Vec2::new(4.0, 4.0)),
            (EntityKind::Camera, Vec2::new(640.0, 360.0)),
        ]);
        Self { sizes }
    }

    /// Override a single entry, e.g. for a reskinned enemy.
    pub fn with_size(mut self, kind: EntityKind, size: Vec2) -> Self {
        self.sizes.insert(kind, size);
        self
    }
}

impl Default for DefaultFootprints {
    fn default() -> Self {
        Self::new()
    }
}

impl FootprintProvider for DefaultFootprints {
    fn footprint(&self, kind: EntityKind) -> Option<Vec2> {
        self.sizes.get(&kind).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_footprint() {
        let fp = DefaultFootprints::new();
        for kind in EntityKind::ALL {
            assert!(fp.footprint(kind).is_some(), "missing footprint for {kind}");
        }
    }

    #[test]
    fn override_replaces_entry() {
        let fp = DefaultFootprints::new().with_size(EntityKind::Enemy, Vec2::new(48.0, 24.0));
        assert_eq!(fp.footprint(EntityKind::Enemy), Some(Vec2::new(48.0, 24.0)));
    }
}
