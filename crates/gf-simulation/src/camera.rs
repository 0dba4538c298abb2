use gf_core::geometry::{Rect, Vec2};
use gf_core::store::EntityStore;

use crate::context::SimContext;
use crate::error::SimResult;
use crate::system::System;

/// Eases the camera toward the player.
#[derive(Debug, Default)]
pub struct CameraSystem;

impl CameraSystem {
    /// A camera system with nothing cached.
    pub fn new() -> Self {
        Self
    }
}

/// Move the camera's center a fraction of the way toward `target`.
pub fn follow(center: Vec2, target: Vec2, rate: f32) -> Vec2 {
    center.lerp(target, rate.clamp(0.0, 1.0))
}

/// Snap the camera onto `target` with no easing.
pub fn recenter(store: &mut EntityStore, target: Vec2) {
    let Some(camera) = store.camera_id().and_then(|id| store.get_mut(id)) else {
        return;
    };
    if let Some(component) = camera.components.camera.as_mut() {
        component.center = target;
        camera.hitbox = Rect::centered(target, component.viewport);
    }
}

impl System for CameraSystem {
    fn name(&self) -> &str {
        "camera"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let Some(player) = ctx.require_player("camera") else {
            return Ok(());
        };
        let Some(target) = ctx.store.get(player).map(|p| p.hitbox.center()) else {
            return Ok(());
        };
        let rate = ctx.config.camera.follow_rate;
        let Some(camera) = ctx.store.camera_id().and_then(|id| ctx.store.get_mut(id)) else {
            log::warn!("level has no camera to follow the player");
            return Ok(());
        };
        if let Some(component) = camera.components.camera.as_mut() {
            component.center = follow(component.center, target, rate);
            camera.hitbox = Rect::centered(component.center, component.viewport);
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_covers_a_fraction_of_the_gap() {
        let next = follow(Vec2::ZERO, Vec2::new(100.0, -50.0), 0.1);
        assert_eq!(next, Vec2::new(10.0, -5.0));
    }

    #[test]
    fn follow_rate_is_clamped() {
        let target = Vec2::new(3.0, 4.0);
        assert_eq!(follow(Vec2::ZERO, target, 2.0), target);
    }
}
