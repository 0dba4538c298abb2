use gf_core::entity::EntityId;
use gf_core::geometry::Vec2;
use gf_core::store::EntityStore;
use gf_core::tags::Tags;

use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::system::System;

/// Advances moving platforms back and forth between their anchors.
///
/// Each platform publishes this tick's displacement in
/// `last_frame_trajectory`; riders add it to their own position after
/// resolving their own movement.
#[derive(Debug, Default)]
pub struct PlatformSystem {
    reversals: u64,
}

impl PlatformSystem {
    /// A platform system with no reversals counted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total reversals since the simulation started.
    pub fn reversals(&self) -> u64 {
        self.reversals
    }
}

/// Result of advancing one platform by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformStep {
    /// New top-left.
    pub position: Vec2,
    /// Direction of travel after the step.
    pub forward: bool,
    /// An anchor was reached this tick.
    pub reversed: bool,
}

/// Move `current` toward the anchor it is heading for, clamping and
/// reversing if the step would reach or pass it on any axis.
pub fn step_platform(current: Vec2, start: Vec2, end: Vec2, speed: f32, forward: bool) -> PlatformStep {
    let track = end - start;
    let length = track.length();
    if length == 0.0 || speed == 0.0 {
        return PlatformStep {
            position: current,
            forward,
            reversed: false,
        };
    }

    let (target, direction) = if forward {
        (end, track * (1.0 / length))
    } else {
        (start, track * (-1.0 / length))
    };
    let step = direction * speed;
    let next = current + step;

    let passed = |from: f32, to: f32, s: f32| {
        (s > 0.0 && to >= from) || (s < 0.0 && to <= from)
    };
    if passed(target.x, next.x, step.x) || passed(target.y, next.y, step.y) {
        return PlatformStep {
            position: target,
            forward: !forward,
            reversed: true,
        };
    }
    PlatformStep {
        position: next,
        forward,
        reversed: false,
    }
}

/// Displacement a rider standing on `ground` should adopt this tick.
pub fn rider_displacement(store: &EntityStore, ground: Option<EntityId>) -> Vec2 {
    ground
        .and_then(|id| store.get(id))
        .filter(|e| e.is_active())
        .and_then(|e| e.components.platform.as_ref())
        .map(|p| p.last_frame_trajectory)
        .unwrap_or(Vec2::ZERO)
}

impl System for PlatformSystem {
    fn name(&self) -> &str {
        "platforms"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let platforms: Vec<EntityId> = ctx
            .store
            .with_tags(Tags::MOVING_PLATFORM)
            .map(|e| e.id)
            .collect();

        for id in platforms {
            let Some((start, end)) = ctx.store.platform_track(id) else {
                log::warn!("platform {id} has lost an anchor, leaving it in place");
                continue;
            };
            let Some(entity) = ctx.store.get_mut(id) else {
                continue;
            };
            if entity.disabled {
                continue;
            }
            let Some(platform) = entity.components.platform.as_mut() else {
                continue;
            };

            let step = step_platform(platform.current_pos, start, end, platform.speed, platform.forward);
            platform.last_frame_trajectory = step.position - platform.current_pos;
            platform.current_pos = step.position;
            platform.forward = step.forward;
            entity.hitbox = entity.hitbox.with_position(step.position);

            if step.reversed {
                self.reversals += 1;
                let heading = if step.forward { "start" } else { "end" };
                ctx.emit(
                    SimEventKind::PlatformReversed { platform: id },
                    format!("platform {id} reached its {heading} anchor"),
                );
            }
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
