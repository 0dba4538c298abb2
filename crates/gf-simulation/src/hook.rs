//! Grappling hook: a projectile that turns into a pendulum once it bites.
//!
//! Angles use the usual math convention with `y` pointing up, while scene
//! coordinates have `y` pointing down. The swinging end therefore sits at
//! `end + (L cos a, -L sin a)`, and a hook hanging straight down has
//! `a == -PI/2`.

use std::f32::consts::PI;

use gf_core::component::HookComponent;
use gf_core::entity::{Entity, EntityId, EntityKind, Facing};
use gf_core::geometry::{Rect, Vec2};
use gf_core::tags::Tags;

use crate::config::HookTuning;
use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::system::System;

/// Unit vector for an angle in y-up convention, expressed in scene axes.
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), -angle.sin())
}

/// Position of the swinging end given the fixed end.
pub fn swing_position(end: Vec2, length: f32, angle: f32) -> Vec2 {
    end + direction(angle) * length
}

/// Angle of `start` as seen from `end`.
pub fn angle_between(end: Vec2, start: Vec2) -> f32 {
    let offset = start - end;
    (-offset.y).atan2(offset.x)
}

/// Scene-space displacement per tick of the swinging end.
pub fn tangential_velocity(angle: f32, angular_velocity: f32, length: f32, dt: f32) -> Vec2 {
    Vec2::new(-angle.sin(), -angle.cos()) * (angular_velocity * length * dt)
}

/// Angular velocity that matches the tangential part of a per-tick velocity.
pub fn angular_velocity_from(velocity: Vec2, angle: f32, length: f32, dt: f32) -> f32 {
    if length <= f32::EPSILON || dt <= 0.0 {
        return 0.0;
    }
    let tangent = Vec2::new(-angle.sin(), -angle.cos());
    velocity.dot(tangent) / (length * dt)
}

/// One semi-implicit Euler step of the damped pendulum.
pub fn pendulum_step(
    angle: f32,
    angular_velocity: f32,
    length: f32,
    tuning: &HookTuning,
    dt: f32,
) -> (f32, f32) {
    let length = length.max(1.0);
    let acceleration = -tuning.gravity * angle.cos() / length - tuning.damping * angular_velocity;
    let angular_velocity = angular_velocity + acceleration * dt;
    (angle + angular_velocity * dt, angular_velocity)
}

/// Whether the swinging end is currently moving downward.
pub fn on_falling_side(angle: f32, angular_velocity: f32) -> bool {
    angle.cos() * angular_velocity < 0.0
}

/// Throw a hook from `owner`'s center. Returns the new hook.
pub fn fire(ctx: &mut SimContext<'_>, owner: EntityId) -> Option<EntityId> {
    let entity = ctx.store.get(owner)?;
    let hand = entity.hitbox.center();
    let up = ctx.config.hook.launch_angle_deg.to_radians();
    let launch_angle = match entity.facing {
        Facing::Right => up,
        Facing::Left => PI - up,
    };

    let mut hook = Entity::spawn(EntityKind::Hook, hand, ctx.footprints);
    hook.hitbox = Rect::centered(hand, hook.size);
    hook.components.hook = Some(HookComponent {
        owner,
        start: hand,
        end: hand,
        launch_angle,
        speed: ctx.config.hook.launch_speed,
        current_length: 0.0,
        current_angle: launch_angle,
        angular_velocity: 0.0,
        previous_angle: launch_angle,
        attached_to: None,
        attach_offset: Vec2::ZERO,
    });
    let id = ctx.store.insert(hook);
    if let Some(player) = ctx
        .store
        .get_mut(owner)
        .and_then(|e| e.components.player.as_mut())
    {
        player.hook = Some(id);
    }
    ctx.emit(
        SimEventKind::HookFired { hook: id, owner },
        format!("hook {id} fired by {owner}"),
    );
    Some(id)
}

/// Destroy a hook and clear its owner's reference.
pub fn release(ctx: &mut SimContext<'_>, hook: EntityId) {
    let Ok(removed) = ctx.store.destroy(hook) else {
        return;
    };
    let owner = removed
        .components
        .hook
        .as_ref()
        .map(|h| h.owner)
        .unwrap_or(EntityId::NULL);
    ctx.emit(
        SimEventKind::HookReleased { hook, owner },
        format!("hook {hook} released"),
    );
}

/// Drives every hook: extension, attachment, and the pendulum.
#[derive(Debug, Default)]
pub struct HookSystem;

impl HookSystem {
    /// A hook system.
    pub fn new() -> Self {
        Self
    }

    fn extend(ctx: &mut SimContext<'_>, id: EntityId, mut hook: HookComponent, hand: Vec2, owner_velocity: Vec2) {
        let tuning = &ctx.config.hook;
        hook.speed += tuning.acceleration;
        hook.start = hand;
        let dir = direction(hook.launch_angle);
        let mut projected = hook.end + dir * hook.speed;
        let reach = projected.distance(hand);
        let mut exhausted = false;
        if reach >= tuning.max_length {
            projected = hand + (projected - hand) * (tuning.max_length / reach);
            exhausted = true;
        }

        let samples = tuning.samples.max(1);
        let mut bite = None;
        for i in 1..=samples {
            let point = hook.end.lerp(projected, i as f32 / samples as f32);
            let target = ctx
                .store
                .query()
                .tags(Tags::HOOKABLE)
                .active()
                .excluding(hook.owner)
                .containing(point)
                .first();
            if let Some(target) = target {
                bite = Some((target.id, target.hitbox.position(), point));
                break;
            }
        }

        if let Some((target, target_pos, point)) = bite {
            hook.end = point;
            hook.current_length = point.distance(hand).max(1.0);
            hook.current_angle = angle_between(point, hand);
            hook.previous_angle = hook.current_angle;
            hook.angular_velocity =
                angular_velocity_from(owner_velocity, hook.current_angle, hook.current_length, ctx.clock.dt());
            hook.attached_to = Some(target);
            hook.attach_offset = point - target_pos;
            let length = hook.current_length;
            write_back(ctx, id, hook);
            ctx.emit(
                SimEventKind::HookAttached { hook: id, to: target },
                format!("hook {id} attached to {target} at length {length:.1}"),
            );
            return;
        }

        if exhausted {
            let _ = ctx.store.destroy(id);
            ctx.emit(
                SimEventKind::HookMissed { hook: id },
                format!("hook {id} found nothing to grab"),
            );
            return;
        }

        hook.end = projected;
        hook.current_length = projected.distance(hand);
        write_back(ctx, id, hook);
    }

    fn swing(ctx: &mut SimContext<'_>, id: EntityId, mut hook: HookComponent, pivot: Vec2) {
        hook.end = pivot;
        hook.previous_angle = hook.current_angle;
        let (angle, angular_velocity) = pendulum_step(
            hook.current_angle,
            hook.angular_velocity,
            hook.current_length,
            &ctx.config.hook,
            ctx.clock.dt(),
        );
        hook.current_angle = angle;
        hook.angular_velocity = angular_velocity;
        hook.start = swing_position(pivot, hook.current_length, angle);
        write_back(ctx, id, hook);
    }
}

fn write_back(ctx: &mut SimContext<'_>, id: EntityId, hook: HookComponent) {
    if let Some(entity) = ctx.store.get_mut(id) {
        entity.hitbox = Rect::centered(hook.end, entity.size);
        entity.components.hook = Some(hook);
    }
}

impl System for HookSystem {
    fn name(&self) -> &str {
        "hooks"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let hooks: Vec<EntityId> = ctx.store.with_tags(Tags::HOOK).map(|e| e.id).collect();
        for id in hooks {
            let Some(hook) = ctx.store.get(id).and_then(|e| e.components.hook.clone()) else {
                continue;
            };
            let owner = ctx
                .store
                .get(hook.owner)
                .filter(|o| o.is_active())
                .map(|o| {
                    let velocity = o
                        .components
                        .player
                        .as_ref()
                        .map(|p| p.velocity)
                        .unwrap_or(Vec2::ZERO);
                    (o.hitbox.center(), velocity)
                });
            let Some((hand, velocity)) = owner else {
                release(ctx, id);
                continue;
            };

            match hook.attached_to {
                None => Self::extend(ctx, id, hook, hand, velocity),
                Some(target) => {
                    let pivot = ctx
                        .store
                        .get(target)
                        .filter(|t| t.is_active())
                        .map(|t| t.hitbox.position() + hook.attach_offset);
                    match pivot {
                        Some(pivot) => Self::swing(ctx, id, hook, pivot),
                        None => {
                            log::debug!("hook {id} lost its target {target}");
                            release(ctx, id);
                        }
                    }
                }
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
