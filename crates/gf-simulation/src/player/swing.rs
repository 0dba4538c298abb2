//! Player movement while hanging from an attached hook.

use gf_core::component::{HookComponent, PlayerComponent};
use gf_core::entity::{EntityId, Facing};
use gf_core::geometry::{Rect, Vec2};
use gf_core::tags::Tags;

use crate::collision::{ActorRole, CollisionReport, CollisionResolver, Motion};
use crate::context::SimContext;
use crate::enemy::kill_enemy;
use crate::event::SimEventKind;
use crate::hook::{self, on_falling_side, swing_position, tangential_velocity};

/// What the swing step did with the player.
#[derive(Debug)]
pub enum SwingOutcome {
    /// Still hanging; the report holds hazards and triggers touched.
    Hanging(CollisionReport),
    /// Jumped off the hook.
    Launched,
}

/// Add a push from held input, only while the swing is heading downward.
pub fn pump(hook: &mut HookComponent, direction: f32, strength: f32) {
    if direction == 0.0 || !on_falling_side(hook.current_angle, hook.angular_velocity) {
        return;
    }
    let toward = (-hook.current_angle.sin()).signum();
    hook.angular_velocity += strength * direction * toward;
}

/// Advance a hooked player by one tick. The hook system has already moved
/// the pendulum, so this places the player on it and handles input.
pub fn step(
    ctx: &mut SimContext<'_>,
    id: EntityId,
    player: &mut PlayerComponent,
    hitbox: &mut Rect,
    facing: &mut Facing,
    hook_id: EntityId,
    mut hook: HookComponent,
) -> SwingOutcome {
    let tuning = &ctx.config.hook;
    let dir = ctx.input.horizontal.sign();
    if dir > 0.0 {
        *facing = Facing::Right;
    } else if dir < 0.0 {
        *facing = Facing::Left;
    }
    pump(&mut hook, dir, tuning.pump_strength);

    player.ground = None;
    player.ascending = false;
    player.gliding = false;
    player.skidding = false;
    player.running = ctx.input.run_held;

    if ctx.input.jump_pressed {
        let tangent = tangential_velocity(
            hook.current_angle,
            hook.angular_velocity,
            hook.current_length,
            ctx.clock.dt(),
        );
        player.velocity = tangent * tuning.launch_multiplier + Vec2::new(0.0, -tuning.launch_boost);
        player.ascending = player.velocity.y < 0.0;
        player.velocity_target = Vec2::new(
            0.0,
            if player.ascending {
                0.0
            } else {
                ctx.config.player.max_fall_speed
            },
        );
        player.last_pressed_jump = None;
        player.last_ground_beneath = None;

        let hooked_enemy = hook
            .attached_to
            .filter(|t| ctx.store.get(*t).is_some_and(|e| e.has(Tags::ENEMY)));
        hook::release(ctx, hook_id);
        player.hook = None;
        if let Some(enemy) = hooked_enemy {
            kill_enemy(ctx, enemy, "hook jump");
        }
        ctx.emit(
            SimEventKind::Jumped {
                player: id,
                stomped: hooked_enemy,
            },
            format!("player {id} jumped off hook {hook_id}"),
        );
        return SwingOutcome::Launched;
    }

    let proposed = Rect::centered(hook.start, hitbox.size());
    let mut blocking = ctx
        .store
        .query()
        .tags(Tags::GEOMETRY)
        .active()
        .excluding(id)
        .overlapping(proposed);
    if let Some(target) = hook.attached_to {
        blocking = blocking.excluding(target);
    }
    let blocked = blocking.first().is_some();

    let previous = *hitbox;
    if blocked {
        log::trace!("swing of player {id} blocked, holding position");
        hook.current_angle = hook.previous_angle;
        hook.angular_velocity = 0.0;
        hook.start = swing_position(hook.end, hook.current_length, hook.current_angle);
        player.velocity = Vec2::ZERO;
    } else {
        player.velocity = proposed.position() - hitbox.position();
        *hitbox = proposed;
    }
    player.velocity_target = Vec2::new(0.0, ctx.config.player.max_fall_speed);

    if let Some(entity) = ctx.store.get_mut(hook_id) {
        entity.components.hook = Some(hook);
    }

    let mut resolved = *hitbox;
    let motion = Motion::new(previous, hitbox, false);
    let report = CollisionResolver::new(&ctx.config.collision).resolve(
        ctx.store,
        id,
        ActorRole::Player,
        &mut resolved,
        &motion,
        None,
    );
    SwingOutcome::Hanging(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    fn hook_at(angle: f32, angular_velocity: f32) -> HookComponent {
        HookComponent {
            owner: EntityId::NULL,
            start: Vec2::ZERO,
            end: Vec2::ZERO,
            launch_angle: angle,
            speed: 0.0,
            current_length: 100.0,
            current_angle: angle,
            angular_velocity,
            previous_angle: angle,
            attached_to: None,
            attach_offset: Vec2::ZERO,
        }
    }

    #[test]
    fn pump_adds_speed_on_the_way_down() {
        // Right of the pivot, swinging down toward the bottom.
        let mut hook = hook_at(-FRAC_PI_4, -1.0);
        pump(&mut hook, -1.0, 0.05);
        assert!(hook.angular_velocity < -1.0);
    }

    #[test]
    fn pump_is_ignored_on_the_way_up() {
        let mut hook = hook_at(-FRAC_PI_4, 1.0);
        pump(&mut hook, 1.0, 0.05);
        assert_eq!(hook.angular_velocity, 1.0);
    }

    #[test]
    fn no_input_no_pump() {
        let mut hook = hook_at(-FRAC_PI_4, -1.0);
        pump(&mut hook, 0.0, 0.05);
        assert_eq!(hook.angular_velocity, -1.0);
    }
}
