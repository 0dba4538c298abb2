//! The player state machine.
//!
//! Each tick the player is either dead (and respawns), hanging from a hook,
//! or moving freely. Free movement runs horizontal input, vertical physics,
//! collision, triggers, ground detection and the jump buffer, in that order.

pub mod horizontal;
pub mod jump;
pub mod respawn;
pub mod swing;
pub mod vertical;

use gf_core::component::{MovementMode, PlayerComponent};
use gf_core::entity::{EntityId, Facing};
use gf_core::geometry::Rect;

use crate::collision::{ActorRole, CollisionReport, CollisionResolver, Motion, Trigger};
use crate::context::{LevelStatus, SimContext};
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::ground::GroundDetector;
use crate::hook;
use crate::platform::rider_displacement;
use crate::system::System;

pub use respawn::{die, respawn};
use swing::SwingOutcome;

/// Drives the single player entity.
#[derive(Debug, Default)]
pub struct PlayerSystem {
    deaths: u64,
}

impl PlayerSystem {
    /// A player system with no deaths counted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deaths seen by this system.
    pub fn deaths(&self) -> u64 {
        self.deaths
    }

    fn free_step(
        &mut self,
        ctx: &mut SimContext<'_>,
        id: EntityId,
        player: &mut PlayerComponent,
        hitbox: &mut Rect,
        facing: &mut Facing,
    ) -> Option<String> {
        let now = ctx.clock.now();
        let tuning = &ctx.config.player;

        horizontal::step(player, facing, ctx.input, tuning);
        if ctx.input.jump_pressed {
            player.last_pressed_jump = Some(now);
        }
        vertical::step(player, ctx.input.run_held, tuning);

        let previous = *hitbox;
        *hitbox = hitbox.translated(player.velocity);
        let motion = Motion::new(previous, hitbox, player.ascending);
        let report = CollisionResolver::new(&ctx.config.collision).resolve(
            ctx.store,
            id,
            ActorRole::Player,
            hitbox,
            &motion,
            player.ground,
        );
        if let Some(killer) = report.killed_by {
            return Some(format!("touched {killer}"));
        }
        if report.ceiling.is_some() {
            let collision = &ctx.config.collision;
            player.velocity.y = collision
                .ceiling_bounce
                .apply(player.velocity.y, collision.ceiling_damping);
            player.velocity_target.y = collision.ceiling_fall_target;
            player.ascending = false;
        }
        apply_triggers(ctx, id, player, &report);

        if !player.ascending {
            *hitbox = hitbox.translated(rider_displacement(ctx.store, player.ground));
        }

        let detector = GroundDetector::new(ctx.config.collision.ground_tolerance);
        let ground = detector.detect(ctx.store, id, hitbox, *facing);
        let surface = ground
            .and_then(|g| ctx.store.get(g))
            .map(|s| (s.id, s.hitbox.top()));
        match surface {
            Some((surface_id, top)) if !player.ascending && player.velocity.y >= 0.0 => {
                hitbox.y = top - hitbox.h;
                if player.ground.is_none() {
                    player.last_landed = Some(now);
                    ctx.emit(
                        SimEventKind::Landed {
                            entity: id,
                            on: surface_id,
                        },
                        format!("player {id} landed on {surface_id}"),
                    );
                }
                player.velocity.y = 0.0;
                player.velocity_target.y = 0.0;
                player.gliding = false;
                player.last_ground_beneath = Some(now);
                player.ground = Some(surface_id);
            }
            _ => {
                player.ground = None;
                if !player.ascending && player.velocity_target.y <= 0.0 {
                    player.velocity_target.y = ctx.config.player.max_fall_speed;
                }
            }
        }

        if jump::buffered_jump_ready(player, now, &ctx.config.player) {
            jump::launch(ctx, id, player);
        } else {
            jump::expire_press(player, now, &ctx.config.player);
        }
        None
    }
}

/// React to every trigger the player touched this tick.
fn apply_triggers(ctx: &mut SimContext<'_>, id: EntityId, player: &mut PlayerComponent, report: &CollisionReport) {
    let mut textbox = None;
    for &(other, trigger) in &report.triggers {
        match trigger {
            Trigger::Exit => {
                if ctx.level.status == LevelStatus::Playing {
                    ctx.level.status = LevelStatus::Completed;
                    ctx.emit(
                        SimEventKind::LevelCompleted { player: id, exit: other },
                        format!("level \"{}\" completed", ctx.level.meta.name),
                    );
                }
            }
            Trigger::GlidePickup => {
                player.mode = MovementMode::Glide;
                disable(ctx, other);
                ctx.emit(
                    SimEventKind::GlideUnlocked { player: id },
                    format!("player {id} picked up glide"),
                );
            }
            Trigger::Checkpoint => {
                if player.checkpoint != Some(other) {
                    player.checkpoint = Some(other);
                    disable(ctx, other);
                    ctx.emit(
                        SimEventKind::CheckpointCollected {
                            player: id,
                            checkpoint: other,
                        },
                        format!("player {id} reached checkpoint {other}"),
                    );
                }
            }
            Trigger::Textbox => {
                textbox.get_or_insert(other);
            }
        }
    }

    if textbox != player.textbox {
        if let Some(old) = player.textbox {
            ctx.emit(
                SimEventKind::TextboxExited {
                    player: id,
                    textbox: old,
                },
                format!("player {id} left textbox {old}"),
            );
        }
        if let Some(new) = textbox {
            let text = ctx
                .store
                .get(new)
                .and_then(|e| e.components.textbox.as_ref())
                .map(|t| t.text.clone())
                .unwrap_or_default();
            ctx.emit(
                SimEventKind::TextboxEntered {
                    player: id,
                    textbox: new,
                },
                format!("player {id} reads \"{text}\""),
            );
        }
        player.textbox = textbox;
    }
}

fn disable(ctx: &mut SimContext<'_>, id: EntityId) {
    if let Some(entity) = ctx.store.get_mut(id) {
        entity.disabled = true;
    }
}

impl System for PlayerSystem {
    fn name(&self) -> &str {
        "player"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let Some(id) = ctx.require_player("player") else {
            return Ok(());
        };
        let Some(entity) = ctx.store.get(id) else {
            return Ok(());
        };
        if entity.dead {
            respawn(ctx, id);
            return Ok(());
        }
        let mut hitbox = entity.hitbox;
        let mut facing = entity.facing;
        let mut player = entity.components.player.clone().unwrap_or_default();

        // The hook reference can go stale when its target was destroyed.
        if player.hook.is_some_and(|h| !ctx.store.contains(h)) {
            player.hook = None;
        }

        if ctx.input.interact_pressed {
            match player.hook {
                Some(existing) => {
                    hook::release(ctx, existing);
                    player.hook = None;
                }
                None => {
                    commit(ctx, id, hitbox, facing, &player);
                    player.hook = hook::fire(ctx, id);
                }
            }
        }

        let attached = player.hook.and_then(|h| {
            ctx.store
                .get(h)
                .and_then(|e| e.components.hook.clone())
                .filter(|c| c.is_attached())
                .map(|c| (h, c))
        });

        let death = match attached {
            Some((hook_id, component)) => {
                match swing::step(ctx, id, &mut player, &mut hitbox, &mut facing, hook_id, component) {
                    SwingOutcome::Hanging(report) => match report.killed_by {
                        Some(killer) => Some(format!("touched {killer}")),
                        None => {
                            apply_triggers(ctx, id, &mut player, &report);
                            None
                        }
                    },
                    SwingOutcome::Launched => None,
                }
            }
            None => self.free_step(ctx, id, &mut player, &mut hitbox, &mut facing),
        };

        commit(ctx, id, hitbox, facing, &player);

        let cause = death.or_else(|| {
            (hitbox.top() > ctx.level.meta.death_y).then(|| "fell out of the level".to_string())
        });
        if let Some(cause) = cause {
            self.deaths += 1;
            die(ctx, id, &cause);
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

fn commit(ctx: &mut SimContext<'_>, id: EntityId, hitbox: Rect, facing: Facing, player: &PlayerComponent) {
    if let Some(entity) = ctx.store.get_mut(id) {
        entity.hitbox = hitbox;
        entity.facing = facing;
        entity.components.player = Some(player.clone());
    }
}
