use gf_core::component::EnemyState;
use gf_core::entity::{EntityId, Facing};
use gf_core::geometry::{Rect, Vec2};
use gf_core::tags::Tags;

use crate::collision::{ActorRole, CollisionResolver, Motion};
use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::ground::GroundDetector;
use crate::platform::rider_displacement;
use crate::system::System;

/// Patrol and fall behavior for every enemy.
///
/// Must run before the player system so the player sees this tick's enemy
/// positions when resolving stomps and contact.
#[derive(Debug, Default)]
pub struct EnemySystem;

impl EnemySystem {
    /// An enemy system.
    pub fn new() -> Self {
        Self
    }
}

/// Disable an enemy and drop every reference the editor holds to it.
pub fn kill_enemy(ctx: &mut SimContext<'_>, enemy: EntityId, cause: &str) {
    let Some(entity) = ctx.store.get_mut(enemy) else {
        return;
    };
    let Some(state) = entity.components.enemy.as_mut() else {
        return;
    };
    if state.state == EnemyState::Dead {
        return;
    }
    state.state = EnemyState::Dead;
    state.ground = None;
    entity.disabled = true;
    ctx.selection.remove(enemy);
    ctx.emit(
        SimEventKind::EnemyKilled {
            enemy,
            cause: cause.to_string(),
        },
        format!("enemy {enemy} killed by {cause}"),
    );
}

/// Whether a patrolling enemy should turn around before taking `proposed`.
///
/// The ground is re-detected under the proposed box so that walking across
/// a seam between adjacent tiles does not count as leaving the ground.
pub fn should_turn(ctx: &SimContext<'_>, enemy: EntityId, proposed: &Rect, facing: Facing) -> bool {
    let detector = GroundDetector::new(ctx.config.collision.ground_tolerance);
    let Some(ground) = detector
        .detect(ctx.store, enemy, proposed, facing)
        .and_then(|id| ctx.store.get(id))
    else {
        return true;
    };
    let leading = match facing {
        Facing::Right => proposed.right(),
        Facing::Left => proposed.left(),
    };
    leading > ground.hitbox.right() || leading < ground.hitbox.left()
}

impl System for EnemySystem {
    fn name(&self) -> &str {
        "enemies"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let enemies: Vec<EntityId> = ctx.store.with_tags(Tags::ENEMY).map(|e| e.id).collect();
        let detector = GroundDetector::new(ctx.config.collision.ground_tolerance);
        let speed = ctx.config.enemy.patrol_speed;
        let fall_speed = ctx.config.enemy.fall_speed;
        let death_y = ctx.level.meta.death_y;

        for id in enemies {
            let Some(entity) = ctx.store.get(id) else {
                continue;
            };
            let Some(component) = entity.components.enemy.as_ref() else {
                continue;
            };
            if entity.disabled || component.state == EnemyState::Dead {
                continue;
            }
            let mut state = component.state;
            let previous_ground = component.ground;
            let mut facing = entity.facing;
            let mut hitbox = entity.hitbox;

            match state {
                EnemyState::Falling => {
                    hitbox = hitbox.translated(Vec2::new(0.0, fall_speed));
                }
                EnemyState::Patrolling => {
                    // The platform underfoot has already moved this tick.
                    let carried = hitbox.translated(rider_displacement(ctx.store, previous_ground));
                    let proposed = carried.translated(Vec2::new(facing.sign() * speed, 0.0));
                    if should_turn(ctx, id, &proposed, facing) {
                        facing = facing.flipped();
                        hitbox = carried;
                    } else {
                        let motion = Motion::new(carried, &proposed, false);
                        let mut moved = proposed;
                        let resolver = CollisionResolver::new(&ctx.config.collision);
                        let report = resolver.resolve(
                            ctx.store,
                            id,
                            ActorRole::Enemy,
                            &mut moved,
                            &motion,
                            previous_ground,
                        );
                        if report.wall.is_some() {
                            facing = facing.flipped();
                        }
                        hitbox = moved;
                    }
                }
                EnemyState::Dead => {}
            }

            let ground = detector.detect(ctx.store, id, &hitbox, facing);
            if let Some(ground_entity) = ground.and_then(|g| ctx.store.get(g)) {
                hitbox.y = ground_entity.hitbox.top() - hitbox.h;
                if state == EnemyState::Falling {
                    log::debug!("enemy {id} landed on {}", ground_entity.id);
                    state = EnemyState::Patrolling;
                }
            } else if state == EnemyState::Patrolling {
                log::debug!("enemy {id} lost its footing");
                state = EnemyState::Falling;
            }

            if let Some(entity) = ctx.store.get_mut(id) {
                entity.hitbox = hitbox;
                entity.facing = facing;
                if let Some(component) = entity.components.enemy.as_mut() {
                    component.state = state;
                    component.ground = ground;
                }
            }

            if hitbox.top() > death_y {
                kill_enemy(ctx, id, "falling out of the level");
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
