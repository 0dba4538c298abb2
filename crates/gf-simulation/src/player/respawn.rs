//! Death and respawn at the last checkpoint.

use gf_core::component::{EnemyState, PlayerComponent};
use gf_core::entity::EntityId;
use gf_core::geometry::{Rect, Vec2};
use gf_core::store::EntityStore;
use gf_core::tags::Tags;

use crate::camera;
use crate::context::SimContext;
use crate::event::SimEventKind;
use crate::hook;

/// Mark the player dead. It comes back on the next tick.
pub fn die(ctx: &mut SimContext<'_>, id: EntityId, cause: &str) {
    let hook = {
        let Some(entity) = ctx.store.get_mut(id) else {
            return;
        };
        if entity.dead {
            return;
        }
        entity.dead = true;
        entity.components.player.as_ref().and_then(|p| p.hook)
    };
    if let Some(hook) = hook {
        hook::release(ctx, hook);
    }
    ctx.emit(
        SimEventKind::PlayerDied {
            player: id,
            cause: cause.to_string(),
        },
        format!("player {id} died: {cause}"),
    );
}

/// Where the player reappears: standing in its last checkpoint, or at its
/// level origin.
pub fn spawn_point(store: &EntityStore, id: EntityId) -> Option<Vec2> {
    let entity = store.get(id)?;
    let checkpoint = entity
        .components
        .player
        .as_ref()
        .and_then(|p| p.checkpoint)
        .and_then(|c| store.get(c));
    Some(match checkpoint {
        Some(c) => Vec2::new(c.origin.x, c.origin.y + c.size.y - entity.size.y),
        None => entity.origin,
    })
}

/// Bring every killed enemy back to where the level placed it.
pub fn reset_dead_enemies(store: &mut EntityStore) -> usize {
    let dead: Vec<EntityId> = store
        .with_tags(Tags::ENEMY)
        .filter(|e| {
            e.components
                .enemy
                .as_ref()
                .is_some_and(|c| c.state == EnemyState::Dead)
        })
        .map(|e| e.id)
        .collect();
    for &id in &dead {
        if let Some(enemy) = store.get_mut(id) {
            enemy.reset();
            if let Some(component) = enemy.components.enemy.as_mut() {
                component.state = EnemyState::Falling;
                component.ground = None;
            }
        }
    }
    dead.len()
}

/// Continue after a death.
pub fn respawn(ctx: &mut SimContext<'_>, id: EntityId) {
    if let Some(hook) = ctx
        .store
        .get(id)
        .and_then(|e| e.components.player.as_ref())
        .and_then(|p| p.hook)
    {
        hook::release(ctx, hook);
    }

    let Some(position) = spawn_point(ctx.store, id) else {
        return;
    };
    let Some(entity) = ctx.store.get_mut(id) else {
        return;
    };
    entity.dead = false;
    entity.hitbox = Rect::from_origin(position, entity.size);
    let center = entity.hitbox.center();
    let player = entity
        .components
        .player
        .get_or_insert_with(PlayerComponent::default);
    player.clear_transient();
    player.hook = None;

    camera::recenter(ctx.store, center);
    if ctx.config.reset_enemies_on_continue {
        let revived = reset_dead_enemies(ctx.store);
        if revived > 0 {
            log::debug!("revived {revived} enemies for the retry");
        }
    }
    ctx.emit(
        SimEventKind::PlayerRespawned { player: id },
        format!("player {id} respawned at ({:.0}, {:.0})", position.x, position.y),
    );
}
