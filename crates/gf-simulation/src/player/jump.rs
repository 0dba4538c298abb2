//! Jump buffering, coyote time and launches.

use std::time::Duration;

use gf_core::component::PlayerComponent;
use gf_core::entity::EntityId;
use gf_core::tags::Tags;

use crate::config::PlayerTuning;
use crate::context::SimContext;
use crate::enemy::kill_enemy;
use crate::event::SimEventKind;

/// Whether a buffered press should turn into a jump at `now`.
///
/// The press must still be inside its buffer window, the player must have
/// had ground beneath it within the coyote window, and it must not already
/// be ascending.
pub fn buffered_jump_ready(player: &PlayerComponent, now: Duration, tuning: &PlayerTuning) -> bool {
    if player.ascending {
        return false;
    }
    let (Some(pressed), Some(grounded)) = (player.last_pressed_jump, player.last_ground_beneath) else {
        return false;
    };
    now.saturating_sub(pressed) <= tuning.jump_buffer(player.gliding)
        && now.saturating_sub(grounded) <= tuning.coyote_window()
}

/// Forget a press that has outlived its buffer window.
pub fn expire_press(player: &mut PlayerComponent, now: Duration, tuning: &PlayerTuning) {
    if let Some(pressed) = player.last_pressed_jump {
        if now.saturating_sub(pressed) > tuning.jump_buffer(player.gliding) {
            player.last_pressed_jump = None;
        }
    }
}

/// Launch the player upward. Jumping off an enemy stomps it and jumps higher.
pub fn launch(ctx: &mut SimContext<'_>, id: EntityId, player: &mut PlayerComponent) {
    let tuning = &ctx.config.player;
    let mut speed = tuning.jump_speed(player.running);
    let stomped = player
        .ground
        .filter(|g| ctx.store.get(*g).is_some_and(|e| e.has(Tags::ENEMY)));
    if stomped.is_some() {
        speed *= tuning.stomp_multiplier;
    }

    player.velocity.y = -speed;
    player.velocity_target.y = 0.0;
    player.ascending = true;
    player.gliding = false;
    player.last_pressed_jump = None;
    player.last_ground_beneath = None;
    player.ground = None;

    if let Some(enemy) = stomped {
        kill_enemy(ctx, enemy, "stomp");
    }
    ctx.emit(
        SimEventKind::Jumped { player: id, stomped },
        format!("player {id} jumped at {speed:.2}"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn pressed_at(press: u64, ground: u64) -> PlayerComponent {
        PlayerComponent {
            last_pressed_jump: Some(ms(press)),
            last_ground_beneath: Some(ms(ground)),
            ..PlayerComponent::default()
        }
    }

    #[test]
    fn press_before_landing_fires_at_the_window_edge() {
        let tuning = PlayerTuning::default();
        let p = pressed_at(1000, 1100);
        assert!(buffered_jump_ready(&p, ms(1100), &tuning));
        let late = Duration::from_millis(1100) + Duration::from_nanos(1);
        let p = PlayerComponent {
            last_ground_beneath: Some(late),
            ..p
        };
        assert!(!buffered_jump_ready(&p, late, &tuning));
    }

    #[test]
    fn gliding_extends_the_buffer() {
        let tuning = PlayerTuning::default();
        let mut p = pressed_at(1000, 1140);
        assert!(!buffered_jump_ready(&p, ms(1140), &tuning));
        p.gliding = true;
        assert!(buffered_jump_ready(&p, ms(1140), &tuning));
    }

    #[test]
    fn coyote_time_after_leaving_a_ledge() {
        let tuning = PlayerTuning::default();
        assert!(buffered_jump_ready(&pressed_at(1080, 1000), ms(1080), &tuning));
        assert!(!buffered_jump_ready(&pressed_at(1120, 1000), ms(1120), &tuning));
    }

    #[test]
    fn never_while_ascending_or_without_ground() {
        let tuning = PlayerTuning::default();
        let mut p = pressed_at(1000, 1000);
        p.ascending = true;
        assert!(!buffered_jump_ready(&p, ms(1000), &tuning));
        p.ascending = false;
        p.last_ground_beneath = None;
        assert!(!buffered_jump_ready(&p, ms(1000), &tuning));
    }

    #[test]
    fn stale_press_expires() {
        let tuning = PlayerTuning::default();
        let mut p = pressed_at(1000, 0);
        expire_press(&mut p, ms(1100), &tuning);
        assert!(p.last_pressed_jump.is_some());
        expire_press(&mut p, ms(1101), &tuning);
        assert!(p.last_pressed_jump.is_none());
    }
}
