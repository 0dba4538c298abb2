//! Gravity, fall speed and gliding.

use gf_core::component::{MovementMode, PlayerComponent};
use gf_core::geometry::approach;

use crate::config::PlayerTuning;

/// Update vertical velocity for one tick of free movement.
pub fn step(player: &mut PlayerComponent, run_held: bool, tuning: &PlayerTuning) {
    if player.ascending
        && (player.velocity.y - player.velocity_target.y).abs() <= tuning.velocity_tolerance
    {
        player.ascending = false;
        player.velocity_target.y = tuning.max_fall_speed;
    }

    if player.ascending {
        player.gliding = false;
        player.velocity.y = approach(player.velocity.y, player.velocity_target.y, tuning.gravity);
        return;
    }

    if player.ground.is_some() {
        player.gliding = false;
        player.velocity.y = 0.0;
        return;
    }

    if player.velocity_target.y <= 0.0 {
        player.velocity_target.y = tuning.max_fall_speed;
    }
    if player.mode == MovementMode::Glide && run_held && player.velocity.y >= 0.0 {
        player.gliding = true;
        player.velocity.y = tuning.glide_fall_speed;
    } else {
        player.gliding = false;
        player.velocity.y = approach(player.velocity.y, player.velocity_target.y, tuning.fall_gravity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gf_core::entity::EntityId;

    fn jumping(speed: f32) -> PlayerComponent {
        let mut p = PlayerComponent::default();
        p.velocity.y = -speed;
        p.ascending = true;
        p
    }

    #[test]
    fn ascent_lasts_the_documented_number_of_ticks() {
        let tuning = PlayerTuning::default();
        let mut p = jumping(tuning.jump_speed(false));
        let mut ticks = 0;
        while p.ascending {
            step(&mut p, false, &tuning);
            ticks += 1;
            assert!(ticks < 100);
        }
        assert_eq!(ticks, tuning.ascent_ticks(false));
        assert_eq!(p.velocity_target.y, tuning.max_fall_speed);
    }

    #[test]
    fn falls_toward_terminal_speed() {
        let tuning = PlayerTuning::default();
        let mut p = PlayerComponent::default();
        for _ in 0..100 {
            step(&mut p, false, &tuning);
        }
        assert_eq!(p.velocity.y, tuning.max_fall_speed);
    }

    #[test]
    fn glide_requires_mode_and_run() {
        let tuning = PlayerTuning::default();
        let mut p = PlayerComponent::default();
        p.velocity.y = 6.0;
        step(&mut p, true, &tuning);
        assert!(!p.gliding);

        p.mode = MovementMode::Glide;
        step(&mut p, true, &tuning);
        assert!(p.gliding);
        assert_eq!(p.velocity.y, tuning.glide_fall_speed);

        step(&mut p, false, &tuning);
        assert!(!p.gliding);
    }

    #[test]
    fn grounded_player_has_no_vertical_speed() {
        let tuning = PlayerTuning::default();
        let mut p = PlayerComponent::default();
        p.velocity.y = 3.0;
        p.ground = Some(EntityId::NULL);
        step(&mut p, false, &tuning);
        assert_eq!(p.velocity.y, 0.0);
    }
}
