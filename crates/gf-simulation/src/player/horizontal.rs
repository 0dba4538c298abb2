//! Walking, running and skidding.

use gf_core::component::PlayerComponent;
use gf_core::entity::Facing;
use gf_core::geometry::approach;

use crate::config::PlayerTuning;
use crate::input::{HorizontalIntent, InputSnapshot};

/// Update horizontal velocity and facing from the held direction.
///
/// Holding a direction accelerates toward walk or run speed. Holding the
/// opposite direction brakes at the active rate and may start a skid;
/// releasing everything coasts down at the passive rate.
pub fn step(player: &mut PlayerComponent, facing: &mut Facing, input: &InputSnapshot, tuning: &PlayerTuning) {
    player.running = input.run_held;
    let max = if player.running {
        tuning.run_speed
    } else {
        tuning.walk_speed
    };
    let vx = player.velocity.x;

    let dir = input.horizontal.sign();
    if input.horizontal == HorizontalIntent::Stop {
        player.velocity_target.x = 0.0;
        player.velocity.x = approach(vx, 0.0, tuning.passive_deceleration);
    } else {
        *facing = if dir > 0.0 { Facing::Right } else { Facing::Left };
        player.velocity_target.x = dir * max;
        let opposing = vx != 0.0 && vx.signum() != dir;
        if opposing {
            if vx.abs() >= tuning.skid_threshold {
                player.skidding = true;
            }
            player.velocity.x = approach(vx, player.velocity_target.x, tuning.active_deceleration);
        } else {
            player.velocity.x = approach(vx, player.velocity_target.x, tuning.acceleration);
        }
    }

    let vx = player.velocity.x;
    if player.skidding && (vx == 0.0 || (dir != 0.0 && vx.signum() == dir)) {
        player.skidding = false;
    }
}
