//! Integration tests for core gameplay behavior.
use std::time::Duration;

use gf_core::component::{EnemyState, MovementMode};
use gf_core::entity::{EntityId, EntityKind, Facing};
use gf_core::footprint::DefaultFootprints;
use gf_core::level::Level;
use gf_core::tags::Tags;
use gf_simulation::{
    HorizontalIntent, InputSnapshot, LevelStatus, ManualClock, SimConfig, SimEventKind, Simulation,
};

const FLOOR: &str = "type=block;x=0;y=352;w=640;h=32";

fn sim_from(lines: &[&str]) -> Simulation {
    let text = lines.join("\n");
    let (level, report) = Level::parse(&text, &DefaultFootprints::new());
    assert!(report.is_clean(), "level did not load cleanly: {:?}", report.skipped);
    Simulation::standard(level, SimConfig::default()).unwrap()
}

fn first_of(sim: &Simulation, kind: EntityKind) -> EntityId {
    sim.store().iter().find(|e| e.kind == kind).unwrap().id
}

fn count(sim: &Simulation, pred: impl Fn(&SimEventKind) -> bool) -> usize {
    sim.events().count_where(pred)
}

fn jumped(sim: &Simulation) -> usize {
    count(sim, |k| matches!(k, SimEventKind::Jumped { .. }))
}

#[test]
fn jump_ascent_ends_after_the_expected_number_of_ticks() {
    let mut sim = sim_from(&["type=player;x=64;y=304", FLOOR]);
    sim.run(2).unwrap();
    assert!(sim.player_state().unwrap().is_grounded());

    sim.set_input(InputSnapshot::idle().with_jump(true));
    sim.tick().unwrap();
    sim.set_input(InputSnapshot::idle());
    assert!(sim.player_state().unwrap().ascending);
    assert_eq!(jumped(&sim), 1);

    let ticks = sim.config().player.ascent_ticks(false);
    sim.run(u64::from(ticks - 1)).unwrap();
    assert!(sim.player_state().unwrap().ascending);
    sim.tick().unwrap();
    let state = sim.player_state().unwrap();
    assert!(!state.ascending);
    assert!(state.velocity.y > 0.0);
}

#[test]
fn bumping_a_ceiling_ends_the_ascent_and_bounces_down() {
    let mut sim = sim_from(&[
        "type=player;x=64;y=304",
        FLOOR,
        "type=block;x=0;y=232;w=640;h=32",
    ]);
    sim.run(2).unwrap();
    assert!(sim.player_state().unwrap().is_grounded());

    sim.set_input(InputSnapshot::idle().with_jump(true));
    sim.tick().unwrap();
    sim.set_input(InputSnapshot::idle());

    let ascent = sim.config().player.ascent_ticks(false);
    let mut rising = sim.player_state().unwrap().velocity.y;
    let mut bounce = None;
    for tick in 1..ascent {
        sim.tick().unwrap();
        let state = sim.player_state().unwrap();
        if !state.ascending {
            bounce = Some((tick, state.velocity, state.velocity_target));
            break;
        }
        rising = state.velocity.y;
    }
    let (tick, velocity, target) = bounce.expect("the ceiling should end the ascent early");
    assert!(tick < ascent);
    assert!(rising < 0.0);
    assert!(velocity.y > 0.0, "vertical velocity should flip downward");
    assert!(velocity.y < rising.abs(), "the bounce should be damped");
    assert_eq!(target.y, sim.config().collision.ceiling_fall_target);
    assert!(sim.player().unwrap().hitbox.top() >= 264.0);

    sim.run(30).unwrap();
    assert!(sim.player_state().unwrap().is_grounded());
    assert_eq!(sim.player().unwrap().hitbox.bottom(), 352.0);
    assert_eq!(count(&sim, |k| matches!(k, SimEventKind::PlayerDied { .. })), 0);
}

fn buffered_landing(landing_time: Duration) -> Simulation {
    // Bottom starts 20 units above the floor; the player lands on tick 7.
    let clock = ManualClock::new();
    let mut sim = sim_from(&["type=player;x=64;y=284", FLOOR]).with_clock(Box::new(clock.clone()));

    clock.set(Duration::from_millis(1000));
    sim.set_input(InputSnapshot::idle().with_jump(true));
    sim.tick().unwrap();
    sim.set_input(InputSnapshot::idle());
    sim.run(5).unwrap();
    assert!(sim.player_state().unwrap().ground.is_none());

    clock.set(landing_time);
    sim.tick().unwrap();
    sim
}

#[test]
fn press_before_landing_fires_on_the_window_edge() {
    let sim = buffered_landing(Duration::from_millis(1100));
    assert_eq!(jumped(&sim), 1);
    assert!(sim.player_state().unwrap().ascending);
}

#[test]
fn press_just_outside_the_window_is_dropped() {
    let sim = buffered_landing(Duration::from_millis(1100) + Duration::from_nanos(1));
    assert_eq!(jumped(&sim), 0);
    let state = sim.player_state().unwrap();
    assert!(state.is_grounded());
    assert!(state.last_pressed_jump.is_none());
    assert_eq!(sim.player().unwrap().hitbox.bottom(), 352.0);
}

#[test]
fn destroying_the_ground_mid_stand_drops_the_player() {
    let mut sim = sim_from(&["type=player;x=64;y=304", "type=block;x=0;y=352;w=128;h=32"]);
    sim.run(2).unwrap();
    let block = first_of(&sim, EntityKind::Block);
    sim.store_mut().destroy(block).unwrap();
    sim.run(3).unwrap();
    let state = sim.player_state().unwrap();
    assert!(state.ground.is_none());
    assert!(state.velocity.y > 0.0);
    assert!(sim.player().unwrap().hitbox.bottom() > 352.0);
}

#[test]
fn landing_on_an_enemy_with_jump_buffered_stomps_it() {
    let mut sim = sim_from(&[
        "type=player;x=96;y=200",
        "type=enemy;x=96;y=320;facing=right",
        FLOOR,
    ]);
    let enemy = first_of(&sim, EntityKind::Enemy);
    sim.set_input(InputSnapshot::idle().with_jump(true));
    let mut stomped = false;
    for _ in 0..20 {
        sim.tick().unwrap();
        if count(&sim, |k| matches!(k, SimEventKind::Jumped { stomped: Some(_), .. })) > 0 {
            stomped = true;
            break;
        }
    }
    assert!(stomped);
    let state = sim.player_state().unwrap();
    assert!((state.velocity.y + 11.5).abs() < 1e-3);

    let body = sim.store().get(enemy).unwrap();
    assert!(body.disabled);
    assert_eq!(body.components.enemy.as_ref().unwrap().state, EnemyState::Dead);
    assert_eq!(
        count(&sim, |k| matches!(k, SimEventKind::EnemyKilled { cause, .. } if cause == "stomp")),
        1
    );
}

#[test]
fn walking_into_an_enemy_kills_the_player() {
    let mut sim = sim_from(&[
        "type=player;x=64;y=304",
        "type=enemy;x=160;y=320;facing=left",
        FLOOR,
    ]);
    sim.set_input(InputSnapshot::idle().with_horizontal(HorizontalIntent::Right));
    sim.run(40).unwrap();
    assert!(count(&sim, |k| matches!(k, SimEventKind::PlayerDied { .. })) >= 1);
    assert!(count(&sim, |k| matches!(k, SimEventKind::PlayerRespawned { .. })) >= 1);
}

#[test]
fn hazard_death_respawns_at_the_collected_checkpoint() {
    let mut sim = sim_from(&[
        "type=player;x=32;y=304",
        "type=checkpoint;x=96;y=288",
        "type=spike;x=256;y=320;w=32;h=32",
        FLOOR,
    ]);
    sim.set_input(InputSnapshot::idle().with_horizontal(HorizontalIntent::Right));
    let mut died = false;
    for _ in 0..120 {
        sim.tick().unwrap();
        if sim.player().unwrap().dead {
            died = true;
            break;
        }
    }
    assert!(died);
    let checkpoint = first_of(&sim, EntityKind::Checkpoint);
    assert_eq!(sim.player_state().unwrap().checkpoint, Some(checkpoint));
    assert!(sim.store().get(checkpoint).unwrap().disabled);

    sim.set_input(InputSnapshot::idle());
    sim.tick().unwrap();
    let player = sim.player().unwrap();
    assert!(!player.dead);
    assert_eq!(player.hitbox.x, 96.0);
    assert_eq!(player.hitbox.bottom(), 352.0);
}

#[test]
fn falling_out_of_the_level_respawns_at_origin() {
    let mut sim = sim_from(&["level;name=pit;death_y=400", "type=player;x=64;y=0"]);
    sim.run(60).unwrap();
    assert!(count(&sim, |k| matches!(k, SimEventKind::PlayerDied { .. })) >= 1);
    assert!(count(&sim, |k| matches!(k, SimEventKind::PlayerRespawned { .. })) >= 1);
}

#[test]
fn reaching_the_exit_freezes_the_level_until_restart() {
    let mut sim = sim_from(&[
        "type=player;x=32;y=304",
        "type=exit;x=160;y=288",
        "type=enemy;x=480;y=320;facing=left",
        FLOOR,
    ]);
    sim.set_input(InputSnapshot::idle().with_horizontal(HorizontalIntent::Right));
    for _ in 0..120 {
        sim.tick().unwrap();
        if sim.status() == LevelStatus::Completed {
            break;
        }
    }
    assert_eq!(sim.status(), LevelStatus::Completed);
    let player_at = sim.player().unwrap().hitbox;
    let enemy = first_of(&sim, EntityKind::Enemy);
    let enemy_at = sim.store().get(enemy).unwrap().hitbox;
    sim.run(10).unwrap();
    assert_eq!(sim.player().unwrap().hitbox, player_at);
    assert_eq!(sim.store().get(enemy).unwrap().hitbox, enemy_at);
    assert_eq!(
        count(&sim, |k| matches!(k, SimEventKind::LevelCompleted { .. })),
        1
    );

    sim.restart_level();
    assert_eq!(sim.status(), LevelStatus::Playing);
    sim.tick().unwrap();
    assert!(sim.player().unwrap().hitbox.x < 64.0);
}

#[test]
fn glide_pickup_unlocks_glide_once() {
    let mut sim = sim_from(&["type=player;x=64;y=304", "type=glide_pickup;x=104;y=320", FLOOR]);
    sim.set_input(InputSnapshot::idle().with_horizontal(HorizontalIntent::Right));
    sim.run(30).unwrap();
    assert_eq!(sim.player_state().unwrap().mode, MovementMode::Glide);
    assert_eq!(count(&sim, |k| matches!(k, SimEventKind::GlideUnlocked { .. })), 1);
    let pickup = first_of(&sim, EntityKind::GlidePickup);
    assert!(sim.store().get(pickup).unwrap().disabled);
}

#[test]
fn textbox_fires_on_enter_and_exit_only() {
    let mut sim = sim_from(&[
        "type=player;x=32;y=304",
        "type=textbox;x=96;y=288;w=64;h=64;text=hello",
        FLOOR,
    ]);
    sim.set_input(InputSnapshot::idle().with_horizontal(HorizontalIntent::Right));
    sim.run(60).unwrap();
    assert_eq!(count(&sim, |k| matches!(k, SimEventKind::TextboxEntered { .. })), 1);
    assert_eq!(count(&sim, |k| matches!(k, SimEventKind::TextboxExited { .. })), 1);
}

#[test]
fn enemy_turns_at_the_ledge_without_overhanging() {
    let mut sim = sim_from(&[
        "type=player;x=512;y=304",
        "type=block;x=448;y=352;w=128;h=32",
        "type=enemy;x=32;y=320;facing=right",
        "type=block;x=0;y=352;w=96;h=32",
    ]);
    let enemy = first_of(&sim, EntityKind::Enemy);
    let mut turned_at = None;
    for _ in 0..60 {
        sim.tick().unwrap();
        let body = sim.store().get(enemy).unwrap();
        assert!(body.hitbox.right() <= 96.0);
        if body.facing == Facing::Left {
            turned_at = Some(body.hitbox.x);
            break;
        }
    }
    assert_eq!(turned_at, Some(64.0));
    sim.tick().unwrap();
    let body = sim.store().get(enemy).unwrap();
    assert_eq!(body.hitbox.x, 63.0);
    assert_eq!(body.components.enemy.as_ref().unwrap().state, EnemyState::Patrolling);
}

#[test]
fn enemy_riding_a_platform_turns_before_its_edge() {
    let mut sim = sim_from(&[
        "type=player;x=512;y=304",
        FLOOR,
        "type=moving_platform;x=100;y=200;x2=400;y2=200;size=2;speed=1",
        "type=enemy;x=110;y=168;facing=right",
    ]);
    let enemy = first_of(&sim, EntityKind::Enemy);
    let platform = first_of(&sim, EntityKind::MovingPlatform);
    sim.tick().unwrap();

    let mut turned = false;
    for _ in 0..400 {
        sim.tick().unwrap();
        let body = sim.store().get(enemy).unwrap();
        let deck = sim.store().get(platform).unwrap().hitbox;
        let state = body.components.enemy.as_ref().unwrap();
        assert_eq!(state.state, EnemyState::Patrolling);
        assert_eq!(state.ground, Some(platform));
        assert!(body.hitbox.right() <= deck.right() + 1e-3, "overhangs right edge");
        assert!(body.hitbox.left() >= deck.left() - 1e-3, "overhangs left edge");
        turned |= body.facing == Facing::Left;
    }
    assert!(turned);
}

#[test]
fn enemy_walking_off_nothing_falls_and_lands() {
    let mut sim = sim_from(&[
        "type=player;x=512;y=304",
        "type=enemy;x=128;y=200;facing=left",
        FLOOR,
    ]);
    let enemy = first_of(&sim, EntityKind::Enemy);
    sim.run(60).unwrap();
    let body = sim.store().get(enemy).unwrap();
    assert_eq!(body.hitbox.bottom(), 352.0);
    assert_eq!(body.components.enemy.as_ref().unwrap().state, EnemyState::Patrolling);
}

#[test]
fn platform_reverses_exactly_at_its_anchor() {
    let mut sim = sim_from(&[
        "type=player;x=512;y=304",
        FLOOR,
        "type=moving_platform;x=0;y=100;x2=100;y2=100;size=1;speed=3",
    ]);
    let platform = first_of(&sim, EntityKind::MovingPlatform);
    sim.run(33).unwrap();
    assert_eq!(count(&sim, |k| matches!(k, SimEventKind::PlatformReversed { .. })), 0);
    sim.tick().unwrap();
    assert_eq!(count(&sim, |k| matches!(k, SimEventKind::PlatformReversed { .. })), 1);
    let x = sim.store().get(platform).unwrap().hitbox.x;
    assert!((x - 100.0).abs() < 1e-3);
    sim.tick().unwrap();
    let x = sim.store().get(platform).unwrap().hitbox.x;
    assert!((x - 97.0).abs() < 1e-3);
}

#[test]
fn rider_is_carried_by_the_platform() {
    let mut sim = sim_from(&[
        "type=moving_platform;x=0;y=200;x2=300;y2=200;size=2;speed=2",
        "type=player;x=32;y=140",
    ]);
    sim.run(20).unwrap();
    let platform = first_of(&sim, EntityKind::MovingPlatform);
    assert_eq!(sim.player_state().unwrap().ground, Some(platform));
    let before = sim.player().unwrap().hitbox.x;
    sim.run(10).unwrap();
    let after = sim.player().unwrap().hitbox.x;
    assert!((after - before - 20.0).abs() < 1e-3);
}

#[test]
fn continue_revives_killed_enemies() {
    let mut sim = sim_from(&[
        "type=player;x=96;y=200",
        "type=enemy;x=96;y=320;facing=right",
        FLOOR,
    ]);
    let enemy = first_of(&sim, EntityKind::Enemy);
    sim.set_input(InputSnapshot::idle().with_jump(true));
    sim.run(20).unwrap();
    assert!(sim.store().get(enemy).unwrap().disabled);

    sim.set_input(InputSnapshot::idle());
    let player = sim.store().player_id().unwrap();
    sim.store_mut().get_mut(player).unwrap().dead = true;
    sim.tick().unwrap();
    let body = sim.store().get(enemy).unwrap();
    assert!(body.is_active());
    assert!(body.has(Tags::ENEMY));
    assert_eq!(body.hitbox.x, 96.0);
}
