//! Integration tests for grappling hook swing behavior.
use std::f32::consts::{FRAC_PI_2, PI};

use gf_core::entity::{EntityId, EntityKind};
use gf_core::footprint::DefaultFootprints;
use gf_core::level::Level;
use gf_core::tags::Tags;
use gf_simulation::config::HookTuning;
use gf_simulation::hook::pendulum_step;
use gf_simulation::{InputSnapshot, SimConfig, SimEventKind, Simulation};

/// A falling player with a hook point up and to the right, on the 60 degree
/// launch line.
fn sky() -> Simulation {
    let text = "type=player;x=64;y=0\ntype=hook_point;x=144;y=-128;w=32;h=32";
    let (level, report) = Level::parse(text, &DefaultFootprints::new());
    assert!(report.is_clean());
    Simulation::standard(level, SimConfig::default()).unwrap()
}

fn hooks(sim: &Simulation) -> usize {
    sim.store().with_tags(Tags::HOOK).count()
}

fn attach(sim: &mut Simulation) -> EntityId {
    sim.set_input(InputSnapshot::idle().with_interact(true));
    sim.tick().unwrap();
    sim.set_input(InputSnapshot::idle());
    assert_eq!(hooks(sim), 1);
    for _ in 0..30 {
        sim.tick().unwrap();
        let attached = sim.events().events().iter().find_map(|e| match e.kind {
            SimEventKind::HookAttached { to, .. } => Some(to),
            _ => None,
        });
        if let Some(to) = attached {
            return to;
        }
    }
    panic!("hook never attached");
}

#[test]
fn hook_attaches_and_keeps_the_player_on_the_rope() {
    let mut sim = sky();
    let target = attach(&mut sim);
    let hook_point = sim
        .store()
        .iter()
        .find(|e| e.kind == EntityKind::HookPoint)
        .unwrap()
        .id;
    assert_eq!(target, hook_point);

    sim.run(20).unwrap();
    let hook = sim
        .store()
        .with_tags(Tags::HOOK)
        .next()
        .and_then(|h| h.components.hook.clone())
        .unwrap();
    assert!(hook.is_attached());
    let center = sim.player().unwrap().hitbox.center();
    assert!((center.distance(hook.end) - hook.current_length).abs() < 0.05);
    assert!(sim.player_state().unwrap().ground.is_none());
}

#[test]
fn jump_while_hooked_launches_upward_and_frees_the_hook() {
    let mut sim = sky();
    attach(&mut sim);
    sim.run(10).unwrap();

    sim.set_input(InputSnapshot::idle().with_jump(true));
    sim.tick().unwrap();
    let state = sim.player_state().unwrap();
    assert!(state.ascending);
    assert!(state.velocity.y < 0.0);
    assert!(state.hook.is_none());
    assert_eq!(hooks(&sim), 0);
    assert_eq!(
        sim.events()
            .count_where(|k| matches!(k, SimEventKind::Jumped { stomped: None, .. })),
        1
    );
}

#[test]
fn pressing_interact_again_releases() {
    let mut sim = sky();
    attach(&mut sim);
    sim.set_input(InputSnapshot::idle().with_interact(true));
    sim.tick().unwrap();
    assert_eq!(hooks(&sim), 0);
    assert!(sim.player_state().unwrap().hook.is_none());
    assert_eq!(
        sim.events()
            .count_where(|k| matches!(k, SimEventKind::HookReleased { .. })),
        1
    );
}

#[test]
fn hook_with_nothing_to_grab_retracts() {
    let text = "type=player;x=64;y=0";
    let (level, _) = Level::parse(text, &DefaultFootprints::new());
    let mut sim = Simulation::standard(level, SimConfig::default()).unwrap();
    sim.set_input(InputSnapshot::idle().with_interact(true));
    sim.tick().unwrap();
    sim.set_input(InputSnapshot::idle());
    sim.run(40).unwrap();
    assert_eq!(hooks(&sim), 0);
    assert!(sim.player_state().unwrap().hook.is_none());
    assert_eq!(
        sim.events()
            .count_where(|k| matches!(k, SimEventKind::HookMissed { .. })),
        1
    );
}

#[test]
fn destroying_the_hooked_entity_drops_the_player() {
    let mut sim = sky();
    let target = attach(&mut sim);
    sim.run(5).unwrap();
    sim.store_mut().destroy(target).unwrap();
    assert_eq!(hooks(&sim), 0);
    assert!(sim.player_state().unwrap().hook.is_none());

    let before = sim.player().unwrap().hitbox.y;
    sim.run(20).unwrap();
    assert!(sim.player().unwrap().hitbox.y > before);
}

#[test]
fn damped_swing_never_gains_speed() {
    let tuning = HookTuning::default();
    let dt = 1.0 / 60.0;
    let (mut angle, mut omega) = (0.0_f32, 0.0_f32);
    let mut peaks = Vec::new();
    let mut below = angle + FRAC_PI_2;
    for _ in 0..3000 {
        (angle, omega) = pendulum_step(angle, omega, 100.0, &tuning, dt);
        let offset = angle + FRAC_PI_2;
        if offset.signum() != below.signum() {
            peaks.push(omega.abs());
        }
        below = offset;
        assert!(angle.abs() < 2.0 * PI);
    }
    assert!(peaks.len() > 4);
    for pair in peaks.windows(2) {
        assert!(pair[1] <= pair[0] + 1e-3, "speed grew: {pair:?}");
    }
}
