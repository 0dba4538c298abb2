use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use gf_core::entity::{Entity, EntityKind};
use gf_simulation::player::PlayerSystem;
use gf_simulation::{LevelStatus, SimConfig, SimEventKind, Simulation, WallClock};

use crate::script::Script;

pub struct RunOptions<'a> {
    pub level: &'a Path,
    pub ticks: u64,
    pub script: Option<&'a Path>,
    pub config: Option<&'a Path>,
    pub wall_clock: bool,
    pub verbose: bool,
}

pub fn run(opts: &RunOptions<'_>) -> Result<(), String> {
    let (level, _) = super::load_level(opts.level)?;

    let config = match opts.config {
        Some(path) => SimConfig::from_json_file(path).map_err(|e| e.to_string())?,
        None => SimConfig::default(),
    };
    let script = match opts.script {
        Some(path) => Script::from_file(path)?,
        None => Script::default(),
    };

    let mut sim = Simulation::standard(level, config).map_err(|e| e.to_string())?;
    if opts.wall_clock {
        sim = sim.with_clock(Box::new(WallClock::new()));
    }
    sim.init()
        .map_err(|e| format!("simulation init failed: {e}"))?;

    let mut completed_at = None;
    for tick in 1..=opts.ticks {
        sim.set_input(script.input_at(tick));
        sim.tick().map_err(|e| format!("simulation error: {e}"))?;
        if sim.status() == LevelStatus::Completed {
            completed_at = Some(tick);
            break;
        }
    }

    let deaths = sim.get_system::<PlayerSystem>().map_or(0, |p| p.deaths());
    println!(
        "  {} '{}' {}",
        "Run".bold(),
        sim.level().meta.name,
        format!("({} ticks)", sim.current_tick()).dimmed()
    );
    match completed_at {
        Some(tick) => println!("  {} at tick {tick}", "Level completed".green().bold()),
        None => println!("  Level not completed"),
    }
    println!(
        "  {deaths} death{}, {} events logged",
        if deaths == 1 { "" } else { "s" },
        sim.events().len()
    );
    println!();

    if opts.verbose {
        println!("  {}", "Event Log".bold().underline());
        println!();
        for event in sim.events().events() {
            let tick_label = format!("[tick {:>4}]", event.tick).dimmed();
            let desc = colorize_event(&event.kind, &event.description);
            println!("  {tick_label} {desc}");
        }
        if sim.events().is_empty() {
            println!("  {}", "(no events)".dimmed());
        }
        println!();
    } else {
        let notable: Vec<_> = sim
            .events()
            .events()
            .iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    SimEventKind::PlayerDied { .. }
                        | SimEventKind::CheckpointCollected { .. }
                        | SimEventKind::LevelCompleted { .. }
                )
            })
            .collect();
        if !notable.is_empty() {
            println!("  {}", "Notable Events".bold().underline());
            for event in &notable {
                let tick_label = format!("[tick {:>4}]", event.tick).dimmed();
                let desc = colorize_event(&event.kind, &event.description);
                println!("  {tick_label} {desc}");
            }
            println!();
        }
    }

    println!("  {}", "Actors".bold().underline());
    println!();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Kind", "Position", "State"]);
    for entity in sim.store().iter().filter(|e| is_actor(e)) {
        table.add_row(vec![
            entity.id.to_string(),
            entity.kind.to_string(),
            super::position(entity),
            actor_state(entity),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn is_actor(entity: &Entity) -> bool {
    matches!(
        entity.kind,
        EntityKind::Player | EntityKind::Enemy | EntityKind::MovingPlatform
    )
}

fn actor_state(entity: &Entity) -> String {
    if entity.dead {
        return "dead".to_string();
    }
    if let Some(player) = &entity.components.player {
        let motion = format!("{:?}", player.motion(player.hook.is_some())).to_lowercase();
        return format!("{motion}, facing {}", entity.facing);
    }
    if let Some(enemy) = &entity.components.enemy {
        return format!("{:?}", enemy.state).to_lowercase();
    }
    if let Some(platform) = &entity.components.platform {
        let heading = if platform.forward { "to end" } else { "to start" };
        return heading.to_string();
    }
    String::new()
}

fn colorize_event(kind: &SimEventKind, desc: &str) -> String {
    match kind {
        SimEventKind::PlayerDied { .. } | SimEventKind::EnemyKilled { .. } => {
            desc.red().to_string()
        }
        SimEventKind::LevelCompleted { .. } | SimEventKind::CheckpointCollected { .. } => {
            desc.green().bold().to_string()
        }
        SimEventKind::HookFired { .. }
        | SimEventKind::HookAttached { .. }
        | SimEventKind::HookReleased { .. }
        | SimEventKind::HookMissed { .. } => desc.cyan().to_string(),
        SimEventKind::Landed { .. } | SimEventKind::PlatformReversed { .. } => {
            desc.dimmed().to_string()
        }
        _ => desc.to_string(),
    }
}
