pub mod check;
pub mod export;
pub mod list;
pub mod new;
pub mod run;

use std::path::Path;

use colored::Colorize;
use gf_core::entity::Entity;
use gf_core::footprint::DefaultFootprints;
use gf_core::level::{Level, LoadReport};

/// Read and parse a level file. Skipped lines are reported on stderr but do
/// not fail the load.
fn load_level(path: &Path) -> Result<(Level, LoadReport), String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let (level, report) = Level::parse(&text, &DefaultFootprints::new());
    print_skipped(&report, path);
    Ok((level, report))
}

fn print_skipped(report: &LoadReport, path: &Path) {
    for skipped in &report.skipped {
        eprintln!(
            "  {} {}:{}: {}",
            "skipped".yellow().bold(),
            path.display(),
            skipped.line,
            skipped.reason
        );
    }
}

/// `x,y` of an entity's live position, trimmed for tables.
fn position(entity: &Entity) -> String {
    format!("{:.1},{:.1}", entity.hitbox.x, entity.hitbox.y)
}
