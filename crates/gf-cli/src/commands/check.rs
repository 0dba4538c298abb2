use std::path::Path;

pub fn run(path: &Path) -> Result<(), String> {
    let (level, report) = super::load_level(path)?;

    if !report.is_clean() {
        let n = report.skipped.len();
        return Err(format!(
            "{n} line{} of {} could not be loaded",
            if n == 1 { "" } else { "s" },
            path.display()
        ));
    }
    if level.store.player_id().is_none() {
        return Err(format!("{} has no player", path.display()));
    }

    println!("  All checks passed for '{}'.", level.meta.name);
    println!(
        "  {} entities loaded, {} in the store",
        report.loaded,
        level.store.len()
    );
    Ok(())
}
