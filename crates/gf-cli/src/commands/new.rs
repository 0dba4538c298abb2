use std::fs;
use std::path::Path;

use gf_core::footprint::DefaultFootprints;
use gf_core::level::Level;

pub fn run(path: &Path) -> Result<(), String> {
    if path.exists() {
        return Err(format!("{} already exists", path.display()));
    }
    let level = Level::template(&DefaultFootprints::new());
    fs::write(path, level.to_text()).map_err(|e| format!("cannot write {}: {e}", path.display()))?;

    println!(
        "  Created level '{}' at {} ({} entities)",
        level.meta.name,
        path.display(),
        level.store.len()
    );
    println!("  Try it with: gf run {}", path.display());
    Ok(())
}
