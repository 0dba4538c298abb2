use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use gf_core::tags::Tags;

pub fn run(path: &Path, tag: Option<&str>) -> Result<(), String> {
    let (level, _) = super::load_level(path)?;

    let mut query = level.store.query();
    if let Some(name) = tag {
        let tag = Tags::from_snake_name(name).ok_or_else(|| format!("unknown tag: \"{name}\""))?;
        query = query.tags(tag);
    }
    let results = query.execute();

    if results.is_empty() {
        println!("  No entities found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Kind", "Position", "Size", "Facing", "Tags"]);

    for entity in &results {
        table.add_row(vec![
            entity.id.to_string(),
            entity.kind.to_string(),
            super::position(entity),
            format!("{}x{}", entity.size.x, entity.size.y),
            entity.facing.to_string(),
            entity.tags.to_string(),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} entities", results.len());
    Ok(())
}
