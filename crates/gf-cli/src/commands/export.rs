use std::path::Path;

use gf_core::level::Level;

pub fn run(path: &Path, format: &str, output: Option<&Path>) -> Result<(), String> {
    let (level, _) = super::load_level(path)?;

    let content = match format {
        "level" | "txt" => level.to_text(),
        "json" => export_json(&level)?,
        _ => {
            return Err(format!(
                "unsupported format: \"{format}\". Use: level, json"
            ));
        }
    };

    if let Some(out) = output {
        std::fs::write(out, &content)
            .map_err(|e| format!("cannot write to {}: {e}", out.display()))?;
        println!("  Exported to {}", out.display());
    } else {
        print!("{content}");
    }
    Ok(())
}

fn export_json(level: &Level) -> Result<String, String> {
    let to_value = |e: serde_json::Error| format!("JSON serialization error: {e}");
    let entities: Vec<_> = level.store.iter().collect();
    let mut export = serde_json::Map::new();
    export.insert("level".into(), serde_json::to_value(&level.meta).map_err(to_value)?);
    export.insert("entities".into(), serde_json::to_value(entities).map_err(to_value)?);
    let mut text = serde_json::to_string_pretty(&export).map_err(to_value)?;
    text.push('\n');
    Ok(text)
}
