use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::app::App;

/// Write the whole document as JSON, to `output` or stdout
pub fn run(app: &App, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(&app.tree().to_document())?;

    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "Exported {} categories ({} pages) to {}",
                app.tree().category_count(),
                app.tree().page_count(),
                path.display()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}
