use anyhow::Result;

use crate::app::App;
use crate::OutputFormat;

pub fn run_new(app: &mut App, name: &str, format: &OutputFormat) -> Result<()> {
    let (tree, category_id) = app.tree().create_category(Some(name.to_string()));
    app.commit(tree)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "id": category_id, "name": name });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Created category \"{}\"", name);
            println!("  ID: {}", category_id);
        }
    }

    Ok(())
}

pub fn run_rm(app: &mut App, category_query: &str, format: &OutputFormat) -> Result<()> {
    let category = app.find_category(category_query)?;
    let (category_id, name, pages) = (category.id, category.name.clone(), category.pages.len());

    let tree = app.tree().delete_category(category_id)?;
    app.commit(tree)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "deleted": category_id, "name": name, "pages": pages });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => println!("Deleted category \"{}\" and {} page(s)", name, pages),
    }

    Ok(())
}

pub fn run_rename(app: &mut App, category_query: &str, name: &str, format: &OutputFormat) -> Result<()> {
    let category = app.find_category(category_query)?;
    let (category_id, old_name) = (category.id, category.name.clone());

    let tree = app.tree().rename_category(category_id, name.to_string());
    app.commit(tree)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "id": category_id, "name": name, "previousName": old_name });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => println!("Renamed \"{}\" to \"{}\"", old_name, name),
    }

    Ok(())
}
