use anyhow::{bail, Result};
use serde_json::Value;

use crate::app::App;
use crate::OutputFormat;
use sidenote_lib::storage::Block;
use sidenote_lib::tree::NewPage;

pub struct NewPageArgs<'a> {
    pub category: &'a str,
    pub title: Option<&'a str>,
    pub parent: Option<&'a str>,
    pub icon: Option<&'a str>,
    pub content: Option<String>,
}

pub fn run_new(app: &mut App, args: NewPageArgs, format: &OutputFormat) -> Result<()> {
    let category_id = app.find_category(args.category)?.id;
    let parent_id = match args.parent {
        Some(query) => {
            let parent = app.find_page(query)?;
            if parent.category_id != category_id {
                bail!("Parent page '{}' is in another category", parent.title);
            }
            Some(parent.id)
        }
        None => None,
    };

    // Default title if not provided
    let title = args
        .title
        .map(str::to_string)
        .unwrap_or_else(|| chrono::Local::now().format("Quick Note %Y-%m-%d %H:%M").to_string());

    let opts = NewPage {
        title: Some(title),
        parent_id,
        icon: args.icon.map(str::to_string),
        ..NewPage::default()
    };
    let mut tree = app.tree().create_page(category_id, opts)?;
    let page_id = tree.active_page_id();

    if let Some(text) = args.content.filter(|t| !t.trim().is_empty()) {
        let blocks = text
            .split("\n\n")
            .map(|para| {
                let mut block = Block::paragraph();
                block.content = Some(Value::String(para.trim_end().to_string()));
                block
            })
            .collect();
        tree = tree.set_page_blocks(page_id, blocks);
    }
    app.commit(tree)?;

    let page = app.find_page(&page_id.to_string())?;
    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "id": page.id,
                "title": page.title,
                "categoryId": page.category_id,
                "categoryName": app.category_name(page.category_id),
                "parentId": page.parent_id,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!(
                "Created page \"{}\" in category \"{}\"",
                page.title,
                app.category_name(page.category_id)
            );
            println!("  ID: {}", page.id);
        }
    }

    Ok(())
}

pub fn run_rm(app: &mut App, page_query: &str, format: &OutputFormat) -> Result<()> {
    let page = app.find_page(page_query)?;
    let (page_id, title) = (page.id, page.title.clone());
    let lifted = app.tree().children(page_id).len();

    let tree = app.tree().delete_page(page_id)?;
    app.commit(tree)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "deleted": page_id, "title": title, "movedUp": lifted });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Deleted page \"{}\"", title);
            if lifted > 0 {
                println!("  {} child page(s) moved up one level", lifted);
            }
        }
    }

    Ok(())
}

/// Move a page under another page, into another category, or both
pub fn run_move(
    app: &mut App,
    page_query: &str,
    parent_query: Option<&str>,
    category_query: Option<&str>,
    format: &OutputFormat,
) -> Result<()> {
    let page_id = app.find_page(page_query)?.id;
    let parent_id = parent_query.map(|q| app.find_page(q).map(|p| p.id)).transpose()?;
    let category_id = category_query.map(|q| app.find_category(q).map(|c| c.id)).transpose()?;

    let mut tree = app.tree().clone();
    if let Some(category_id) = category_id {
        tree = tree.move_page_to_category(page_id, category_id);
    }
    if parent_id.is_some() || category_id.is_none() {
        tree = tree.reparent_page(page_id, parent_id)?;
    }
    app.commit(tree)?;

    let page = app.find_page(&page_id.to_string())?;
    let parent_title = page
        .parent_id
        .and_then(|id| app.tree().page(id))
        .map(|p| p.title.clone());

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "id": page.id,
                "title": page.title,
                "categoryId": page.category_id,
                "parentId": page.parent_id,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => match parent_title {
            Some(parent) => println!("Moved \"{}\" under \"{}\"", page.title, parent),
            None => println!(
                "Moved \"{}\" to the top of \"{}\"",
                page.title,
                app.category_name(page.category_id)
            ),
        },
    }

    Ok(())
}
