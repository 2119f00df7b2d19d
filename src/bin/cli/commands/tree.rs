use anyhow::Result;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;
use sidenote_lib::storage::Page;
use sidenote_lib::tree::DocumentTree;

const BRANCH: &str = "\u{251c}\u{2500}\u{2500} ";
const LAST_BRANCH: &str = "\u{2514}\u{2500}\u{2500} ";

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let tree = app.tree();

    match format {
        OutputFormat::Json => {
            let output: Vec<Value> = tree
                .categories()
                .iter()
                .map(|category| {
                    json!({
                        "id": category.id,
                        "name": category.name,
                        "icon": category.icon,
                        "folderPath": category.folder_path,
                        "pages": tree.root_pages(category.id)
                            .into_iter()
                            .map(|p| page_json(tree, p))
                            .collect::<Vec<_>>(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            for category in tree.categories() {
                let label = with_icon(category.icon.as_deref(), &category.name);
                println!("{}", paint(&label, Color::BOLD, use_color));
                if let Some(folder) = &category.folder_path {
                    println!("{}", paint(&format!("  ({})", folder.display()), Color::DIM, use_color));
                }

                let roots = tree.root_pages(category.id);
                if roots.is_empty() {
                    println!("    (no pages)");
                }
                for (i, page) in roots.iter().enumerate() {
                    print_page(tree, page, "", i + 1 == roots.len());
                }
                println!();
            }
        }
    }

    Ok(())
}

fn page_json(tree: &DocumentTree, page: &Page) -> Value {
    json!({
        "id": page.id,
        "title": page.title,
        "icon": page.icon,
        "children": tree.children(page.id)
            .into_iter()
            .map(|child| page_json(tree, child))
            .collect::<Vec<_>>(),
    })
}

fn print_page(tree: &DocumentTree, page: &Page, prefix: &str, is_last: bool) {
    let connector = if is_last { LAST_BRANCH } else { BRANCH };
    println!("{}{}{}", prefix, connector, with_icon(page.icon.as_deref(), &page.title));

    let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "\u{2502}   " });
    let children = tree.children(page.id);
    for (i, child) in children.iter().enumerate() {
        print_page(tree, child, &child_prefix, i + 1 == children.len());
    }
}

fn with_icon(icon: Option<&str>, label: &str) -> String {
    match icon {
        Some(icon) if !icon.is_empty() => format!("{} {}", icon, label),
        _ => label.to_string(),
    }
}

/// Page path from its category root, e.g. `Projects / Launch / Notes`
pub fn breadcrumb(tree: &DocumentTree, page_id: Uuid) -> String {
    let mut titles = Vec::new();
    let mut current = tree.page(page_id);
    while let Some(page) = current {
        titles.push(page.title.as_str());
        current = page.parent_id.and_then(|id| tree.page(id));
    }
    titles.reverse();
    titles.join(" / ")
}
