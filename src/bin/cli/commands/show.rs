use anyhow::Result;

use crate::app::App;
use crate::commands::tree::breadcrumb;
use crate::render::terminal::{self, paint, Color};
use crate::OutputFormat;
use sidenote_lib::editor::sanitize_blocks;

pub fn run(app: &App, page_query: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let page = app.find_page(page_query)?;
    let blocks = sanitize_blocks(&page.blocks);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "id": page.id,
                "title": page.title,
                "icon": page.icon,
                "categoryId": page.category_id,
                "categoryName": app.category_name(page.category_id),
                "parentId": page.parent_id,
                "blocks": blocks,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            let title = match &page.icon {
                Some(icon) => format!("{} {}", icon, page.title),
                None => page.title.clone(),
            };
            println!("{}", paint(&title, Color::BOLD, use_color));

            let location = format!(
                "{} / {}",
                app.category_name(page.category_id),
                breadcrumb(app.tree(), page.id)
            );
            println!("{}", paint(&location, Color::DIM, use_color));

            let rendered = terminal::render_blocks(&blocks, use_color);
            if !rendered.is_empty() {
                println!();
                println!("{}", rendered);
            }
        }
    }

    Ok(())
}
