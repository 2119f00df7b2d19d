mod app;
mod commands;
mod render;

use std::io::{IsTerminal, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sidenote-cli", about = "Inspect and edit the Sidenote document", version)]
struct Cli {
    /// Data directory holding the document (default: configured or platform data dir)
    #[arg(long, global = true, env = "SIDENOTE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Show categories and their page trees
    Tree,

    /// Show page content
    Show {
        /// Page title (case-insensitive prefix match) or ID
        page: String,
    },

    /// Create a page in a category
    NewPage {
        /// Category name (case-insensitive prefix match) or ID
        category: String,
        /// Page title (defaults to "Quick Note YYYY-MM-DD HH:MM")
        title: Option<String>,
        /// Nest under this page
        #[arg(long)]
        parent: Option<String>,
        /// Icon (an emoji or icon name)
        #[arg(long)]
        icon: Option<String>,
        /// Initial text, blank lines separate paragraphs (use "-" to read from stdin)
        #[arg(long)]
        content: Option<String>,
    },

    /// Create a category
    NewCategory {
        name: String,
    },

    /// Delete a page; its children move up one level
    RmPage {
        page: String,
    },

    /// Delete a category and all its pages
    RmCategory {
        category: String,
    },

    /// Rename a category
    RenameCategory {
        category: String,
        name: String,
    },

    /// Move a page under another page, or to the top level
    Move {
        page: String,
        /// New parent page; omit to move to the top level
        #[arg(long)]
        parent: Option<String>,
        /// Target category
        #[arg(long)]
        category: Option<String>,
    },

    /// Print the whole document as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// Resolve "-" as stdin
fn resolve_content(content: Option<String>) -> Option<String> {
    match content.as_deref() {
        Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).ok();
            Some(buf)
        }
        _ => content,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && std::io::stdout().is_terminal();
    let mut app = app::App::new(cli.data_dir.as_deref())?;

    match cli.command {
        Command::Tree => {
            commands::tree::run(&app, &cli.format, use_color)?;
        }
        Command::Show { page } => {
            commands::show::run(&app, &page, &cli.format, use_color)?;
        }
        Command::NewPage { category, title, parent, icon, content } => {
            let args = commands::page::NewPageArgs {
                category: &category,
                title: title.as_deref(),
                parent: parent.as_deref(),
                icon: icon.as_deref(),
                content: resolve_content(content),
            };
            commands::page::run_new(&mut app, args, &cli.format)?;
        }
        Command::NewCategory { name } => {
            commands::category::run_new(&mut app, &name, &cli.format)?;
        }
        Command::RmPage { page } => {
            commands::page::run_rm(&mut app, &page, &cli.format)?;
        }
        Command::RmCategory { category } => {
            commands::category::run_rm(&mut app, &category, &cli.format)?;
        }
        Command::RenameCategory { category, name } => {
            commands::category::run_rename(&mut app, &category, &name, &cli.format)?;
        }
        Command::Move { page, parent, category } => {
            commands::page::run_move(
                &mut app,
                &page,
                parent.as_deref(),
                category.as_deref(),
                &cli.format,
            )?;
        }
        Command::Export { output } => {
            commands::export::run(&app, output.as_deref())?;
        }
    }

    Ok(())
}
