use serde_json::Value;

use sidenote_lib::editor::widgets::{FlowState, GanttState, WhiteboardState};
use sidenote_lib::editor::{WidgetKind, WIDGET_STATE_PROP};
use sidenote_lib::storage::Block;

/// ANSI color codes
#[allow(dead_code)]
pub struct Color;

#[allow(dead_code)]
impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const ITALIC: &str = "\x1b[3m";
    pub const STRIKETHROUGH: &str = "\x1b[9m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// Render editor blocks to terminal text
pub fn render_blocks(blocks: &[Block], use_color: bool) -> String {
    let mut lines = Vec::new();
    render_into(&mut lines, blocks, use_color, 0);

    // Remove trailing blank line
    while lines.last().map_or(false, |l| l.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

fn render_into(lines: &mut Vec<String>, blocks: &[Block], use_color: bool, depth: usize) {
    let mut number = 0;
    for block in blocks {
        number = if block.block_type == "numberedListItem" { number + 1 } else { 0 };

        let block_lines = render_block(block, use_color, &"  ".repeat(depth), number);
        let nested = children(block);
        if block_lines.is_empty() && nested.is_empty() {
            continue;
        }
        lines.extend(block_lines);
        render_into(lines, &nested, use_color, depth + 1);
        if depth == 0 {
            lines.push(String::new()); // blank line between blocks
        }
    }
}

fn render_block(block: &Block, use_color: bool, prefix: &str, number: usize) -> Vec<String> {
    if let Some(kind) = WidgetKind::from_block_type(&block.block_type) {
        return render_widget(block, kind, use_color, prefix);
    }

    let text = inline_text(block.content.as_ref());
    match block.block_type.as_str() {
        "paragraph" => wrap_lines(&text, prefix, 80),
        "heading" => {
            let level = prop_u64(block, "level").unwrap_or(1).clamp(1, 6);
            let line = format!("{} {}", "#".repeat(level as usize), text);
            vec![format!("{}{}", prefix, paint(&line, Color::BOLD, use_color))]
        }
        "bulletListItem" => wrap_lines(&format!("- {}", text), prefix, 80),
        "numberedListItem" => wrap_lines(&format!("{}. {}", number, text), prefix, 80),
        "checkListItem" => {
            let checked = block
                .props
                .as_ref()
                .and_then(|p| p.get("checked"))
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if checked {
                vec![format!("{}[x] {}", prefix, paint(&text, Color::STRIKETHROUGH, use_color))]
            } else {
                vec![format!("{}[ ] {}", prefix, text)]
            }
        }
        "codeBlock" => text
            .lines()
            .map(|line| format!("{}    {}", prefix, paint(line, Color::CYAN, use_color)))
            .collect(),
        "quote" => text.lines().map(|line| format!("{}> {}", prefix, line)).collect(),
        "image" => {
            let url = block.prop_str("url").unwrap_or("");
            vec![format!("{}[image: {}]", prefix, url)]
        }
        other => {
            if text.is_empty() {
                vec![format!("{}{}", prefix, paint(&format!("[{}]", other), Color::DIM, use_color))]
            } else {
                wrap_lines(&text, prefix, 80)
            }
        }
    }
}

fn render_widget(block: &Block, kind: WidgetKind, use_color: bool, prefix: &str) -> Vec<String> {
    let raw = kind.normalize(block.prop_str(WIDGET_STATE_PROP));
    let mut lines = Vec::new();

    match kind {
        WidgetKind::Flow => {
            let state: FlowState = serde_json::from_str(&raw).unwrap_or_default();
            lines.push(format!(
                "{}[flow: {} nodes, {} edges]",
                prefix,
                state.nodes.len(),
                state.edges.len()
            ));
            for node in &state.nodes {
                let link = if node.page_id.is_some() { " ->" } else { "" };
                lines.push(format!("{}  * {}{}", prefix, node.label, link));
            }
        }
        WidgetKind::Gantt => {
            let state: GanttState = serde_json::from_str(&raw).unwrap_or_default();
            lines.push(format!("{}[gantt: {} tasks]", prefix, state.tasks.len()));
            for task in &state.tasks {
                lines.push(format!(
                    "{}  {} {} .. {} ({:.0}%)",
                    prefix, task.name, task.start, task.end, task.progress
                ));
            }
        }
        WidgetKind::Whiteboard => {
            let state: WhiteboardState = serde_json::from_str(&raw).unwrap_or_default();
            lines.push(format!("{}[whiteboard: {} strokes]", prefix, state.strokes.len()));
        }
    }

    if use_color {
        lines = lines.into_iter().map(|l| paint(&l, Color::GRAY, true)).collect();
    }
    lines
}

/// Flatten inline content: a plain string, or an array of inline runs
/// (`{ "type": "text", "text": ... }`, links carry their own `content`)
pub fn inline_text(content: Option<&Value>) -> String {
    match content {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                Value::Object(obj) => match obj.get("text") {
                    Some(Value::String(s)) => s.clone(),
                    _ => inline_text(obj.get("content")),
                },
                _ => String::new(),
            })
            .collect(),
        _ => String::new(),
    }
}

fn prop_u64(block: &Block, key: &str) -> Option<u64> {
    let value = block.props.as_ref()?.get(key)?;
    value.as_u64().or_else(|| value.as_str()?.parse().ok())
}

fn children(block: &Block) -> Vec<Block> {
    match block.extra.get("children") {
        Some(Value::Array(items)) => items.iter().cloned().filter_map(Block::from_value).collect(),
        _ => Vec::new(),
    }
}

/// Simple word-wrapping for terminal output
fn wrap_lines(text: &str, prefix: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let effective_width = max_width.saturating_sub(prefix.len());

    for line in text.lines() {
        if line.len() <= effective_width {
            lines.push(format!("{}{}", prefix, line));
            continue;
        }
        let mut current_line = String::new();
        for word in line.split_whitespace() {
            if current_line.is_empty() {
                current_line = word.to_string();
            } else if current_line.len() + 1 + word.len() <= effective_width {
                current_line.push(' ');
                current_line.push_str(word);
            } else {
                lines.push(format!("{}{}", prefix, current_line));
                current_line = word.to_string();
            }
        }
        if !current_line.is_empty() {
            lines.push(format!("{}{}", prefix, current_line));
        }
    }

    lines
}
