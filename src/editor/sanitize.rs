use serde_json::Value;

use super::widgets::{WidgetKind, WIDGET_STATE_PROP};
use crate::storage::Block;

/// Prepare stored blocks for the editor.
///
/// Unknown block types pass through untouched. Widget blocks get a usable
/// state. An empty result becomes a single empty paragraph.
pub fn sanitize_blocks(blocks: &[Block]) -> Vec<Block> {
    let mut sanitized: Vec<Block> = blocks.iter().cloned().map(normalize_block).collect();
    if sanitized.is_empty() {
        sanitized.push(Block::paragraph());
    }
    sanitized
}

/// Same as [`sanitize_blocks`] for raw JSON coming from the webview. Entries
/// that are not objects carrying a `type` tag are dropped.
pub fn sanitize_values(values: Vec<Value>) -> Vec<Block> {
    let blocks: Vec<Block> = values.into_iter().filter_map(Block::from_value).collect();
    sanitize_blocks(&blocks)
}

fn normalize_block(mut block: Block) -> Block {
    if let Some(kind) = WidgetKind::from_block_type(&block.block_type) {
        let raw = block.prop_str(WIDGET_STATE_PROP).map(str::to_string);
        let normalized = kind.normalize(raw.as_deref());
        if raw.as_deref() != Some(normalized.as_str()) {
            log::debug!("Repaired {} widget state", kind.block_type());
            block.set_prop(WIDGET_STATE_PROP, Value::String(normalized));
        }
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_becomes_paragraph() {
        assert_eq!(sanitize_blocks(&[]), vec![Block::paragraph()]);
        assert_eq!(
            serde_json::to_value(sanitize_values(vec![])).unwrap(),
            json!([{ "type": "paragraph", "content": "" }])
        );
    }

    #[test]
    fn test_all_malformed_becomes_paragraph() {
        let values = vec![json!(null), json!(7), json!({ "content": "no type" })];
        assert_eq!(sanitize_values(values), vec![Block::paragraph()]);
    }

    #[test]
    fn test_unknown_types_pass_through() {
        let raw = json!({ "type": "mystery-widget", "props": { "anything": [1, 2] }, "id": "x" });
        let blocks = sanitize_values(vec![raw.clone()]);
        assert_eq!(serde_json::to_value(&blocks[0]).unwrap(), raw);
    }

    #[test]
    fn test_widget_without_state_gets_default() {
        let blocks = sanitize_values(vec![
            json!({ "type": "flow" }),
            json!({ "type": "gantt", "props": { "data": 12 } }),
            json!({ "type": "whiteboard", "props": { "data": "{broken", "height": 300 } }),
        ]);

        assert!(blocks[0].prop_str(WIDGET_STATE_PROP).unwrap().contains("\"nodes\":[]"));
        assert_eq!(blocks[1].prop_str(WIDGET_STATE_PROP), Some(r#"{"tasks":[]}"#));
        assert_eq!(blocks[2].prop_str(WIDGET_STATE_PROP), Some(r#"{"strokes":[]}"#));
        // Other props survive the repair
        assert_eq!(blocks[2].props.as_ref().unwrap()["height"], json!(300));
    }

    #[test]
    fn test_healthy_widget_unchanged() {
        let state = r##"{"strokes":[{"color":"#123456","width":3.0,"points":[{"x":1.0,"y":1.0}]}]}"##;
        let raw = json!({ "type": "whiteboard", "props": { "data": state } });
        let blocks = sanitize_values(vec![raw.clone()]);
        assert_eq!(serde_json::to_value(&blocks[0]).unwrap(), raw);
    }
}
