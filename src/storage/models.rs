use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Block type used for the default, empty page content
pub const PARAGRAPH_BLOCK: &str = "paragraph";

/// One unit of page content.
///
/// The shape is owned by the external block editor. Only `type` is
/// interpreted here; `props` and `content` are kept as raw JSON and any
/// other field is carried through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Block {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Block {
    pub fn new(block_type: impl Into<String>) -> Self {
        Self {
            block_type: block_type.into(),
            props: None,
            content: None,
            extra: Map::new(),
        }
    }

    /// `{ "type": "paragraph", "content": "" }`
    pub fn paragraph() -> Self {
        Self {
            content: Some(Value::String(String::new())),
            ..Self::new(PARAGRAPH_BLOCK)
        }
    }

    /// Parse a raw JSON value, keeping it only if it is an object with a
    /// string `type` tag.
    pub fn from_value(value: Value) -> Option<Self> {
        match value.get("type") {
            Some(Value::String(_)) if value.is_object() => serde_json::from_value(value).ok(),
            _ => None,
        }
    }

    /// String-valued prop, if present
    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.props.as_ref()?.get(key)?.as_str()
    }

    /// Set a prop, turning `props` into an object if it was absent or not one
    pub fn set_prop(&mut self, key: &str, value: Value) {
        match self.props.as_mut() {
            Some(Value::Object(map)) => {
                map.insert(key.to_string(), value);
            }
            _ => {
                let mut map = Map::new();
                map.insert(key.to_string(), value);
                self.props = Some(Value::Object(map));
            }
        }
    }
}

/// Lenient reader for a page's block list: `null`, a non-array value, or
/// entries that are not well-formed blocks never fail the whole document.
fn deserialize_blocks<'de, D>(deserializer: D) -> Result<Vec<Block>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Array(items)) => items.into_iter().filter_map(Block::from_value).collect(),
        _ => Vec::new(),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_blocks")]
    pub blocks: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub category_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub is_expanded: bool,
}

impl Page {
    pub fn new(category_id: Uuid, title: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            blocks: vec![Block::paragraph()],
            icon: None,
            category_id,
            parent_id: None,
            is_expanded: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub is_expanded: bool,
    /// Advisory folder chosen by the user. Stored only; persistence always
    /// goes to the single document file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_path: Option<PathBuf>,
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Category {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            icon: None,
            is_expanded: true,
            folder_path: None,
            pages: Vec::new(),
        }
    }
}

/// The persisted unit: every category with its pages, written as a bare
/// JSON array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct Document {
    pub categories: Vec<Category>,
}

impl Document {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.categories.iter().map(|c| c.pages.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_paragraph_serializes_minimal() {
        let value = serde_json::to_value(Block::paragraph()).unwrap();
        assert_eq!(value, json!({ "type": "paragraph", "content": "" }));
    }

    #[test]
    fn test_block_keeps_unknown_fields() {
        let raw = json!({
            "id": "b1",
            "type": "heading",
            "props": { "level": 2 },
            "content": [{ "type": "text", "text": "Hi" }],
            "children": []
        });
        let block = Block::from_value(raw.clone()).unwrap();
        assert_eq!(block.block_type, "heading");
        assert_eq!(block.extra.get("id"), Some(&json!("b1")));
        assert_eq!(serde_json::to_value(&block).unwrap(), raw);
    }

    #[test]
    fn test_block_requires_type_tag() {
        assert!(Block::from_value(json!({ "content": "x" })).is_none());
        assert!(Block::from_value(json!({ "type": 3 })).is_none());
        assert!(Block::from_value(json!("paragraph")).is_none());
    }

    #[test]
    fn test_page_tolerates_bad_blocks() {
        let category_id = Uuid::new_v4();
        let raw = json!({
            "id": Uuid::new_v4(),
            "title": "Notes",
            "blocks": [{ "type": "paragraph", "content": "ok" }, 42, { "props": {} }],
            "categoryId": category_id
        });
        let page: Page = serde_json::from_value(raw).unwrap();
        assert_eq!(page.blocks.len(), 1);
        assert_eq!(page.category_id, category_id);
        assert!(!page.is_expanded);

        let raw = json!({ "id": Uuid::new_v4(), "title": "Empty", "blocks": null, "categoryId": category_id });
        let page: Page = serde_json::from_value(raw).unwrap();
        assert!(page.blocks.is_empty());
    }

    #[test]
    fn test_document_is_bare_array() {
        let mut category = Category::new("Default".to_string());
        category.pages.push(Page::new(category.id, "Welcome".to_string()));
        let doc = Document::new(vec![category]);

        let value = serde_json::to_value(&doc).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["pages"][0]["categoryId"], json!(doc.categories[0].id));
        assert!(value[0]["pages"][0].get("parentId").is_none());
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn test_set_prop_creates_object() {
        let mut block = Block::new("flow");
        block.set_prop("data", json!("{}"));
        assert_eq!(block.prop_str("data"), Some("{}"));

        block.props = Some(json!("garbage"));
        block.set_prop("data", json!("[]"));
        assert_eq!(block.prop_str("data"), Some("[]"));
    }
}
