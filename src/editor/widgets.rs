//! Embedded widget blocks.
//!
//! `flow`, `gantt` and `whiteboard` blocks keep their whole state as a JSON
//! string in `props.data`. The editor canvas owns the interaction; this
//! module only knows the state shapes well enough to repair them and to
//! notice flow nodes that stand for pages.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::storage::Block;
use crate::tree::{WidgetCommand, UNTITLED};

/// Prop holding a widget's JSON-encoded state
pub const WIDGET_STATE_PROP: &str = "data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Flow,
    Gantt,
    Whiteboard,
}

impl WidgetKind {
    pub fn from_block_type(block_type: &str) -> Option<Self> {
        match block_type {
            "flow" => Some(Self::Flow),
            "gantt" => Some(Self::Gantt),
            "whiteboard" => Some(Self::Whiteboard),
            _ => None,
        }
    }

    pub fn block_type(self) -> &'static str {
        match self {
            Self::Flow => "flow",
            Self::Gantt => "gantt",
            Self::Whiteboard => "whiteboard",
        }
    }

    /// Repair a serialized state. Missing or unparsable input becomes the
    /// empty state; a state that needed no repair comes back byte-identical.
    pub fn normalize(self, raw: Option<&str>) -> String {
        match self {
            Self::Flow => normalize_state(raw, FlowState::repair),
            Self::Gantt => normalize_state(raw, GanttState::repair),
            Self::Whiteboard => normalize_state(raw, WhiteboardState::repair),
        }
    }
}

fn normalize_state<T>(raw: Option<&str>, repair: fn(&mut T)) -> String
where
    T: DeserializeOwned + Serialize + Default + PartialEq,
{
    let parsed = raw.and_then(|s| serde_json::from_str::<T>(s).ok());
    let (mut state, original) = match parsed {
        Some(state) => (state, raw),
        None => (T::default(), None),
    };

    let before_repair = original.map(|_| serde_json::to_value(&state).ok());
    repair(&mut state);

    if let (Some(raw), Some(Some(before))) = (original, before_repair) {
        if serde_json::to_value(&state).ok().as_ref() == Some(&before) {
            return raw.to_string();
        }
    }

    match serde_json::to_string(&state) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Failed to serialize widget state: {}", e);
            "{}".to_string()
        }
    }
}

// ===== Flow diagram =====

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Viewport {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
}

fn default_zoom() -> f64 {
    1.0
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: default_zoom(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlowNode {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub position: Position,
    /// Page this node stands for, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<Uuid>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FlowState {
    #[serde(default)]
    pub nodes: Vec<FlowNode>,
    #[serde(default)]
    pub edges: Vec<FlowEdge>,
    #[serde(default)]
    pub viewport: Viewport,
}

impl FlowState {
    /// Drop duplicate nodes and edges whose endpoints are gone
    fn repair(&mut self) {
        let mut seen = HashSet::new();
        self.nodes.retain(|n| seen.insert(n.id.clone()));
        self.edges
            .retain(|e| seen.contains(&e.source) && seen.contains(&e.target));
        if !self.viewport.zoom.is_finite() || self.viewport.zoom <= 0.0 {
            self.viewport.zoom = default_zoom();
        }
    }

    pub fn from_block(block: &Block) -> Option<Self> {
        if WidgetKind::from_block_type(&block.block_type) != Some(WidgetKind::Flow) {
            return None;
        }
        serde_json::from_str(block.prop_str(WIDGET_STATE_PROP)?).ok()
    }

    /// (page id, node label) for every node that stands for a page
    pub fn linked_pages(&self) -> Vec<(Uuid, String)> {
        self.nodes
            .iter()
            .filter_map(|n| n.page_id.map(|id| (id, n.label.clone())))
            .collect()
    }
}

fn linked_pages_in(blocks: &[Block]) -> Vec<(Uuid, String)> {
    blocks
        .iter()
        .filter_map(FlowState::from_block)
        .flat_map(|state| state.linked_pages())
        .collect()
}

/// Compare the flow diagrams of a page before and after an edit and turn
/// added or removed page nodes into tree requests.
pub fn linked_page_commands(before: &[Block], after: &[Block], host_page: Uuid) -> Vec<WidgetCommand> {
    let old = linked_pages_in(before);
    let new = linked_pages_in(after);
    let old_ids: HashSet<Uuid> = old.iter().map(|(id, _)| *id).collect();
    let new_ids: HashSet<Uuid> = new.iter().map(|(id, _)| *id).collect();

    let mut commands = Vec::new();
    let mut emitted = HashSet::new();

    for (page_id, label) in &new {
        if *page_id == host_page || old_ids.contains(page_id) || !emitted.insert(*page_id) {
            continue;
        }
        let title = if label.trim().is_empty() {
            UNTITLED.to_string()
        } else {
            label.clone()
        };
        commands.push(WidgetCommand::CreateLinkedPage {
            page_id: *page_id,
            title,
            parent_id: host_page,
        });
    }

    for (page_id, _) in &old {
        if *page_id == host_page || new_ids.contains(page_id) || !emitted.insert(*page_id) {
            continue;
        }
        commands.push(WidgetCommand::DeleteLinkedPage { page_id: *page_id });
    }

    commands
}

// ===== Gantt chart =====

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GanttTask {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Percent complete, 0 to 100
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GanttState {
    #[serde(default)]
    pub tasks: Vec<GanttTask>,
}

impl GanttState {
    fn repair(&mut self) {
        let ids: HashSet<String> = self.tasks.iter().map(|t| t.id.clone()).collect();
        for task in self.tasks.iter_mut() {
            if task.end < task.start {
                task.end = task.start;
            }
            task.progress = if task.progress.is_finite() {
                task.progress.clamp(0.0, 100.0)
            } else {
                0.0
            };
            let own_id = task.id.clone();
            task.dependencies
                .retain(|dep| *dep != own_id && ids.contains(dep));
        }
    }
}

// ===== Whiteboard =====

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

fn default_color() -> String {
    "#000000".to_string()
}

fn default_width() -> f64 {
    2.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stroke {
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WhiteboardState {
    #[serde(default)]
    pub strokes: Vec<Stroke>,
}

impl WhiteboardState {
    fn repair(&mut self) {
        self.strokes.retain(|s| !s.points.is_empty());
        for stroke in self.strokes.iter_mut() {
            if !stroke.width.is_finite() || stroke.width <= 0.0 {
                stroke.width = default_width();
            }
        }
    }
}
