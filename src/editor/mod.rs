//! Synchronization between the document tree and the external block editor,
//! plus the content rules the editor relies on.

mod binding;
mod sanitize;
pub mod widgets;

pub use binding::{BlockEditor, CaptureOutcome, EditorBinding, EditorMirror};
pub use sanitize::{sanitize_blocks, sanitize_values};
pub use widgets::{WidgetKind, WIDGET_STATE_PROP};
