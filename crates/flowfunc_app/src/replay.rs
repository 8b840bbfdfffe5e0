// SPDX-License-Identifier: MIT OR Apache-2.0
//! Drive an editor through a scripted sequence of host and user events.
//!
//! A script is JSON: initial props, a viewport size and a list of steps.
//!
//! ```json
//! {
//!   "props": { "config": { "nodeTypes": [] }, "nodes": {} },
//!   "viewport": { "width": 800, "height": 600 },
//!   "steps": [
//!     { "click": { "node": "n1" } },
//!     { "click": { "node": "n2", "modifier": true } },
//!     { "move_node": { "node": "n1", "x": 10, "y": 20 } },
//!     "fit",
//!     "toggle_zoom"
//!   ]
//! }
//! ```

use crate::editor::Editor;
use crate::error::AppError;
use crate::headless::HeadlessEngine;
use crate::props::{EditorOutput, EditorProps};
use egui::Vec2;
use flowfunc_graph::{Compiler, ElementId, ElementTree, GraphEngine, Node};
use serde::Deserialize;
use std::path::Path;

/// Viewport size in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ViewportSize {
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl From<ViewportSize> for Vec2 {
    fn from(size: ViewportSize) -> Self {
        Vec2::new(size.width, size.height)
    }
}

/// One scripted event
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Click a node, or the background when `node` is absent
    Click {
        /// Target node
        #[serde(default)]
        node: Option<String>,
        /// Ctrl/cmd held
        #[serde(default)]
        modifier: bool,
    },
    /// Double click a node, or the background
    DoubleClick {
        /// Target node
        #[serde(default)]
        node: Option<String>,
    },
    /// Add a node through the engine
    AddNode(Node),
    /// Move a node through the engine
    MoveNode {
        /// Node id
        node: String,
        /// New x
        x: f32,
        /// New y
        y: f32,
    },
    /// Delete a node through the engine
    RemoveNode {
        /// Node id
        node: String,
    },
    /// Host replaces the props
    Update(Box<EditorProps>),
    /// Fit button
    Fit,
    /// Viewport resized
    Resize(ViewportSize),
    /// Zoom toggle button
    ToggleZoom,
    /// Pan toggle button
    TogglePan,
}

/// A complete replay script
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Props at mount
    #[serde(default)]
    pub props: EditorProps,
    /// Viewport size at mount
    #[serde(default)]
    pub viewport: ViewportSize,
    /// Events, in order
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Script {
    /// Load a script from a JSON file
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Run `script` against a headless editor and collect every output
pub fn run(script: Script, compiler: Compiler) -> Result<Vec<EditorOutput>, AppError> {
    let mut editor: Editor<HeadlessEngine, ElementTree> =
        Editor::new(compiler, script.props, ElementTree::new(), script.viewport.into())?;
    sync_surface(&mut editor);

    let mut outputs = editor.drain_outputs();
    for (index, step) in script.steps.into_iter().enumerate() {
        tracing::debug!("Step {}: {:?}", index, step);
        match step {
            Step::Click { node, modifier } => {
                let target = target(&editor, node.as_deref());
                editor.click(target, modifier);
            }
            Step::DoubleClick { node } => {
                let target = target(&editor, node.as_deref());
                editor.double_click(target);
            }
            Step::AddNode(node) => {
                if editor.engine_mut().add_node(node) {
                    editor.graph_changed();
                }
            }
            Step::MoveNode { node, x, y } => {
                if editor.engine_mut().move_node(&node, x, y) {
                    editor.graph_changed();
                } else {
                    tracing::warn!("Step {}: no node '{}' to move", index, node);
                }
            }
            Step::RemoveNode { node } => {
                if editor.engine_mut().remove_node(&node).is_some() {
                    editor.graph_changed();
                }
            }
            Step::Update(props) => editor.update(*props)?,
            Step::Fit => {
                editor.fit_to_view();
            }
            Step::Resize(size) => {
                editor.resize(size.into());
            }
            Step::ToggleZoom => editor.toggle_zoom(),
            Step::TogglePan => editor.toggle_pan(),
        }
        sync_surface(&mut editor);
        outputs.extend(editor.drain_outputs());
    }
    Ok(outputs)
}

/// Render a wrapper for every engine node that has none yet
fn sync_surface(editor: &mut Editor<HeadlessEngine, ElementTree>) {
    let nodes = editor.engine().nodes();
    for node_id in nodes.keys() {
        editor.surface_mut().ensure_node(node_id);
    }
}

fn target(editor: &Editor<HeadlessEngine, ElementTree>, node: Option<&str>) -> ElementId {
    node.and_then(|id| editor.surface().node_element(id))
        .unwrap_or(ElementTree::CONTAINER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn script(steps: serde_json::Value) -> Script {
        serde_json::from_value(json!({
            "props": {
                "config": {
                    "nodeTypes": [
                        {"type": "number", "label": "Number",
                         "outputs": [{"type": "number"}]}
                    ]
                },
                "nodes": {
                    "n1": {"id": "n1", "type": "number", "x": 0, "y": 0},
                    "n2": {"id": "n2", "type": "number", "x": 100, "y": 100}
                }
            },
            "viewport": {"width": 500, "height": 500},
            "steps": steps
        }))
        .unwrap()
    }

    #[test]
    fn test_replay_selection_and_toggles() {
        let outputs = run(
            script(json!([
                {"click": {"node": "n1"}},
                {"click": {"node": "n2", "modifier": true}},
                {"double_click": {"node": "n2"}},
                {"click": {}},
                "toggle_pan"
            ])),
            Compiler::new(),
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&outputs).unwrap(),
            json!([
                {"selected_nodes": ["n1"]},
                {"selected_nodes": ["n1", "n2"]},
                {"double_clicked_node": "n2"},
                {"selected_nodes": []},
                {"disable_pan": true}
            ])
        );
    }

    #[test]
    fn test_replay_graph_edits() {
        let outputs = run(
            script(json!([
                {"add_node": {"id": "n3", "type": "number", "x": 5, "y": 5}},
                {"move_node": {"node": "n1", "x": 7, "y": 8}},
                {"move_node": {"node": "ghost", "x": 0, "y": 0}},
                {"click": {"node": "n3"}}
            ])),
            Compiler::new(),
        )
        .unwrap();

        assert_eq!(outputs.len(), 3);
        let value = serde_json::to_value(&outputs).unwrap();
        assert_eq!(value[0]["editor_status"], "client");
        assert!(value[0]["nodes"]["n3"].is_object());
        assert_eq!(value[1]["nodes"]["n1"]["x"], 7.0);
        assert_eq!(value[2], json!({"selected_nodes": ["n3"]}));
    }

    #[test]
    fn test_replay_rejects_bad_schema_update() {
        let mut script = script(json!([]));
        let mut next = script.props.clone();
        next.config.node_types[0].outputs[0].port_type = "missing".to_string();
        script.steps.push(Step::Update(Box::new(next)));

        assert!(matches!(run(script, Compiler::new()), Err(AppError::Config(_))));
    }
}
