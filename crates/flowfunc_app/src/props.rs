// SPDX-License-Identifier: MIT OR Apache-2.0
//! Properties the host passes to the editor, and what the editor reports back.

use flowfunc_graph::{CommentMap, NodeMap, Schema, StatusTable};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Who last wrote the node set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorStatus {
    /// The editor itself, after a user edit
    Client,
    /// The host pushed a new node set
    Server,
}

/// Host-controlled editor properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorProps {
    /// Component id assigned by the host
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Port and node type schema
    pub config: Schema,
    /// Node set to show
    pub nodes: NodeMap,
    /// Execution status per node id
    #[serde(
        default,
        deserialize_with = "flowfunc_graph::status::lenient_status_table",
        skip_serializing_if = "Option::is_none"
    )]
    pub nodes_status: Option<StatusTable>,
    /// Origin of the current node set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor_status: Option<EditorStatus>,
    /// Enforce declared accept types on connections
    pub type_safety: bool,
    /// Nodes to create when the node set is empty
    pub default_nodes: Vec<Value>,
    /// Passed through to input strategies
    pub context: Value,
    /// Zoom level at first mount
    pub initial_scale: f32,
    /// Disable mouse-wheel zoom
    pub disable_zoom: bool,
    /// Disable panning
    pub disable_pan: bool,
    /// Require the space bar to pan
    pub space_to_pan: bool,
    /// Fit the graph to the viewport when this goes from false to true
    pub fit_to_view: bool,
}

impl Default for EditorProps {
    fn default() -> Self {
        Self {
            id: None,
            config: Schema::default(),
            nodes: NodeMap::new(),
            nodes_status: None,
            editor_status: None,
            type_safety: false,
            default_nodes: Vec::new(),
            context: Value::Null,
            initial_scale: 1.0,
            disable_zoom: false,
            disable_pan: false,
            space_to_pan: false,
            fit_to_view: false,
        }
    }
}

impl EditorProps {
    /// Parse props from JSON text
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Load props from a JSON file
    pub fn load(path: &Path) -> Result<Self, crate::error::AppError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&text)?)
    }

    /// Whether the host just pushed a new node set
    pub fn is_server_update(&self) -> bool {
        self.editor_status == Some(EditorStatus::Server)
    }
}

/// A property update the editor sends back to the host
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EditorOutput {
    /// The graph changed inside the editor
    Graph {
        /// Always [`EditorStatus::Client`]
        editor_status: EditorStatus,
        /// Node set read from the engine
        nodes: NodeMap,
        /// Comments read from the engine
        comments: CommentMap,
    },
    /// Selection after a click
    Selection {
        /// Selected ids in selection order
        selected_nodes: Vec<String>,
    },
    /// A node was double clicked
    DoubleClick {
        /// The node id
        double_clicked_node: String,
    },
    /// The zoom toggle was flipped
    Zoom {
        /// New value
        disable_zoom: bool,
    },
    /// The pan toggle was flipped
    Pan {
        /// New value
        disable_pan: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowfunc_graph::NodeStatus;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let props = EditorProps::from_json("{}").unwrap();
        assert_eq!(props, EditorProps::default());
        assert_eq!(props.initial_scale, 1.0);
        assert!(!props.type_safety);
        assert!(!props.is_server_update());
    }

    #[test]
    fn test_parse_host_props() {
        let props = EditorProps::from_json(
            &json!({
                "id": "editor",
                "config": {
                    "portTypes": [{"type": "image", "label": "Image"}],
                    "nodeTypes": []
                },
                "nodes": {
                    "n1": {"id": "n1", "type": "load", "x": 10, "y": 20}
                },
                "nodes_status": {"n1": "started"},
                "editor_status": "server",
                "type_safety": true,
                "fit_to_view": true,
                "selected_nodes": ["n1"]
            })
            .to_string(),
        )
        .unwrap();

        assert_eq!(props.id.as_deref(), Some("editor"));
        assert_eq!(props.config.port_types[0].id, "image");
        assert_eq!(props.nodes["n1"].x, 10.0);
        assert!(props.is_server_update());
        assert!(props.type_safety);
        assert!(props.fit_to_view);
    }

    #[test]
    fn test_bad_status_entries_do_not_reject_props() {
        let props = EditorProps::from_json(
            &json!({
                "nodes": {"n1": {"id": "n1", "type": "load", "x": 0, "y": 0}},
                "nodes_status": {"n1": "started", "n2": null}
            })
            .to_string(),
        )
        .unwrap();
        assert_eq!(props.nodes.len(), 1);
        let table = props.nodes_status.unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table["n1"], NodeStatus::Started);

        let props =
            EditorProps::from_json(r#"{"nodes_status": {"n1": "running"}}"#).unwrap();
        assert_eq!(props.nodes_status, Some(StatusTable::new()));
    }

    #[test]
    fn test_output_shapes() {
        let outputs = vec![
            EditorOutput::Selection {
                selected_nodes: vec!["n1".to_string()],
            },
            EditorOutput::DoubleClick {
                double_clicked_node: "n2".to_string(),
            },
            EditorOutput::Zoom { disable_zoom: true },
            EditorOutput::Graph {
                editor_status: EditorStatus::Client,
                nodes: NodeMap::new(),
                comments: CommentMap::new(),
            },
        ];
        assert_eq!(
            serde_json::to_value(&outputs).unwrap(),
            json!([
                {"selected_nodes": ["n1"]},
                {"double_clicked_node": "n2"},
                {"disable_zoom": true},
                {"editor_status": "client", "nodes": {}, "comments": {}}
            ])
        );
    }
}
