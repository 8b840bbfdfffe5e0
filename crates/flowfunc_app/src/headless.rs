// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory graph engine for hosts without a renderer.

use flowfunc_graph::{
    CommentMap, EngineConfig, GraphEngine, MountKey, Node, NodeMap, Port, Registry, Transform,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Entry of the `default_nodes` list
#[derive(Debug, Deserialize)]
struct DefaultNode {
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
}

/// A graph engine that keeps nodes, comments and the transform in memory
#[derive(Debug, Clone)]
pub struct HeadlessEngine {
    config: EngineConfig,
    nodes: NodeMap,
    comments: CommentMap,
    transform: Transform,
}

impl HeadlessEngine {
    /// Configuration this instance was mounted with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registry this instance was mounted with
    pub fn registry(&self) -> &Arc<Registry> {
        &self.config.registry
    }

    /// Current transform
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Add a node of a registered type. Returns `false` for unknown types.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.config.registry.node_type(&node.node_type).is_none() {
            tracing::warn!("Refusing node '{}' of unknown type '{}'", node.id, node.node_type);
            return false;
        }
        self.nodes.insert(node.id.clone(), node);
        true
    }

    /// Move a node. Returns `false` if the node does not exist.
    pub fn move_node(&mut self, node_id: &str, x: f32, y: f32) -> bool {
        match self.nodes.get_mut(node_id) {
            Some(node) => {
                node.x = x;
                node.y = y;
                true
            }
            None => false,
        }
    }

    /// Remove a node unless its type forbids deletion
    pub fn remove_node(&mut self, node_id: &str) -> Option<Node> {
        let node = self.nodes.get(node_id)?;
        let deletable = self
            .config
            .registry
            .node_type(&node.node_type)
            .map_or(true, |node_type| node_type.deletable);
        if !deletable {
            tracing::debug!("Node '{}' is not deletable", node_id);
            return None;
        }
        self.nodes.shift_remove(node_id)
    }

    /// Set a comment
    pub fn set_comment(&mut self, comment_id: impl Into<String>, comment: Value) {
        self.comments.insert(comment_id.into(), comment);
    }

    /// Input ports of a node instance, resolved against its own data
    pub fn input_ports(&self, node_id: &str) -> Option<Vec<Port>> {
        let node = self.nodes.get(node_id)?;
        self.config.registry.input_ports(
            &node.node_type,
            &node.input_data,
            &node.connections,
            &self.config.context,
        )
    }

    fn default_nodes(config: &EngineConfig) -> NodeMap {
        let mut nodes = NodeMap::new();
        for value in &config.default_nodes {
            match serde_json::from_value::<DefaultNode>(value.clone()) {
                Ok(default) if config.registry.node_type(&default.node_type).is_some() => {
                    let id = Uuid::new_v4().simple().to_string();
                    nodes.insert(
                        id.clone(),
                        Node::new(id, default.node_type, default.x, default.y),
                    );
                }
                Ok(default) => {
                    tracing::warn!("Default node of unknown type '{}' skipped", default.node_type);
                }
                Err(e) => tracing::warn!("Invalid default node skipped: {}", e),
            }
        }
        nodes
    }
}

impl GraphEngine for HeadlessEngine {
    fn mount(config: EngineConfig) -> Self {
        let nodes = if config.nodes.is_empty() {
            Self::default_nodes(&config)
        } else {
            config.nodes.clone()
        };
        tracing::debug!("Mounted engine {} with {} nodes", config.mount_key, nodes.len());
        Self {
            transform: Transform::with_scale(config.initial_scale),
            nodes,
            comments: CommentMap::new(),
            config,
        }
    }

    fn nodes(&self) -> NodeMap {
        self.nodes.clone()
    }

    fn comments(&self) -> CommentMap {
        self.comments.clone()
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    fn mount_key(&self) -> MountKey {
        self.config.mount_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowfunc_graph::{Compiler, Schema};
    use serde_json::json;

    fn config(nodes: NodeMap, default_nodes: Vec<Value>) -> EngineConfig {
        let schema: Schema = serde_json::from_value(json!({
            "nodeTypes": [
                {"type": "start", "label": "Start", "deletable": false,
                 "outputs": [{"type": "number", "name": "value"}]},
                {"type": "add", "label": "Add",
                 "inputs": [{"type": "number", "name": "a"}, {"type": "number", "name": "b"}],
                 "outputs": [{"type": "number", "name": "sum"}]}
            ]
        }))
        .unwrap();
        EngineConfig {
            registry: Arc::new(Compiler::new().compile(&schema, true).unwrap()),
            nodes,
            default_nodes,
            context: Value::Null,
            initial_scale: 0.75,
            disable_zoom: false,
            disable_pan: false,
            space_to_pan: false,
            mount_key: MountKey::new(),
        }
    }

    #[test]
    fn test_mount_uses_given_nodes() {
        let mut nodes = NodeMap::new();
        nodes.insert("n1".to_string(), Node::new("n1", "add", 5.0, 6.0));
        let engine = HeadlessEngine::mount(config(nodes.clone(), vec![json!({"type": "start"})]));

        assert_eq!(engine.nodes(), nodes);
        assert_eq!(engine.transform(), Transform::with_scale(0.75));
        assert_eq!(engine.mount_key(), engine.config().mount_key);
    }

    #[test]
    fn test_mount_creates_default_nodes() {
        let engine = HeadlessEngine::mount(config(
            NodeMap::new(),
            vec![
                json!({"type": "start", "x": 10, "y": 20}),
                json!({"type": "missing"}),
                json!({"x": 1}),
            ],
        ));
        let nodes = engine.nodes();
        assert_eq!(nodes.len(), 1);
        let node = nodes.values().next().unwrap();
        assert_eq!(node.node_type, "start");
        assert_eq!((node.x, node.y), (10.0, 20.0));
    }

    #[test]
    fn test_mutations() {
        let mut engine = HeadlessEngine::mount(config(NodeMap::new(), Vec::new()));
        assert!(engine.add_node(Node::new("s", "start", 0.0, 0.0)));
        assert!(engine.add_node(Node::new("a", "add", 0.0, 0.0)));
        assert!(!engine.add_node(Node::new("x", "missing", 0.0, 0.0)));

        assert!(engine.move_node("a", 40.0, 50.0));
        assert!(!engine.move_node("x", 1.0, 1.0));
        assert_eq!(engine.nodes()["a"].position(), egui::Pos2::new(40.0, 50.0));

        assert!(engine.remove_node("s").is_none());
        assert!(engine.remove_node("a").is_some());
        assert_eq!(engine.nodes().len(), 1);

        engine.set_comment("c1", json!({"text": "hello"}));
        assert_eq!(engine.comments()["c1"]["text"], "hello");
    }

    #[test]
    fn test_input_ports_resolve_per_instance() {
        let mut engine = HeadlessEngine::mount(config(NodeMap::new(), Vec::new()));
        engine.add_node(Node::new("a", "add", 0.0, 0.0));
        let ports = engine.input_ports("a").unwrap();
        let names: Vec<&str> = ports.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(engine.input_ports("nope").is_none());
    }
}
