// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node type definitions and the externally owned node instances.

use crate::expression::InputExpression;
use crate::functions::InputFn;
use crate::port::{Port, PortFactory};
use egui::Pos2;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Node instances keyed by node id, as reported by the graph engine
pub type NodeMap = IndexMap<String, Node>;

/// Comments keyed by comment id. Opaque to this crate.
pub type CommentMap = Map<String, Value>;

/// A node instance in the editor. Owned by the graph engine; read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique instance id
    pub id: String,
    /// Node type id
    #[serde(rename = "type")]
    pub node_type: String,
    /// Horizontal position in graph space
    pub x: f32,
    /// Vertical position in graph space
    pub y: f32,
    /// Rendered width, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    /// Control values keyed by port name
    #[serde(default)]
    pub input_data: Value,
    /// Connections keyed by side and port name
    #[serde(default)]
    pub connections: Value,
    /// Fields this crate does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    /// Create a node at a position
    pub fn new(id: impl Into<String>, node_type: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            x,
            y,
            width: None,
            input_data: Value::Null,
            connections: Value::Null,
            extra: Map::new(),
        }
    }

    /// Position in graph space
    pub fn position(&self) -> Pos2 {
        Pos2::new(self.x, self.y)
    }
}

/// How a node type produces its input ports
#[derive(Clone)]
pub enum InputPorts {
    /// Fixed list built at compile time
    Static(Vec<Port>),
    /// Sandboxed expression evaluated per request
    Expression(InputExpression),
    /// Registered host function
    Function {
        /// Path the function was registered under
        path: String,
        /// The function
        function: InputFn,
    },
}

impl InputPorts {
    /// Produce the ports for one node instance
    pub fn resolve(
        &self,
        ports: &PortFactory<'_>,
        input_data: &Value,
        connections: &Value,
        context: &Value,
    ) -> Vec<Port> {
        match self {
            Self::Static(list) => list.clone(),
            Self::Expression(expression) => {
                expression.evaluate(ports, input_data, connections, context)
            }
            Self::Function { function, .. } => function(ports, input_data, connections, context),
        }
    }

    /// Whether the ports can differ between instances
    pub fn is_dynamic(&self) -> bool {
        !matches!(self, Self::Static(_))
    }
}

impl fmt::Debug for InputPorts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(list) => f.debug_tuple("Static").field(list).finish(),
            Self::Expression(expression) => f.debug_tuple("Expression").field(expression).finish(),
            Self::Function { path, .. } => f.debug_struct("Function").field("path", path).finish(),
        }
    }
}

impl PartialEq for InputPorts {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Static(a), Self::Static(b)) => a == b,
            (Self::Expression(a), Self::Expression(b)) => a == b,
            (Self::Function { path: a, .. }, Self::Function { path: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Serialize for InputPorts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Static(list) => list.serialize(serializer),
            Self::Expression(expression) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("source", expression.source())?;
                map.end()
            }
            Self::Function { path, .. } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("path", path)?;
                map.end()
            }
        }
    }
}

/// A resolved node type, as registered with the graph engine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeType {
    /// Node type id
    #[serde(rename = "type")]
    pub id: String,
    /// Effective label (category-prefixed)
    pub label: String,
    /// Help text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Initial rendered width
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_width: Option<f32>,
    /// Shown in the add-node menu
    pub addable: bool,
    /// Instances can be deleted
    pub deletable: bool,
    /// Root node marker
    pub root: bool,
    /// Menu ordering hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_index: Option<i32>,
    /// Input strategy
    pub inputs: InputPorts,
    /// Output ports
    pub outputs: Vec<Port>,
}

impl NodeType {
    /// Create a node type with no ports
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            initial_width: None,
            addable: true,
            deletable: true,
            root: false,
            sort_index: None,
            inputs: InputPorts::Static(Vec::new()),
            outputs: Vec::new(),
        }
    }

    /// Input ports for one instance of this type
    pub fn input_ports(
        &self,
        ports: &PortFactory<'_>,
        input_data: &Value,
        connections: &Value,
        context: &Value,
    ) -> Vec<Port> {
        self.inputs.resolve(ports, input_data, connections, context)
    }
}
