// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host-supplied schema of port and node types.
//!
//! The schema is plain data, usually produced by the host application as
//! JSON. It is turned into a [`Registry`](crate::registry::Registry) by the
//! [`Compiler`](crate::compiler::Compiler).

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Complete schema: every custom port type and node type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Port type definitions, in registration order
    #[serde(default)]
    pub port_types: Vec<PortTypeSpec>,
    /// Node type definitions, in registration order
    #[serde(default)]
    pub node_types: Vec<NodeTypeSpec>,
}

impl Schema {
    /// Parse a schema from JSON text
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a schema from RON text
    pub fn from_ron(text: &str) -> Result<Self, SchemaError> {
        Ok(ron::from_str(text)?)
    }

    /// Load a schema file, picking the format from its extension
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&text),
            Some("ron") => Self::from_ron(&text),
            other => Err(SchemaError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }
}

/// Declared port type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortTypeSpec {
    /// Port type id
    #[serde(rename = "type", alias = "id")]
    pub id: String,
    /// Default port name, falls back to the id
    #[serde(default)]
    pub name: Option<String>,
    /// Display label
    #[serde(default)]
    pub label: String,
    /// Palette token
    #[serde(default)]
    pub color: Option<String>,
    /// Declared controls; empty means "label only"
    #[serde(default)]
    pub controls: Vec<ControlSpec>,
    /// Port type ids this port accepts connections from; defaults to its own id
    #[serde(default)]
    pub accept_types: Option<Vec<String>>,
    /// Hide the connection point
    #[serde(default)]
    pub hide_port: bool,
}

/// Declared control: a kind plus free-form parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSpec {
    /// Control kind, e.g. `text` or `select`
    #[serde(rename = "type")]
    pub kind: String,
    /// Every other declared field
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

/// Declared node type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTypeSpec {
    /// Node type id
    #[serde(rename = "type", alias = "id")]
    pub id: String,
    /// Display label
    #[serde(default)]
    pub label: String,
    /// Optional category, prefixed to the label
    #[serde(default)]
    pub category: Option<String>,
    /// Help text
    #[serde(default)]
    pub description: Option<String>,
    /// Initial rendered width
    #[serde(default)]
    pub initial_width: Option<f32>,
    /// Whether the node shows up in the add-node menu
    #[serde(default)]
    pub addable: Option<bool>,
    /// Whether instances can be deleted
    #[serde(default)]
    pub deletable: Option<bool>,
    /// Root nodes are the graph's outputs
    #[serde(default)]
    pub root: bool,
    /// Ordering hint for menus
    #[serde(default)]
    pub sort_index: Option<i32>,
    /// Input port strategy
    #[serde(default)]
    pub inputs: Option<InputsSpec>,
    /// Output ports
    #[serde(default)]
    pub outputs: Vec<PortSpec>,
}

impl NodeTypeSpec {
    /// `"{category}: {label}"` when a category is set, otherwise the label
    pub fn effective_label(&self) -> String {
        match self.category.as_deref().map(str::trim) {
            Some(category) if !category.is_empty() => format!("{category}: {}", self.label),
            _ => self.label.clone(),
        }
    }
}

/// How a node type computes its input ports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputsSpec {
    /// Script body evaluated with `(ports, input_data, connections, context)`
    Expression {
        /// Script source
        source: String,
    },
    /// Name of a function in the compiler's input function registry
    Path {
        /// Dotted function name
        path: String,
    },
    /// Fixed list of ports
    Ports(Vec<PortSpec>),
}

impl InputsSpec {
    /// Whether this spec declares nothing
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Expression { source } => source.trim().is_empty(),
            Self::Path { path } => path.trim().is_empty(),
            Self::Ports(ports) => ports.is_empty(),
        }
    }
}

/// One structured port entry on a node type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortSpec {
    /// Port type id, resolved through the ports factory
    #[serde(rename = "type")]
    pub port_type: String,
    /// Port name, unique per node side
    #[serde(default)]
    pub name: Option<String>,
    /// Display label
    #[serde(default)]
    pub label: Option<String>,
    /// Suppress the port type's controls
    #[serde(default)]
    pub no_controls: Option<bool>,
    /// Hide the connection point
    #[serde(default)]
    pub hide_port: Option<bool>,
    /// Palette token overriding the port type's color
    #[serde(default)]
    pub color: Option<String>,
}
