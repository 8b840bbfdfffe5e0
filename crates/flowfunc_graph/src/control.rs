// SPDX-License-Identifier: MIT OR Apache-2.0
//! Controls attached to port types and the factory table that builds them.
//!
//! A schema declares controls as `{ "type": kind, ...params }`. The kind picks
//! a factory from [`ControlFactories`]; every other field is handed to the
//! factory untouched.

use crate::error::ConfigError;
use crate::schema::ControlSpec;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Widget family of a control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    /// Non-interactive label showing the port label
    Label,
    /// Single-line text entry
    Text,
    /// Numeric entry
    Number,
    /// Boolean toggle
    Checkbox,
    /// Pick one option
    Select,
    /// Pick any number of options
    Multiselect,
}

/// One entry of a select/multiselect control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlOption {
    /// Stored value
    pub value: Value,
    /// Display label
    pub label: String,
    /// Optional help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A resolved control, ready for the graph engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    /// Widget family
    pub kind: ControlKind,
    /// Key the control's value is stored under in the node's input data
    pub name: String,
    /// Display label
    pub label: String,
    /// Value used before the user edits the control
    pub default_value: Value,
    /// Options for select/multiselect controls
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ControlOption>,
    /// Remaining declared parameters (placeholder, step, min, max, ...)
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

impl Control {
    /// The label-only control synthesized for port types that declare no controls
    pub fn port_label(port_type: &str, label: &str) -> Self {
        Self {
            kind: ControlKind::Label,
            name: port_type.to_string(),
            label: label.to_string(),
            default_value: Value::Null,
            options: Vec::new(),
            params: Map::new(),
        }
    }
}

/// Builds a control from the declaring port type id and the declared parameters
pub type ControlFactory = fn(&str, Map<String, Value>) -> Control;

/// Lookup table from control kind name to factory
#[derive(Debug, Clone)]
pub struct ControlFactories {
    factories: IndexMap<String, ControlFactory>,
}

impl ControlFactories {
    /// An empty table
    pub fn empty() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    /// The standard controls: label, text, number, checkbox, select, multiselect
    pub fn standard() -> Self {
        let mut table = Self::empty();
        table.register("label", label_control);
        table.register("text", text_control);
        table.register("number", number_control);
        table.register("checkbox", checkbox_control);
        table.register("select", select_control);
        table.register("multiselect", multiselect_control);
        table
    }

    /// Register or replace a factory
    pub fn register(&mut self, kind: impl Into<String>, factory: ControlFactory) {
        self.factories.insert(kind.into(), factory);
    }

    /// Whether a factory exists for `kind`
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Resolve a declared control for `port_type`
    pub fn resolve(&self, port_type: &str, spec: &ControlSpec) -> Result<Control, ConfigError> {
        let factory = self
            .factories
            .get(&spec.kind)
            .ok_or_else(|| ConfigError::UnknownControlType {
                port_type: port_type.to_string(),
                kind: spec.kind.clone(),
            })?;
        Ok(factory(port_type, spec.params.clone()))
    }
}

impl Default for ControlFactories {
    fn default() -> Self {
        Self::standard()
    }
}

fn take_string(params: &mut Map<String, Value>, key: &str) -> Option<String> {
    match params.remove(key) {
        Some(Value::String(s)) => Some(s),
        Some(other) if !other.is_null() => Some(other.to_string()),
        _ => None,
    }
}

fn take_options(params: &mut Map<String, Value>) -> Vec<ControlOption> {
    params
        .remove("options")
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default()
}

fn build(
    kind: ControlKind,
    port_type: &str,
    mut params: Map<String, Value>,
    fallback_default: Value,
) -> Control {
    let name = take_string(&mut params, "name").unwrap_or_else(|| port_type.to_string());
    let label = take_string(&mut params, "label").unwrap_or_default();
    let default_value = params
        .remove("defaultValue")
        .filter(|value| !value.is_null())
        .unwrap_or(fallback_default);
    let options = take_options(&mut params);
    Control {
        kind,
        name,
        label,
        default_value,
        options,
        params,
    }
}

fn label_control(port_type: &str, params: Map<String, Value>) -> Control {
    build(ControlKind::Label, port_type, params, Value::Null)
}

fn text_control(port_type: &str, params: Map<String, Value>) -> Control {
    build(ControlKind::Text, port_type, params, Value::String(String::new()))
}

fn number_control(port_type: &str, params: Map<String, Value>) -> Control {
    build(ControlKind::Number, port_type, params, Value::from(0))
}

fn checkbox_control(port_type: &str, params: Map<String, Value>) -> Control {
    build(ControlKind::Checkbox, port_type, params, Value::Bool(false))
}

fn select_control(port_type: &str, params: Map<String, Value>) -> Control {
    let mut control = build(ControlKind::Select, port_type, params, Value::Null);
    if control.default_value.is_null() {
        if let Some(first) = control.options.first() {
            control.default_value = first.value.clone();
        }
    }
    control
}

fn multiselect_control(port_type: &str, params: Map<String, Value>) -> Control {
    build(ControlKind::Multiselect, port_type, params, Value::Array(Vec::new()))
}
