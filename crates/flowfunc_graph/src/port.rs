// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port type definitions and the factory that stamps ports out of them.

use crate::control::Control;
use crate::error::LookupFailure;
use crate::palette::PortColor;
use crate::schema::PortSpec;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A resolved port type, as registered with the graph engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortType {
    /// Port type id
    #[serde(rename = "type")]
    pub id: String,
    /// Default port name
    pub name: String,
    /// Display label
    pub label: String,
    /// Resolved palette color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<PortColor>,
    /// Hide the connection point
    #[serde(default)]
    pub hide_port: bool,
    /// Controls shown while the port is unconnected
    pub controls: Vec<Control>,
    /// Port type ids this port accepts connections from
    pub accept_types: Vec<String>,
}

impl PortType {
    /// Create a port type with a label control and accepting only itself
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        let id = id.into();
        let label = label.into();
        Self {
            name: id.clone(),
            controls: vec![Control::port_label(&id, &label)],
            accept_types: vec![id.clone()],
            id,
            label,
            color: None,
            hide_port: false,
        }
    }

    /// Set the color
    pub fn with_color(mut self, color: PortColor) -> Self {
        self.color = Some(color);
        self
    }

    /// Replace the controls
    pub fn with_controls(mut self, controls: Vec<Control>) -> Self {
        self.controls = controls;
        self
    }

    /// Check if a connection from a port of type `other` is accepted
    pub fn accepts(&self, other: &str) -> bool {
        self.accept_types.iter().any(|accepted| accepted == other)
    }

    /// Create a port instance of this type
    pub fn instantiate(&self, spec: &PortSpec) -> Port {
        Port {
            port_type: self.id.clone(),
            name: spec.name.clone().unwrap_or_else(|| self.name.clone()),
            label: spec.label.clone().unwrap_or_else(|| self.label.clone()),
            color: spec
                .color
                .as_deref()
                .and_then(PortColor::from_token)
                .or(self.color),
            hide_port: spec.hide_port.unwrap_or(self.hide_port),
            no_controls: spec.no_controls.unwrap_or(false),
            controls: self.controls.clone(),
        }
    }
}

/// A port on a node type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    /// Port type id
    #[serde(rename = "type")]
    pub port_type: String,
    /// Port name, unique per node side
    pub name: String,
    /// Display label
    pub label: String,
    /// Color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<PortColor>,
    /// Hide the connection point
    #[serde(default)]
    pub hide_port: bool,
    /// Suppress controls
    #[serde(default)]
    pub no_controls: bool,
    /// Controls copied from the port type
    #[serde(default)]
    pub controls: Vec<Control>,
}

/// Builds [`Port`]s from port type ids.
///
/// This is the `ports` argument handed to every input strategy.
#[derive(Debug, Clone, Copy)]
pub struct PortFactory<'a> {
    port_types: &'a IndexMap<String, PortType>,
}

impl<'a> PortFactory<'a> {
    /// Wrap a port type table
    pub fn new(port_types: &'a IndexMap<String, PortType>) -> Self {
        Self { port_types }
    }

    /// Look up a port type
    pub fn port_type(&self, id: &str) -> Option<&'a PortType> {
        self.port_types.get(id)
    }

    /// All port types
    pub fn port_types(&self) -> impl Iterator<Item = &'a PortType> {
        self.port_types.values()
    }

    /// Build a port from a structured entry
    pub fn build(&self, spec: &PortSpec) -> Result<Port, LookupFailure> {
        self.port_type(&spec.port_type)
            .map(|port_type| port_type.instantiate(spec))
            .ok_or_else(|| LookupFailure::PortType(spec.port_type.clone()))
    }

    /// Build a port from a type id, name and label
    pub fn port(
        &self,
        port_type: &str,
        name: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<Port, LookupFailure> {
        self.build(&PortSpec {
            port_type: port_type.to_string(),
            name: Some(name.into()),
            label: Some(label.into()),
            ..PortSpec::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlKind;

    fn table() -> IndexMap<String, PortType> {
        let mut table = IndexMap::new();
        table.insert(
            "decimal".to_string(),
            PortType::new("decimal", "Decimal").with_color(PortColor::Green),
        );
        table
    }

    #[test]
    fn test_new_port_type_defaults() {
        let port_type = PortType::new("decimal", "Decimal");
        assert_eq!(port_type.name, "decimal");
        assert_eq!(port_type.accept_types, vec!["decimal".to_string()]);
        assert_eq!(port_type.controls.len(), 1);
        assert_eq!(port_type.controls[0].kind, ControlKind::Label);
        assert!(port_type.accepts("decimal"));
        assert!(!port_type.accepts("string"));
    }

    #[test]
    fn test_factory_applies_overrides() {
        let table = table();
        let factory = PortFactory::new(&table);

        let port = factory
            .build(&PortSpec {
                port_type: "decimal".to_string(),
                name: Some("x".to_string()),
                color: Some("red".to_string()),
                no_controls: Some(true),
                ..PortSpec::default()
            })
            .unwrap();
        assert_eq!(port.name, "x");
        assert_eq!(port.label, "Decimal");
        assert_eq!(port.color, Some(PortColor::Red));
        assert!(port.no_controls);

        let plain = factory.port("decimal", "y", "Y").unwrap();
        assert_eq!(plain.color, Some(PortColor::Green));
        assert!(!plain.no_controls);
    }

    #[test]
    fn test_factory_unknown_type() {
        let table = table();
        let factory = PortFactory::new(&table);
        assert_eq!(
            factory.port("vector", "v", "V").unwrap_err(),
            LookupFailure::PortType("vector".to_string())
        );
    }
}
