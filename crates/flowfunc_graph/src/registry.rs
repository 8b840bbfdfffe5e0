// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compiled registry of port types and node types handed to the graph engine.

use crate::control::{Control, ControlFactories};
use crate::node::NodeType;
use crate::port::{Port, PortFactory, PortType};
use crate::schema::ControlSpec;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

/// Id of the generic port type whose accepted types are used when type safety is off
pub const GENERIC_PORT_TYPE: &str = "object";

/// Port type ids pre-seeded in every registry
pub const STANDARD_PORT_TYPES: [&str; 4] = ["string", "number", "boolean", GENERIC_PORT_TYPE];

/// What kind of definition a skipped registration was
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RegistrationKind {
    /// Port type
    PortType,
    /// Node type
    NodeType,
}

/// A schema entry that re-declared a standard type and was ignored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateRegistration {
    /// Definition kind
    pub kind: RegistrationKind,
    /// Duplicated id
    pub id: String,
}

/// Port and node types ready for the graph engine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registry {
    port_types: IndexMap<String, PortType>,
    node_types: IndexMap<String, NodeType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skipped: Vec<DuplicateRegistration>,
    widened: bool,
}

impl Registry {
    /// An empty registry with no standard types
    pub fn empty() -> Self {
        Self {
            port_types: IndexMap::new(),
            node_types: IndexMap::new(),
            skipped: Vec::new(),
            widened: false,
        }
    }

    /// A registry pre-seeded with the standard port types
    pub fn standard(controls: &ControlFactories) -> Self {
        let mut registry = Self::empty();
        let control = |port_type: &str, kind: &str, label: &str| {
            let mut params = Map::new();
            params.insert("label".to_string(), Value::String(label.to_string()));
            controls
                .resolve(port_type, &ControlSpec { kind: kind.to_string(), params })
                .unwrap_or_else(|_| Control::port_label(port_type, label))
        };

        registry.insert_port_type(
            PortType::new("string", "Text").with_controls(vec![control("string", "text", "Text")]),
        );
        registry.insert_port_type(
            PortType::new("number", "Number")
                .with_controls(vec![control("number", "number", "Number")]),
        );
        registry.insert_port_type(
            PortType::new("boolean", "True/False")
                .with_controls(vec![control("boolean", "checkbox", "True/False")]),
        );
        registry.insert_port_type(PortType::new(GENERIC_PORT_TYPE, "Object"));
        registry
    }

    /// Whether `id` is one of the pre-seeded port types
    pub fn is_standard_port_type(id: &str) -> bool {
        STANDARD_PORT_TYPES.contains(&id)
    }

    pub(crate) fn insert_port_type(&mut self, port_type: PortType) {
        self.port_types.insert(port_type.id.clone(), port_type);
    }

    pub(crate) fn insert_node_type(&mut self, node_type: NodeType) {
        self.node_types.insert(node_type.id.clone(), node_type);
    }

    pub(crate) fn record_skipped(&mut self, kind: RegistrationKind, id: &str) {
        self.skipped.push(DuplicateRegistration {
            kind,
            id: id.to_string(),
        });
    }

    /// Let the generic port type accept every registered port type
    pub(crate) fn open_generic_port_type(&mut self) {
        let all: Vec<String> = self.port_types.keys().cloned().collect();
        if let Some(generic) = self.port_types.get_mut(GENERIC_PORT_TYPE) {
            generic.accept_types = all;
        }
    }

    /// Get a port type by id
    pub fn port_type(&self, id: &str) -> Option<&PortType> {
        self.port_types.get(id)
    }

    /// Get a node type by id
    pub fn node_type(&self, id: &str) -> Option<&NodeType> {
        self.node_types.get(id)
    }

    /// All port types, in registration order
    pub fn port_types(&self) -> impl Iterator<Item = &PortType> {
        self.port_types.values()
    }

    /// All node types, in registration order
    pub fn node_types(&self) -> impl Iterator<Item = &NodeType> {
        self.node_types.values()
    }

    /// Number of port types
    pub fn port_type_count(&self) -> usize {
        self.port_types.len()
    }

    /// Number of node types
    pub fn node_type_count(&self) -> usize {
        self.node_types.len()
    }

    /// Schema entries ignored because they re-declared a standard type
    pub fn skipped_registrations(&self) -> &[DuplicateRegistration] {
        &self.skipped
    }

    /// The ports factory over this registry's port types
    pub fn port_factory(&self) -> PortFactory<'_> {
        PortFactory::new(&self.port_types)
    }

    /// Input ports for an instance of `node_type`, or `None` if the type is unknown
    pub fn input_ports(
        &self,
        node_type: &str,
        input_data: &Value,
        connections: &Value,
        context: &Value,
    ) -> Option<Vec<Port>> {
        let node_type = self.node_type(node_type)?;
        Some(node_type.input_ports(&self.port_factory(), input_data, connections, context))
    }

    /// Check if an output of type `from` may connect to an input of type `to`
    pub fn can_connect(&self, from: &str, to: &str) -> bool {
        self.port_type(to)
            .is_some_and(|port_type| port_type.accepts(from))
    }

    /// Whether type safety has been switched off on this registry
    pub fn is_widened(&self) -> bool {
        self.widened
    }

    /// Overwrite every port type's accepted types with the generic port type's.
    ///
    /// This cannot be undone on the same registry; recompile the schema to
    /// get the declared constraints back.
    pub fn widen_accept_types(&mut self) {
        let Some(accepted) = self
            .port_types
            .get(GENERIC_PORT_TYPE)
            .map(|generic| generic.accept_types.clone())
        else {
            tracing::warn!("No '{}' port type; type safety left on", GENERIC_PORT_TYPE);
            return;
        };
        for port_type in self.port_types.values_mut() {
            port_type.accept_types.clone_from(&accepted);
        }
        self.widened = true;
    }

    /// Apply a type safety flag. Turning it off widens; turning it back on is a no-op.
    pub fn apply_type_safety(&mut self, type_safety: bool) {
        if !type_safety {
            self.widen_accept_types();
        } else if self.widened {
            tracing::debug!("Registry already widened; recompile to restore port constraints");
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard(&ControlFactories::standard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlKind;

    #[test]
    fn test_standard_port_types() {
        let registry = Registry::default();
        assert_eq!(registry.port_type_count(), 4);
        assert_eq!(
            registry.port_type("number").unwrap().controls[0].kind,
            ControlKind::Number
        );
        assert_eq!(
            registry.port_type("boolean").unwrap().controls[0].kind,
            ControlKind::Checkbox
        );
        assert!(Registry::is_standard_port_type("object"));
        assert!(!Registry::is_standard_port_type("decimal"));
    }

    #[test]
    fn test_widening_is_one_way() {
        let mut registry = Registry::default();
        registry.open_generic_port_type();
        assert!(!registry.can_connect("string", "number"));

        registry.apply_type_safety(false);
        assert!(registry.is_widened());
        assert!(registry.can_connect("string", "number"));

        registry.apply_type_safety(true);
        assert!(registry.is_widened());
        assert!(registry.can_connect("string", "number"));
    }

    #[test]
    fn test_type_safety_on_leaves_constraints() {
        let mut registry = Registry::default();
        registry.apply_type_safety(true);
        assert!(!registry.is_widened());
        assert_eq!(
            registry.port_type("string").unwrap().accept_types,
            vec!["string".to_string()]
        );
    }

    #[test]
    fn test_input_ports_for_unknown_type() {
        let registry = Registry::default();
        assert!(registry
            .input_ports("missing", &Value::Null, &Value::Null, &Value::Null)
            .is_none());
    }
}
