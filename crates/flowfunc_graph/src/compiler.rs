// SPDX-License-Identifier: MIT OR Apache-2.0
//! Schema compiler.
//!
//! Turns a [`Schema`] into a [`Registry`]:
//! - port types get their color and controls resolved
//! - node types get their input strategy and output ports resolved
//! - with type safety off, every port accepts what the generic port accepts

use crate::control::{Control, ControlFactories};
use crate::error::ConfigError;
use crate::expression::{sandboxed_engine, InputExpression};
use crate::functions::InputFunctions;
use crate::node::{InputPorts, NodeType};
use crate::palette::PortColor;
use crate::port::{Port, PortFactory, PortType};
use crate::registry::{RegistrationKind, Registry};
use crate::schema::{InputsSpec, NodeTypeSpec, PortSpec, PortTypeSpec, Schema};
use rhai::Engine;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Compiles schemas against a fixed set of resolver tables
#[derive(Clone)]
pub struct Compiler {
    controls: ControlFactories,
    functions: InputFunctions,
    engine: Arc<Engine>,
}

impl Compiler {
    /// A compiler with the standard controls and no input functions
    pub fn new() -> Self {
        Self {
            controls: ControlFactories::standard(),
            functions: InputFunctions::new(),
            engine: Arc::new(sandboxed_engine()),
        }
    }

    /// Replace the control factory table
    pub fn with_controls(mut self, controls: ControlFactories) -> Self {
        self.controls = controls;
        self
    }

    /// Replace the input function registry
    pub fn with_functions(mut self, functions: InputFunctions) -> Self {
        self.functions = functions;
        self
    }

    /// The input function registry
    pub fn functions(&self) -> &InputFunctions {
        &self.functions
    }

    /// Compile `schema` into a registry
    pub fn compile(&self, schema: &Schema, type_safety: bool) -> Result<Registry, ConfigError> {
        let mut registry = Registry::standard(&self.controls);

        let mut custom_ports = HashSet::new();
        for spec in &schema.port_types {
            if Registry::is_standard_port_type(&spec.id) {
                tracing::debug!("Port type '{}' is built in; ignoring redefinition", spec.id);
                registry.record_skipped(RegistrationKind::PortType, &spec.id);
                continue;
            }
            if !custom_ports.insert(spec.id.as_str()) {
                return Err(ConfigError::DuplicatePortType(spec.id.clone()));
            }
            registry.insert_port_type(self.compile_port_type(spec)?);
        }

        registry.open_generic_port_type();
        for port_type in registry.port_types() {
            if let Some(unknown) = port_type
                .accept_types
                .iter()
                .find(|accepted| registry.port_type(accepted).is_none())
            {
                return Err(ConfigError::UnknownAcceptType {
                    port_type: port_type.id.clone(),
                    accepted: unknown.clone(),
                });
            }
        }

        let mut node_ids = HashSet::new();
        for spec in &schema.node_types {
            if !node_ids.insert(spec.id.as_str()) {
                return Err(ConfigError::DuplicateNodeType(spec.id.clone()));
            }
            let node_type = self.compile_node_type(spec, &registry.port_factory())?;
            registry.insert_node_type(node_type);
        }

        if !type_safety {
            registry.widen_accept_types();
        }

        tracing::info!(
            "Compiled schema: {} port types, {} node types{}",
            registry.port_type_count(),
            registry.node_type_count(),
            if type_safety { "" } else { " (type safety off)" }
        );
        Ok(registry)
    }

    fn compile_port_type(&self, spec: &PortTypeSpec) -> Result<PortType, ConfigError> {
        let color = spec.color.as_deref().and_then(|token| {
            let color = PortColor::from_token(token);
            if color.is_none() && !token.trim().is_empty() {
                tracing::warn!("Unknown color '{}' on port type '{}'", token, spec.id);
            }
            color
        });

        let controls = if spec.controls.is_empty() {
            vec![Control::port_label(&spec.id, &spec.label)]
        } else {
            spec.controls
                .iter()
                .map(|control| self.controls.resolve(&spec.id, control))
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(PortType {
            id: spec.id.clone(),
            name: spec.name.clone().unwrap_or_else(|| spec.id.clone()),
            label: spec.label.clone(),
            color,
            hide_port: spec.hide_port,
            controls,
            accept_types: spec
                .accept_types
                .clone()
                .unwrap_or_else(|| vec![spec.id.clone()]),
        })
    }

    fn compile_node_type(
        &self,
        spec: &NodeTypeSpec,
        ports: &PortFactory<'_>,
    ) -> Result<NodeType, ConfigError> {
        let inputs = match &spec.inputs {
            None => InputPorts::Static(Vec::new()),
            Some(inputs) if inputs.is_empty() => InputPorts::Static(Vec::new()),
            Some(InputsSpec::Ports(list)) => InputPorts::Static(build_ports(&spec.id, list, ports)?),
            Some(InputsSpec::Expression { source }) => InputPorts::Expression(
                InputExpression::compile(Arc::clone(&self.engine), &spec.id, source)?,
            ),
            Some(InputsSpec::Path { path }) => {
                let function =
                    self.functions
                        .get(path)
                        .ok_or_else(|| ConfigError::UnknownInputFunction {
                            node_type: spec.id.clone(),
                            path: path.clone(),
                        })?;
                InputPorts::Function {
                    path: path.clone(),
                    function,
                }
            }
        };

        Ok(NodeType {
            id: spec.id.clone(),
            label: spec.effective_label(),
            description: spec.description.clone(),
            initial_width: spec.initial_width,
            addable: spec.addable.unwrap_or(true),
            deletable: spec.deletable.unwrap_or(true),
            root: spec.root,
            sort_index: spec.sort_index,
            inputs,
            outputs: build_ports(&spec.id, &spec.outputs, ports)?,
        })
    }
}

impl fmt::Debug for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiler")
            .field("controls", &self.controls)
            .field("functions", &self.functions)
            .finish_non_exhaustive()
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

fn build_ports(
    node_type: &str,
    specs: &[PortSpec],
    ports: &PortFactory<'_>,
) -> Result<Vec<Port>, ConfigError> {
    specs
        .iter()
        .map(|spec| {
            ports.build(spec).map_err(|_| ConfigError::UnknownPortType {
                node_type: node_type.to_string(),
                port_type: spec.port_type.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlKind;
    use crate::registry::{DuplicateRegistration, GENERIC_PORT_TYPE};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn schema(value: Value) -> Schema {
        serde_json::from_value(value).unwrap()
    }

    fn sample() -> Schema {
        schema(json!({
            "portTypes": [
                {"type": "decimal", "label": "Decimal", "color": "green",
                 "controls": [{"type": "number", "name": "value", "label": "Value", "step": 0.1}]},
                {"type": "frame", "label": "Frame", "color": "blue"},
                {"type": "string", "label": "Redefined"}
            ],
            "nodeTypes": [
                {"type": "scale", "label": "Scale", "category": "Math",
                 "inputs": [{"type": "decimal", "name": "in", "label": "In"},
                            {"type": "number", "name": "factor", "label": "Factor"}],
                 "outputs": [{"type": "decimal", "name": "out", "label": "Out"}]},
                {"type": "source", "label": "Source",
                 "outputs": [{"type": "frame", "name": "frame"}]},
                {"type": "concat", "label": "Concat",
                 "inputs": {"source": "[#{\"type\": \"string\", \"name\": \"a\"}]"}}
            ]
        }))
    }

    #[test]
    fn test_compile_port_types() {
        let registry = Compiler::new().compile(&sample(), true).unwrap();

        let decimal = registry.port_type("decimal").unwrap();
        assert_eq!(decimal.color, Some(PortColor::Green));
        assert_eq!(decimal.controls.len(), 1);
        assert_eq!(decimal.controls[0].kind, ControlKind::Number);
        assert_eq!(decimal.controls[0].params.get("step"), Some(&json!(0.1)));
        assert_eq!(decimal.accept_types, vec!["decimal".to_string()]);

        let frame = registry.port_type("frame").unwrap();
        assert_eq!(frame.controls, vec![Control::port_label("frame", "Frame")]);
    }

    #[test]
    fn test_standard_redefinition_is_skipped() {
        let registry = Compiler::new().compile(&sample(), true).unwrap();
        assert_eq!(registry.port_type("string").unwrap().label, "Text");
        assert_eq!(
            registry.skipped_registrations(),
            &[DuplicateRegistration {
                kind: RegistrationKind::PortType,
                id: "string".to_string(),
            }]
        );
    }

    #[test]
    fn test_compile_node_types() {
        let registry = Compiler::new().compile(&sample(), true).unwrap();

        let scale = registry.node_type("scale").unwrap();
        assert_eq!(scale.label, "Math: Scale");
        assert_eq!(scale.outputs.len(), 1);
        assert_eq!(scale.outputs[0].color, Some(PortColor::Green));

        let inputs = registry
            .input_ports("scale", &Value::Null, &Value::Null, &Value::Null)
            .unwrap();
        let names: Vec<_> = inputs.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["in", "factor"]);

        let source = registry.node_type("source").unwrap();
        assert_eq!(source.label, "Source");
        assert!(!source.inputs.is_dynamic());

        let concat = registry
            .input_ports("concat", &Value::Null, &Value::Null, &Value::Null)
            .unwrap();
        assert_eq!(concat.len(), 1);
        assert_eq!(concat[0].port_type, "string");
    }

    #[test]
    fn test_compile_is_deterministic() {
        let compiler = Compiler::new();
        let first = compiler.compile(&sample(), true).unwrap();
        let second = compiler.compile(&sample(), true).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn test_type_safety_off_widens_every_port() {
        let registry = Compiler::new().compile(&sample(), false).unwrap();
        let generic = registry
            .port_type(GENERIC_PORT_TYPE)
            .unwrap()
            .accept_types
            .clone();
        assert!(generic.contains(&"decimal".to_string()));
        for port_type in registry.port_types() {
            assert_eq!(port_type.accept_types, generic);
        }
        assert!(registry.can_connect("frame", "decimal"));
    }

    #[test]
    fn test_widened_registry_stays_widened() {
        let compiler = Compiler::new();
        let mut registry = compiler.compile(&sample(), false).unwrap();
        registry.apply_type_safety(true);
        assert!(registry.can_connect("frame", "decimal"));

        let fresh = compiler.compile(&sample(), true).unwrap();
        assert!(!fresh.can_connect("frame", "decimal"));
    }

    #[test]
    fn test_unknown_control_type() {
        let err = Compiler::new()
            .compile(
                &schema(json!({"portTypes": [
                    {"type": "decimal", "label": "D", "controls": [{"type": "dial"}]}
                ]})),
                true,
            )
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownControlType {
                port_type: "decimal".to_string(),
                kind: "dial".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_port_type_in_outputs() {
        let err = Compiler::new()
            .compile(
                &schema(json!({"nodeTypes": [
                    {"type": "n", "label": "N", "outputs": [{"type": "vector"}]}
                ]})),
                true,
            )
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownPortType {
                node_type: "n".to_string(),
                port_type: "vector".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_port_type_in_inputs() {
        let err = Compiler::new()
            .compile(
                &schema(json!({"nodeTypes": [
                    {"type": "n", "label": "N",
                     "inputs": [{"type": "number"}, {"type": "matrix", "name": "m"}],
                     "outputs": [{"type": "number"}]}
                ]})),
                true,
            )
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownPortType {
                node_type: "n".to_string(),
                port_type: "matrix".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_custom_ids() {
        let compiler = Compiler::new();
        let err = compiler
            .compile(
                &schema(json!({"portTypes": [
                    {"type": "decimal", "label": "A"},
                    {"type": "decimal", "label": "B"}
                ]})),
                true,
            )
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicatePortType("decimal".to_string()));

        let err = compiler
            .compile(
                &schema(json!({"nodeTypes": [
                    {"type": "n", "label": "A"},
                    {"type": "n", "label": "B"}
                ]})),
                true,
            )
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateNodeType("n".to_string()));
    }

    #[test]
    fn test_unknown_accept_type() {
        let err = Compiler::new()
            .compile(
                &schema(json!({"portTypes": [
                    {"type": "decimal", "label": "D", "acceptTypes": ["decimal", "vector"]}
                ]})),
                true,
            )
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownAcceptType {
                port_type: "decimal".to_string(),
                accepted: "vector".to_string(),
            }
        );
    }

    #[test]
    fn test_path_inputs_resolve_at_compile_time() {
        let spec = schema(json!({"nodeTypes": [
            {"type": "dynamic", "label": "Dynamic", "inputs": {"path": "math.dynamic"}}
        ]}));

        let err = Compiler::new().compile(&spec, true).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownInputFunction {
                node_type: "dynamic".to_string(),
                path: "math.dynamic".to_string(),
            }
        );

        let functions = InputFunctions::new().with(
            "math.dynamic",
            |ports: &PortFactory<'_>, input_data: &Value, _: &Value, _: &Value| {
                let count = input_data["count"].as_u64().unwrap_or(1);
                (0..count)
                    .filter_map(|i| ports.port("number", format!("n{i}"), "N").ok())
                    .collect()
            },
        );
        let registry = Compiler::new()
            .with_functions(functions)
            .compile(&spec, true)
            .unwrap();
        let inputs = registry
            .input_ports("dynamic", &json!({"count": 3}), &Value::Null, &Value::Null)
            .unwrap();
        assert_eq!(inputs.len(), 3);
    }

    #[test]
    fn test_invalid_expression() {
        let err = Compiler::new()
            .compile(
                &schema(json!({"nodeTypes": [
                    {"type": "bad", "label": "Bad", "inputs": {"source": "let = ;"}}
                ]})),
                true,
            )
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidExpression { .. }));
    }

    #[test]
    fn test_empty_inputs_mean_no_ports() {
        let registry = Compiler::new()
            .compile(
                &schema(json!({"nodeTypes": [
                    {"type": "a", "label": "A", "inputs": []},
                    {"type": "b", "label": "B", "inputs": {"source": "  "}}
                ]})),
                true,
            )
            .unwrap();
        for id in ["a", "b"] {
            assert_eq!(
                registry.node_type(id).unwrap().inputs,
                InputPorts::Static(Vec::new())
            );
        }
    }
}
