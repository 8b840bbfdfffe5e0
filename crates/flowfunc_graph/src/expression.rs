// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sandboxed evaluation of expression-defined node inputs.
//!
//! An expression is the body of a function
//! `inputs(ports, input_data, connections, context)` returning an array of
//! port entries (`#{"type": ..., "name": ..., "label": ...}`). It is parsed
//! once when the schema is compiled and evaluated by a rhai engine with
//! tight operation, depth and size limits.

use crate::error::ConfigError;
use crate::port::{Port, PortFactory};
use crate::schema::PortSpec;
use rhai::{Dynamic, Engine, Scope, AST};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Name of the wrapper function every expression is compiled into
const INPUTS_FN: &str = "inputs";

/// Build the engine used for all input expressions
pub fn sandboxed_engine() -> Engine {
    let mut engine = Engine::new();
    engine.set_max_expr_depths(64, 64);
    engine.set_max_call_levels(32);
    engine.set_max_operations(50_000);
    engine.set_max_string_size(10_000);
    engine.set_max_array_size(1_000);
    engine.set_max_map_size(1_000);
    engine
}

/// An input expression compiled into an AST
#[derive(Clone)]
pub struct InputExpression {
    source: String,
    engine: Arc<Engine>,
    ast: Arc<AST>,
}

impl InputExpression {
    /// Parse `source` for `node_type`
    pub fn compile(
        engine: Arc<Engine>,
        node_type: &str,
        source: &str,
    ) -> Result<Self, ConfigError> {
        let script =
            format!("fn {INPUTS_FN}(ports, input_data, connections, context) {{\n{source}\n}}");
        let ast = engine
            .compile(&script)
            .map_err(|e| ConfigError::InvalidExpression {
                node_type: node_type.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            source: source.to_string(),
            engine,
            ast: Arc::new(ast),
        })
    }

    /// Source text as declared in the schema
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate the expression and build the resulting ports.
    ///
    /// Evaluation errors and entries naming unknown port types are logged and
    /// dropped; a failing expression yields no ports.
    pub fn evaluate(
        &self,
        ports: &PortFactory<'_>,
        input_data: &Value,
        connections: &Value,
        context: &Value,
    ) -> Vec<Port> {
        match self.call(ports, input_data, connections, context) {
            Ok(specs) => specs
                .iter()
                .filter_map(|spec| match ports.build(spec) {
                    Ok(port) => Some(port),
                    Err(e) => {
                        tracing::warn!("Dropping expression input: {}", e);
                        None
                    }
                })
                .collect(),
            Err(message) => {
                tracing::warn!("Input expression failed: {}", message);
                Vec::new()
            }
        }
    }

    fn call(
        &self,
        ports: &PortFactory<'_>,
        input_data: &Value,
        connections: &Value,
        context: &Value,
    ) -> Result<Vec<PortSpec>, String> {
        let to_dynamic = |value: &Value| rhai::serde::to_dynamic(value).map_err(|e| e.to_string());

        let templates: serde_json::Map<String, Value> = ports
            .port_types()
            .map(|port_type| {
                let template = port_type.instantiate(&PortSpec::default());
                serde_json::to_value(template).map(|value| (port_type.id.clone(), value))
            })
            .collect::<Result<_, _>>()
            .map_err(|e| e.to_string())?;

        let args = (
            to_dynamic(&Value::Object(templates))?,
            to_dynamic(input_data)?,
            to_dynamic(connections)?,
            to_dynamic(context)?,
        );

        let result: Dynamic = self
            .engine
            .call_fn(&mut Scope::new(), &self.ast, INPUTS_FN, args)
            .map_err(|e| e.to_string())?;

        rhai::serde::from_dynamic(&result).map_err(|e| e.to_string())
    }
}

impl fmt::Debug for InputExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputExpression")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl PartialEq for InputExpression {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}
