// SPDX-License-Identifier: MIT OR Apache-2.0
//! Registry of host functions that compute node inputs.
//!
//! Node types may declare `{"path": "some.name"}` as their inputs. The name is
//! looked up here when the schema is compiled, so a missing function is a
//! [`ConfigError`](crate::error::ConfigError) rather than a silent miss later.

use crate::port::{Port, PortFactory};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Computes a node's input ports from `(ports, input_data, connections, context)`
pub type InputFn = Arc<dyn Fn(&PortFactory<'_>, &Value, &Value, &Value) -> Vec<Port> + Send + Sync>;

/// Named input functions
#[derive(Clone, Default)]
pub struct InputFunctions {
    functions: IndexMap<String, InputFn>,
}

impl InputFunctions {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function under a dotted path
    pub fn register<F>(&mut self, path: impl Into<String>, function: F)
    where
        F: Fn(&PortFactory<'_>, &Value, &Value, &Value) -> Vec<Port> + Send + Sync + 'static,
    {
        self.functions.insert(path.into(), Arc::new(function));
    }

    /// Builder form of [`register`](Self::register)
    pub fn with<F>(mut self, path: impl Into<String>, function: F) -> Self
    where
        F: Fn(&PortFactory<'_>, &Value, &Value, &Value) -> Vec<Port> + Send + Sync + 'static,
    {
        self.register(path, function);
        self
    }

    /// Look up a function
    pub fn get(&self, path: &str) -> Option<InputFn> {
        self.functions.get(path).cloned()
    }

    /// Registered paths
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether no functions are registered
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for InputFunctions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.functions.keys()).finish()
    }
}
