// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types shared across the schema compiler and runtime services.

use thiserror::Error;

/// Structural error raised while compiling a schema into a registry.
///
/// These are caller-visible: a schema that references unknown controls,
/// port types or input functions never produces a partial registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A control spec names a kind with no registered factory
    #[error("Unknown control type '{kind}' on port type '{port_type}'")]
    UnknownControlType {
        /// Port type declaring the control
        port_type: String,
        /// Unresolved control kind
        kind: String,
    },

    /// An input/output entry names a port type missing from the registry
    #[error("Unknown port type '{port_type}' referenced by node type '{node_type}'")]
    UnknownPortType {
        /// Node type declaring the port
        node_type: String,
        /// Unresolved port type id
        port_type: String,
    },

    /// A port type's accepted types names a port type missing from the registry
    #[error("Port type '{port_type}' accepts unknown port type '{accepted}'")]
    UnknownAcceptType {
        /// Port type declaring the accept list
        port_type: String,
        /// Unresolved accepted id
        accepted: String,
    },

    /// Two custom port types share an id
    #[error("Duplicate port type: {0}")]
    DuplicatePortType(String),

    /// Two node types share an id
    #[error("Duplicate node type: {0}")]
    DuplicateNodeType(String),

    /// A path-referenced input function is not registered
    #[error("Unknown input function '{path}' for node type '{node_type}'")]
    UnknownInputFunction {
        /// Node type declaring the reference
        node_type: String,
        /// Dotted function path
        path: String,
    },

    /// An expression-defined input failed to parse
    #[error("Invalid inputs expression for node type '{node_type}': {message}")]
    InvalidExpression {
        /// Node type declaring the expression
        node_type: String,
        /// Parser message
        message: String,
    },
}

/// Error raised when schema or props text cannot be decoded.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// JSON decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// RON decoding failed
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// File could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File extension is neither `.json` nor `.ron`
    #[error("Unsupported schema format: {0}")]
    UnsupportedFormat(String),
}

/// A per-entry lookup miss. Always absorbed by the caller, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupFailure {
    /// No element on the surface carries this node id
    #[error("No element for node '{0}'")]
    NodeElement(String),

    /// The event target has no node-wrapper ancestor
    #[error("Event target is not inside a node")]
    NodeWrapper,

    /// An expression returned a port entry of unknown type
    #[error("Unknown port type '{0}' in resolved inputs")]
    PortType(String),
}
