// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors surfaced by the host binary.

use flowfunc_graph::{ConfigError, SchemaError};
use thiserror::Error;

/// Anything that stops a command
#[derive(Debug, Error)]
pub enum AppError {
    /// The schema could not be compiled
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The schema could not be read
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Props, nodes or a script could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
