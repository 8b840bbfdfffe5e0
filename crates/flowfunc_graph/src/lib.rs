// SPDX-License-Identifier: MIT OR Apache-2.0
//! Core of the flowfunc node editor bridge.
//!
//! This crate turns a host-supplied schema into the registry a graph-editing
//! engine consumes, and provides the runtime services around that engine:
//! - Schema compiler (port/node types, controls, input strategies)
//! - Viewport fit-to-view
//! - Click-driven node selection
//! - Execution status markers
//!
//! ## Architecture
//!
//! Resolver tables ([`palette`], [`control`], [`functions`]) feed the
//! [`compiler`], which produces an immutable [`Registry`]. The runtime
//! services work against two seams: [`GraphEngine`] for the engine itself and
//! [`NodeSurface`] for its rendered element tree.

pub mod compiler;
pub mod control;
pub mod engine;
pub mod error;
pub mod expression;
pub mod functions;
pub mod node;
pub mod palette;
pub mod port;
pub mod registry;
pub mod schema;
pub mod selection;
pub mod status;
pub mod surface;
pub mod viewport;

pub use compiler::Compiler;
pub use control::{Control, ControlFactories, ControlKind};
pub use engine::{EngineConfig, GraphEngine};
pub use error::{ConfigError, LookupFailure, SchemaError};
pub use functions::InputFunctions;
pub use node::{CommentMap, InputPorts, Node, NodeMap, NodeType};
pub use palette::PortColor;
pub use port::{Port, PortFactory, PortType};
pub use registry::{Registry, GENERIC_PORT_TYPE};
pub use schema::{InputsSpec, NodeTypeSpec, PortSpec, PortTypeSpec, Schema};
pub use selection::{PointerEvent, Selection, SelectionOutput, SelectionTracker};
pub use status::{apply_statuses, NodeStatus, StatusReport, StatusTable};
pub use surface::{ElementId, ElementTree, NodeSurface};
pub use viewport::{fit_nodes, fit_to_view, FitOptions, MountKey, Transform, ViewportController};
