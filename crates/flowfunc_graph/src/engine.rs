// SPDX-License-Identifier: MIT OR Apache-2.0
//! Contract with the hosted graph-editing engine.
//!
//! The engine owns dragging, connecting and rendering. This crate only needs
//! to construct it, read its nodes and comments back, and push transforms.

use crate::node::{CommentMap, NodeMap};
use crate::registry::Registry;
use crate::viewport::{MountKey, Transform};
use serde_json::Value;
use std::sync::Arc;

/// Construction-time configuration of an engine instance
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Compiled port and node types
    pub registry: Arc<Registry>,
    /// Nodes to show
    pub nodes: NodeMap,
    /// Nodes to create when `nodes` is empty
    pub default_nodes: Vec<Value>,
    /// Extra data passed through to input strategies
    pub context: Value,
    /// Zoom level at mount
    pub initial_scale: f32,
    /// Disable mouse-wheel zoom
    pub disable_zoom: bool,
    /// Disable panning
    pub disable_pan: bool,
    /// Require the space bar to pan
    pub space_to_pan: bool,
    /// Identity of this mount; a new key means a new instance
    pub mount_key: MountKey,
}

/// A graph-editing engine
pub trait GraphEngine {
    /// Construct a fresh instance
    fn mount(config: EngineConfig) -> Self
    where
        Self: Sized;

    /// Current nodes
    fn nodes(&self) -> NodeMap;

    /// Current comments
    fn comments(&self) -> CommentMap;

    /// Apply a pan/zoom transform to the live instance
    fn set_transform(&mut self, transform: Transform);

    /// The key this instance was mounted with
    fn mount_key(&self) -> MountKey;
}
