// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fit-to-view geometry and the viewport controller.

use crate::engine::GraphEngine;
use crate::node::Node;
use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Default padding around the node bounds, in graph units
pub const DEFAULT_FIT_PADDING: f32 = 150.0;

/// Default lower bound for the fitted zoom level
pub const DEFAULT_MIN_SCALE: f32 = 0.1;

/// Floor applied to [`FitOptions::min_scale`] so a fitted scale stays positive
pub const MIN_POSITIVE_SCALE: f32 = 1e-4;

/// Pan offset plus zoom applied to the graph viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Horizontal translation in screen pixels
    pub x: f32,
    /// Vertical translation in screen pixels
    pub y: f32,
    /// Zoom level, always positive
    pub scale: f32,
}

impl Transform {
    /// Identity transform at a given zoom
    pub fn with_scale(scale: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale,
        }
    }

    /// Translation as a vector
    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Convert a graph position to screen space
    pub fn graph_to_screen(&self, graph_pos: Pos2) -> Pos2 {
        Pos2::new(
            graph_pos.x * self.scale + self.x,
            graph_pos.y * self.scale + self.y,
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::with_scale(1.0)
    }
}

/// Parameters for [`fit_to_view`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Space added around the node bounds on every side
    pub padding: f32,
    /// Lower bound for the resulting zoom level
    pub min_scale: f32,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            padding: DEFAULT_FIT_PADDING,
            min_scale: DEFAULT_MIN_SCALE,
        }
    }
}

/// Compute a transform that fits every position inside the viewport.
///
/// Only node origins are considered, not their rendered size. Returns `None`
/// when there is nothing to fit.
pub fn fit_to_view(
    positions: impl IntoIterator<Item = Pos2>,
    viewport: Vec2,
    options: &FitOptions,
) -> Option<Transform> {
    let points: Vec<Pos2> = positions.into_iter().collect();
    if points.is_empty() {
        return None;
    }

    let content = Rect::from_points(&points).expand(options.padding);

    let scale_x = if content.width() > 0.0 {
        viewport.x / content.width()
    } else {
        f32::INFINITY
    };
    let scale_y = if content.height() > 0.0 {
        viewport.y / content.height()
    } else {
        f32::INFINITY
    };
    let scale = scale_x.min(scale_y);
    if !scale.is_finite() {
        return None;
    }
    let scale = scale.max(options.min_scale.max(MIN_POSITIVE_SCALE));

    // No upper clamp: small graphs zoom in
    let translate = viewport / 2.0 - content.center().to_vec2() * scale;
    Some(Transform {
        x: translate.x,
        y: translate.y,
        scale,
    })
}

/// [`fit_to_view`] over node instances
pub fn fit_nodes<'a>(
    nodes: impl IntoIterator<Item = &'a Node>,
    viewport: Vec2,
    options: &FitOptions,
) -> Option<Transform> {
    fit_to_view(nodes.into_iter().map(Node::position), viewport, options)
}

/// Identity of one engine mount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MountKey(pub Uuid);

impl MountKey {
    /// Create a new random mount key
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MountKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Tracks the applied transform and the engine mount identity.
///
/// The engine only reads its initial zoom at construction, so applying a fit
/// both updates the live instance and issues a new mount key.
#[derive(Debug, Clone)]
pub struct ViewportController {
    transform: Transform,
    mount_key: MountKey,
    options: FitOptions,
}

impl ViewportController {
    /// Create a controller starting at `initial_scale`
    pub fn new(initial_scale: f32) -> Self {
        let scale = if initial_scale > 0.0 { initial_scale } else { 1.0 };
        Self {
            transform: Transform::with_scale(scale),
            mount_key: MountKey::new(),
            options: FitOptions::default(),
        }
    }

    /// Override the fit options
    pub fn with_options(mut self, options: FitOptions) -> Self {
        self.options = options;
        self
    }

    /// Last applied transform
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Zoom level the next mount should start at
    pub fn initial_scale(&self) -> f32 {
        self.transform.scale
    }

    /// Current mount key
    pub fn mount_key(&self) -> MountKey {
        self.mount_key
    }

    /// Issue a fresh mount key
    pub fn remount(&mut self) -> MountKey {
        self.mount_key = MountKey::new();
        self.mount_key
    }

    /// Fit `nodes` into the viewport and apply the result to `engine`.
    ///
    /// Returns the applied transform, or `None` (transform unchanged) when
    /// there are no nodes.
    pub fn fit<'a>(
        &mut self,
        nodes: impl IntoIterator<Item = &'a Node>,
        viewport: Vec2,
        engine: Option<&mut dyn GraphEngine>,
    ) -> Option<Transform> {
        let transform = fit_nodes(nodes, viewport, &self.options)?;
        if let Some(engine) = engine {
            engine.set_transform(transform);
        }
        self.transform = transform;
        self.remount();
        tracing::debug!(
            "Fit to view: scale {:.3}, translate ({:.1}, {:.1}), mount {}",
            transform.scale,
            transform.x,
            transform.y,
            self.mount_key
        );
        Some(transform)
    }
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(1.0)
    }
}
