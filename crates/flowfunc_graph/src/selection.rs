// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node selection driven by delegated click events.
//!
//! [`Selection::reduce`] is a pure reducer from a resolved pointer event to the
//! next selection plus the effects to carry out. [`SelectionTracker`] resolves
//! raw events against a [`NodeSurface`] and applies those effects.

use crate::surface::{ElementId, NodeSurface, ACTIVE_CLASS, BOUND_ATTRIBUTE};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A pointer event with its target already resolved to a node id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerEvent {
    /// Single click; `modifier` is ctrl/cmd
    Click {
        /// Node under the pointer, if any
        node: Option<String>,
        /// Whether the accumulate modifier was held
        modifier: bool,
    },
    /// Double click
    DoubleClick {
        /// Node under the pointer, if any
        node: Option<String>,
    },
}

/// Work the tracker must do after a reduction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEffect {
    /// Remove the active marker from every known node
    ClearActive,
    /// Add the active marker to a node
    MarkActive(String),
    /// Report the selection to the host
    EmitSelected(Vec<String>),
    /// Report a double-clicked node to the host
    EmitDoubleClicked(String),
}

/// Ordered set of selected node ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    nodes: IndexSet<String>,
}

impl Selection {
    /// An empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `node_id` is selected
    pub fn contains(&self, node_id: &str) -> bool {
        self.nodes.contains(node_id)
    }

    /// Number of selected nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing is selected
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Selected ids in selection order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    /// Selected ids as an owned list
    pub fn to_vec(&self) -> Vec<String> {
        self.nodes.iter().cloned().collect()
    }

    /// Compute the next selection for `event`.
    ///
    /// A plain click replaces the selection (or empties it when no node was
    /// hit). A modifier click only ever adds. A double click leaves the
    /// selection alone.
    pub fn reduce(&self, event: &PointerEvent) -> (Selection, Vec<SelectionEffect>) {
        match event {
            PointerEvent::Click { node, modifier } => {
                let mut next = if *modifier { self.clone() } else { Selection::new() };
                let mut effects = Vec::new();
                if !*modifier {
                    effects.push(SelectionEffect::ClearActive);
                }
                if let Some(node) = node {
                    next.nodes.insert(node.clone());
                    effects.push(SelectionEffect::MarkActive(node.clone()));
                }
                effects.push(SelectionEffect::EmitSelected(next.to_vec()));
                (next, effects)
            }
            PointerEvent::DoubleClick { node } => {
                let effects = node
                    .iter()
                    .map(|node| SelectionEffect::EmitDoubleClicked(node.clone()))
                    .collect();
                (self.clone(), effects)
            }
        }
    }
}

impl FromIterator<String> for Selection {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

/// What a handled event reports to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutput {
    /// The selection after a click
    Selected(Vec<String>),
    /// A node was double clicked
    DoubleClicked(String),
}

/// Holds the selection and applies reductions to a surface
#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    selection: Selection,
}

impl SelectionTracker {
    /// Create a tracker with nothing selected
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the click handlers on `surface` once.
    ///
    /// Returns `true` the first time and `false` on every later call for the
    /// same container.
    pub fn bind<S: NodeSurface + ?Sized>(surface: &mut S) -> bool {
        if surface.container_attribute(BOUND_ATTRIBUTE).as_deref() == Some("true") {
            return false;
        }
        surface.set_container_attribute(BOUND_ATTRIBUTE, "true");
        tracing::debug!("Click handlers bound to container");
        true
    }

    /// Current selection
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Handle a click on `target`. `known_nodes` are the ids whose active
    /// marker is cleared on a plain click.
    pub fn click<'a, S: NodeSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        known_nodes: impl IntoIterator<Item = &'a str>,
        target: ElementId,
        modifier: bool,
    ) -> Vec<SelectionOutput> {
        let node = surface.closest_node(target);
        self.dispatch(surface, known_nodes, &PointerEvent::Click { node, modifier })
    }

    /// Handle a double click on `target`
    pub fn double_click<S: NodeSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        target: ElementId,
    ) -> Vec<SelectionOutput> {
        let node = surface.closest_node(target);
        self.dispatch(surface, std::iter::empty(), &PointerEvent::DoubleClick { node })
    }

    /// Reduce an already resolved event and apply its effects
    pub fn dispatch<'a, S: NodeSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        known_nodes: impl IntoIterator<Item = &'a str>,
        event: &PointerEvent,
    ) -> Vec<SelectionOutput> {
        let (next, effects) = self.selection.reduce(event);
        self.selection = next;

        let mut known_nodes = Some(known_nodes);
        let mut outputs = Vec::new();
        for effect in effects {
            match effect {
                SelectionEffect::ClearActive => {
                    for node_id in known_nodes.take().into_iter().flatten() {
                        if let Err(e) = surface.remove_node_classes(node_id, &[ACTIVE_CLASS]) {
                            tracing::debug!("Skipping active marker: {}", e);
                        }
                    }
                }
                SelectionEffect::MarkActive(node_id) => {
                    if let Err(e) = surface.add_node_class(&node_id, ACTIVE_CLASS) {
                        tracing::debug!("Skipping active marker: {}", e);
                    }
                }
                SelectionEffect::EmitSelected(ids) => outputs.push(SelectionOutput::Selected(ids)),
                SelectionEffect::EmitDoubleClicked(id) => {
                    outputs.push(SelectionOutput::DoubleClicked(id));
                }
            }
        }
        outputs
    }
}
