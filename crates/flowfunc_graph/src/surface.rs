// SPDX-License-Identifier: MIT OR Apache-2.0
//! The rendered element tree the selection tracker and status applier mutate.
//!
//! [`NodeSurface`] is the narrow slice of a DOM this crate needs: find a node's
//! element by id, toggle classes on it, walk from an event target up to the
//! enclosing node wrapper, and keep attributes on the container.
//! [`ElementTree`] is an in-memory implementation for headless hosts.

use crate::error::LookupFailure;
use indexmap::{IndexMap, IndexSet};

/// Class-name prefix of the element wrapping each rendered node
pub const NODE_WRAPPER_PREFIX: &str = "Node_wrapper";

/// Attribute carrying the node id on a node wrapper
pub const NODE_ID_ATTRIBUTE: &str = "data-node-id";

/// Class marking a selected node
pub const ACTIVE_CLASS: &str = "active";

/// Container attribute recording that click handlers are installed
pub const BOUND_ATTRIBUTE: &str = "data-event-click";

/// Handle to an element on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub usize);

/// A rendered element tree hosting node wrappers
pub trait NodeSurface {
    /// Id of the nearest node-wrapper ancestor of `target` (inclusive)
    fn closest_node(&self, target: ElementId) -> Option<String>;

    /// Add a class to a node's element
    fn add_node_class(&mut self, node_id: &str, class: &str) -> Result<(), LookupFailure>;

    /// Remove classes from a node's element
    fn remove_node_classes(&mut self, node_id: &str, classes: &[&str]) -> Result<(), LookupFailure>;

    /// Whether a node's element carries `class`
    fn node_has_class(&self, node_id: &str, class: &str) -> bool;

    /// Read an attribute of the container element
    fn container_attribute(&self, name: &str) -> Option<String>;

    /// Set an attribute on the container element
    fn set_container_attribute(&mut self, name: &str, value: &str);
}

#[derive(Debug, Clone, Default)]
struct Element {
    parent: Option<ElementId>,
    classes: IndexSet<String>,
    attributes: IndexMap<String, String>,
}

/// In-memory element tree. Element 0 is the container.
#[derive(Debug, Clone)]
pub struct ElementTree {
    elements: Vec<Element>,
}

impl ElementTree {
    /// The container element
    pub const CONTAINER: ElementId = ElementId(0);

    /// Create a tree holding only the container
    pub fn new() -> Self {
        Self {
            elements: vec![Element::default()],
        }
    }

    /// Append a child element with the given classes
    pub fn append(&mut self, parent: ElementId, classes: &[&str]) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element {
            parent: Some(parent),
            classes: classes.iter().map(|c| (*c).to_string()).collect(),
            attributes: IndexMap::new(),
        });
        id
    }

    /// Append a node wrapper for `node_id` directly under the container
    pub fn append_node(&mut self, node_id: &str) -> ElementId {
        let id = self.append(Self::CONTAINER, &["Node_wrapper__2O2Ng"]);
        self.set_attribute(id, NODE_ID_ATTRIBUTE, node_id);
        id
    }

    /// Element for `node_id`, appending a wrapper if there is none yet
    pub fn ensure_node(&mut self, node_id: &str) -> ElementId {
        match self.node_element(node_id) {
            Some(id) => id,
            None => self.append_node(node_id),
        }
    }

    /// Set an attribute on any element
    pub fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        if let Some(el) = self.elements.get_mut(element.0) {
            el.attributes.insert(name.to_string(), value.to_string());
        }
    }

    /// Read an attribute of any element
    pub fn attribute(&self, element: ElementId, name: &str) -> Option<&str> {
        self.elements
            .get(element.0)
            .and_then(|el| el.attributes.get(name))
            .map(String::as_str)
    }

    /// Classes of an element, in insertion order
    pub fn classes(&self, element: ElementId) -> Vec<&str> {
        self.elements
            .get(element.0)
            .map(|el| el.classes.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Element rendering `node_id`, if any
    pub fn node_element(&self, node_id: &str) -> Option<ElementId> {
        self.elements
            .iter()
            .position(|el| el.attributes.get(NODE_ID_ATTRIBUTE).is_some_and(|id| id == node_id))
            .map(ElementId)
    }

    /// Classes of the element rendering `node_id`
    pub fn node_classes(&self, node_id: &str) -> Vec<&str> {
        self.node_element(node_id)
            .map(|el| self.classes(el))
            .unwrap_or_default()
    }

    fn is_node_wrapper(element: &Element) -> bool {
        element
            .classes
            .first()
            .is_some_and(|class| class.starts_with(NODE_WRAPPER_PREFIX))
    }

    fn node_element_mut(&mut self, node_id: &str) -> Result<&mut Element, LookupFailure> {
        let index = self
            .node_element(node_id)
            .ok_or_else(|| LookupFailure::NodeElement(node_id.to_string()))?;
        Ok(&mut self.elements[index.0])
    }
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeSurface for ElementTree {
    fn closest_node(&self, target: ElementId) -> Option<String> {
        let mut current = Some(target);
        while let Some(id) = current {
            let element = self.elements.get(id.0)?;
            if Self::is_node_wrapper(element) {
                return element.attributes.get(NODE_ID_ATTRIBUTE).cloned();
            }
            current = element.parent;
        }
        None
    }

    fn add_node_class(&mut self, node_id: &str, class: &str) -> Result<(), LookupFailure> {
        self.node_element_mut(node_id)?
            .classes
            .insert(class.to_string());
        Ok(())
    }

    fn remove_node_classes(&mut self, node_id: &str, classes: &[&str]) -> Result<(), LookupFailure> {
        let element = self.node_element_mut(node_id)?;
        for class in classes {
            element.classes.shift_remove(*class);
        }
        Ok(())
    }

    fn node_has_class(&self, node_id: &str, class: &str) -> bool {
        self.node_classes(node_id).contains(&class)
    }

    fn container_attribute(&self, name: &str) -> Option<String> {
        self.attribute(Self::CONTAINER, name).map(str::to_string)
    }

    fn set_container_attribute(&mut self, name: &str, value: &str) {
        self.set_attribute(Self::CONTAINER, name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closest_node_walks_ancestors() {
        let mut tree = ElementTree::new();
        let wrapper = tree.append_node("n1");
        let header = tree.append(wrapper, &["Node_label__3MmhF"]);
        let text = tree.append(header, &[]);
        let stray = tree.append(ElementTree::CONTAINER, &["Stage_wrapper"]);

        assert_eq!(tree.closest_node(text), Some("n1".to_string()));
        assert_eq!(tree.closest_node(wrapper), Some("n1".to_string()));
        assert_eq!(tree.closest_node(stray), None);
        assert_eq!(tree.closest_node(ElementId(99)), None);
    }

    #[test]
    fn test_wrapper_prefix_must_lead_class_list() {
        let mut tree = ElementTree::new();
        let el = tree.append(ElementTree::CONTAINER, &["selected", "Node_wrapper__x"]);
        tree.set_attribute(el, NODE_ID_ATTRIBUTE, "n1");
        assert_eq!(tree.closest_node(el), None);
    }

    #[test]
    fn test_class_operations() {
        let mut tree = ElementTree::new();
        tree.append_node("n1");

        tree.add_node_class("n1", "queued").unwrap();
        tree.add_node_class("n1", ACTIVE_CLASS).unwrap();
        assert!(tree.node_has_class("n1", "queued"));

        tree.remove_node_classes("n1", &["queued", "missing"]).unwrap();
        assert!(!tree.node_has_class("n1", "queued"));
        assert!(tree.node_has_class("n1", ACTIVE_CLASS));

        assert_eq!(
            tree.add_node_class("ghost", ACTIVE_CLASS),
            Err(LookupFailure::NodeElement("ghost".to_string()))
        );
    }
}
